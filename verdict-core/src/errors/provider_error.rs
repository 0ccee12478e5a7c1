/// Errors from external LLM and embedding providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider unavailable: {provider}")]
    Unavailable { provider: String },

    #[error("request to {provider} failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("invalid response from provider: {reason}")]
    InvalidResponse { reason: String },

    #[error("{provider} failed after {attempts} attempts")]
    RetriesExhausted { provider: String, attempts: usize },

    #[error("request to {provider} timed out after {seconds}s")]
    Timeout { provider: String, seconds: u64 },
}
