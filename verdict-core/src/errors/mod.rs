//! Error types for every Verdict subsystem, plus the umbrella
//! [`VerdictError`] and the [`VerdictResult`] alias used across crates.

mod knowledge_error;
mod mining_error;
mod provider_error;
mod retrieval_error;

pub use knowledge_error::KnowledgeError;
pub use mining_error::MiningError;
pub use provider_error::ProviderError;
pub use retrieval_error::RetrievalError;

/// Umbrella error for the whole system.
#[derive(Debug, thiserror::Error)]
pub enum VerdictError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Mining(#[from] MiningError),

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error("configuration error: {reason}")]
    Config { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result alias used by every crate in the workspace.
pub type VerdictResult<T> = Result<T, VerdictError>;
