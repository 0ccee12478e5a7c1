use crate::errors::VerdictResult;

/// Text-generation provider.
///
/// Implementations must request a JSON-object response from the backing
/// model; callers parse the returned string with [`crate::llm_json`].
pub trait ILlmProvider: Send + Sync {
    /// Run one completion and return the raw response text.
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> VerdictResult<String>;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider is currently available.
    fn is_available(&self) -> bool;
}
