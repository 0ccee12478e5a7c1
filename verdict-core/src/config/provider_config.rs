use serde::{Deserialize, Serialize};

use super::defaults;

/// LLM provider configuration (OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key; empty means no auth.
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_retries: usize,
    /// Linear backoff base: attempt `n` waits `n * backoff_base_secs`.
    pub backoff_base_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_LLM_BASE_URL.to_string(),
            model: defaults::DEFAULT_LLM_MODEL.to_string(),
            api_key_env: String::new(),
            timeout_secs: defaults::DEFAULT_LLM_TIMEOUT_SECS,
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            backoff_base_secs: defaults::DEFAULT_BACKOFF_BASE_SECS,
        }
    }
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// "http" for a remote endpoint, "hashing" for the offline fallback.
    pub provider: String,
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub dimensions: usize,
    /// Texts above this many estimated tokens are chunked before embedding.
    pub chunk_token_limit: usize,
    pub max_retries: usize,
    pub backoff_base_secs: u64,
    pub timeout_secs: u64,
    /// L1 cache capacity (entries).
    pub cache_size: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: defaults::DEFAULT_EMBEDDING_PROVIDER.to_string(),
            base_url: defaults::DEFAULT_LLM_BASE_URL.to_string(),
            model: defaults::DEFAULT_EMBEDDING_MODEL.to_string(),
            api_key_env: String::new(),
            dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
            chunk_token_limit: defaults::DEFAULT_CHUNK_TOKEN_LIMIT,
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            backoff_base_secs: defaults::DEFAULT_BACKOFF_BASE_SECS,
            timeout_secs: defaults::DEFAULT_LLM_TIMEOUT_SECS,
            cache_size: defaults::DEFAULT_EMBED_CACHE_SIZE,
        }
    }
}
