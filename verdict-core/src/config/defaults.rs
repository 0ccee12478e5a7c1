//! Default values shared between config structs and constants.

pub use crate::constants::{
    DEFAULT_DISTINCTION_THRESHOLD, DEFAULT_EARLY_STOP_COVERAGE, DEFAULT_MAX_CASE_SAMPLES,
    DEFAULT_MAX_LEVEL_DURATION_SECS, DEFAULT_MAX_PATTERN_LENGTH, DEFAULT_MIN_PATTERN_LENGTH,
    DEFAULT_TOP_K,
};

pub const DEFAULT_KNOWLEDGE_DB: &str = "knowledge/verdict.db";
pub const DEFAULT_WORKER_THREADS: usize = 4;
pub const DEFAULT_LLM_BASE_URL: &str = "http://localhost:11434/v1";
pub const DEFAULT_LLM_MODEL: &str = "qwen2.5-coder";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_RETRIES: usize = 3;
pub const DEFAULT_BACKOFF_BASE_SECS: u64 = 2;
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "hashing";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;
pub const DEFAULT_CHUNK_TOKEN_LIMIT: usize = 2048;
pub const DEFAULT_EMBED_CACHE_SIZE: u64 = 4096;
