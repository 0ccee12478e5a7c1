//! # verdict-providers
//!
//! External provider plumbing: an OpenAI-compatible LLM client, an HTTP
//! embedding client with chunked long-text handling, a deterministic
//! hashing fallback embedder for offline use, an L1 embedding cache, and
//! the retry policy wrapping every remote call.

pub mod embedding;
pub mod llm;
pub mod retry;

pub use embedding::{create_embedding_provider, CachedEmbedder, HashingEmbedder, HttpEmbedder};
pub use llm::HttpLlmProvider;
pub use retry::RetryPolicy;
