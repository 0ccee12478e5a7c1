//! Provider traits implemented outside the core crate.

mod embedding;
mod llm;

pub use embedding::IEmbeddingProvider;
pub use llm::ILlmProvider;
