//! # verdict-knowledge
//!
//! The persisted knowledge base. A SQLite store holds enriched patterns,
//! their owned cases, embeddings, and a resumable build checkpoint; the
//! in-memory [`KnowledgeBase`] view adds the exact-subsequence pattern
//! index and flat vector indexes the query path serves from.

pub mod builder;
pub mod enrichment;
pub mod index;
pub mod store;
pub mod vector;

pub use builder::{BuildReport, KnowledgeBuilder};
pub use index::{KnowledgeBase, PatternIndex};
pub use store::KnowledgeStore;
pub use vector::{cosine_similarity, FlatVectorIndex};
