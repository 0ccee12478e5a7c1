//! # verdict-retrieval
//!
//! The query-time retrieval layer: exact/superset/subset matching against
//! the pattern index, combined-similarity case retrieval, and the vector
//! scans backing the pure-RAG detection path.

pub mod engine;
pub mod matching;

pub use engine::{load_knowledge_base, RetrievalEngine};
pub use matching::find_matches;
