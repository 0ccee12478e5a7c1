//! # verdict-detection
//!
//! The decision layer. Two strategies share one output contract: pure-RAG
//! always retrieves and asks the LLM once; pattern-RAG matches the pattern
//! index first and short-circuits deterministically when pure patterns
//! settle the verdict, calling the LLM only for ambiguous inputs.
//!
//! `DetectionEngine::detect` never returns an error and never panics; every
//! failure becomes a well-formed output with `detection_method == "error"`.

pub mod category;
pub mod engine;
pub mod prompts;
pub mod risk;

pub use category::classify_matches;
pub use engine::DetectionEngine;
