//! # verdict-mining
//!
//! Frequent-subsequence pattern mining over labeled action sequences.
//! A PrefixSpan miner feeds a hierarchical coverage-greedy selection loop
//! that lowers the support threshold level by level, classifying each
//! surviving pattern as pure or distinction by its benign/malware split.

pub mod coverage;
pub mod engine;
pub mod interner;
pub mod prefixspan;

pub use engine::MiningEngine;
pub use verdict_core::subsequence::is_subsequence;
