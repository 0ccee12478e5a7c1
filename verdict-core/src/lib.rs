//! # verdict-core
//!
//! Foundation crate for the Verdict malicious-package detection system.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod llm_json;
pub mod models;
pub mod subsequence;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::VerdictConfig;
pub use errors::{VerdictError, VerdictResult};
pub use models::{
    ActionSequence, CaseLabel, CaseRecord, DetectionOutput, MatchType, MinedPattern, Pattern,
    PatternKind, PatternMatch, RiskLevel,
};
pub use subsequence::is_subsequence;
