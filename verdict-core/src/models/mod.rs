//! Domain models shared by every Verdict crate.

mod case;
mod detection;
mod matching;
mod pattern;
mod sequence;

pub use case::CaseRecord;
pub use detection::{DetectionOutput, RiskLevel};
pub use matching::{MatchCategory, MatchType, PatternMatch, SimilarCase, SimilarPattern};
pub use pattern::{MinedPattern, Pattern, PatternCoverage, PatternEnrichment, PatternKind};
pub use sequence::{ActionSequence, CaseLabel};
