//! Match-set classification driving the pattern-RAG state machine.

use verdict_core::models::{MatchCategory, PatternKind};

/// Classify a set of matched pattern kinds.
///
/// Pure patterns decide: any pure-malware match without a pure-benign one
/// is a deterministic malware verdict and vice versa; both present at once
/// is a conflict the caller resolves as malicious with reduced confidence.
/// Biased patterns alone only justify an LLM-backed analysis.
pub fn classify_matches(kinds: &[PatternKind]) -> MatchCategory {
    if kinds.is_empty() {
        return MatchCategory::NoMatch;
    }

    let has_pure_malware = kinds.contains(&PatternKind::PureMalwareOnly);
    let has_pure_benign = kinds.contains(&PatternKind::PureBenignOnly);

    match (has_pure_malware, has_pure_benign) {
        (true, true) => MatchCategory::DeterministicBoth,
        (true, false) => MatchCategory::DeterministicMalware,
        (false, true) => MatchCategory::DeterministicBenign,
        (false, false) => MatchCategory::JustificationOnly,
    }
}
