//! Coverage computation and pattern-kind classification.

use verdict_core::models::{PatternCoverage, PatternKind};

use verdict_core::subsequence::is_subsequence;

/// Indices (into the given slice of symbol sequences) that contain
/// `pattern` as a subsequence.
pub fn covering_indices(pattern: &[u32], sequences: &[Vec<u32>], candidates: &[usize]) -> Vec<usize> {
    candidates
        .iter()
        .copied()
        .filter(|&i| is_subsequence(pattern, &sequences[i]))
        .collect()
}

/// Fraction of all `sequences` containing `pattern` as a subsequence.
pub fn coverage_fraction(pattern: &[u32], sequences: &[Vec<u32>]) -> f64 {
    if sequences.is_empty() {
        return 0.0;
    }
    let hits = sequences
        .iter()
        .filter(|s| is_subsequence(pattern, s))
        .count();
    hits as f64 / sequences.len() as f64
}

/// Classify a pattern by its benign/malware coverage split.
///
/// Pure kinds require exactly zero opposite-label coverage. Mixed patterns
/// must reach `distinction_threshold` on their dominant side or they are
/// discarded (`None`).
pub fn classify(coverage: &PatternCoverage, distinction_threshold: f64) -> Option<PatternKind> {
    match (coverage.benign_count, coverage.malware_count) {
        (0, 0) => None,
        (0, _) => Some(PatternKind::PureMalwareOnly),
        (_, 0) => Some(PatternKind::PureBenignOnly),
        _ if coverage.max_ratio() >= distinction_threshold => {
            if coverage.benign_ratio >= coverage.malware_ratio {
                Some(PatternKind::DistinctionBenignBiased)
            } else {
                Some(PatternKind::DistinctionMalwareBiased)
            }
        }
        _ => None,
    }
}

/// Global over-generalization check against the full corpus.
///
/// A benign-leaning candidate is rejected when it covers more than
/// `1 - distinction_threshold` of the full malware set (and symmetrically
/// for malware-leaning candidates). Mining restricts coverage to the
/// uncovered remainder, so without this check a shrinking remainder could
/// admit patterns that are common on the other side of the full corpus.
pub fn conflicts_globally(
    pattern: &[u32],
    kind: PatternKind,
    full_benign: &[Vec<u32>],
    full_malware: &[Vec<u32>],
    distinction_threshold: f64,
) -> bool {
    let limit = 1.0 - distinction_threshold;
    match kind.biased_label() {
        verdict_core::models::CaseLabel::Benign => {
            coverage_fraction(pattern, full_malware) > limit
        }
        verdict_core::models::CaseLabel::Malware => {
            coverage_fraction(pattern, full_benign) > limit
        }
    }
}
