use serde::{Deserialize, Serialize};

use super::sequence::CaseLabel;

/// How a mined pattern relates to the benign/malware corpus split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Observed only in benign sequences.
    PureBenignOnly,
    /// Observed only in malware sequences.
    PureMalwareOnly,
    /// Observed in both, skewed toward benign beyond the threshold.
    DistinctionBenignBiased,
    /// Observed in both, skewed toward malware beyond the threshold.
    DistinctionMalwareBiased,
}

impl PatternKind {
    /// Whether the pattern appears in exactly one label class.
    pub fn is_pure(&self) -> bool {
        matches!(self, PatternKind::PureBenignOnly | PatternKind::PureMalwareOnly)
    }

    /// Whether this pattern is evidence toward a malicious verdict.
    pub fn is_malware_signal(&self) -> bool {
        matches!(
            self,
            PatternKind::PureMalwareOnly | PatternKind::DistinctionMalwareBiased
        )
    }

    /// The label class this pattern leans toward.
    pub fn biased_label(&self) -> CaseLabel {
        match self {
            PatternKind::PureBenignOnly | PatternKind::DistinctionBenignBiased => CaseLabel::Benign,
            PatternKind::PureMalwareOnly | PatternKind::DistinctionMalwareBiased => {
                CaseLabel::Malware
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::PureBenignOnly => "pure_benign_only",
            PatternKind::PureMalwareOnly => "pure_malware_only",
            PatternKind::DistinctionBenignBiased => "distinction_benign_biased",
            PatternKind::DistinctionMalwareBiased => "distinction_malware_biased",
        }
    }
}

impl std::str::FromStr for PatternKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pure_benign_only" => Ok(PatternKind::PureBenignOnly),
            "pure_malware_only" => Ok(PatternKind::PureMalwareOnly),
            "distinction_benign_biased" => Ok(PatternKind::DistinctionBenignBiased),
            "distinction_malware_biased" => Ok(PatternKind::DistinctionMalwareBiased),
            other => Err(format!("unknown pattern kind: {other}")),
        }
    }
}

/// Benign/malware coverage statistics for a pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternCoverage {
    pub benign_count: usize,
    pub malware_count: usize,
    /// `benign_count / (benign_count + malware_count)`.
    pub benign_ratio: f64,
    /// `malware_count / (benign_count + malware_count)`.
    pub malware_ratio: f64,
}

impl PatternCoverage {
    pub fn new(benign_count: usize, malware_count: usize) -> Self {
        let total = benign_count + malware_count;
        let (benign_ratio, malware_ratio) = if total == 0 {
            (0.0, 0.0)
        } else {
            (
                benign_count as f64 / total as f64,
                malware_count as f64 / total as f64,
            )
        };
        Self {
            benign_count,
            malware_count,
            benign_ratio,
            malware_ratio,
        }
    }

    /// The dominant label ratio, used for ranking and the distinction bound.
    pub fn max_ratio(&self) -> f64 {
        self.benign_ratio.max(self.malware_ratio)
    }

    pub fn total(&self) -> usize {
        self.benign_count + self.malware_count
    }
}

/// Semantic annotations attached to a pattern during the knowledge build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternEnrichment {
    pub semantic_summary: String,
    pub security_assessment: String,
    pub typical_scenarios: Vec<String>,
    pub benign_characteristics: Vec<String>,
    pub malware_characteristics: Vec<String>,
    pub distinction_rules: Vec<String>,
    pub context_indicators: Vec<String>,
}

impl PatternEnrichment {
    /// Fallback enrichment when the LLM call or parse fails: a synthesized
    /// one-line summary and empty characteristic lists.
    pub fn minimal(subsequence: &[String]) -> Self {
        Self {
            semantic_summary: format!("Pattern: {}", subsequence.join(" -> ")),
            ..Default::default()
        }
    }
}

/// A fully built pattern as persisted in the knowledge base.
///
/// Created once by mining, enriched once by the knowledge builder, and
/// read-only on the query path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub id: i64,
    pub subsequence: Vec<String>,
    pub kind: PatternKind,
    /// Maximum support observed for this subsequence during mining.
    pub support: usize,
    /// The support level the pattern was discovered at.
    pub discovery_level: usize,
    pub coverage: PatternCoverage,
    pub enrichment: PatternEnrichment,
    /// Embedding of the space-joined subsequence.
    pub embedding: Vec<f32>,
}

/// Raw miner output, before enrichment and persistence.
///
/// `covered_benign` / `covered_malware` hold the indices of the input
/// sequences this pattern newly covered when it was greedily accepted.
/// Because acceptance only counts sequences no earlier pattern claimed,
/// these sets partition the covered corpus: each sequence is owned by
/// exactly one pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinedPattern {
    pub subsequence: Vec<String>,
    pub kind: PatternKind,
    pub support: usize,
    pub discovery_level: usize,
    pub coverage: PatternCoverage,
    pub covered_benign: Vec<usize>,
    pub covered_malware: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_ratios_sum_to_one() {
        let cov = PatternCoverage::new(3, 7);
        assert_eq!(cov.benign_ratio, 0.3);
        assert_eq!(cov.malware_ratio, 0.7);
        assert_eq!(cov.max_ratio(), 0.7);
    }

    #[test]
    fn empty_coverage_has_zero_ratios() {
        let cov = PatternCoverage::new(0, 0);
        assert_eq!(cov.max_ratio(), 0.0);
    }

    #[test]
    fn minimal_enrichment_formats_arrow_chain() {
        let e = PatternEnrichment::minimal(&[
            "read_env_var".to_string(),
            "http_post".to_string(),
        ]);
        assert_eq!(e.semantic_summary, "Pattern: read_env_var -> http_post");
        assert!(e.distinction_rules.is_empty());
    }

    #[test]
    fn kind_bias() {
        assert_eq!(
            PatternKind::DistinctionMalwareBiased.biased_label(),
            CaseLabel::Malware
        );
        assert!(PatternKind::PureBenignOnly.is_pure());
        assert!(!PatternKind::DistinctionBenignBiased.is_pure());
        assert!(PatternKind::DistinctionMalwareBiased.is_malware_signal());
        assert!(!PatternKind::PureBenignOnly.is_malware_signal());
    }
}
