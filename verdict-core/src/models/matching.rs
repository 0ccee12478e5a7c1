use serde::{Deserialize, Serialize};

use super::sequence::CaseLabel;

/// Relationship between a query sequence and an indexed pattern subsequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Query equals the pattern subsequence.
    Exact,
    /// Query is a subsequence of the pattern (the pattern is a superset context).
    ContainsInput,
    /// Pattern is a subsequence of the query.
    ContainedByInput,
}

impl MatchType {
    /// Ranking priority: exact > contains_input > contained_by_input.
    pub fn priority(&self) -> u8 {
        match self {
            MatchType::Exact => 3,
            MatchType::ContainsInput => 2,
            MatchType::ContainedByInput => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::ContainsInput => "contains_input",
            MatchType::ContainedByInput => "contained_by_input",
        }
    }
}

/// One ranked hit from the pattern index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern_id: i64,
    /// Length of the contained side of the match.
    pub match_length: usize,
    pub match_type: MatchType,
}

/// Classification of a full match set, drives the detection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchCategory {
    /// No pattern matched at all.
    NoMatch,
    /// At least one pure-malware pattern matched, no pure-benign.
    DeterministicMalware,
    /// At least one pure-benign pattern matched, no pure-malware.
    DeterministicBenign,
    /// Both pure-malware and pure-benign patterns matched.
    DeterministicBoth,
    /// Only distinction (biased) patterns matched.
    JustificationOnly,
}

/// A case retrieved by combined embedding similarity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarCase {
    pub case_id: i64,
    pub pattern_id: i64,
    pub label: CaseLabel,
    pub filename: String,
    pub similarity: f64,
    pub case_summary: String,
    pub risk_indicators: Vec<String>,
}

/// A pattern retrieved by sequence-embedding similarity (pure-RAG path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarPattern {
    pub pattern_id: i64,
    pub similarity: f64,
    pub kind: super::pattern::PatternKind,
    pub semantic_summary: String,
    pub security_assessment: String,
}
