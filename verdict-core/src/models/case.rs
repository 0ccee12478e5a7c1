use serde::{Deserialize, Serialize};

use super::sequence::CaseLabel;

/// One labeled code sample persisted as retrievable evidence.
///
/// A case is owned by exactly one pattern: the pattern whose greedy
/// acceptance first covered its sequence during mining.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: i64,
    /// The owning pattern.
    pub pattern_id: i64,
    pub filename: String,
    pub label: CaseLabel,
    pub action_sequence: Vec<String>,
    pub code_context: String,
    /// Embedding of the space-joined action identifiers.
    pub sequence_embedding: Vec<f32>,
    /// Embedding of the code context.
    pub context_embedding: Vec<f32>,
    /// Best-effort LLM annotations; empty when enrichment was skipped or failed.
    pub case_summary: String,
    pub key_behaviors: Vec<String>,
    pub risk_indicators: Vec<String>,
}
