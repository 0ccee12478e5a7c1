use serde::{Deserialize, Serialize};

use crate::constants::{
    CASE_SIMILARITY_WEIGHT, HIGH_RISK_CONFIDENCE, LABEL_CONSISTENCY_WEIGHT,
    MEDIUM_RISK_CONFIDENCE, PATTERN_SIMILARITY_WEIGHT,
};

/// Which decision procedure the detection engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStrategy {
    /// Retrieval + one LLM call, no deterministic short-circuit.
    PureRag,
    /// Pattern matching first; deterministic verdicts skip the LLM.
    PatternRag,
}

/// Detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub strategy: DetectionStrategy,
    /// Confidence weights for the LLM-backed branches.
    pub pattern_weight: f64,
    pub case_weight: f64,
    pub consistency_weight: f64,
    /// Confidence thresholds for risk levels.
    pub high_risk_confidence: f64,
    pub medium_risk_confidence: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            strategy: DetectionStrategy::PatternRag,
            pattern_weight: PATTERN_SIMILARITY_WEIGHT,
            case_weight: CASE_SIMILARITY_WEIGHT,
            consistency_weight: LABEL_CONSISTENCY_WEIGHT,
            high_risk_confidence: HIGH_RISK_CONFIDENCE,
            medium_risk_confidence: MEDIUM_RISK_CONFIDENCE,
        }
    }
}
