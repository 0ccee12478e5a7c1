use serde::{Deserialize, Serialize};

use super::matching::{PatternMatch, SimilarCase};

/// Final risk classification attached to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Benign,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Benign => "benign",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// The structured verdict returned by every detection request.
///
/// Detection never raises to the caller: the only observable failure mode
/// is `detection_method == "error"` with the cause in `llm_reasoning`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionOutput {
    pub is_malicious: bool,
    /// In [0, 1].
    pub confidence: f64,
    pub risk_level: RiskLevel,
    /// "pattern_match", "pattern_rag", "pure_rag", or "error".
    pub detection_method: String,
    pub matched_patterns: Vec<PatternMatch>,
    pub top_similar_cases: Vec<SimilarCase>,
    pub explanation: String,
    pub recommendation: String,
    /// Raw LLM reasoning, or the failure message on the error path.
    pub llm_reasoning: String,
}

impl DetectionOutput {
    /// Terminal output for any internal failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_malicious: false,
            confidence: 0.0,
            risk_level: RiskLevel::Low,
            detection_method: "error".to_string(),
            matched_patterns: Vec::new(),
            top_similar_cases: Vec::new(),
            explanation: String::new(),
            recommendation: String::new(),
            llm_reasoning: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_output_is_well_formed() {
        let out = DetectionOutput::error("provider down");
        assert!(!out.is_malicious);
        assert_eq!(out.confidence, 0.0);
        assert_eq!(out.detection_method, "error");
        assert_eq!(out.llm_reasoning, "provider down");
    }

    #[test]
    fn risk_level_serializes_snake_case() {
        let json = serde_json::to_string(&RiskLevel::High).unwrap();
        assert_eq!(json, "\"high\"");
    }
}
