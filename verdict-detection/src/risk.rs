//! Confidence and risk-level computation for the LLM-backed branches.

use verdict_core::config::DetectionConfig;
use verdict_core::constants::HIGH_RISK_KEYWORDS;
use verdict_core::models::{CaseLabel, Pattern, RiskLevel, SimilarCase, SimilarPattern};

/// Weighted confidence for a non-deterministic verdict, clamped to [0, 1].
pub fn confidence(
    config: &DetectionConfig,
    avg_pattern_similarity: f64,
    avg_case_similarity: f64,
    label_consistency: f64,
) -> f64 {
    let raw = config.pattern_weight * avg_pattern_similarity
        + config.case_weight * avg_case_similarity
        + config.consistency_weight * label_consistency;
    raw.clamp(0.0, 1.0)
}

pub fn average_similarity(similarities: &[f64]) -> f64 {
    if similarities.is_empty() {
        return 0.0;
    }
    similarities.iter().sum::<f64>() / similarities.len() as f64
}

/// Fraction of retrieved cases whose label agrees with the verdict.
/// Zero when nothing was retrieved.
pub fn label_consistency(cases: &[SimilarCase], is_malicious: bool) -> f64 {
    if cases.is_empty() {
        return 0.0;
    }
    let verdict_label = if is_malicious {
        CaseLabel::Malware
    } else {
        CaseLabel::Benign
    };
    let agreeing = cases.iter().filter(|c| c.label == verdict_label).count();
    agreeing as f64 / cases.len() as f64
}

/// Whether any pattern assessment or case risk indicator names a known
/// high-risk behavior.
pub fn mentions_high_risk_keyword(patterns: &[SimilarPattern], cases: &[SimilarCase]) -> bool {
    let pattern_texts = patterns
        .iter()
        .flat_map(|p| [p.semantic_summary.as_str(), p.security_assessment.as_str()]);
    let case_texts = cases
        .iter()
        .flat_map(|c| c.risk_indicators.iter().map(String::as_str));

    pattern_texts
        .chain(case_texts)
        .any(|text| contains_keyword(text))
}

/// Keyword scan over the enrichment texts of index-matched patterns.
pub fn matched_patterns_mention_keyword<'a>(
    patterns: impl IntoIterator<Item = &'a Pattern>,
) -> bool {
    patterns.into_iter().any(|p| {
        contains_keyword(&p.enrichment.semantic_summary)
            || contains_keyword(&p.enrichment.security_assessment)
            || p.enrichment
                .malware_characteristics
                .iter()
                .any(|t| contains_keyword(t))
    })
}

fn contains_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    HIGH_RISK_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Final risk level. A benign verdict is always `Benign`; malicious
/// verdicts escalate on keyword hits or confidence thresholds.
pub fn risk_level(
    config: &DetectionConfig,
    is_malicious: bool,
    confidence: f64,
    keyword_hit: bool,
) -> RiskLevel {
    if !is_malicious {
        return RiskLevel::Benign;
    }
    if keyword_hit || confidence >= config.high_risk_confidence {
        RiskLevel::High
    } else if confidence >= config.medium_risk_confidence {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
