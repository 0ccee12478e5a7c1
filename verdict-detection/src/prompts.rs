//! Detection prompts and verdict parsing.

use verdict_core::llm_json::{self, LlmParseResult};
use verdict_core::models::{Pattern, SimilarCase, SimilarPattern};

pub const DETECTION_SYSTEM_PROMPT: &str = "You are a software supply-chain security analyst. \
Decide whether the analyzed package code is malicious, using the retrieved reference patterns \
and cases as evidence. Respond with a single JSON object with a boolean field `is_malicious` \
and string fields `explanation`, `reasoning`, and `recommendation`.";

/// Build the analysis prompt shared by both LLM-backed branches.
///
/// `seed_patterns` carries the semantic annotations of index-matched
/// patterns on the pattern-RAG path; pure-RAG passes none.
pub fn detection_user_prompt(
    actions: &[String],
    code_context: &str,
    seed_patterns: &[&Pattern],
    similar_patterns: &[SimilarPattern],
    similar_cases: &[SimilarCase],
) -> String {
    let mut prompt = format!(
        "Action sequence: {}\n\nCode:\n{}\n",
        actions.join(" -> "),
        code_context,
    );

    if !seed_patterns.is_empty() {
        prompt.push_str("\nMatched known patterns:\n");
        for p in seed_patterns {
            prompt.push_str(&format!(
                "- {} ({}): {}\n",
                p.subsequence.join(" -> "),
                p.kind.as_str(),
                p.enrichment.semantic_summary,
            ));
            if !p.enrichment.distinction_rules.is_empty() {
                prompt.push_str(&format!(
                    "  distinction rules: {}\n",
                    p.enrichment.distinction_rules.join("; "),
                ));
            }
        }
    }

    if !similar_patterns.is_empty() {
        prompt.push_str("\nSimilar patterns:\n");
        for p in similar_patterns {
            prompt.push_str(&format!(
                "- [{:.2}] {} ({}): {}\n",
                p.similarity,
                p.semantic_summary,
                p.kind.as_str(),
                p.security_assessment,
            ));
        }
    }

    if !similar_cases.is_empty() {
        prompt.push_str("\nSimilar known cases:\n");
        for c in similar_cases {
            prompt.push_str(&format!(
                "- [{:.2}] {} ({}): {}\n",
                c.similarity,
                c.filename,
                c.label.as_str(),
                c.case_summary,
            ));
            if !c.risk_indicators.is_empty() {
                prompt.push_str(&format!(
                    "  risk indicators: {}\n",
                    c.risk_indicators.join("; "),
                ));
            }
        }
    }

    prompt
}

/// Parsed LLM verdict.
#[derive(Debug, Clone)]
pub struct LlmVerdict {
    pub is_malicious: bool,
    pub explanation: String,
    pub reasoning: String,
    pub recommendation: String,
}

/// Parse the verdict object; `None` when no JSON could be recovered.
pub fn parse_verdict(raw: &str) -> Option<LlmVerdict> {
    match llm_json::extract(raw) {
        LlmParseResult::Ok(v) => Some(LlmVerdict {
            is_malicious: llm_json::bool_field(&v, "is_malicious", false),
            explanation: llm_json::str_field(&v, "explanation"),
            reasoning: llm_json::str_field(&v, "reasoning"),
            recommendation: llm_json::str_field(&v, "recommendation"),
        }),
        LlmParseResult::ParseError(_) => None,
    }
}
