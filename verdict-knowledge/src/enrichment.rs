//! LLM enrichment prompts and response parsing.
//!
//! One completion per pattern requests the full structured annotation set;
//! case summaries are a smaller best-effort call. Both parse through the
//! tolerant extractor and degrade to minimal annotations on failure.

use verdict_core::llm_json::{self, LlmParseResult};
use verdict_core::models::{MinedPattern, PatternEnrichment};

pub const PATTERN_SYSTEM_PROMPT: &str = "You are a software supply-chain security analyst. \
Given a frequent API call pattern mined from package corpora and sample code, describe its \
behavior and how benign and malicious uses of it differ. \
Respond with a single JSON object with string fields `semantic_summary` and \
`security_assessment`, and string-array fields `typical_scenarios`, \
`benign_characteristics`, `malware_characteristics`, `distinction_rules`, and \
`context_indicators`.";

pub const CASE_SYSTEM_PROMPT: &str = "You are a software supply-chain security analyst. \
Summarize the behavior of one code sample. Respond with a single JSON object with a string \
field `case_summary` and string-array fields `key_behaviors` and `risk_indicators`.";

/// Build the user prompt for one pattern enrichment call.
pub fn pattern_user_prompt(
    mined: &MinedPattern,
    benign_snippets: &[&str],
    malware_snippets: &[&str],
) -> String {
    let mut prompt = format!(
        "Action pattern: {}\nKind: {}\nSupport: {}\nCoverage: {} benign, {} malware\n",
        mined.subsequence.join(" -> "),
        mined.kind.as_str(),
        mined.support,
        mined.coverage.benign_count,
        mined.coverage.malware_count,
    );

    if !benign_snippets.is_empty() {
        prompt.push_str("\nBenign samples:\n");
        for (i, s) in benign_snippets.iter().enumerate() {
            prompt.push_str(&format!("--- benign {} ---\n{}\n", i + 1, s));
        }
    }
    if !malware_snippets.is_empty() {
        prompt.push_str("\nMalware samples:\n");
        for (i, s) in malware_snippets.iter().enumerate() {
            prompt.push_str(&format!("--- malware {} ---\n{}\n", i + 1, s));
        }
    }
    prompt
}

/// Parse a pattern enrichment response.
///
/// Returns the enrichment and whether the minimal fallback was used.
pub fn parse_pattern_enrichment(raw: &str, subsequence: &[String]) -> (PatternEnrichment, bool) {
    match llm_json::extract(raw) {
        LlmParseResult::Ok(v) => {
            let summary = llm_json::str_field(&v, "semantic_summary");
            if summary.is_empty() {
                return (PatternEnrichment::minimal(subsequence), true);
            }
            (
                PatternEnrichment {
                    semantic_summary: summary,
                    security_assessment: llm_json::str_field(&v, "security_assessment"),
                    typical_scenarios: llm_json::str_list_field(&v, "typical_scenarios"),
                    benign_characteristics: llm_json::str_list_field(&v, "benign_characteristics"),
                    malware_characteristics: llm_json::str_list_field(
                        &v,
                        "malware_characteristics",
                    ),
                    distinction_rules: llm_json::str_list_field(&v, "distinction_rules"),
                    context_indicators: llm_json::str_list_field(&v, "context_indicators"),
                },
                false,
            )
        }
        LlmParseResult::ParseError(_) => (PatternEnrichment::minimal(subsequence), true),
    }
}

/// Best-effort case-level annotations.
#[derive(Debug, Clone, Default)]
pub struct CaseAnnotations {
    pub case_summary: String,
    pub key_behaviors: Vec<String>,
    pub risk_indicators: Vec<String>,
}

/// Build the user prompt for one case summary call.
pub fn case_user_prompt(filename: &str, label: &str, actions: &[String], code: &str) -> String {
    format!(
        "File: {filename}\nLabel: {label}\nActions: {}\nCode:\n{code}",
        actions.join(" -> "),
    )
}

/// Parse a case summary response; empty annotations on failure.
pub fn parse_case_annotations(raw: &str) -> CaseAnnotations {
    match llm_json::extract(raw) {
        LlmParseResult::Ok(v) => CaseAnnotations {
            case_summary: llm_json::str_field(&v, "case_summary"),
            key_behaviors: llm_json::str_list_field(&v, "key_behaviors"),
            risk_indicators: llm_json::str_list_field(&v, "risk_indicators"),
        },
        LlmParseResult::ParseError(_) => CaseAnnotations::default(),
    }
}
