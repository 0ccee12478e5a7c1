//! Tolerant extraction of JSON objects from LLM responses.
//!
//! Strategies tried in order: direct parse → fenced code block →
//! first balanced-brace object scan. No nested try/except chains;
//! the outcome is a tagged [`LlmParseResult`].

use serde_json::Value;

/// Outcome of parsing an LLM response.
#[derive(Debug, Clone)]
pub enum LlmParseResult {
    /// A JSON object was recovered.
    Ok(Value),
    /// Nothing parseable; carries the raw response for logging.
    ParseError(String),
}

impl LlmParseResult {
    pub fn ok(self) -> Option<Value> {
        match self {
            LlmParseResult::Ok(v) => Some(v),
            LlmParseResult::ParseError(_) => None,
        }
    }
}

/// Extract a JSON object from raw LLM output.
pub fn extract(raw: &str) -> LlmParseResult {
    let trimmed = raw.trim();

    // Strategy 1: the whole response is valid JSON.
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        if v.is_object() {
            return LlmParseResult::Ok(v);
        }
    }

    // Strategy 2: a fenced ```json … ``` (or bare ```) block.
    if let Some(block) = fenced_block(trimmed) {
        if let Ok(v) = serde_json::from_str::<Value>(block.trim()) {
            if v.is_object() {
                return LlmParseResult::Ok(v);
            }
        }
    }

    // Strategy 3: first balanced { … } span.
    if let Some(span) = balanced_object(trimmed) {
        if let Ok(v) = serde_json::from_str::<Value>(span) {
            if v.is_object() {
                return LlmParseResult::Ok(v);
            }
        }
    }

    LlmParseResult::ParseError(raw.to_string())
}

/// Find the contents of the first fenced code block.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // Skip an optional language tag up to the first newline.
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

/// Find the first balanced top-level `{…}` span, respecting strings.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Read a string field from a parsed object, empty when absent.
pub fn str_field(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Read a string-array field from a parsed object, empty when absent.
pub fn str_list_field(v: &Value, key: &str) -> Vec<String> {
    v.get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Read a boolean field, defaulting when absent.
pub fn bool_field(v: &Value, key: &str, default: bool) -> bool {
    v.get(key).and_then(Value::as_bool).unwrap_or(default)
}
