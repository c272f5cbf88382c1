//! JSON extraction from raw model text.
//!
//! Models wrap JSON in prose, code fences, or trailing commentary. This module
//! recovers the first embedded object or array without ever touching the
//! network; the repair cascade decides what to do when recovery fails.

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

/// Extract the first JSON object or array from `text` and parse it.
///
/// Leading prose before the first `{` or `[` is trimmed. If parsing fails on
/// trailing garbage, the candidate is truncated to the last `}`/`]` and parsed
/// again.
pub fn extract_json(text: &str) -> Result<Value> {
    let candidate = strip_code_fences(text.trim());
    let candidate = match candidate.find(['{', '[']) {
        Some(start) => candidate[start..].trim(),
        None => return Err(anyhow!("no JSON object or array found in model output")),
    };

    match serde_json::from_str(candidate) {
        Ok(value) => Ok(value),
        Err(_) => {
            let last = candidate.rfind(['}', ']']).ok_or_else(|| {
                anyhow!("no closing brace or bracket found in model output")
            })?;
            serde_json::from_str(&candidate[..=last])
                .context("parse JSON after trimming trailing garbage")
        }
    }
}

/// Remove a surrounding ```lang ... ``` fence if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_plain_object() {
        let value = extract_json(r#"{"tool": "doc_write"}"#).expect("parse");
        assert_eq!(value, json!({"tool": "doc_write"}));
    }

    #[test]
    fn extracts_object_between_prose() {
        let text = "Sure! Here is the decision you asked for:\n{\"tool\": \"doc_write\", \"confidence\": 90}\nLet me know if you need anything else.";
        let value = extract_json(text).expect("parse");
        assert_eq!(value, json!({"tool": "doc_write", "confidence": 90}));
    }

    #[test]
    fn extracts_fenced_object() {
        let text = "```json\n{\"tool\": \"metrics_generate\"}\n```";
        let value = extract_json(text).expect("parse");
        assert_eq!(value, json!({"tool": "metrics_generate"}));
    }

    #[test]
    fn extracts_array() {
        let value = extract_json("prefix [1, 2, 3]").expect("parse");
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn recovers_from_trailing_garbage() {
        let text = "{\"a\": 1} and then some explanation";
        let value = extract_json(text).expect("parse");
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn errors_when_no_json_present() {
        let err = extract_json("I could not produce a decision.").unwrap_err();
        assert!(err.to_string().contains("no JSON object or array"));
    }

    #[test]
    fn errors_on_unclosed_object() {
        assert!(extract_json("{\"a\": ").is_err());
    }
}
