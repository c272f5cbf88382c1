//! Decision normalization: tool names and argument mappings.
//!
//! The model can name several tools in one decision, invent argument keys, or
//! hand back something that is not a mapping at all. Normalization never
//! fails; it always yields a resolvable tool name and a cleaned argument map.

use serde_json::{Map, Value};
use tracing::warn;

use crate::core::types::{DOC_TOOL, KNOWN_TOOLS};

/// Sanitize a raw tool identifier into a known tool name.
///
/// Non-strings default to the document tool. List separators (`|`, `,`) keep
/// only the first segment so a decision cannot select multiple tools. Unknown
/// names default to the document tool.
pub fn normalize_tool_name(raw: &Value) -> String {
    let Some(name) = raw.as_str() else {
        return DOC_TOOL.to_string();
    };
    let mut name = name.trim();
    if let Some((first, _)) = name.split_once('|') {
        name = first.trim();
    }
    if let Some((first, _)) = name.split_once(',') {
        name = first.trim();
    }
    if KNOWN_TOOLS.contains(&name) {
        name.to_string()
    } else {
        DOC_TOOL.to_string()
    }
}

/// Intersect raw arguments with a tool's declared parameter names.
///
/// Non-mapping input is coerced to a `{title, content}` pair. An empty
/// declared set means the tool is variadic and arguments pass through
/// unchanged. Dropped keys are logged, never errors.
pub fn clean_args(params: &[&str], raw: &Value) -> Map<String, Value> {
    let Some(args) = raw.as_object() else {
        let content = match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let mut map = Map::new();
        map.insert("title".to_string(), Value::String("Output".to_string()));
        map.insert("content".to_string(), Value::String(content));
        return map;
    };

    if params.is_empty() {
        return args.clone();
    }

    let mut clean = Map::new();
    let mut dropped = Vec::new();
    for (key, value) in args {
        if params.contains(&key.as_str()) {
            clean.insert(key.clone(), value.clone());
        } else {
            dropped.push(key.as_str());
        }
    }
    if !dropped.is_empty() {
        warn!(dropped = ?dropped, "dropping invalid tool args");
    }
    clean
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pipe_separated_names_keep_first_segment() {
        let name = normalize_tool_name(&json!("metrics_generate | doc_write"));
        assert_eq!(name, "metrics_generate");
    }

    #[test]
    fn comma_separated_names_keep_first_segment() {
        let name = normalize_tool_name(&json!("doc_write, metrics_generate"));
        assert_eq!(name, "doc_write");
    }

    #[test]
    fn unknown_first_segment_defaults_to_doc_tool() {
        let name = normalize_tool_name(&json!("send_email|doc_write"));
        assert_eq!(name, DOC_TOOL);
    }

    #[test]
    fn non_string_defaults_to_doc_tool() {
        assert_eq!(normalize_tool_name(&json!(42)), DOC_TOOL);
        assert_eq!(normalize_tool_name(&json!(["doc_write"])), DOC_TOOL);
        assert_eq!(normalize_tool_name(&Value::Null), DOC_TOOL);
    }

    #[test]
    fn whitespace_is_stripped() {
        assert_eq!(normalize_tool_name(&json!("  doc_write  ")), DOC_TOOL);
    }

    #[test]
    fn non_mapping_args_coerce_to_title_content() {
        let cleaned = clean_args(&["title", "content"], &json!("just some text"));
        assert_eq!(cleaned.get("title"), Some(&json!("Output")));
        assert_eq!(cleaned.get("content"), Some(&json!("just some text")));
    }

    #[test]
    fn undeclared_keys_are_dropped() {
        let cleaned = clean_args(
            &["title", "content"],
            &json!({"title": "t", "content": "c", "urgency": "high"}),
        );
        assert_eq!(cleaned.len(), 2);
        assert!(!cleaned.contains_key("urgency"));
    }

    #[test]
    fn variadic_tools_pass_args_through() {
        let args = json!({"task_goal": "g", "anything": [1, 2]});
        let cleaned = clean_args(&[], &args);
        assert_eq!(Value::Object(cleaned), args);
    }
}
