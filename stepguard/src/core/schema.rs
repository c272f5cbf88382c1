//! Strict argument schema for the document tool.
//!
//! The document tool takes exactly four fields. Whatever the model proposed is
//! coerced into that shape here, before execution, so downstream code never
//! sees nulls or mistyped context fields.

use serde_json::{Map, Value};

use crate::core::types::{DocArgs, DocContext};

/// Document types the document tool understands; anything else is forced to
/// `generic`.
pub const ALLOWED_DOC_TYPES: [&str; 13] = [
    "prd",
    "gtm",
    "integration_plan",
    "test_plan",
    "checklist",
    "roadmap",
    "kpi_doc",
    "runbook",
    "generic",
    "spec",
    "risk_register",
    "user_research",
    "onboarding",
];

/// Force raw arguments into the fixed document-tool shape.
///
/// Never fails: missing or mistyped fields get defaults, the context block is
/// always present with string-typed goal and non-empty string lists.
pub fn enforce_doc_args(raw: &Map<String, Value>) -> DocArgs {
    let title = coerce_string(raw.get("title"), "Document");
    let content = match raw.get("content") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let doc_type = {
        let dt = coerce_string(raw.get("doc_type"), "generic");
        if ALLOWED_DOC_TYPES.contains(&dt.as_str()) {
            dt
        } else {
            "generic".to_string()
        }
    };

    let ctx = raw.get("context").and_then(Value::as_object);
    let context = DocContext {
        task_goal: ctx
            .and_then(|c| c.get("task_goal"))
            .map(trimmed_string)
            .unwrap_or_default(),
        assumptions: coerce_string_list(ctx.and_then(|c| c.get("assumptions"))),
        constraints: coerce_string_list(ctx.and_then(|c| c.get("constraints"))),
    };

    DocArgs {
        title,
        content,
        doc_type,
        context,
    }
}

/// Stringify a value, trim it, and substitute `default` when empty or null.
fn coerce_string(value: Option<&Value>, default: &str) -> String {
    let s = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string().trim().to_string(),
    };
    if s.is_empty() { default.to_string() } else { s }
}

fn trimmed_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// Normalize list-like input into a clean list of non-empty strings.
fn coerce_string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.trim().to_string(),
            other => other.to_string().trim().to_string(),
        })
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn empty_args_get_full_defaults() {
        let args = enforce_doc_args(&Map::new());
        assert_eq!(args.title, "Document");
        assert_eq!(args.content, "");
        assert_eq!(args.doc_type, "generic");
        assert_eq!(args.context, DocContext::default());
    }

    #[test]
    fn nulls_never_survive_enforcement() {
        let raw = as_map(json!({
            "title": null,
            "content": null,
            "doc_type": null,
            "context": {
                "task_goal": null,
                "assumptions": null,
                "constraints": null,
            },
        }));
        let args = enforce_doc_args(&raw);
        assert_eq!(args.title, "Document");
        assert_eq!(args.content, "");
        assert_eq!(args.doc_type, "generic");
        assert_eq!(args.context.task_goal, "");
        assert!(args.context.assumptions.is_empty());
        assert!(args.context.constraints.is_empty());
    }

    #[test]
    fn unknown_doc_type_is_forced_to_generic() {
        let raw = as_map(json!({"doc_type": "haiku"}));
        assert_eq!(enforce_doc_args(&raw).doc_type, "generic");
    }

    #[test]
    fn allowed_doc_type_is_kept() {
        let raw = as_map(json!({"doc_type": "integration_plan"}));
        assert_eq!(enforce_doc_args(&raw).doc_type, "integration_plan");
    }

    #[test]
    fn non_string_content_is_stringified() {
        let raw = as_map(json!({"content": {"sections": ["a", "b"]}}));
        assert_eq!(enforce_doc_args(&raw).content, "{\"sections\":[\"a\",\"b\"]}");
    }

    #[test]
    fn context_lists_drop_empty_entries_and_stringify_the_rest() {
        let raw = as_map(json!({
            "context": {
                "task_goal": "  mobile fitness app  ",
                "assumptions": ["solo founder", "", "   ", 12],
                "constraints": "not a list",
            },
        }));
        let args = enforce_doc_args(&raw);
        assert_eq!(args.context.task_goal, "mobile fitness app");
        assert_eq!(args.context.assumptions, vec!["solo founder", "12"]);
        assert!(args.context.constraints.is_empty());
    }

    #[test]
    fn non_object_context_coerces_to_empty() {
        let raw = as_map(json!({"context": "mobile fitness app"}));
        assert_eq!(enforce_doc_args(&raw).context, DocContext::default());
    }
}
