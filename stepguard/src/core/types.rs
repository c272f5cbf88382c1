//! Shared deterministic types for the guarded execution core.
//!
//! These types define stable contracts between core components. They must not
//! depend on external state or I/O and must remain deterministic across runs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Name of the document-producing tool. Every unsafe path falls back to it.
pub const DOC_TOOL: &str = "doc_write";
/// Name of the metrics-producing tool.
pub const METRICS_TOOL: &str = "metrics_generate";
/// The fixed set of tool names a decision may select.
pub const KNOWN_TOOLS: [&str; 2] = [DOC_TOOL, METRICS_TOOL];

/// The model's proposed action for one step.
///
/// Built tolerantly from whatever JSON object the repair cascade produced:
/// wrong-typed or missing fields fall back to safe defaults instead of
/// failing, so a decision record always exists for the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub tool: String,
    pub args: Value,
    pub decision: String,
    pub reason: String,
    pub confidence: i64,
}

impl Decision {
    /// Extract a decision from a raw parsed object, coercing field types.
    ///
    /// The `tool` field keeps whatever string the model produced (including
    /// separator junk); normalization happens later so the record stays
    /// faithful to what was decided.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            tool: map
                .get("tool")
                .and_then(Value::as_str)
                .unwrap_or(DOC_TOOL)
                .to_string(),
            args: map.get("args").cloned().unwrap_or_else(|| json!({})),
            decision: string_field(map, "decision"),
            reason: string_field(map, "reason"),
            confidence: map.get("confidence").and_then(Value::as_i64).unwrap_or(0),
        }
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Goal-tracking context nested inside document-tool arguments.
///
/// After schema enforcement all three fields are present and typed; none is
/// ever null. An empty `task_goal` means "unknown".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocContext {
    pub task_goal: String,
    pub assumptions: Vec<String>,
    pub constraints: Vec<String>,
}

/// The enforced four-field argument shape for the document tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocArgs {
    pub title: String,
    pub content: String,
    pub doc_type: String,
    pub context: DocContext,
}

impl DocArgs {
    /// Render back into the open argument mapping handed to the tool.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("title".to_string(), Value::String(self.title.clone()));
        map.insert("content".to_string(), Value::String(self.content.clone()));
        map.insert(
            "doc_type".to_string(),
            Value::String(self.doc_type.clone()),
        );
        map.insert(
            "context".to_string(),
            serde_json::to_value(&self.context).unwrap_or_else(|_| json!({})),
        );
        map
    }
}

/// Terminal result of executing one step.
///
/// Exactly one outcome is produced per step: the tool's return value (or a
/// degraded clarify substitution) or an explicit error record. Failures are
/// data, never raised faults.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Output(Value),
    Failure { error: String, details: String },
}

impl ExecutionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Serializable representation for trace payloads and callers.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Output(value) => value.clone(),
            Self::Failure { error, details } => json!({
                "error": error,
                "details": details,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_from_map_coerces_missing_and_wrong_types() {
        let map = serde_json::from_value::<Map<String, Value>>(json!({
            "tool": 42,
            "decision": {"nested": true},
            "confidence": "high",
        }))
        .expect("map");

        let decision = Decision::from_map(&map);
        assert_eq!(decision.tool, DOC_TOOL);
        assert_eq!(decision.args, json!({}));
        assert_eq!(decision.decision, "{\"nested\":true}");
        assert_eq!(decision.reason, "");
        assert_eq!(decision.confidence, 0);
    }

    #[test]
    fn decision_from_map_keeps_raw_tool_string() {
        let map = serde_json::from_value::<Map<String, Value>>(json!({
            "tool": "doc_write|metrics_generate",
            "args": {"title": "x"},
            "confidence": 80,
        }))
        .expect("map");

        let decision = Decision::from_map(&map);
        assert_eq!(decision.tool, "doc_write|metrics_generate");
        assert_eq!(decision.confidence, 80);
    }

    #[test]
    fn failure_outcome_serializes_as_error_record() {
        let outcome = ExecutionOutcome::Failure {
            error: "Tool execution failed after retry".to_string(),
            details: "boom".to_string(),
        };
        assert_eq!(
            outcome.to_value(),
            json!({"error": "Tool execution failed after retry", "details": "boom"})
        );
        assert!(outcome.is_failure());
    }
}
