//! Audit trail for step execution.
//!
//! Every model decision, tool call, tool output, and reflection is recorded
//! as one event. The sink is a trait seam so tests capture events in memory
//! while the CLI appends JSON lines to a file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The four event kinds recorded per step, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Decision,
    Tool,
    Llm,
    Reflection,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decision => "decision",
            Self::Tool => "tool",
            Self::Llm => "llm",
            Self::Reflection => "reflection",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub task_id: String,
    pub step_id: String,
    pub event_type: EventType,
    pub payload: Value,
}

impl TraceEvent {
    pub fn new(task_id: &str, step_id: &str, event_type: EventType, payload: Value) -> Self {
        Self {
            task_id: task_id.to_string(),
            step_id: step_id.to_string(),
            event_type,
            payload,
        }
    }
}

pub trait TraceSink {
    fn append(&self, event: TraceEvent) -> Result<()>;
}

/// Appends one JSON line per event to a file.
pub struct JsonlTraceSink {
    path: PathBuf,
}

impl JsonlTraceSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TraceSink for JsonlTraceSink {
    fn append(&self, event: TraceEvent) -> Result<()> {
        let mut line = serde_json::to_string(&event).context("serialize trace event")?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open trace file {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("append trace event to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_types_serialize_lowercase() {
        assert_eq!(EventType::Decision.as_str(), "decision");
        let event = TraceEvent::new("t1", "s1", EventType::Reflection, json!({}));
        let line = serde_json::to_string(&event).expect("serialize");
        assert!(line.contains("\"event_type\":\"reflection\""));
    }

    #[test]
    fn jsonl_sink_appends_one_line_per_event() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("trace.jsonl");
        let sink = JsonlTraceSink::new(path.clone());

        sink.append(TraceEvent::new("t1", "s1", EventType::Decision, json!({"tool": "doc_write"})))
            .expect("append");
        sink.append(TraceEvent::new("t1", "s1", EventType::Tool, json!({"args": {}})))
            .expect("append");

        let contents = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: TraceEvent = serde_json::from_str(lines[0]).expect("parse");
        assert_eq!(first.event_type, EventType::Decision);
        assert_eq!(first.payload["tool"], "doc_write");
    }
}
