//! Test-only fakes for the completion client and trace sink seams.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::{Value, json};

use crate::llm::{CompletionClient, LlmError};
use crate::trace::{TraceEvent, TraceSink};

/// Completion client that replays a fixed script of responses and records
/// every prompt it was sent. Once the script runs out it fails loudly so a
/// test never silently makes more round trips than expected.
pub struct ScriptedClient {
    responses: RefCell<VecDeque<Result<String, LlmError>>>,
    prompts: RefCell<Vec<(String, String)>>,
}

impl ScriptedClient {
    pub fn with_responses(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Number of round trips made so far.
    pub fn calls(&self) -> usize {
        self.prompts.borrow().len()
    }

    /// The (system, user) prompt pair of the `index`-th round trip.
    pub fn call(&self, index: usize) -> (String, String) {
        self.prompts.borrow()[index].clone()
    }
}

impl CompletionClient for ScriptedClient {
    fn chat(&self, system: &str, user: &str) -> Result<String, LlmError> {
        self.prompts
            .borrow_mut()
            .push((system.to_string(), user.to_string()));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Transient("script exhausted".to_string())))
    }
}

/// Trace sink that keeps events in memory for assertions.
#[derive(Default)]
pub struct MemoryTraceSink {
    events: RefCell<Vec<TraceEvent>>,
}

impl MemoryTraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.borrow().clone()
    }
}

impl TraceSink for MemoryTraceSink {
    fn append(&self, event: TraceEvent) -> anyhow::Result<()> {
        self.events.borrow_mut().push(event);
        Ok(())
    }
}

/// Serialize a complete decision reply the way a well-behaved model would.
pub fn decision_reply(tool: &str, args: Value) -> String {
    json!({
        "tool": tool,
        "args": args,
        "decision": format!("Use {tool}"),
        "reason": "scripted",
        "confidence": 90,
    })
    .to_string()
}
