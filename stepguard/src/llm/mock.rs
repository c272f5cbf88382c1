//! Deterministic completion client for key-less development.

use serde_json::json;

use crate::llm::{CompletionClient, LlmError};

/// Always answers with a valid document-tool decision that echoes the user
/// prompt as content. Lets the whole pipeline run without credentials.
#[derive(Debug, Default)]
pub struct MockCompletionClient;

impl MockCompletionClient {
    pub fn new() -> Self {
        Self
    }
}

impl CompletionClient for MockCompletionClient {
    fn chat(&self, _system: &str, user: &str) -> Result<String, LlmError> {
        let decision = json!({
            "tool": "doc_write",
            "args": {"title": "Mock Output", "content": user},
            "decision": "Mock tool",
            "reason": "No LLM key",
            "confidence": 50,
        });
        Ok(decision.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extract::extract_json;

    #[test]
    fn mock_reply_is_a_parseable_decision() {
        let reply = MockCompletionClient::new()
            .chat("system", "Step: do the thing")
            .expect("chat");
        let value = extract_json(&reply).expect("parse");
        assert_eq!(value["tool"], "doc_write");
        assert_eq!(value["confidence"], 50);
        assert!(value["args"]["content"]
            .as_str()
            .expect("content")
            .contains("do the thing"));
    }
}
