//! Response repair cascade: unreliable model text in, JSON object out.
//!
//! Three escalating strategies, each a full round trip to the completion
//! endpoint, modeled as an explicit ordered policy rather than nested error
//! handling. The infallible entry point ends in a hard default decision, so a
//! parse failure can never propagate to the caller.

use serde_json::{Map, Value, json};
use tracing::{error, warn};

use crate::core::extract::extract_json;
use crate::llm::prompts::{
    REPAIR_FORMATTER_SYSTEM, SCHEMA_REPAIR_SYSTEM, repair_user, schema_repair_user,
};
use crate::llm::{CompletionClient, LlmError};

/// Repair strategies in escalation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// Send the original instructions and extract embedded JSON.
    Raw,
    /// Ask a strict formatter to re-emit the previous response as JSON.
    Reformat,
    /// Demand a minimal object matching the decision schema exactly.
    SchemaForced,
}

const STRATEGIES: [Strategy; 3] = [Strategy::Raw, Strategy::Reformat, Strategy::SchemaForced];

pub struct RepairCascade<'a> {
    client: &'a dyn CompletionClient,
}

impl<'a> RepairCascade<'a> {
    pub fn new(client: &'a dyn CompletionClient) -> Self {
        Self { client }
    }

    /// Run the cascade and fall back to the hard default decision when every
    /// strategy fails. Never returns an error and never returns a non-object.
    pub fn decide(&self, system: &str, user: &str) -> Map<String, Value> {
        match self.request(system, user) {
            Ok(map) => map,
            Err(err) => {
                error!(%err, "all repair strategies failed, using fallback decision");
                fallback_decision()
            }
        }
    }

    /// Run the cascade without the hard fallback.
    ///
    /// Self-heal and reflection round trips use this entry point so the
    /// controller can swallow their failures instead of silently receiving
    /// the default decision. Transport exhaustion inside a strategy counts as
    /// a strategy failure and degrades to the next one.
    pub fn request(&self, system: &str, user: &str) -> Result<Map<String, Value>, LlmError> {
        let mut last_raw = String::new();
        let mut last_failure = String::new();

        for strategy in STRATEGIES {
            let (sys, usr) = match strategy {
                Strategy::Raw => (system.to_string(), user.to_string()),
                Strategy::Reformat => {
                    (REPAIR_FORMATTER_SYSTEM.to_string(), repair_user(&last_raw))
                }
                Strategy::SchemaForced => {
                    (SCHEMA_REPAIR_SYSTEM.to_string(), schema_repair_user(&last_raw))
                }
            };

            match self.client.chat(&sys, &usr) {
                Ok(text) => match parse_object(&text) {
                    Ok(map) => return Ok(map),
                    Err(err) => {
                        warn!(
                            ?strategy,
                            %err,
                            snippet = safe_snippet(&text),
                            "JSON parse failed, escalating"
                        );
                        last_failure = err.to_string();
                        last_raw = text;
                    }
                },
                Err(err) => {
                    warn!(?strategy, %err, "completion round trip failed, escalating");
                    last_failure = err.to_string();
                    last_raw.clear();
                }
            }
        }

        Err(LlmError::Parse(last_failure))
    }
}

/// The fixed decision returned when no strategy produced a JSON object.
pub fn fallback_decision() -> Map<String, Value> {
    let fallback = json!({
        "tool": "doc_write",
        "args": {
            "title": "Step Output",
            "content": "Fallback: produce a structured document for this step.",
        },
        "decision": "Fallback doc_write",
        "reason": "LLM JSON formatting failed after retries.",
        "confidence": 0,
    });
    match fallback {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn parse_object(text: &str) -> anyhow::Result<Map<String, Value>> {
    match extract_json(text)? {
        Value::Object(map) => Ok(map),
        other => Err(anyhow::anyhow!(
            "JSON is not an object (got {})",
            type_name(&other)
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn safe_snippet(text: &str) -> String {
    text.chars()
        .take(400)
        .collect::<String>()
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}
