//! Instruction templates for every model round trip.
//!
//! System prompts ship as included markdown; user prompts are built here so
//! the embedding and truncation rules live in one place.

use serde_json::Value;

/// System instruction for the primary per-step decision.
pub const EXECUTOR_SYSTEM: &str = include_str!("prompts/executor_system.md");

/// System instruction for the self-heal argument-fixing round trip.
pub const ARG_FIXER_SYSTEM: &str = include_str!("prompts/arg_fixer_system.md");

/// System instruction for the generic JSON-repair pass.
pub const REPAIR_FORMATTER_SYSTEM: &str =
    "You are a strict JSON formatter. Return ONLY a valid JSON object.";

/// System instruction for the schema-forced minimal repair pass.
pub const SCHEMA_REPAIR_SYSTEM: &str =
    "Return ONLY valid JSON. You MUST match the provided schema exactly.";

/// System instruction for the post-step reflection round trip.
pub const REFLECTION_SYSTEM: &str = "You evaluate agent performance.";

const SCHEMA_REPAIR_RULES: &str = include_str!("prompts/schema_repair_rules.md");

/// Pretty-print a JSON value for prompt embedding, capped at `limit` chars.
pub fn pretty(value: &Value, limit: usize) -> String {
    let rendered = match value {
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    rendered.chars().take(limit).collect()
}

/// User prompt asking the model to choose and parametrize one tool.
pub fn decision_user(step_title: &str, memory: &Value) -> String {
    format!(
        "Step: {step_title}\n\n\
         Memory snapshot (may include task goal + constraints):\n{}\n\n\
         Return the tool call JSON.\nChoose exactly ONE tool.\n",
        pretty(memory, 2000)
    )
}

/// User prompt for the generic JSON-repair pass, embedding the broken text.
pub fn repair_user(raw: &str) -> String {
    format!("Fix and output ONLY a JSON object for this content:\n{raw}\nReturn ONLY JSON.")
}

/// User prompt for the schema-forced minimal repair pass.
pub fn schema_repair_user(raw: &str) -> String {
    format!("{SCHEMA_REPAIR_RULES}\nCONTENT:\n{raw}\n")
}

/// User prompt asking the model to correct failing tool arguments.
pub fn arg_fixer_user(tool: &str, step_title: &str, args: &Value, error: &str) -> String {
    format!(
        "Tool: {tool}\n\n\
         Step title: {step_title}\n\n\
         Original args:\n{}\n\n\
         Error:\n{error}\n\n\
         Return ONLY JSON:\n{{ \"args\": {{ ... }} }}\n",
        pretty(args, 4000)
    )
}

/// User prompt asking the model to evaluate a finished step.
pub fn reflection_user(step_title: &str, output: &Value) -> String {
    format!(
        "Evaluate this step execution.\n\n\
         Step: {step_title}\n\
         Output:\n{}\n\n\
         Return ONLY valid JSON:\n{{\n  \"quality_score\": 1,\n  \"success\": true,\n  \"improvement\": \"...\"\n}}\n",
        pretty(output, 4000)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pretty_caps_length() {
        let value = json!({"content": "x".repeat(5000)});
        assert_eq!(pretty(&value, 100).chars().count(), 100);
    }

    #[test]
    fn decision_prompt_embeds_step_and_memory() {
        let memory = json!({"task_goal": "mobile fitness app"});
        let prompt = decision_user("Write the PRD", &memory);
        assert!(prompt.starts_with("Step: Write the PRD"));
        assert!(prompt.contains("mobile fitness app"));
        assert!(prompt.contains("Choose exactly ONE tool."));
    }

    #[test]
    fn arg_fixer_prompt_embeds_failure_details() {
        let prompt = arg_fixer_user(
            "doc_write",
            "Write the PRD",
            &json!({"title": "t"}),
            "content must be a string",
        );
        assert!(prompt.contains("Tool: doc_write"));
        assert!(prompt.contains("content must be a string"));
        assert!(prompt.contains("\"args\""));
    }

    #[test]
    fn schema_repair_prompt_ends_with_content() {
        let prompt = schema_repair_user("broken {");
        assert!(prompt.contains("matches this schema EXACTLY"));
        assert!(prompt.trim_end().ends_with("broken {"));
    }
}
