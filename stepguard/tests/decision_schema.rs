//! Every decision the pipeline can emit must conform to the shipped schema.

use jsonschema::{Draft, Validator};
use serde_json::{Map, Value, json};

use stepguard::core::extract::extract_json;
use stepguard::core::types::DOC_TOOL;
use stepguard::llm::CompletionClient;
use stepguard::llm::mock::MockCompletionClient;
use stepguard::llm::repair::fallback_decision;
use stepguard::step::{StepRequest, StepRunner};
use stepguard::test_support::{MemoryTraceSink, ScriptedClient, decision_reply};
use stepguard::tools::ToolRegistry;

const DECISION_SCHEMA: &str = include_str!("../schemas/decision.schema.json");

fn validator() -> Validator {
    let schema: Value = serde_json::from_str(DECISION_SCHEMA).expect("parse schema");
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .expect("compile schema")
}

fn assert_valid(validator: &Validator, instance: &Value) {
    let errors: Vec<String> = validator
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    assert!(errors.is_empty(), "schema violations: {errors:?}");
}

#[test]
fn hard_fallback_decision_conforms() {
    let validator = validator();
    assert_valid(&validator, &Value::Object(fallback_decision()));
}

#[test]
fn mock_client_decision_conforms() {
    let validator = validator();
    let reply = MockCompletionClient::new()
        .chat("system", "Step: write the plan")
        .expect("chat");
    let decision = extract_json(&reply).expect("parse");
    assert_valid(&validator, &decision);
}

#[test]
fn forced_clarify_decision_conforms() {
    let registry = ToolRegistry::with_defaults();
    let client = ScriptedClient::with_responses(vec![Ok(decision_reply(
        DOC_TOOL,
        json!({
            "title": "Plan",
            "content": "Audience: [Target segment here]",
            "doc_type": "generic",
            "context": {"task_goal": "mobile fitness app", "assumptions": [], "constraints": []},
        }),
    ))]);
    let sink = MemoryTraceSink::new();
    let memory = Map::new();

    let result = StepRunner::new(&registry, &client, &sink).run_step(&StepRequest {
        task_id: "t1",
        step_id: "s1",
        step_title: "Plan",
        memory: &memory,
    });

    // The placeholder filler forces the clarify override.
    assert_eq!(result.decision.confidence, 100);
    let validator = validator();
    assert_valid(
        &validator,
        &serde_json::to_value(&result.decision).expect("serialize decision"),
    );
}
