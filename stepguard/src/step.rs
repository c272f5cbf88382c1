//! Guarded execution of one step.
//!
//! Coordinates the repair cascade, tool normalization, schema enforcement,
//! guardrails, and the retry controller. `run_step` never returns an error
//! and never panics: every failure path degrades to a clarify document or an
//! explicit failure record so a multi-step run always keeps moving.

use serde_json::{Map, Value, json};
use tracing::{error, warn};

use crate::core::clarify::{clarify_title, make_clarify_doc};
use crate::core::guardrails::GuardReport;
use crate::core::normalize::{clean_args, normalize_tool_name};
use crate::core::schema::enforce_doc_args;
use crate::core::types::{DOC_TOOL, Decision, DocContext, ExecutionOutcome, METRICS_TOOL};
use crate::llm::prompts::{
    ARG_FIXER_SYSTEM, EXECUTOR_SYSTEM, REFLECTION_SYSTEM, arg_fixer_user, decision_user,
    reflection_user,
};
use crate::llm::repair::RepairCascade;
use crate::llm::CompletionClient;
use crate::tools::ToolRegistry;
use crate::trace::{EventType, TraceEvent, TraceSink};

/// Identity and input of one step execution.
pub struct StepRequest<'a> {
    pub task_id: &'a str,
    pub step_id: &'a str,
    pub step_title: &'a str,
    /// Accumulated task state; `task_goal` is read from here when present.
    pub memory: &'a Map<String, Value>,
}

/// What one step produced, plus the decision that stands for it in the audit
/// trail. The decision is the model's original one unless a guardrail forced
/// a clarify override.
pub struct StepResult {
    pub outcome: ExecutionOutcome,
    pub decision: Decision,
}

pub struct StepRunner<'a> {
    registry: &'a ToolRegistry,
    client: &'a dyn CompletionClient,
    trace: &'a dyn TraceSink,
}

impl<'a> StepRunner<'a> {
    pub fn new(
        registry: &'a ToolRegistry,
        client: &'a dyn CompletionClient,
        trace: &'a dyn TraceSink,
    ) -> Self {
        Self {
            registry,
            client,
            trace,
        }
    }

    /// Execute one step end to end.
    pub fn run_step(&self, request: &StepRequest<'_>) -> StepResult {
        let cascade = RepairCascade::new(self.client);
        let step_title = request.step_title;

        let user = decision_user(step_title, &Value::Object(request.memory.clone()));
        let decision_map = cascade.decide(EXECUTOR_SYSTEM, &user);
        self.record(request, EventType::Decision, Value::Object(decision_map.clone()));

        let decision = Decision::from_map(&decision_map);
        let mut tool_name = normalize_tool_name(&Value::String(decision.tool.clone()));
        let mut raw_args = decision.args.clone();

        self.record(
            request,
            EventType::Tool,
            json!({
                "tool_raw": decision.tool,
                "tool": tool_name,
                "args": raw_args,
            }),
        );

        let mut tool = match self.registry.resolve(&tool_name) {
            Some(tool) => tool,
            None => {
                warn!(tool = %tool_name, "tool not registered, falling back to document tool");
                tool_name = DOC_TOOL.to_string();
                raw_args = json!({});
                match self.registry.resolve(DOC_TOOL) {
                    Some(tool) => tool,
                    None => return self.fail(request, decision, "document tool not registered"),
                }
            }
        };

        // Document steps get schema enforcement before execution. A missing
        // goal redirects to a clarify document instead of letting the tool
        // guess.
        if tool_name == DOC_TOOL {
            let raw_map = raw_args.as_object().cloned().unwrap_or_default();
            let mut doc = enforce_doc_args(&raw_map);
            if doc.context.task_goal.is_empty() {
                doc.title = clarify_title(step_title);
                doc.doc_type = "generic".to_string();
                doc.content = make_clarify_doc(
                    step_title,
                    "",
                    &doc.context.assumptions,
                    &doc.context.constraints,
                );
            }
            raw_args = Value::Object(doc.to_map());
        }

        let mut clean = clean_args(tool.params(), &raw_args);

        // Ground metrics to the goal; without one the step becomes a clarify
        // document rather than generic guessed KPIs.
        if tool_name == METRICS_TOOL {
            clean
                .entry("task_goal".to_string())
                .or_insert_with(|| Value::String(stringy(request.memory.get("task_goal"))));
            clean
                .entry("step_title".to_string())
                .or_insert_with(|| Value::String(step_title.to_string()));

            if goal_missing(clean.get("task_goal")) {
                tool_name = DOC_TOOL.to_string();
                tool = match self.registry.resolve(DOC_TOOL) {
                    Some(tool) => tool,
                    None => return self.fail(request, decision, "document tool not registered"),
                };
                let mut doc = enforce_doc_args(&Map::new());
                doc.title = clarify_title(step_title);
                doc.content = make_clarify_doc(step_title, "", &[], &[]);
                raw_args = Value::Object(doc.to_map());
                clean = clean_args(tool.params(), &raw_args);
            }
        }

        let mut final_decision = decision;
        let outcome = match tool.call(&clean) {
            Ok(output) => self.guard_output(&tool_name, step_title, &raw_args, output, &mut final_decision),
            Err(err) => {
                error!(attempt = 1, tool = %tool_name, %err, "tool execution failed");

                // One self-heal round trip: ask the model to fix the
                // arguments, then retry exactly once.
                let fix_user = arg_fixer_user(&tool_name, step_title, &raw_args, &err.to_string());
                match cascade.request(ARG_FIXER_SYSTEM, &fix_user) {
                    Ok(fix) => {
                        let mut fixed = fix
                            .get("args")
                            .cloned()
                            .unwrap_or_else(|| Value::Object(clean.clone()));
                        if tool_name == DOC_TOOL
                            && let Some(fixed_map) = fixed.as_object().cloned()
                        {
                            fixed = Value::Object(enforce_doc_args(&fixed_map).to_map());
                        }
                        clean = clean_args(tool.params(), &fixed);
                    }
                    Err(heal_err) => warn!(%heal_err, "self-heal round trip failed"),
                }

                match tool.call(&clean) {
                    Ok(output) => self.guard_output(
                        &tool_name,
                        step_title,
                        &raw_args,
                        output,
                        &mut final_decision,
                    ),
                    Err(err) => {
                        error!(attempt = 2, tool = %tool_name, %err, "tool execution failed");
                        ExecutionOutcome::Failure {
                            error: "Tool execution failed after retry".to_string(),
                            details: err.to_string(),
                        }
                    }
                }
            }
        };

        self.record(
            request,
            EventType::Llm,
            json!({"tool_output": outcome.to_value()}),
        );

        // Best-effort reflection; a failed round trip never affects the
        // outcome.
        let reflect_user = reflection_user(step_title, &outcome.to_value());
        match cascade.request(REFLECTION_SYSTEM, &reflect_user) {
            Ok(reflection) => {
                self.record(request, EventType::Reflection, Value::Object(reflection));
            }
            Err(err) => warn!(%err, "reflection failed"),
        }

        StepResult {
            outcome,
            decision: final_decision,
        }
    }

    /// Guardrail pass over successful document output. Non-document tools and
    /// failures pass through untouched.
    fn guard_output(
        &self,
        tool_name: &str,
        step_title: &str,
        raw_args: &Value,
        output: Value,
        final_decision: &mut Decision,
    ) -> ExecutionOutcome {
        if tool_name != DOC_TOOL {
            return ExecutionOutcome::Output(output);
        }

        let out_text = match &output {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let context = doc_context(raw_args);

        let report = GuardReport::evaluate(&context.task_goal, step_title, &out_text);
        if !report.fired() {
            return ExecutionOutcome::Output(output);
        }

        warn!(reason = %report.reason(), "guardrails fired, overriding with clarify document");
        let clarify = make_clarify_doc(
            step_title,
            &context.task_goal,
            &context.assumptions,
            &context.constraints,
        );
        *final_decision = Decision {
            tool: DOC_TOOL.to_string(),
            args: json!({
                "title": clarify_title(step_title),
                "content": clarify,
                "doc_type": "generic",
                "context": context,
            }),
            decision: "Forced clarify due to placeholders/duplication/domain drift risk."
                .to_string(),
            reason: report.reason(),
            confidence: 100,
        };
        ExecutionOutcome::Output(Value::String(clarify))
    }

    fn fail(&self, request: &StepRequest<'_>, decision: Decision, error: &str) -> StepResult {
        let outcome = ExecutionOutcome::Failure {
            error: error.to_string(),
            details: String::new(),
        };
        self.record(
            request,
            EventType::Llm,
            json!({"tool_output": outcome.to_value()}),
        );
        StepResult { outcome, decision }
    }

    fn record(&self, request: &StepRequest<'_>, event_type: EventType, payload: Value) {
        let event = TraceEvent::new(request.task_id, request.step_id, event_type, payload);
        if let Err(err) = self.trace.append(event) {
            warn!(%err, event_type = event_type.as_str(), "failed to record trace event");
        }
    }
}

fn stringy(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

fn goal_missing(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Null) | None => true,
        Some(_) => false,
    }
}

/// Read the enforced context block back out of document-tool arguments.
fn doc_context(raw_args: &Value) -> DocContext {
    raw_args
        .as_object()
        .map(|map| enforce_doc_args(map).context)
        .unwrap_or_default()
}
