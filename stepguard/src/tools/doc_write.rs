//! Domain-neutral structured document generator.
//!
//! Converts whatever content it is handed into markdown, strips obvious
//! template filler, and wraps the result in a doc-type template anchored to
//! the task context. Content that already reads as a full structured document
//! is returned unchanged so it never gets wrapped twice.

use std::sync::LazyLock;

use minijinja::{Environment, context};
use serde_json::{Map, Value};

use crate::core::schema::enforce_doc_args;
use crate::core::types::{DOC_TOOL, DocArgs};
use crate::tools::Tool;

static TEMPLATES: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    let sources = [
        ("prd", include_str!("templates/prd.md")),
        ("gtm", include_str!("templates/gtm.md")),
        ("integration_plan", include_str!("templates/integration_plan.md")),
        ("test_plan", include_str!("templates/test_plan.md")),
        ("checklist", include_str!("templates/checklist.md")),
        ("default", include_str!("templates/default.md")),
    ];
    for (name, source) in sources {
        env.add_template(name, source)
            .expect("document template should be valid");
    }
    env
});

/// Filler text removed from incoming content before templating.
const FILLER_VARIANTS: [&str; 9] = [
    "[Insert",
    "[insert",
    "Bullet 1",
    "Bullet 2",
    "Bullet 3",
    "TBD",
    "tbd",
    "Lorem ipsum",
    "lorem ipsum",
];

#[derive(Debug, Default)]
pub struct DocWriteTool;

impl DocWriteTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for DocWriteTool {
    fn name(&self) -> &'static str {
        DOC_TOOL
    }

    fn params(&self) -> &'static [&'static str] {
        &["title", "content", "doc_type", "context"]
    }

    fn call(&self, args: &Map<String, Value>) -> anyhow::Result<Value> {
        let doc = enforce_doc_args(args);

        // Structured content renders as a JSON block instead of the
        // enforcement layer's compact stringification.
        let body = match args.get("content") {
            Some(value @ (Value::Object(_) | Value::Array(_))) => to_md(value),
            _ => doc.content.clone(),
        };
        let body = strip_filler(&body);

        if looks_like_full_doc(&body) {
            return Ok(Value::String(body));
        }

        let memory_keys = memory_key_preview(args);
        Ok(Value::String(render_document(&doc, &body, &memory_keys)))
    }
}

/// Render any value as a markdown-safe string.
fn to_md(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => {
            let rendered =
                serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string());
            format!("```json\n{rendered}\n```")
        }
    }
}

/// Remove obvious template filler tokens.
fn strip_filler(text: &str) -> String {
    let lowered = text.to_lowercase();
    let banned = ["[insert", "bullet 1", "bullet 2", "bullet 3", "tbd", "lorem ipsum"];
    if !banned.iter().any(|token| lowered.contains(token)) {
        return text.trim().to_string();
    }
    let mut cleaned = text.to_string();
    for variant in FILLER_VARIANTS {
        cleaned = cleaned.replace(variant, "");
    }
    cleaned.trim().to_string()
}

/// Detect markdown that already reads as a full structured document.
fn looks_like_full_doc(md: &str) -> bool {
    let md = md.trim();
    if !md.starts_with('#') {
        return false;
    }

    let section_count = md.matches("\n## ").count() + md.matches("\n### ").count();

    let strong_section_keywords = [
        "context",
        "objective",
        "requirements",
        "kpis",
        "risks",
        "acceptance",
        "timeline",
        "overview",
    ];
    let low = md.to_lowercase();
    let keyword_hits = strong_section_keywords
        .iter()
        .filter(|k| low.contains(**k))
        .count();

    section_count >= 2 || keyword_hits >= 3
}

/// Up to 10 top-level keys of a `context.memory` object, for the meta block.
fn memory_key_preview(args: &Map<String, Value>) -> Vec<String> {
    args.get("context")
        .and_then(Value::as_object)
        .and_then(|ctx| ctx.get("memory"))
        .and_then(Value::as_object)
        .map(|memory| memory.keys().take(10).cloned().collect())
        .unwrap_or_default()
}

fn meta_block(doc: &DocArgs, memory_keys: &[String]) -> String {
    let mut lines: Vec<String> = Vec::new();

    if !doc.context.task_goal.is_empty() {
        lines.push(format!("**Task goal:** {}", doc.context.task_goal));
    }
    if !doc.context.assumptions.is_empty() {
        let joined = doc.context.assumptions[..doc.context.assumptions.len().min(6)].join("; ");
        lines.push(format!("**Assumptions:** {joined}"));
    }
    if !doc.context.constraints.is_empty() {
        let joined = doc.context.constraints[..doc.context.constraints.len().min(6)].join("; ");
        lines.push(format!("**Constraints:** {joined}"));
    }
    if !memory_keys.is_empty() {
        lines.push(format!("**Memory keys:** {}", memory_keys.join(", ")));
    }

    if lines.is_empty() {
        "- (not provided)".to_string()
    } else {
        lines
            .iter()
            .map(|line| format!("- {line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn render_document(doc: &DocArgs, body: &str, memory_keys: &[String]) -> String {
    let name = match doc.doc_type.as_str() {
        "prd" | "gtm" | "integration_plan" | "test_plan" | "checklist" => doc.doc_type.as_str(),
        _ => "default",
    };
    let objective = if doc.context.task_goal.is_empty() {
        "Define the objective for this document."
    } else {
        doc.context.task_goal.as_str()
    };

    let template = TEMPLATES
        .get_template(name)
        .expect("document template should be registered");
    template
        .render(context! {
            title => doc.title,
            meta_block => meta_block(doc, memory_keys),
            body => body,
            objective => objective,
        })
        .expect("document template rendering should not fail")
}
