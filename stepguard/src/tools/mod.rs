//! Executable tools and the registry the step runner resolves them from.
//!
//! Tools are synchronous and deterministic given their arguments. Each tool
//! declares the argument names it accepts; an empty list means the tool takes
//! arbitrary keyword-style arguments and filtering is skipped upstream.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

pub mod doc_write;
pub mod metrics;

pub use doc_write::DocWriteTool;
pub use metrics::MetricsTool;

pub trait Tool {
    /// Registry name the decision's `tool` field resolves to.
    fn name(&self) -> &'static str;

    /// Accepted argument names, or empty for variadic tools.
    fn params(&self) -> &'static [&'static str];

    /// Execute with already-cleaned arguments.
    fn call(&self, args: &Map<String, Value>) -> anyhow::Result<Value>;
}

/// Name-keyed tool lookup. Resolution never guesses: an unknown name is the
/// caller's problem to redirect.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the two built-in tools.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(DocWriteTool::new()));
        registry.register(Box::new(MetricsTool::new()));
        registry
    }

    /// Later registrations replace earlier ones with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name(), tool);
    }

    pub fn resolve(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(Box::as_ref)
    }
}
