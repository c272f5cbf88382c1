//! Guarded step executor CLI.
//!
//! Runs one step of a task through the full pipeline: model decision, JSON
//! repair, tool normalization, schema enforcement, guardrails, and retry.
//! The produced document (or failure record) goes to stdout; the audit trail
//! is appended to a JSONL file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use stepguard::config::{LlmConfig, Provider, load_config};
use stepguard::llm::CompletionClient;
use stepguard::llm::http::HttpCompletionClient;
use stepguard::llm::mock::MockCompletionClient;
use stepguard::logging;
use stepguard::step::{StepRequest, StepRunner};
use stepguard::tools::ToolRegistry;
use stepguard::trace::JsonlTraceSink;

#[derive(Parser)]
#[command(name = "stepguard", version, about = "Guarded executor for LLM-planned steps")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute one step and print its output.
    Run {
        /// Step title, e.g. "Write the PRD".
        #[arg(long)]
        title: String,

        /// Task goal; omit to exercise the clarify path.
        #[arg(long)]
        goal: Option<String>,

        /// Completion endpoint config (TOML). Missing file means mock mode.
        #[arg(long, default_value = "stepguard.toml")]
        config: PathBuf,

        /// Audit trail output (JSON lines, appended).
        #[arg(long, default_value = "trace.jsonl")]
        trace: PathBuf,

        /// Task id recorded in the audit trail.
        #[arg(long, default_value = "task-local")]
        task_id: String,

        /// Step id recorded in the audit trail.
        #[arg(long, default_value = "step-1")]
        step_id: String,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            title,
            goal,
            config,
            trace,
            task_id,
            step_id,
        } => cmd_run(&title, goal.as_deref(), &config, &trace, &task_id, &step_id),
    }
}

fn cmd_run(
    title: &str,
    goal: Option<&str>,
    config_path: &PathBuf,
    trace_path: &PathBuf,
    task_id: &str,
    step_id: &str,
) -> Result<()> {
    let cfg = load_config(config_path).context("load config")?;
    let client = build_client(&cfg)?;
    let registry = ToolRegistry::with_defaults();
    let sink = JsonlTraceSink::new(trace_path.clone());

    let mut memory = Map::new();
    if let Some(goal) = goal {
        memory.insert("task_goal".to_string(), Value::String(goal.to_string()));
    }

    let runner = StepRunner::new(&registry, client.as_ref(), &sink);
    let result = runner.run_step(&StepRequest {
        task_id,
        step_id,
        step_title: title,
        memory: &memory,
    });

    match result.outcome.to_value() {
        Value::String(text) => println!("{text}"),
        other => println!("{}", serde_json::to_string_pretty(&other)?),
    }
    eprintln!(
        "decision: {}",
        serde_json::to_string(&result.decision).context("serialize decision")?
    );
    Ok(())
}

fn build_client(cfg: &LlmConfig) -> Result<Box<dyn CompletionClient>> {
    match cfg.provider {
        Provider::Mock => Ok(Box::new(MockCompletionClient::new())),
        Provider::Live => Ok(Box::new(
            HttpCompletionClient::new(cfg).context("build completion client")?,
        )),
    }
}
