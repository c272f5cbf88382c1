//! Guarded execution core for LLM-driven step runners.
//!
//! This crate takes one step of a task and executes it safely against an
//! unreliable model: malformed JSON is repaired through an escalating
//! cascade, tool choices and arguments are normalized and schema-enforced,
//! produced documents pass content guardrails, and every path degrades to a
//! clarify document or an explicit failure record instead of raising. The
//! architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (extraction, normalization,
//!   schema enforcement, guardrails, clarify rendering). No I/O.
//! - **[`llm`]**, **[`tools`]**, **[`trace`]**: Side-effecting seams behind
//!   traits, mockable in tests.
//!
//! [`step`] coordinates core logic with those seams to run one step end to
//! end.

pub mod config;
pub mod core;
pub mod llm;
pub mod logging;
pub mod step;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tools;
pub mod trace;
