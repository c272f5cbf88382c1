//! Completion-endpoint abstraction.
//!
//! The [`CompletionClient`] trait decouples the execution core from the actual
//! model backend (a live OpenAI-compatible endpoint or a deterministic mock).
//! Tests use scripted clients that return predetermined responses without any
//! network access.

pub mod http;
pub mod mock;
pub mod prompts;
pub mod repair;

use thiserror::Error;

/// One round trip to a text-completion service.
///
/// Used for the primary decision, the repair passes, the self-heal round trip,
/// and the reflection call. The endpoint is treated as effect-free, so callers
/// may retry freely.
pub trait CompletionClient {
    fn chat(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

/// Failure taxonomy for completion round trips.
///
/// Only [`LlmError::Transient`] is worth retrying; everything else fails the
/// round trip immediately.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Timeout, connection failure, 429, or 5xx. Retried with backoff.
    #[error("completion endpoint transient failure: {0}")]
    Transient(String),

    /// A non-retryable 4xx response.
    #[error("completion endpoint rejected request ({status}): {body}")]
    Status { status: u16, body: String },

    /// The endpoint answered but without usable message content.
    #[error("unexpected completion response shape: {0}")]
    MalformedResponse(String),

    /// The model's text never yielded a JSON object, across all repair
    /// strategies.
    #[error("model output is not a JSON object: {0}")]
    Parse(String),
}

impl LlmError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
