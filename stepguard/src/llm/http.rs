//! Live completion client for OpenAI-compatible chat endpoints.
//!
//! One blocking POST per round trip, with bounded exponential backoff on
//! transient failures. JSON mode is deliberately NOT requested from the
//! endpoint; the repair cascade owns JSON enforcement.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tracing::warn;

use crate::config::LlmConfig;
use crate::llm::{CompletionClient, LlmError};

/// Transport attempts per round trip, including the first.
const MAX_ATTEMPTS: u32 = 3;
/// First backoff delay; doubles per attempt.
const BACKOFF_BASE_SECS: f64 = 0.6;

pub struct HttpCompletionClient {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
    model: String,
}

impl HttpCompletionClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn send_once(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": 0.2,
        });

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .map_err(|err| LlmError::Transient(err.to_string()))?;

        let status = response.status().as_u16();
        if is_transient_status(status) {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Transient(format!("status {status}: {body}")));
        }
        if status >= 400 {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let body: Value = response
            .json()
            .map_err(|err| LlmError::MalformedResponse(err.to_string()))?;
        message_content(&body)
            .map(str::to_string)
            .ok_or_else(|| LlmError::MalformedResponse(body.to_string()))
    }
}

impl CompletionClient for HttpCompletionClient {
    fn chat(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let mut last_err = LlmError::Transient("no attempt made".to_string());
        for attempt in 0..MAX_ATTEMPTS {
            match self.send_once(system, user) {
                Ok(text) => return Ok(text),
                Err(err) if err.is_transient() => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = MAX_ATTEMPTS,
                        delay_secs = delay.as_secs_f64(),
                        %err,
                        "completion call failed, backing off"
                    );
                    last_err = err;
                    if attempt + 1 < MAX_ATTEMPTS {
                        thread::sleep(delay);
                    }
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_err)
    }
}

/// 429 and 5xx are retried; other failing statuses are not.
fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Exponential backoff: 0.6s, 1.2s, 2.4s, ...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs_f64(BACKOFF_BASE_SECS * f64::from(1u32 << attempt))
}

fn message_content(body: &Value) -> Option<&str> {
    body.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}
