//! Completion endpoint configuration (TOML).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Deterministic canned responses; no credentials needed.
    Mock,
    /// OpenAI-compatible chat endpoint over HTTP.
    Live,
}

/// Completion client configuration.
///
/// Intended to be edited by humans. Missing fields default to key-less mock
/// operation so a fresh checkout runs without any setup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: Provider,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Mock,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: String::new(),
            model: "llama-3.3-70b-versatile".to_string(),
            request_timeout_secs: 40,
            connect_timeout_secs: 10,
        }
    }
}

impl LlmConfig {
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be > 0"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(anyhow!("connect_timeout_secs must be > 0"));
        }
        if self.provider == Provider::Live {
            if self.base_url.trim().is_empty() {
                return Err(anyhow!("base_url must be set for the live provider"));
            }
            if self.api_key.trim().is_empty() {
                return Err(anyhow!("api_key must be set for the live provider"));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `LlmConfig::default()`. The
/// `STEPGUARD_API_KEY` environment variable overrides the file's key either
/// way, so credentials can stay out of checked-in config.
pub fn load_config(path: &Path) -> Result<LlmConfig> {
    let mut cfg = if path.exists() {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?
    } else {
        LlmConfig::default()
    };
    if let Ok(key) = std::env::var("STEPGUARD_API_KEY")
        && !key.trim().is_empty()
    {
        cfg.api_key = key;
    }
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg.provider, Provider::Mock);
        assert_eq!(cfg.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "model = \"llama-3.1-8b-instant\"\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.model, "llama-3.1-8b-instant");
        assert_eq!(cfg.provider, Provider::Mock);
        assert_eq!(cfg.request_timeout_secs, 40);
    }

    #[test]
    fn live_provider_requires_api_key() {
        let cfg = LlmConfig {
            provider: Provider::Live,
            ..LlmConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = LlmConfig {
            provider: Provider::Live,
            api_key: "gsk_test".to_string(),
            ..LlmConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = LlmConfig {
            request_timeout_secs: 0,
            ..LlmConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
