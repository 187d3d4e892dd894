use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;

/// Settings for the language-model service and the pipeline knobs that
/// depend on it.
///
/// The API key is resolved once at process start (environment variable or
/// interactive prompt) and passed explicitly into the client constructor; it
/// is never written back to the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the generation API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model identifier appended to the endpoint.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    /// Bounded per-call request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Backoff before the single retry of a transient failure.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Maximum number of result rows rendered into the explanation prompt.
    /// Larger results are truncated and summarized by total count.
    #[serde(default = "default_explain_row_limit")]
    pub explain_row_limit: usize,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_explain_row_limit() -> usize {
    50
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            retry_backoff_ms: default_retry_backoff_ms(),
            explain_row_limit: default_explain_row_limit(),
        }
    }
}

impl LlmConfig {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tablechat")
            .join("config.toml")
    }

    /// Load settings from the config file, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.retry_backoff_ms, 500);
        assert_eq!(config.explain_row_limit, 50);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: LlmConfig = toml::from_str("model = \"gemini-2.0-pro\"").unwrap();
        assert_eq!(config.model, "gemini-2.0-pro");
        assert_eq!(config.endpoint, default_endpoint());
        assert_eq!(config.explain_row_limit, 50);
    }

    #[test]
    fn test_api_key_can_come_from_file() {
        let config: LlmConfig = toml::from_str("api_key = \"from-file\"").unwrap();
        assert_eq!(config.api_key, "from-file");
    }
}
