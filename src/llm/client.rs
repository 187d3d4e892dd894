use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::error::LlmError;

use super::CompletionClient;

/// Client for the Gemini `generateContent` endpoint.
///
/// The request timeout is bounded on the underlying HTTP client so a hung
/// call can never block the session indefinitely. Transient failures get a
/// single retry with fixed backoff; everything else surfaces immediately.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
    retry_backoff: Duration,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::Transport("no API key configured".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout_secs,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    async fn request_once(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&serde_json::json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout_secs)
                } else {
                    LlmError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("failed to parse response: {}", e)))?;

        let text = body.completion_text();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyCompletion);
        }
        debug!(chars = text.len(), "completion received");
        Ok(text)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        with_single_retry(self.retry_backoff, || self.request_once(prompt)).await
    }
}

/// Run `attempt`, retrying exactly once (after `backoff`) when the failure
/// is classified as transient. The second failure is surfaced as-is.
pub(crate) async fn with_single_retry<F, Fut>(
    backoff: Duration,
    mut attempt: F,
) -> Result<String, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, LlmError>>,
{
    match attempt().await {
        Ok(text) => Ok(text),
        Err(first) if first.is_retryable() => {
            warn!(error = %first, "model call failed, retrying once");
            tokio::time::sleep(backoff).await;
            attempt().await
        }
        Err(err) => Err(err),
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate's parts.
    fn completion_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}
