//! OpenAI-compatible chat-completions client.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use shoprag_core::config::LlmSettings;

use crate::error::LlmError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self { Self { role: "system".to_string(), content: content.into() } }
    pub fn user(content: impl Into<String>) -> Self { Self { role: "user".to_string(), content: content.into() } }
}

/// Request body: `{model, messages, temperature}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Anything that can complete a chat request.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

#[async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for Arc<T> {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        (**self).complete(request).await
    }
}

pub struct ChatClient {
    client: Client,
    api_url: String,
    api_key: String,
    timeout: Duration,
    max_retries: u32,
}

impl ChatClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        Ok(Self { client, api_url: api_url.into(), api_key: api_key.into(), timeout, max_retries: 0 })
    }

    /// Build from settings, reading the bearer credential from the
    /// environment variable named by `api_key_env`.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey(settings.api_key_env.clone()))?;
        Ok(Self::new(&settings.api_url, api_key, Duration::from_secs(settings.timeout_secs))?.with_max_retries(settings.max_retries))
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn api_url(&self) -> &str { &self.api_url }

    async fn send_once(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_transport(e))?;
        if !status.is_success() {
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| LlmError::Malformed(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| LlmError::Malformed("no choices[0].message.content in response".to_string()))
    }

    fn map_transport(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout.as_secs())
        } else {
            LlmError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let mut attempt = 0u32;
        loop {
            match self.send_once(request).await {
                Ok(content) => {
                    debug!(model = %request.model, attempt, chars = content.len(), "chat completion received");
                    return Ok(content);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let backoff = Duration::from_millis(200 * 2u64.pow(attempt.min(5)));
                    warn!(error = %e, attempt, ?backoff, "chat completion failed, retrying");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
