//! LLM backend implementations
//!
//! `OpenAiBackend` talks to any OpenAI-compatible chat completions API.
//! Transient failures are retried with a doubling backoff; timeouts map to
//! `LlmError::Timeout` so callers can degrade the same way as for any other
//! gateway failure.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::prompt::{Message, Role};
use crate::LlmError;

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name
    pub model: String,
    /// API endpoint
    pub endpoint: String,
    /// API key
    pub api_key: String,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry)
    pub initial_backoff: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            max_tokens: 512,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_backoff: Duration::from_millis(200),
        }
    }
}

impl From<&dealer_agent_config::LlmSettings> for LlmConfig {
    fn from(settings: &dealer_agent_config::LlmSettings) -> Self {
        Self {
            model: settings.model.clone(),
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            timeout: settings.timeout(),
            max_retries: settings.max_retries,
            ..Default::default()
        }
    }
}

/// LLM backend trait
///
/// Supports both short deterministic-style calls (classification, query
/// rewriting) and longer generative calls (customer-facing replies).
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response for a message sequence
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// Convenience: single system instruction + single user input
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        self.chat(&[Message::system(system), Message::user(user)])
            .await
    }

    /// Model name, for logging
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible backend
pub struct OpenAiBackend {
    config: LlmConfig,
    client: Client,
}

impl OpenAiBackend {
    /// Create a new backend
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() && !config.endpoint.starts_with("http://localhost") {
            return Err(LlmError::Configuration(
                "API key required for remote endpoints".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    async fn request_once(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {status}: {error_text}")));
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        Ok(choice.message.content)
    }

    fn is_retryable(err: &LlmError) -> bool {
        match err {
            LlmError::Network(_) | LlmError::Timeout => true,
            LlmError::Api(msg) => msg.contains("429") || msg.contains("HTTP 5"),
            _ => false,
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    }
                    .to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };

        let mut backoff = self.config.initial_backoff;
        let mut last_err = None;

        for attempt in 0..=self.config.max_retries {
            match self.request_once(&request).await {
                Ok(text) => return Ok(text),
                Err(e) if Self::is_retryable(&e) && attempt < self.config.max_retries => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %e,
                        "LLM request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| LlmError::Api("retries exhausted".to_string())))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_backend_requires_api_key_for_remote() {
        let config = LlmConfig::default();
        assert!(OpenAiBackend::new(config).is_err());

        let config = LlmConfig {
            api_key: "sk-test".to_string(),
            ..Default::default()
        };
        assert!(OpenAiBackend::new(config).is_ok());

        // Local endpoints need no key
        let config = LlmConfig {
            endpoint: "http://localhost:8000/v1".to_string(),
            ..Default::default()
        };
        assert!(OpenAiBackend::new(config).is_ok());
    }

    #[test]
    fn test_chat_url() {
        let config = LlmConfig {
            api_key: "sk-test".to_string(),
            endpoint: "https://api.openai.com/v1/".to_string(),
            ..Default::default()
        };
        let backend = OpenAiBackend::new(config).unwrap();
        assert_eq!(
            backend.chat_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(OpenAiBackend::is_retryable(&LlmError::Timeout));
        assert!(OpenAiBackend::is_retryable(&LlmError::Api(
            "HTTP 429: rate limited".to_string()
        )));
        assert!(!OpenAiBackend::is_retryable(&LlmError::Api(
            "HTTP 401: unauthorized".to_string()
        )));
        assert!(!OpenAiBackend::is_retryable(&LlmError::InvalidResponse(
            "bad json".to_string()
        )));
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![WireMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            max_tokens: Some(256),
            temperature: Some(0.0),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("gpt-4o-mini"));
        assert!(json.contains("max_tokens"));
    }
}
