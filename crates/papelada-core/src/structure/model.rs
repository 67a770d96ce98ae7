use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::config::ModelConfig;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid model endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("Model request timed out")]
    Timeout,
    #[error("Model HTTP error: {0}")]
    Http(reqwest::Error),
    #[error("Model API error: {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Model returned an empty completion")]
    EmptyResponse,
}

pub type ModelResult<T> = Result<T, ModelError>;

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

/// Token accounting reported by the completion API.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// One completion from the language-model collaborator.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub content: String,
    /// Self-reported certainty, when the collaborator surfaces one. Carried
    /// as metadata so it never leaks into the structured record itself.
    pub certainty: Option<f64>,
    pub usage: Option<TokenUsage>,
}

impl ModelResponse {
    #[must_use]
    pub fn new(content: String) -> Self {
        Self {
            content,
            certainty: None,
            usage: None,
        }
    }
}

/// Language-model collaborator: instructions plus text in, completion out.
/// Stateless per call; no caching across documents.
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> ModelResult<ModelResponse>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Chat-completions HTTP client (OpenAI wire format).
pub struct OpenAiModelClient {
    endpoint: Url,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    client: Client,
}

impl OpenAiModelClient {
    pub fn new(config: &ModelConfig) -> ModelResult<Self> {
        let endpoint = Url::parse(&config.endpoint)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .build()?;

        Ok(Self {
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client,
        })
    }
}

#[async_trait::async_trait]
impl ModelClient for OpenAiModelClient {
    async fn complete(&self, system: &str, user: &str) -> ModelResult<ModelResponse> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let mut request = self.client.post(self.endpoint.clone()).json(&payload);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ModelError::EmptyResponse)?;

        if let Some(usage) = parsed.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "model completion usage"
            );
        }

        Ok(ModelResponse {
            content,
            certainty: None,
            usage: parsed.usage,
        })
    }
}
