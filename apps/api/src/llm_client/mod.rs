/// LLM Client — the boundary to the remote completion service.
///
/// Callers depend on the `CompletionClient` trait only; `OpenRouterClient` is the
/// production implementation and tests substitute their own.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Completion service API key not configured")]
    MissingApiKey,

    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Completion service returned an HTML page instead of JSON (status {status})")]
    HtmlResponse { status: u16 },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected response structure from completion service")]
    UnexpectedShape,

    #[error("All models failed to provide a response ({attempted} attempted)")]
    AllModelsFailed { attempted: usize },
}

impl LlmError {
    /// The candidate is not served upstream; move on without recording a failure.
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, LlmError::ModelNotFound { .. })
    }

    /// No other candidate can succeed after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LlmError::MissingApiKey)
    }
}

/// A single completion call against one candidate model.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// One entry of the upstream model catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pricing: Option<Value>,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the completion text for `request.prompt` from `request.model`.
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError>;

    /// Lists the models the service currently offers.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelCatalogue {
    #[serde(default)]
    data: Vec<ModelInfo>,
}

/// OpenAI-compatible chat-completions client for OpenRouter.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    referer: String,
    title: String,
}

impl OpenRouterClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.openrouter_api_key.clone(),
            base_url: config.openrouter_base_url.trim_end_matches('/').to_string(),
            referer: config.app_referer.clone(),
            title: config.app_title.clone(),
        })
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.api_key.as_deref().ok_or(LlmError::MissingApiKey)
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let api_key = self.api_key()?;

        let body = ChatRequest {
            model: request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        match classify_completion(request.model, status, &text) {
            Err(e @ (LlmError::UnexpectedShape | LlmError::Parse(_))) => {
                warn!(
                    "Model {} returned an unusable envelope: {}",
                    request.model,
                    preview(&text, 500)
                );
                Err(e)
            }
            other => other,
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: preview(&body, 200).to_string(),
            });
        }

        let catalogue: ModelCatalogue = response.json().await?;
        debug!("Model catalogue lists {} models", catalogue.data.len());
        Ok(catalogue.data)
    }
}

/// Maps a raw completion response onto the completion text or an `LlmError`.
///
/// 404 means the model is unavailable. HTML bodies are reported as such whether
/// or not the status was 2xx.
pub fn classify_completion(model: &str, status: u16, body: &str) -> Result<String, LlmError> {
    if !(200..300).contains(&status) {
        if status == 404 {
            return Err(LlmError::ModelNotFound {
                model: model.to_string(),
            });
        }
        if is_html(body) {
            return Err(LlmError::HtmlResponse { status });
        }
        return Err(LlmError::Api {
            status,
            message: body.to_string(),
        });
    }

    if is_html(body) {
        return Err(LlmError::HtmlResponse { status });
    }

    let envelope: ChatResponse = serde_json::from_str(body)?;
    envelope
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(LlmError::UnexpectedShape)
}

fn is_html(body: &str) -> bool {
    body.starts_with("<!DOCTYPE") || body.contains("<html>")
}

/// First `max_chars` characters of `text`, for log lines.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
