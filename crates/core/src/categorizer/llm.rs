//! Classifier clients.
//!
//! The categorizer only needs "send this prompt, give me text back", so the
//! trait is a single `complete` call. Two HTTP backends are provided:
//! Anthropic's Messages API and a local Ollama server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{LlmConfig, LlmProvider, DEFAULT_MAX_TOKENS};

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const OLLAMA_API_BASE: &str = "http://localhost:11434";

/// Why a classifier call produced no text.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl LlmError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Http(_) => "connection",
            LlmError::RateLimited(_) => "rate_limited",
            LlmError::Api { .. } => "api",
            LlmError::Json(_) => "protocol",
            LlmError::Timeout(_) => "timeout",
            LlmError::NotConfigured(_) => "not_configured",
        }
    }

    fn from_status(status: u16, message: String) -> Self {
        match status {
            429 => LlmError::RateLimited(message),
            401 | 403 => LlmError::NotConfigured(message),
            _ => LlmError::Api { status, message },
        }
    }
}

/// Token counts reported by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A single classification prompt.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Text returned by the classifier, trimmed.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub usage: LlmUsage,
    pub model: String,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Backend label used in metrics, e.g. "anthropic".
    fn provider(&self) -> &str;

    fn model(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Build a client for the configured provider.
///
/// Returns `NotConfigured` when the provider needs credentials that are missing.
pub fn create_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    let client: Arc<dyn LlmClient> = match config.provider {
        LlmProvider::Anthropic => {
            let api_key = config.api_key.clone().unwrap_or_default();
            if api_key.is_empty() && config.api_base.is_none() {
                return Err(LlmError::NotConfigured(
                    "Anthropic provider requires an api_key".to_string(),
                ));
            }
            let base = config.api_base.as_deref().unwrap_or(ANTHROPIC_API_BASE);
            Arc::new(AnthropicClient::new(api_key, &config.model).with_api_base(base))
        }
        LlmProvider::Ollama => {
            let base = config.api_base.as_deref().unwrap_or(OLLAMA_API_BASE);
            Arc::new(OllamaClient::new(&config.model).with_api_base(base))
        }
    };

    info!(
        "Classifier enabled with {} ({})",
        client.provider(),
        client.model()
    );
    Ok(client)
}

/// Turn a non-200 response into an error, preferring the backend's own message.
async fn failure(response: reqwest::Response, extract: fn(&str) -> Option<String>) -> LlmError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = extract(&body).unwrap_or(body);
    LlmError::from_status(status, message)
}

async fn send_json<T: Serialize>(
    request: reqwest::RequestBuilder,
    body: &T,
) -> Result<reqwest::Response, LlmError> {
    request
        .header("content-type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| LlmError::Http(e.to_string()))
}

/// Anthropic Messages API client.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            api_base: ANTHROPIC_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ContentBlock>,
    usage: LlmUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            messages: [UserMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        let builder = self
            .http
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);
        let response = send_json(builder, &body).await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(failure(response, |body| {
                serde_json::from_str::<ErrorEnvelope>(body)
                    .ok()
                    .map(|e| e.error.message)
            })
            .await);
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Json(e.to_string()))?;

        let text: String = parsed
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();

        Ok(CompletionResponse {
            text: text.trim().to_string(),
            usage: parsed.usage,
            model: parsed.model,
        })
    }
}

/// Client for a local Ollama server. No credentials.
pub struct OllamaClient {
    http: reqwest::Client,
    model: String,
    api_base: String,
}

impl OllamaClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            model: model.into(),
            api_base: OLLAMA_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    model: String,
    response: String,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

#[async_trait]
impl LlmClient for OllamaClient {
    fn provider(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: request.max_tokens,
            },
        };

        let builder = self.http.post(format!("{}/api/generate", self.api_base));
        let response = send_json(builder, &body).await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(failure(response, |body| {
                serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v.get("error")?.as_str().map(str::to_string))
            })
            .await);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Json(e.to_string()))?;

        Ok(CompletionResponse {
            text: parsed.response.trim().to_string(),
            usage: LlmUsage {
                input_tokens: parsed.prompt_eval_count,
                output_tokens: parsed.eval_count,
            },
            model: parsed.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm_config(provider: LlmProvider, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            provider,
            model: "test-model".to_string(),
            api_key: api_key.map(str::to_string),
            api_base: None,
            max_tokens: 100,
        }
    }

    #[test]
    fn test_request_defaults() {
        let request = CompletionRequest::new("Classify this");
        assert_eq!(request.prompt, "Classify this");
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(request.with_max_tokens(64).max_tokens, 64);
    }

    #[test]
    fn test_messages_request_wire_format() {
        let body = MessagesRequest {
            model: "claude-3-haiku-20240307",
            max_tokens: 100,
            messages: [UserMessage {
                role: "user",
                content: "Ticket Title: VPN",
            }],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "claude-3-haiku-20240307",
                "max_tokens": 100,
                "messages": [{ "role": "user", "content": "Ticket Title: VPN" }]
            })
        );
    }

    #[test]
    fn test_messages_response_joins_text_blocks() {
        let parsed: MessagesResponse = serde_json::from_str(
            r#"{
                "model": "claude-3-haiku-20240307",
                "content": [
                    {"type": "text", "text": "Department: HR\n"},
                    {"type": "tool_use", "id": "x"},
                    {"type": "text", "text": "Confidence: 80"}
                ],
                "usage": {"input_tokens": 12, "output_tokens": 7}
            }"#,
        )
        .unwrap();

        let text: String = parsed
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();
        assert_eq!(text, "Department: HR\nConfidence: 80");
        assert_eq!(parsed.usage.output_tokens, 7);
    }

    #[test]
    fn test_generate_request_wire_format() {
        let body = GenerateRequest {
            model: "llama3",
            prompt: "hi",
            stream: false,
            options: GenerateOptions { num_predict: 50 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 50);
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            LlmError::from_status(429, "slow down".into()),
            LlmError::RateLimited(_)
        ));
        assert!(matches!(
            LlmError::from_status(401, "bad key".into()),
            LlmError::NotConfigured(_)
        ));
        assert!(matches!(
            LlmError::from_status(500, "oops".into()),
            LlmError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn test_create_anthropic_requires_key() {
        let err = create_llm_client(&llm_config(LlmProvider::Anthropic, None))
            .err()
            .unwrap();
        assert!(matches!(err, LlmError::NotConfigured(_)));
    }

    #[test]
    fn test_create_clients() {
        let anthropic =
            create_llm_client(&llm_config(LlmProvider::Anthropic, Some("sk-test"))).unwrap();
        assert_eq!(anthropic.provider(), "anthropic");

        let ollama = create_llm_client(&llm_config(LlmProvider::Ollama, None)).unwrap();
        assert_eq!(ollama.provider(), "ollama");
        assert_eq!(ollama.model(), "test-model");
    }

    #[test]
    fn test_ollama_custom_base() {
        let client = OllamaClient::new("mistral").with_api_base("http://gpu-box:11434");
        assert_eq!(client.api_base, "http://gpu-box:11434");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(LlmError::Http("x".into()).kind(), "connection");
        assert_eq!(LlmError::Json("x".into()).kind(), "protocol");
        assert_eq!(LlmError::Timeout(Duration::from_secs(1)).kind(), "timeout");
    }
}
