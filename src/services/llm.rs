use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("ANTHROPIC_API_KEY not set in environment")]
    MissingApiKey,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM response contained no text content")]
    EmptyResponse,
}

/// Per-call overrides; `None` falls back to the configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl GenerationOptions {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature: Some(temperature),
            max_tokens: Some(max_tokens),
        }
    }
}

/// Single-shot text generation against an external model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: GenerationOptions,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic Messages API client. Built once at startup and shared.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    default_temperature: f32,
    default_max_tokens: u32,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let api_key = config
            .anthropic_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        let mut builder = reqwest::Client::builder();
        if config.llm_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.llm_timeout_secs));
        }
        let http = builder.build().map_err(LlmError::Client)?;

        Ok(Self {
            http,
            api_key,
            endpoint: format!("{}/v1/messages", config.llm_base_url),
            model: config.llm_model.clone(),
            default_temperature: config.llm_temperature,
            default_max_tokens: config.llm_max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: GenerationOptions,
    ) -> Result<String, LlmError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: options.max_tokens.unwrap_or(self.default_max_tokens),
            temperature: options.temperature.unwrap_or(self.default_temperature),
            messages: [Message {
                role: "user",
                content: prompt,
            }],
            system: system_prompt,
        };

        tracing::debug!(
            model = %self.model,
            max_tokens = body.max_tokens,
            temperature = body.temperature,
            "Sending LLM request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let parsed: MessagesResponse = response.json().await?;
        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or(LlmError::EmptyResponse)
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured {
        body: Arc<Mutex<Option<Value>>>,
        api_key: Arc<Mutex<Option<String>>>,
    }

    fn test_config(base_url: &str) -> Config {
        Config::from_lookup(|key| match key {
            "ANTHROPIC_API_KEY" => Some("sk-test".into()),
            "LLM_BASE_URL" => Some(base_url.into()),
            "LLM_TEMPERATURE" => Some("0.5".into()),
            "LLM_MAX_TOKENS" => Some("321".into()),
            _ => None,
        })
        .unwrap()
    }

    /// Serves `reply` with `status` on /v1/messages and records what was sent.
    async fn spawn_provider(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route(
                "/v1/messages",
                post(
                    move |State(captured): State<Captured>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            *captured.body.lock().await = Some(body);
                            *captured.api_key.lock().await = headers
                                .get("x-api-key")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string);
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), captured)
    }

    #[test]
    fn test_missing_api_key_fails_construction() {
        let config = Config::from_lookup(|_| None).unwrap();
        let err = LlmClient::new(&config).unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[test]
    fn test_debug_output_redacts_api_key() {
        let client = LlmClient::new(&test_config("http://localhost")).unwrap();
        let rendered = format!("{:?}", client);
        assert!(!rendered.contains("sk-test"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("claude-3-haiku-20240307"));
    }

    #[test]
    fn test_client_uses_configured_model() {
        let client = LlmClient::new(&test_config("http://localhost")).unwrap();
        assert_eq!(client.model(), "claude-3-haiku-20240307");
    }

    #[tokio::test]
    async fn test_generate_sends_overrides_and_returns_raw_text() {
        let (base_url, captured) = spawn_provider(
            StatusCode::OK,
            json!({"content": [{"type": "text", "text": "  [\"gym\"]\n"}]}),
        )
        .await;
        let client = LlmClient::new(&test_config(&base_url)).unwrap();

        let text = client
            .generate("hello", Some("be brief"), GenerationOptions::new(0.3, 200))
            .await
            .unwrap();
        assert_eq!(text, "  [\"gym\"]\n", "text must come back untrimmed");

        let body = captured.body.lock().await.clone().unwrap();
        assert_eq!(body["model"], "claude-3-haiku-20240307");
        assert_eq!(body["max_tokens"], 200);
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert_eq!(body["system"], "be brief");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(captured.api_key.lock().await.as_deref(), Some("sk-test"));
    }

    #[tokio::test]
    async fn test_generate_falls_back_to_defaults_and_omits_system() {
        let (base_url, captured) =
            spawn_provider(StatusCode::OK, json!({"content": [{"type": "text", "text": "ok"}]}))
                .await;
        let client = LlmClient::new(&test_config(&base_url)).unwrap();

        client
            .generate("hello", None, GenerationOptions::default())
            .await
            .unwrap();

        let body = captured.body.lock().await.clone().unwrap();
        assert_eq!(body["max_tokens"], 321);
        assert!((body["temperature"].as_f64().unwrap() - 0.5).abs() < 1e-6);
        assert!(body.get("system").is_none());
    }

    #[tokio::test]
    async fn test_generate_surfaces_provider_status() {
        let (base_url, _) = spawn_provider(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"type": "rate_limit_error"}}),
        )
        .await;
        let client = LlmClient::new(&test_config(&base_url)).unwrap();

        let err = client
            .generate("hello", None, GenerationOptions::default())
            .await
            .unwrap_err();
        match err {
            LlmError::Status { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("rate_limit_error"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_without_text_block_is_an_error() {
        let (base_url, _) = spawn_provider(StatusCode::OK, json!({"content": []})).await;
        let client = LlmClient::new(&test_config(&base_url)).unwrap();

        let err = client
            .generate("hello", None, GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_generate_connection_failure_is_request_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = LlmClient::new(&test_config(&format!("http://{}", addr))).unwrap();
        let err = client
            .generate("hello", None, GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Request(_)));
    }
}
