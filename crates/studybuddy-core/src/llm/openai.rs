//! OpenAI chat completions client (`POST /v1/chat/completions`).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::sse::sse_completion_stream;
use super::{ChatClient, ChatRequest, ChatResponse, CompletionStream, LlmError};
use crate::provider::Provider;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Chat client for the OpenAI API
pub struct OpenAiChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
    code: Option<String>,
}

impl OpenAiChatClient {
    pub fn new(api_key: String, model: Option<String>, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against a custom base URL (used by tests and proxies)
    pub fn with_base_url(
        api_key: String,
        model: Option<String>,
        timeout_secs: u64,
        base_url: String,
    ) -> Result<Self, LlmError> {
        if api_key.is_empty() {
            return Err(LlmError::Configuration {
                message: "OpenAI API key is empty".to_string(),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::Configuration {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            api_key,
            base_url,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_secs,
        })
    }

    fn request_body(&self, request: &ChatRequest, stream: bool) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_message }
            ],
            "stream": stream,
        });
        if request.json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }

    async fn send(
        &self,
        request: &ChatRequest,
        stream: bool,
    ) -> Result<reqwest::Response, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(request, stream))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    LlmError::Network {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(status.as_u16(), &body));
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let response = self.send(&request, false).await?;
        let parsed: ChatCompletionResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse {
                message: format!("failed to parse chat completion: {e}"),
            })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse {
                message: "chat completion contained no content".to_string(),
            })?;

        debug!(model = %self.model, chars = text.len(), "openai completion finished");
        Ok(ChatResponse {
            text,
            model: parsed.model,
        })
    }

    async fn stream(&self, request: ChatRequest) -> Result<CompletionStream, LlmError> {
        let response = self.send(&request, true).await?;
        Ok(sse_completion_stream(response, extract_stream_fragment))
    }

    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Pull the text delta out of one streamed chunk payload
fn extract_stream_fragment(data: &str) -> Result<Option<String>, LlmError> {
    let chunk: StreamChunk = serde_json::from_str(data).map_err(|e| LlmError::InvalidResponse {
        message: format!("failed to parse stream chunk: {e}"),
    })?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|s| !s.is_empty()))
}

/// Map a non-success OpenAI response to an error
fn map_api_error(status: u16, body: &str) -> LlmError {
    let detail: Option<ApiErrorDetail> = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error);
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| body.chars().take(200).collect());
    let code = detail.and_then(|d| d.code).unwrap_or_default();

    match status {
        401 | 403 => LlmError::Authentication { message },
        429 if code == "insufficient_quota" || message.contains("insufficient_quota") => {
            LlmError::QuotaExceeded { message }
        }
        429 => LlmError::RateLimit { message },
        400 => LlmError::InvalidRequest { message },
        s if s >= 500 => LlmError::ServerError { message },
        _ => LlmError::InvalidResponse { message },
    }
}
