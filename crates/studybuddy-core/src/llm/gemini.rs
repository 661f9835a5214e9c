//! Gemini chat client (`generateContent` / `streamGenerateContent`).
//!
//! The system prompt rides in `system_instruction`; JSON-mode answers may
//! still arrive wrapped in markdown fences, which the response models strip
//! before parsing.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::sse::sse_completion_stream;
use super::{ChatClient, ChatRequest, ChatResponse, CompletionStream, LlmError};
use crate::provider::Provider;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-flash-latest";

/// Chat client for the Gemini API
pub struct GeminiChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
    status: Option<String>,
}

impl GeminiChatClient {
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
                message: "Gemini API key is empty".to_string(),
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

    fn request_body(&self, request: &ChatRequest) -> serde_json::Value {
        let mut body = json!({
            "system_instruction": {
                "parts": [{ "text": request.system_prompt }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.user_message }]
            }],
        });
        if request.json_mode {
            body["generationConfig"] = json!({ "responseMimeType": "application/json" });
        }
        body
    }

    fn endpoint(&self, method: &str) -> String {
        let sep = if method.contains('?') { '&' } else { '?' };
        format!(
            "{}/models/{}:{}{}key={}",
            self.base_url, self.model, method, sep, self.api_key
        )
    }

    async fn send(&self, request: &ChatRequest, method: &str) -> Result<reqwest::Response, LlmError> {
        let url = self.endpoint(method);
        let response = self
            .client
            .post(&url)
            .json(&self.request_body(request))
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
impl ChatClient for GeminiChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let response = self.send(&request, "generateContent").await?;
        let parsed: GenerateContentResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse {
                message: format!("failed to parse generateContent response: {e}"),
            })?;

        if let Some(feedback) = &parsed.prompt_feedback {
            if feedback.block_reason.is_some() {
                return Err(LlmError::ContentBlocked);
            }
        }

        let text = candidate_text(&parsed).ok_or_else(|| LlmError::InvalidResponse {
            message: "generateContent response contained no text".to_string(),
        })?;

        debug!(model = %self.model, chars = text.len(), "gemini completion finished");
        Ok(ChatResponse {
            text,
            model: Some(self.model.clone()),
        })
    }

    async fn stream(&self, request: ChatRequest) -> Result<CompletionStream, LlmError> {
        let response = self.send(&request, "streamGenerateContent?alt=sse").await?;
        Ok(sse_completion_stream(response, extract_stream_fragment))
    }

    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Concatenate the text parts of the first candidate
fn candidate_text(response: &GenerateContentResponse) -> Option<String> {
    let parts = response
        .candidates
        .as_ref()?
        .first()?
        .content
        .as_ref()?
        .parts
        .as_ref()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    (!text.is_empty()).then_some(text)
}

/// Pull the text out of one streamed `data:` payload
fn extract_stream_fragment(data: &str) -> Result<Option<String>, LlmError> {
    let chunk: GenerateContentResponse =
        serde_json::from_str(data).map_err(|e| LlmError::InvalidResponse {
            message: format!("failed to parse stream chunk: {e}"),
        })?;
    Ok(candidate_text(&chunk))
}

/// Map a non-success Gemini response to an error
fn map_api_error(status: u16, body: &str) -> LlmError {
    let detail: Option<ApiErrorDetail> = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error);
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| body.chars().take(200).collect());
    let api_status = detail.and_then(|d| d.status).unwrap_or_default();

    match status {
        401 | 403 => LlmError::Authentication { message },
        429 if api_status == "RESOURCE_EXHAUSTED" || message.contains("RESOURCE_EXHAUSTED") => {
            LlmError::QuotaExceeded { message }
        }
        429 => LlmError::RateLimit { message },
        400 => LlmError::InvalidRequest { message },
        s if s >= 500 => LlmError::ServerError { message },
        _ => LlmError::InvalidResponse { message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiChatClient {
        GeminiChatClient::new("test-key".to_string(), None, 60).unwrap()
    }

    #[test]
    fn test_default_model() {
        assert_eq!(client().model_name(), "gemini-flash-latest");
    }

    #[test]
    fn test_request_body_carries_system_instruction() {
        let body = client().request_body(&ChatRequest::new("sys prompt", "the topic"));
        assert_eq!(body["system_instruction"]["parts"][0]["text"], "sys prompt");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "the topic");
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_request_body_json_mode() {
        let request = ChatRequest::new("s", "u").with_json_mode(true);
        let body = client().request_body(&request);
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_candidate_text_concatenates_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"world"}],"role":"model"}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(candidate_text(&parsed), Some("Hello world".to_string()));
    }

    #[test]
    fn test_empty_candidates_yield_none() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(candidate_text(&parsed), None);
    }

    #[test]
    fn test_extract_stream_fragment() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"frag"}]}}]}"#;
        assert_eq!(extract_stream_fragment(data).unwrap(), Some("frag".into()));
        assert!(extract_stream_fragment("not json").is_err());
    }

    #[test]
    fn test_endpoint_query_separator() {
        let c = client();
        assert!(c
            .endpoint("generateContent")
            .ends_with(":generateContent?key=test-key"));
        assert!(c
            .endpoint("streamGenerateContent?alt=sse")
            .ends_with(":streamGenerateContent?alt=sse&key=test-key"));
    }

    #[test]
    fn test_quota_error_mapping() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert!(matches!(
            map_api_error(429, body),
            LlmError::QuotaExceeded { .. }
        ));
    }

    #[test]
    fn test_server_error_mapping() {
        assert!(matches!(
            map_api_error(503, r#"{"error":{"message":"overloaded","status":"UNAVAILABLE"}}"#),
            LlmError::ServerError { .. }
        ));
    }
}
