//! OpenAI embeddings backend (`POST /v1/embeddings`).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Embedder, EmbeddingError, EmbeddingMode};
use crate::provider::Provider;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Embedding client for the OpenAI API.
///
/// The OpenAI embedding space is symmetric, so [`EmbeddingMode`] has no wire
/// effect here.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
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

impl OpenAiEmbedder {
    pub fn new(api_key: String, timeout_secs: u64) -> Result<Self, EmbeddingError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against a custom base URL (used by tests and proxies)
    pub fn with_base_url(
        api_key: String,
        timeout_secs: u64,
        base_url: String,
    ) -> Result<Self, EmbeddingError> {
        if api_key.is_empty() {
            return Err(EmbeddingError::Configuration {
                message: "OpenAI API key is empty".to_string(),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::Configuration {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            api_key,
            base_url,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str, _mode: EmbeddingMode) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    EmbeddingError::Network {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(status.as_u16(), &body));
        }

        let parsed: EmbeddingResponse =
            response
                .json()
                .await
                .map_err(|e| EmbeddingError::InvalidResponse {
                    message: format!("failed to parse embedding response: {e}"),
                })?;

        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse {
                message: "embedding response contained no data".to_string(),
            })?;

        debug!(model = %self.model, dims = vector.len(), "generated openai embedding");
        Ok(vector)
    }

    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Map a non-success OpenAI response to an error, distinguishing exhausted
/// quota from plain rate limiting so callers can suggest switching providers.
fn map_api_error(status: u16, body: &str) -> EmbeddingError {
    let detail: Option<ApiErrorDetail> = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error);
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| body.chars().take(200).collect());
    let code = detail.and_then(|d| d.code).unwrap_or_default();

    if code == "insufficient_quota" || message.contains("insufficient_quota") {
        EmbeddingError::QuotaExceeded { message }
    } else {
        EmbeddingError::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_payload_shape() {
        let request = EmbeddingRequest {
            model: "text-embedding-3-small",
            input: "hello world",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "text-embedding-3-small");
        assert_eq!(json["input"], "hello world");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.1,-0.2,0.3]}],"model":"text-embedding-3-small"}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn test_quota_error_detection() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#;
        let err = map_api_error(429, body);
        assert!(matches!(err, EmbeddingError::QuotaExceeded { .. }));
    }

    #[test]
    fn test_rate_limit_without_quota_is_api_error() {
        let body = r#"{"error":{"message":"Rate limit reached","type":"rate_limit_error","code":"rate_limit_exceeded"}}"#;
        let err = map_api_error(429, body);
        assert!(matches!(err, EmbeddingError::Api { status: 429, .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_unparseable_error_body_is_truncated() {
        let err = map_api_error(500, "<html>internal error</html>");
        match err {
            EmbeddingError::Api { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("internal error"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(OpenAiEmbedder::new(String::new(), 60).is_err());
    }
}
