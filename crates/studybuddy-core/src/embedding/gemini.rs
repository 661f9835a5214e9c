//! Gemini embeddings backend (`models/gemini-embedding-001:embedContent`).
//!
//! Gemini's embedding model is asymmetric: stored documents embed with
//! `RETRIEVAL_DOCUMENT` and search queries with `RETRIEVAL_QUERY`, which
//! measurably improves retrieval ranking.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Embedder, EmbeddingError, EmbeddingMode};
use crate::provider::Provider;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-embedding-001";

/// Embedding client for the Gemini API
pub struct GeminiEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
    task_type: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
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

impl GeminiEmbedder {
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
                message: "Gemini API key is empty".to_string(),
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

fn task_type_for(mode: EmbeddingMode) -> &'static str {
    match mode {
        EmbeddingMode::Document => "RETRIEVAL_DOCUMENT",
        EmbeddingMode::Query => "RETRIEVAL_QUERY",
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!(
            "{}/models/{}:embedContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let request = EmbedContentRequest {
            model: format!("models/{}", self.model),
            content: Content {
                parts: vec![Part { text }],
            },
            task_type: task_type_for(mode),
        };

        let response = self
            .client
            .post(&url)
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

        let parsed: EmbedContentResponse =
            response
                .json()
                .await
                .map_err(|e| EmbeddingError::InvalidResponse {
                    message: format!("failed to parse embedContent response: {e}"),
                })?;

        if parsed.embedding.values.is_empty() {
            return Err(EmbeddingError::InvalidResponse {
                message: "embedContent response contained no values".to_string(),
            });
        }

        debug!(
            model = %self.model,
            dims = parsed.embedding.values.len(),
            task_type = task_type_for(mode),
            "generated gemini embedding"
        );
        Ok(parsed.embedding.values)
    }

    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Map a non-success Gemini response to an error. `RESOURCE_EXHAUSTED` is the
/// API's quota signal.
fn map_api_error(status: u16, body: &str) -> EmbeddingError {
    let detail: Option<ApiErrorDetail> = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error);
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| body.chars().take(200).collect());
    let api_status = detail.and_then(|d| d.status).unwrap_or_default();

    if api_status == "RESOURCE_EXHAUSTED" || message.contains("RESOURCE_EXHAUSTED") {
        EmbeddingError::QuotaExceeded { message }
    } else {
        EmbeddingError::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_type_by_mode() {
        assert_eq!(task_type_for(EmbeddingMode::Document), "RETRIEVAL_DOCUMENT");
        assert_eq!(task_type_for(EmbeddingMode::Query), "RETRIEVAL_QUERY");
    }

    #[test]
    fn test_request_payload_shape() {
        let request = EmbedContentRequest {
            model: "models/gemini-embedding-001".to_string(),
            content: Content {
                parts: vec![Part { text: "study notes" }],
            },
            task_type: task_type_for(EmbeddingMode::Document),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "models/gemini-embedding-001");
        assert_eq!(json["content"]["parts"][0]["text"], "study notes");
        assert_eq!(json["taskType"], "RETRIEVAL_DOCUMENT");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"embedding":{"values":[0.25,0.5,-0.75]}}"#;
        let parsed: EmbedContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.embedding.values, vec![0.25, 0.5, -0.75]);
    }

    #[test]
    fn test_quota_error_detection() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded for quota metric","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = map_api_error(429, body);
        assert!(matches!(err, EmbeddingError::QuotaExceeded { .. }));
    }

    #[test]
    fn test_server_error_is_retryable() {
        let err = map_api_error(503, r#"{"error":{"message":"overloaded","status":"UNAVAILABLE"}}"#);
        assert!(matches!(err, EmbeddingError::Api { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(GeminiEmbedder::new(String::new(), 60).is_err());
    }
}
