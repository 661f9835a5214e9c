//! Embedding provider abstraction.
//!
//! Both backends turn text into a fixed-length vector over HTTP. The
//! [`Embedder`] trait is the capability interface the retrieval layer depends
//! on; callers never branch on a provider tag themselves.

pub mod gemini;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AppConfig;
use crate::error::Result;
use crate::provider::Provider;

pub use gemini::GeminiEmbedder;
pub use openai::OpenAiEmbedder;

/// Whether text is embedded as stored content or as a search query.
///
/// Asymmetric embedding models (Gemini) produce better retrieval when the
/// query side is marked as such; symmetric APIs (OpenAI) ignore the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingMode {
    /// Text being indexed for later retrieval
    Document,
    /// Text used to search indexed documents
    Query,
}

/// Errors from embedding backends
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

impl EmbeddingError {
    /// Check if this error is potentially transient
    pub fn is_retryable(&self) -> bool {
        match self {
            EmbeddingError::Network { .. } | EmbeddingError::Timeout { .. } => true,
            EmbeddingError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EmbeddingError::Timeout { timeout_secs: 0 }
        } else {
            EmbeddingError::Network {
                message: err.to_string(),
            }
        }
    }
}

/// Capability interface for embedding backends
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed `text`, returning a vector of fixed provider-specific length
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> std::result::Result<Vec<f32>, EmbeddingError>;

    /// The provider backing this embedder
    fn provider(&self) -> Provider;

    /// The embedding model identifier
    fn model_name(&self) -> &str;
}

/// Create the embedder for a provider from application configuration.
///
/// Fails with a configuration error when the provider's API key is missing.
pub fn create_embedder(provider: Provider, config: &AppConfig) -> Result<Arc<dyn Embedder>> {
    let api_key = config.require_api_key(provider)?.to_string();
    match provider {
        Provider::OpenAi => Ok(Arc::new(OpenAiEmbedder::new(api_key, config.timeout_secs)?)),
        Provider::Gemini => Ok(Arc::new(GeminiEmbedder::new(api_key, config.timeout_secs)?)),
    }
}
