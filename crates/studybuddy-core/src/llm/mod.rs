//! Chat/completion provider abstraction.
//!
//! The orchestrator depends only on [`ChatClient`]; the OpenAI and Gemini
//! implementations handle their wire formats. Explain/summarize tasks use
//! the streaming path, quiz/flashcards the single-shot JSON path.

pub mod factory;
pub mod gemini;
pub mod openai;
pub mod retry;
pub(crate) mod sse;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use thiserror::Error;

use crate::provider::Provider;

pub use factory::create_chat_client;
pub use gemini::GeminiChatClient;
pub use openai::OpenAiChatClient;
pub use retry::{with_retry, RetryPolicy};

/// Errors from chat providers
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimit { message: String },

    #[error("Request timeout after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("Server error: {message}")]
    ServerError { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Content blocked by safety filters")]
    ContentBlocked,
}

impl LlmError {
    /// Check if this error is potentially transient
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimit { .. }
                | LlmError::Timeout { .. }
                | LlmError::Network { .. }
                | LlmError::ServerError { .. }
        )
    }

    /// Convert to a user-facing message with actionable advice
    pub fn user_message(&self) -> String {
        match self {
            LlmError::Configuration { message } => format!("Configuration error: {message}"),
            LlmError::Authentication { .. } => {
                "Authentication failed. Please check your API key.".to_string()
            }
            LlmError::RateLimit { .. } => {
                "Rate limit exceeded. Please wait a moment and try again.".to_string()
            }
            LlmError::Timeout { timeout_secs } => {
                format!("Request timed out after {timeout_secs} seconds.")
            }
            LlmError::Network { .. } => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            LlmError::QuotaExceeded { .. } => {
                "Provider quota exceeded. Please check your billing, or switch to the \
                 other provider."
                    .to_string()
            }
            LlmError::ServerError { .. } => {
                "The provider is experiencing issues. Please try again later.".to_string()
            }
            LlmError::InvalidRequest { message } => format!("Invalid request: {message}"),
            LlmError::InvalidResponse { .. } => {
                "Received an invalid response. Please try again.".to_string()
            }
            LlmError::ContentBlocked => {
                "Content was blocked by safety filters. Try rephrasing your request.".to_string()
            }
        }
    }
}

/// Request to a chat provider
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// System prompt establishing the task
    pub system_prompt: String,

    /// The user's topic or pasted text
    pub user_message: String,

    /// Ask the provider for a strict JSON object response
    pub json_mode: bool,
}

impl ChatRequest {
    pub fn new(system_prompt: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_message: user_message.into(),
            json_mode: false,
        }
    }

    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }
}

/// Single-shot response from a chat provider
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The generated text
    pub text: String,

    /// Model reported by the provider, if any
    pub model: Option<String>,
}

/// Lazy, finite, non-restartable sequence of response fragments.
///
/// The stream ends when the provider finishes or errors; there is no
/// cancellation path beyond dropping it.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Provider-agnostic chat interface
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Generate a complete response in one round trip
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Generate a response as a stream of text fragments
    async fn stream(&self, request: ChatRequest) -> Result<CompletionStream, LlmError>;

    /// The provider backing this client
    fn provider(&self) -> Provider;

    /// The chat model identifier
    fn model_name(&self) -> &str;
}
