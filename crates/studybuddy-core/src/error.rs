use thiserror::Error;

/// Custom error types for the StudyBuddy application
#[derive(Error, Debug)]
pub enum StudyBuddyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Embedding error: {0}")]
    Embedding(#[from] crate::embedding::EmbeddingError),

    #[error("LLM error: {0}")]
    Llm(#[from] crate::llm::LlmError),

    #[error("Malformed model response: {0}")]
    MalformedResponse(#[from] crate::models::ResponseParseError),

    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Service error: {message}")]
    Service { message: String },
}

impl StudyBuddyError {
    /// Create an invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a service error
    pub fn service<S: Into<String>>(message: S) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            StudyBuddyError::Embedding(e) => e.is_retryable(),
            StudyBuddyError::Llm(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Convert to a user-facing message with actionable advice
    pub fn user_message(&self) -> String {
        match self {
            StudyBuddyError::Llm(e) => e.user_message(),
            StudyBuddyError::MalformedResponse(_) => {
                "The model returned a malformed response. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Get error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            StudyBuddyError::Io(_) => "io",
            StudyBuddyError::Json(_) => "json",
            StudyBuddyError::InvalidConfig { .. } => "config",
            StudyBuddyError::Embedding(_) => "embedding",
            StudyBuddyError::Llm(_) => "llm",
            StudyBuddyError::MalformedResponse(_) => "malformed_response",
            StudyBuddyError::Validation { .. } => "validation",
            StudyBuddyError::Service { .. } => "service",
        }
    }
}

/// Result type alias for StudyBuddy
pub type Result<T> = std::result::Result<T, StudyBuddyError>;
