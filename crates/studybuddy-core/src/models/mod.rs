//! Structured responses for JSON-mode tasks.
//!
//! Quiz and flashcard generations must satisfy the exact contract the prompt
//! templates mandate; anything else is a malformed response, reported
//! separately from network failures so the caller can show what was wrong
//! with the model's output.

mod flashcards;
mod quiz;

use thiserror::Error;

pub use flashcards::{Flashcard, FlashcardDeck, EXPECTED_FLASHCARD_COUNT};
pub use quiz::{Quiz, QuizQuestion, EXPECTED_OPTION_COUNT, EXPECTED_QUESTION_COUNT};

/// Failure to parse or validate a JSON-mode model response
#[derive(Debug, Error)]
pub enum ResponseParseError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response violates the expected schema: {message}")]
    SchemaViolation { message: String },
}

impl ResponseParseError {
    pub fn schema<S: Into<String>>(message: S) -> Self {
        Self::SchemaViolation {
            message: message.into(),
        }
    }
}

/// Strip a markdown code fence from a model response.
///
/// Gemini in particular wraps JSON answers in ```json fences even when asked
/// not to; the JSON contract applies to the fenced content.
pub fn strip_json_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        if let Some(inner) = rest.split("```").next() {
            return inner.trim();
        }
    }
    if let Some(rest) = trimmed.strip_prefix("```") {
        if let Some(inner) = rest.split("```").next() {
            return inner.trim();
        }
    }
    trimmed
}
