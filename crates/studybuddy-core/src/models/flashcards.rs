//! Flashcard response schema and validation.

use serde::{Deserialize, Serialize};

use super::{strip_json_fences, ResponseParseError};

/// Cards a generated deck must contain
pub const EXPECTED_FLASHCARD_COUNT: usize = 10;

/// One study flashcard: question on the front, answer on the back
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// A generated deck of flashcards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlashcardDeck {
    pub flashcards: Vec<Flashcard>,
}

impl FlashcardDeck {
    /// Parse a model response into a validated deck (exactly ten cards,
    /// none blank). Markdown fences are stripped first.
    pub fn parse(text: &str) -> Result<Self, ResponseParseError> {
        let deck: FlashcardDeck = serde_json::from_str(strip_json_fences(text))?;
        deck.validate()?;
        Ok(deck)
    }

    /// Validate the deck against the prompt contract
    pub fn validate(&self) -> Result<(), ResponseParseError> {
        if self.flashcards.len() != EXPECTED_FLASHCARD_COUNT {
            return Err(ResponseParseError::schema(format!(
                "expected {EXPECTED_FLASHCARD_COUNT} flashcards, got {}",
                self.flashcards.len()
            )));
        }
        for (i, card) in self.flashcards.iter().enumerate() {
            if card.question.trim().is_empty() || card.answer.trim().is_empty() {
                return Err(ResponseParseError::schema(format!(
                    "flashcard {} has an empty side",
                    i + 1
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_deck_json() -> String {
        let cards: Vec<serde_json::Value> = (0..10)
            .map(|i| {
                serde_json::json!({
                    "question": format!("Term {i}"),
                    "answer": format!("Definition {i}")
                })
            })
            .collect();
        serde_json::json!({ "flashcards": cards }).to_string()
    }

    #[test]
    fn test_parse_valid_deck() {
        let deck = FlashcardDeck::parse(&valid_deck_json()).unwrap();
        assert_eq!(deck.flashcards.len(), 10);
        assert_eq!(deck.flashcards[0].question, "Term 0");
    }

    #[test]
    fn test_parse_fenced_deck() {
        let fenced = format!("```json\n{}\n```", valid_deck_json());
        assert!(FlashcardDeck::parse(&fenced).is_ok());
    }

    #[test]
    fn test_wrong_card_count_rejected() {
        let body = serde_json::json!({
            "flashcards": [{ "question": "Q", "answer": "A" }]
        });
        let err = FlashcardDeck::parse(&body.to_string()).unwrap_err();
        assert!(err.to_string().contains("expected 10 flashcards"));
    }

    #[test]
    fn test_blank_card_rejected() {
        let mut deck = FlashcardDeck::parse(&valid_deck_json()).unwrap();
        deck.flashcards[7].answer = "   ".to_string();
        let err = deck.validate().unwrap_err();
        assert!(err.to_string().contains("flashcard 8"));
    }

    #[test]
    fn test_missing_key_is_json_error() {
        let err = FlashcardDeck::parse(r#"{"cards":[]}"#).unwrap_err();
        assert!(matches!(err, ResponseParseError::Json(_)));
    }
}
