//! Quiz response schema and validation.

use serde::{Deserialize, Serialize};

use super::{strip_json_fences, ResponseParseError};

/// Questions a generated quiz must contain
pub const EXPECTED_QUESTION_COUNT: usize = 5;

/// Options each question must offer
pub const EXPECTED_OPTION_COUNT: usize = 4;

/// A single multiple-choice question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl QuizQuestion {
    /// True iff `choice` is the correct answer
    pub fn is_correct(&self, choice: &str) -> bool {
        self.answer == choice
    }
}

/// A generated practice quiz
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// Parse a model response into a validated quiz.
    ///
    /// Markdown fences are stripped first; the parsed document must carry
    /// exactly five questions of four options each, with every answer
    /// matching one of its options.
    pub fn parse(text: &str) -> Result<Self, ResponseParseError> {
        let quiz: Quiz = serde_json::from_str(strip_json_fences(text))?;
        quiz.validate()?;
        Ok(quiz)
    }

    /// Validate the quiz against the prompt contract
    pub fn validate(&self) -> Result<(), ResponseParseError> {
        if self.questions.len() != EXPECTED_QUESTION_COUNT {
            return Err(ResponseParseError::schema(format!(
                "expected {EXPECTED_QUESTION_COUNT} questions, got {}",
                self.questions.len()
            )));
        }
        for (i, q) in self.questions.iter().enumerate() {
            if q.question.trim().is_empty() {
                return Err(ResponseParseError::schema(format!(
                    "question {} has empty text",
                    i + 1
                )));
            }
            if q.options.len() != EXPECTED_OPTION_COUNT {
                return Err(ResponseParseError::schema(format!(
                    "question {} has {} options, expected {EXPECTED_OPTION_COUNT}",
                    i + 1,
                    q.options.len()
                )));
            }
            if !q.options.contains(&q.answer) {
                return Err(ResponseParseError::schema(format!(
                    "question {} answer {:?} is not among its options",
                    i + 1,
                    q.answer
                )));
            }
        }
        Ok(())
    }

    /// Count correct answers given one choice per question.
    ///
    /// Choices beyond the question count are ignored; missing choices count
    /// as wrong.
    pub fn score(&self, choices: &[String]) -> usize {
        self.questions
            .iter()
            .zip(choices.iter())
            .filter(|(q, choice)| q.is_correct(choice))
            .count()
    }
}
