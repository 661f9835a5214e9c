//! System prompt construction.
//!
//! `build_system_prompt` is a pure function: the same task, difficulty, and
//! context always produce byte-identical output. The quiz and flashcard
//! templates pin down a strict JSON contract that the response validation in
//! [`crate::models`] depends on.

use serde::{Deserialize, Serialize};

/// The study task requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Explain,
    Summarize,
    Quiz,
    Flashcards,
}

impl TaskType {
    pub fn all() -> &'static [TaskType] {
        &[
            TaskType::Explain,
            TaskType::Summarize,
            TaskType::Quiz,
            TaskType::Flashcards,
        ]
    }

    /// Tasks whose responses are a strict JSON object rather than prose
    pub fn requires_json(&self) -> bool {
        matches!(self, TaskType::Quiz | TaskType::Flashcards)
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskType::Explain => write!(f, "explain"),
            TaskType::Summarize => write!(f, "summarize"),
            TaskType::Quiz => write!(f, "quiz"),
            TaskType::Flashcards => write!(f, "flashcards"),
        }
    }
}

impl std::str::FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "explain" => Ok(TaskType::Explain),
            "summarize" => Ok(TaskType::Summarize),
            "quiz" => Ok(TaskType::Quiz),
            "flashcards" => Ok(TaskType::Flashcards),
            _ => Err(format!(
                "Unknown task: {s}. Valid options: explain, summarize, quiz, flashcards"
            )),
        }
    }
}

/// Target difficulty controlling the guidance injected into every prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn all() -> &'static [Difficulty] {
        &[
            Difficulty::Beginner,
            Difficulty::Intermediate,
            Difficulty::Advanced,
        ]
    }

    /// The fixed guidance string for this difficulty
    pub fn guidance(&self) -> &'static str {
        match self {
            Difficulty::Beginner => {
                "Use simple language, short sentences, and everyday analogies. \
                 Assume no prior knowledge of the subject."
            }
            Difficulty::Intermediate => {
                "Use moderate technical language. Assume familiarity with basic \
                 concepts. Include some deeper explanations."
            }
            Difficulty::Advanced => {
                "Use precise technical terminology. Assume strong foundational \
                 knowledge. Include nuanced details and edge cases."
            }
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(format!(
                "Unknown difficulty: {s}. Valid options: beginner, intermediate, advanced"
            )),
        }
    }
}

/// Build the system prompt for a task.
///
/// When `rag_context` is non-empty, a delimited context block is appended
/// instructing the model to ground its answer in the retrieved notes.
pub fn build_system_prompt(task: TaskType, difficulty: Difficulty, rag_context: &[String]) -> String {
    let context_block = if rag_context.is_empty() {
        String::new()
    } else {
        format!(
            "\n\nRELEVANT CONTEXT FROM UPLOADED NOTES:\n---\n{}\n---\n\
             Use the above context to ground your response. If the context is \
             relevant, prioritize information from it.",
            rag_context.join("\n\n")
        )
    };

    let guide = difficulty.guidance();

    match task {
        TaskType::Explain => format!(
            "You are an expert tutor. Your task is to EXPLAIN the given topic or concept clearly and thoroughly.\n\
             \n\
             Difficulty Level: {difficulty}\n\
             {guide}\n\
             \n\
             Guidelines:\n\
             - Break down complex ideas into digestible parts\n\
             - Use relevant examples and analogies\n\
             - Structure your explanation logically with clear sections\n\
             - If applicable, mention common misconceptions\n\
             - Format your response with markdown headings, bold text, and bullet points for readability{context_block}"
        ),
        TaskType::Summarize => format!(
            "You are an expert academic summarizer. Your task is to SUMMARIZE the given text or topic concisely.\n\
             \n\
             Difficulty Level: {difficulty}\n\
             {guide}\n\
             \n\
             Guidelines:\n\
             - Extract the key points and main ideas\n\
             - Organize the summary with clear structure\n\
             - Keep the summary concise but comprehensive\n\
             - Highlight the most important takeaways\n\
             - Use bullet points and headings for clarity\n\
             - End with a brief \"Key Takeaways\" section{context_block}"
        ),
        TaskType::Quiz => format!(
            "You are an expert quiz creator for educational purposes. Generate a quiz based on the given topic.\n\
             \n\
             Difficulty Level: {difficulty}\n\
             {guide}\n\
             \n\
             You MUST respond with ONLY valid JSON in this exact format:\n\
             {{\n\
               \"questions\": [\n\
                 {{\n\
                   \"question\": \"The question text\",\n\
                   \"options\": [\"Option A\", \"Option B\", \"Option C\", \"Option D\"],\n\
                   \"answer\": \"The correct option text (must exactly match one of the options)\"\n\
                 }}\n\
               ]\n\
             }}\n\
             \n\
             Guidelines:\n\
             - Generate exactly 5 questions\n\
             - Each question must have exactly 4 options\n\
             - The answer field must exactly match one of the options\n\
             - Questions should test understanding, not just memorization\n\
             - Vary question types: conceptual, applied, analytical\n\
             - Do NOT include any text outside the JSON object{context_block}"
        ),
        TaskType::Flashcards => format!(
            "You are an expert at creating study flashcards. Generate flashcards based on the given topic.\n\
             \n\
             Difficulty Level: {difficulty}\n\
             {guide}\n\
             \n\
             You MUST respond with ONLY valid JSON in this exact format:\n\
             {{\n\
               \"flashcards\": [\n\
                 {{\n\
                   \"question\": \"Front of card - the question or term\",\n\
                   \"answer\": \"Back of card - the answer or definition\"\n\
                 }}\n\
               ]\n\
             }}\n\
             \n\
             Guidelines:\n\
             - Generate exactly 10 flashcards\n\
             - Questions should be concise and focused on one concept\n\
             - Answers should be clear and informative\n\
             - Vary the aspects of the topic covered\n\
             - Do NOT include any text outside the JSON object{context_block}"
        ),
    }
}
