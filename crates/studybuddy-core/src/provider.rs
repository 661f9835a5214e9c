//! Provider selection shared by the embedding and chat layers.
//!
//! Both backends of the application (OpenAI and Gemini) expose an embedding
//! endpoint and a chat/completion endpoint, so one enum selects both.

use serde::{Deserialize, Serialize};

/// Supported AI providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    /// OpenAI API (chat completions + embeddings)
    OpenAi,
    /// Google Gemini API (generateContent + embedContent)
    #[default]
    Gemini,
}

impl Provider {
    /// Get all supported providers
    pub fn all() -> &'static [Provider] {
        &[Provider::OpenAi, Provider::Gemini]
    }

    /// Name of the environment variable holding this provider's API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "openai" | "open-ai" | "gpt" => Ok(Provider::OpenAi),
            "gemini" | "google" | "google-ai" => Ok(Provider::Gemini),
            _ => Err(format!(
                "Unsupported provider: {s}. Valid options: openai, gemini"
            )),
        }
    }
}
