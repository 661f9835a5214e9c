//! Application configuration loaded from the environment.
//!
//! API keys are read from `OPENAI_API_KEY` / `GEMINI_API_KEY`. The active
//! provider and optional model override come from `STUDYBUDDY_PROVIDER` and
//! `STUDYBUDDY_MODEL`.

use crate::error::{Result, StudyBuddyError};
use crate::provider::Provider;

/// Environment variable names
pub mod env_vars {
    pub const STUDYBUDDY_PROVIDER: &str = "STUDYBUDDY_PROVIDER";
    pub const STUDYBUDDY_MODEL: &str = "STUDYBUDDY_MODEL";
    pub const STUDYBUDDY_LOG: &str = "STUDYBUDDY_LOG";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
}

/// Configuration for provider clients and request handling
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Active provider for both embeddings and chat
    pub provider: Provider,

    /// Optional chat model override (provider defaults apply otherwise)
    pub model: Option<String>,

    /// API key for OpenAI, if configured
    pub openai_api_key: Option<String>,

    /// API key for Gemini, if configured
    pub gemini_api_key: Option<String>,

    /// Per-request timeout for network calls
    pub timeout_secs: u64,

    /// Maximum retries for transient network failures
    pub max_retries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            openai_api_key: None,
            gemini_api_key: None,
            timeout_secs: 60,
            max_retries: 3,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let provider = std::env::var(env_vars::STUDYBUDDY_PROVIDER)
            .ok()
            .and_then(|s| s.parse::<Provider>().ok())
            .unwrap_or_default();

        Self {
            provider,
            model: std::env::var(env_vars::STUDYBUDDY_MODEL).ok(),
            openai_api_key: std::env::var(env_vars::OPENAI_API_KEY).ok(),
            gemini_api_key: std::env::var(env_vars::GEMINI_API_KEY).ok(),
            ..Default::default()
        }
    }

    /// Set the active provider
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Set the chat model override
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Get the API key for a provider, if configured
    pub fn api_key_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAi => self.openai_api_key.as_deref(),
            Provider::Gemini => self.gemini_api_key.as_deref(),
        }
    }

    /// Get the API key for a provider, or a configuration error naming
    /// the missing environment variable
    pub fn require_api_key(&self, provider: Provider) -> Result<&str> {
        self.api_key_for(provider).ok_or_else(|| {
            StudyBuddyError::invalid_config(format!(
                "{} is required for the {provider} provider",
                provider.api_key_env()
            ))
        })
    }

    /// List providers with their configuration status.
    ///
    /// Returns (provider, is_configured, status_message) tuples.
    pub fn list_providers(&self) -> Vec<(Provider, bool, String)> {
        Provider::all()
            .iter()
            .map(|&p| {
                let configured = self.api_key_for(p).is_some();
                let status = if configured {
                    format!("Configured via {}", p.api_key_env())
                } else {
                    format!("Missing {}", p.api_key_env())
                };
                (p, configured, status)
            })
            .collect()
    }
}
