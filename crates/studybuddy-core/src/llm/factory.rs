//! Chat client construction from application configuration.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::provider::Provider;

use super::{ChatClient, GeminiChatClient, OpenAiChatClient};

/// Create the chat client for a provider from application configuration.
///
/// The optional `model` override in the configuration applies to whichever
/// provider is selected; fails with a configuration error when the
/// provider's API key is missing.
pub fn create_chat_client(provider: Provider, config: &AppConfig) -> Result<Arc<dyn ChatClient>> {
    let api_key = config.require_api_key(provider)?.to_string();
    let model = config.model.clone();
    match provider {
        Provider::OpenAi => Ok(Arc::new(OpenAiChatClient::new(
            api_key,
            model,
            config.timeout_secs,
        )?)),
        Provider::Gemini => Ok(Arc::new(GeminiChatClient::new(
            api_key,
            model,
            config.timeout_secs,
        )?)),
    }
}
