pub mod config;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod logging;
pub mod models;
pub mod prompts;
pub mod provider;
pub mod rag;
pub mod services;

// Re-exports for convenience
pub use config::AppConfig;
pub use error::{Result, StudyBuddyError};
pub use logging::{init_logging, LoggingConfig};
pub use provider::Provider;
pub use rag::{ChunkerConfig, RagService, SessionRegistry};
pub use services::StudyService;
