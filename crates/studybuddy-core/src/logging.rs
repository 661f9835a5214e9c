//! Logging initialization built on `tracing`.
//!
//! Commands that stream model output to stdout disable the stdout layer so
//! log lines never interleave with rendered fragments; file logging stays
//! available in either mode.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::env_vars;

/// Configuration for logging output
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive when STUDYBUDDY_LOG is unset
    pub default_filter: String,

    /// Whether to log to stdout
    pub stdout: bool,

    /// Optional log file path
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            stdout: true,
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Create a configuration honoring the STUDYBUDDY_LOG environment variable
    pub fn from_env() -> Self {
        let default_filter =
            std::env::var(env_vars::STUDYBUDDY_LOG).unwrap_or_else(|_| "info".to_string());
        Self {
            default_filter,
            ..Default::default()
        }
    }

    /// Enable or disable stdout logging
    pub fn with_stdout(mut self, stdout: bool) -> Self {
        self.stdout = stdout;
        self
    }

    /// Log to the given file in addition to (or instead of) stdout
    pub fn with_file(mut self, path: PathBuf) -> Self {
        self.file = Some(path);
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// Returns a guard that must be held for the lifetime of the process when
/// file logging is enabled; dropping it flushes buffered log lines.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.default_filter)
        .with_context(|| format!("invalid log filter: {}", config.default_filter))?;

    let stdout_layer = config
        .stdout
        .then(|| fmt::layer().with_target(true).with_writer(std::io::stdout));

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).context("Failed to create log directory")?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}
