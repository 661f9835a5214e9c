use clap::Parser;
use std::path::PathBuf;
use tokio::runtime::Runtime;

mod commands;
use commands::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Streaming commands render model prose on stdout; keep log lines
    // out of it and send them to the daily log file instead.
    let logging_config = match &cli.command {
        Commands::Explain { .. } | Commands::Summarize { .. } => {
            studybuddy_core::LoggingConfig::from_env().with_stdout(false)
        }
        _ => studybuddy_core::LoggingConfig::from_env(),
    };
    let logging_config = match default_log_file() {
        Some(path) => logging_config.with_file(path),
        None => logging_config,
    };

    let _guard = studybuddy_core::init_logging(logging_config)?;

    let rt = Runtime::new()?;
    rt.block_on(commands::run_command(cli.command))
}

/// Daily log file under `~/.studybuddy/logs`, if a home directory exists
fn default_log_file() -> Option<PathBuf> {
    let dir = dirs::home_dir()?.join(".studybuddy").join("logs");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!(
        "studybuddy-{}.log",
        chrono::Local::now().format("%Y%m%d")
    )))
}
