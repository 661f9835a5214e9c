//! Provider listing command.

use anyhow::Result;
use console::style;

use studybuddy_core::AppConfig;

/// Print each supported provider with its configuration status
pub fn handle_list() -> Result<()> {
    let config = AppConfig::from_env();

    println!("{}", style("Providers:").bold());
    for (provider, configured, status) in config.list_providers() {
        let marker = if configured {
            style("✓").green()
        } else {
            style("✗").red()
        };
        let active = if provider == config.provider {
            style(" (active)").cyan().to_string()
        } else {
            String::new()
        };
        println!("  {marker} {provider}{active} - {status}");
    }
    println!();
    println!(
        "Set {} to choose the active provider.",
        style("STUDYBUDDY_PROVIDER").bold()
    );
    Ok(())
}
