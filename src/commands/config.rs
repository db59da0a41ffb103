//! Configuration display.

use hooksett_core::config::AppConfig;

/// Print the effective configuration as JSON
pub fn execute(config: &AppConfig) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
