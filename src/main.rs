//! Hooksett: tracked values with pluggable input and output hooks.
//!
//! Entry point that loads configuration, installs hooks, and runs a command.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use hooksett_core::config::AppConfig;

mod commands;

use commands::Cli;

fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = cli.execute(config) {
        tracing::error!("Command failed: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Installs the global `tracing` subscriber from `[logging]`.
///
/// `RUST_LOG` overrides `logging.level`. `logging.format = "json"` writes one
/// JSON object per event with targets and thread ids, so saves emitted by the
/// traced output hook can be selected with `target == "hooksett::traced"`.
/// Any other format prints human-readable multi-line events.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }

    tracing::debug!(
        level = %config.logging.level,
        format = %config.logging.format,
        "Logging initialized"
    );
}
