//! CLI command definitions and dispatch.

pub mod config;
pub mod train;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use hooksett_core::config::AppConfig;

/// Hooksett: tracked values with pluggable input and output hooks
#[derive(Debug, Parser)]
#[command(name = "hooksett", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.*` and `<env>.*` configuration files
    #[arg(short, long, default_value = "config")]
    pub config_dir: PathBuf,

    /// Configuration environment overlay
    #[arg(short, long, env = "HOOKSETT_ENV", default_value = "development")]
    pub env: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a tracked training loop against the configured hooks
    Train(train::TrainArgs),
    /// Show the effective configuration
    Config,
}

impl Cli {
    /// Load configuration for the selected directory and environment
    pub fn load_config(&self) -> anyhow::Result<AppConfig> {
        AppConfig::load(&self.config_dir, &self.env).with_context(|| {
            format!(
                "loading '{}' (env: {})",
                self.config_dir.display(),
                self.env
            )
        })
    }

    /// Execute the CLI command
    pub fn execute(&self, config: AppConfig) -> anyhow::Result<()> {
        match &self.command {
            Commands::Train(args) => train::execute(args, &config),
            Commands::Config => config::execute(&config),
        }
    }
}
