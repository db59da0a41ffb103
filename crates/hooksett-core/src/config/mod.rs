//! Application configuration schemas.
//!
//! Configuration is deserialized via the `config` crate from a default
//! file, an environment-specific overlay, and `HOOKSETT__*` environment
//! variables. Each sub-module represents a logical configuration section.

pub mod hooks;
pub mod logging;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use self::hooks::HooksConfig;
use self::logging::LoggingConfig;

use crate::error::HookError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Hook installation settings.
    #[serde(default)]
    pub hooks: HooksConfig,
}

impl AppConfig {
    /// Load configuration from `<dir>/default.*` and `<dir>/<env>.*`.
    ///
    /// Both files are optional. Environment variables prefixed with
    /// `HOOKSETT__` override file values (`HOOKSETT__LOGGING__LEVEL=debug`).
    pub fn load(dir: &Path, env: &str) -> Result<Self, HookError> {
        let base = dir.join("default");
        let overlay = dir.join(env);

        let config = config::Config::builder()
            .add_source(config::File::with_name(&base.to_string_lossy()).required(false))
            .add_source(config::File::with_name(&overlay.to_string_lossy()).required(false))
            .add_source(
                config::Environment::with_prefix("HOOKSETT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| HookError::configuration(format!("Failed to build config: {e}")))?;

        let app: AppConfig = config
            .try_deserialize()
            .map_err(|e| HookError::configuration(format!("Failed to deserialize config: {e}")))?;

        app.hooks.check()?;
        debug!(dir = %dir.display(), env = %env, "Configuration loaded");
        Ok(app)
    }
}
