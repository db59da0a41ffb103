//! Initial values from a configuration file.
//!
//! The file format follows the extension (`.yaml`, `.yml`, `.toml`,
//! `.json`). Each top-level key names a tracked value; nested tables are
//! handed to hooks as JSON objects.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use hooksett_core::error::HookError;
use hooksett_core::traits::InputHook;
use hooksett_core::types::{TrackedValue, TypeHint};

/// Input hook backed by a configuration file loaded once at construction.
#[derive(Debug, Clone)]
pub struct ConfigFileInput {
    /// Hook id, derived from the file name.
    id: String,
    /// Source file.
    path: PathBuf,
    /// Top-level key → value.
    values: BTreeMap<String, TrackedValue>,
}

impl ConfigFileInput {
    /// Loads `path`. A missing or malformed file is a configuration error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HookError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(HookError::configuration(format!(
                "Values file not found: {}",
                path.display()
            )));
        }

        let values: BTreeMap<String, TrackedValue> = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| {
                HookError::configuration(format!(
                    "Failed to read values file {}: {e}",
                    path.display()
                ))
            })?;

        info!(
            path = %path.display(),
            keys = values.len(),
            "Values file loaded"
        );

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            id: format!("config-file:{file_name}"),
            path: path.to_path_buf(),
            values,
        })
    }

    /// Builds the hook from an in-memory map.
    pub fn from_values(id: impl Into<String>, values: BTreeMap<String, TrackedValue>) -> Self {
        Self {
            id: id.into(),
            path: PathBuf::new(),
            values,
        }
    }

    /// Returns the source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the loaded keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl InputHook for ConfigFileInput {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(
        &self,
        name: &str,
        _hint: &TypeHint,
        _default: Option<&TrackedValue>,
    ) -> Option<TrackedValue> {
        let value = self.values.get(name).cloned();
        if value.is_some() {
            debug!(hook = %self.id, name = %name, "Value read from file");
        }
        value
    }
}
