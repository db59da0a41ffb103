//! Logs every saved value as a tracing event.

use tracing::info;

use hooksett_core::error::HookError;
use hooksett_core::traits::OutputHook;
use hooksett_core::types::{TrackedValue, TypeHint};

/// Tracing target of every event emitted by [`TracedOutput`].
pub const TRACED_TARGET: &str = "hooksett::traced";

/// Output hook emitting one `info` event per saved value.
#[derive(Debug, Clone)]
pub struct TracedOutput {
    channel: String,
}

impl TracedOutput {
    /// Creates the hook with the given channel label.
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }

    /// Returns the channel label.
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl Default for TracedOutput {
    fn default() -> Self {
        Self::new("traced")
    }
}

impl OutputHook for TracedOutput {
    fn id(&self) -> &str {
        "traced"
    }

    fn save(&self, name: &str, value: &TrackedValue, hint: &TypeHint) -> Result<(), HookError> {
        info!(
            target: TRACED_TARGET,
            channel = %self.channel,
            name = %name,
            kind = %hint.kind(),
            value = %value,
            "Variable '{}' of type '{}' updated to {}",
            name,
            hint.kind(),
            value
        );
        Ok(())
    }
}
