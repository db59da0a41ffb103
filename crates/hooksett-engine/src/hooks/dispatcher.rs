//! Hook dispatcher: resolution, validation, and output broadcast.
//!
//! Resolution:
//! - Input hooks are asked in registration order; the first that reports a
//!   value wins and later hooks are not asked.
//! - With no hook match, the declaration's default is used.
//! - With no default either, resolution fails with `UnresolvedRequiredValue`.
//!
//! Validation:
//! - Every resolved value, whatever its source, is shown to every input
//!   hook's `validate` in registration order.
//! - The first rejection aborts and names the rejecting hook.
//!
//! Dispatch:
//! - Every output hook's `save` runs in registration order. There is no
//!   short-circuit on success; a hook error aborts the pass and propagates.

use std::sync::Arc;

use tracing::{debug, error, warn};

use hooksett_core::error::HookError;
use hooksett_core::result::TrackResult;
use hooksett_core::traits::Verdict;
use hooksett_core::types::{TrackedValue, TypeHint};

use super::definitions::{Provenance, Resolution};
use super::registry::HookRegistry;

/// Runs the resolution and dispatch algorithms over a hook registry.
#[derive(Debug)]
pub struct HookDispatcher {
    /// Hook registry.
    registry: Arc<HookRegistry>,
}

impl HookDispatcher {
    /// Creates a new hook dispatcher.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Resolves the initial value for `name`, then validates it.
    pub fn resolve(
        &self,
        name: &str,
        hint: &TypeHint,
        default: Option<&TrackedValue>,
    ) -> TrackResult<Resolution> {
        let hooks = self.registry.input_hooks();

        let mut found = None;
        for hook in &hooks {
            if let Some(value) = hook.get(name, hint, default) {
                debug!(name = %name, hook = %hook.id(), "Value supplied by input hook");
                found = Some(Resolution {
                    value,
                    provenance: Provenance::Hook(hook.id().to_string()),
                });
                break;
            }
        }

        let resolution = match (found, default) {
            (Some(resolution), _) => resolution,
            (None, Some(default)) => {
                debug!(name = %name, "No input hook matched, using default");
                Resolution {
                    value: default.clone(),
                    provenance: Provenance::Default,
                }
            }
            (None, None) => {
                warn!(
                    name = %name,
                    hint = %hint,
                    input_hooks = hooks.len(),
                    "Required value unresolved"
                );
                return Err(HookError::unresolved(name));
            }
        };

        self.validate(name, &resolution.value, hint)?;
        Ok(resolution)
    }

    /// Validates an explicitly given value and marks it as explicit.
    pub fn accept_explicit(
        &self,
        name: &str,
        value: TrackedValue,
        hint: &TypeHint,
    ) -> TrackResult<Resolution> {
        self.validate(name, &value, hint)?;
        Ok(Resolution {
            value,
            provenance: Provenance::Explicit,
        })
    }

    /// Runs every input hook's validation over `value`.
    pub fn validate(&self, name: &str, value: &TrackedValue, hint: &TypeHint) -> TrackResult<()> {
        for hook in self.registry.input_hooks() {
            if let Verdict::Reject { reason } = hook.validate(name, value, hint) {
                warn!(
                    name = %name,
                    hook = %hook.id(),
                    reason = %reason,
                    "Value rejected by input hook"
                );
                return Err(HookError::rejected(name, hook.id(), reason));
            }
        }
        Ok(())
    }

    /// Broadcasts a value to every output hook.
    pub fn dispatch(&self, name: &str, value: &TrackedValue, hint: &TypeHint) -> TrackResult<()> {
        let hooks = self.registry.output_hooks();

        debug!(
            name = %name,
            hint = %hint,
            hook_count = hooks.len(),
            "Dispatching tracked value"
        );

        for hook in &hooks {
            if let Err(e) = hook.save(name, value, hint) {
                error!(
                    name = %name,
                    hook = %hook.id(),
                    error = %e,
                    "Output hook failed, aborting dispatch"
                );
                return Err(e);
            }
        }
        Ok(())
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}
