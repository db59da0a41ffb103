//! Hook manager: the engine's single entry point, plus the process-wide
//! instance used by declarations that are not bound to a specific manager.
//!
//! The process-wide manager has an explicit lifecycle: [`initialize`]
//! creates it, [`reset`] empties its hook lists and restores the built-in
//! type kinds. Hook registration is expected to finish at startup; the
//! engine adds no ordering guarantees for registrations racing with
//! resolution on other threads.

use std::sync::{Arc, OnceLock};

use tracing::{debug, info};

use hooksett_core::result::TrackResult;
use hooksett_core::traits::{InputHook, OutputHook};
use hooksett_core::types::{TrackedValue, TypeHint};

use crate::hooks::definitions::Resolution;
use crate::hooks::dispatcher::HookDispatcher;
use crate::hooks::registry::HookRegistry;
use crate::registry::{TagKind, TypeRegistry};

/// Coordinates the type registry, the hook lists, and the dispatcher.
#[derive(Debug)]
pub struct HookManager {
    /// Hook registry.
    hook_registry: Arc<HookRegistry>,
    /// Hook dispatcher.
    dispatcher: HookDispatcher,
    /// Tag kinds recognized by declarations bound to this manager.
    types: TypeRegistry,
}

impl HookManager {
    /// Creates an isolated manager with no hooks and the built-in kinds.
    pub fn new() -> Self {
        let hook_registry = Arc::new(HookRegistry::new());
        let dispatcher = HookDispatcher::new(hook_registry.clone());

        Self {
            hook_registry,
            dispatcher,
            types: TypeRegistry::new(),
        }
    }

    /// Appends an input hook.
    pub fn add_input_hook(&self, hook: Arc<dyn InputHook>) {
        self.hook_registry.add_input(hook);
    }

    /// Appends an output hook.
    pub fn add_output_hook(&self, hook: Arc<dyn OutputHook>) {
        self.hook_registry.add_output(hook);
    }

    /// Registers a tag kind on this manager's type registry.
    pub fn register_tracked_type(&self, kind_name: impl Into<String>, tag: TagKind) {
        self.types.register(kind_name, tag);
    }

    /// Resolves and validates the initial value for a declaration.
    pub fn resolve(
        &self,
        name: &str,
        hint: &TypeHint,
        default: Option<&TrackedValue>,
    ) -> TrackResult<Resolution> {
        self.dispatcher.resolve(name, hint, default)
    }

    /// Validates a caller-supplied value.
    pub fn validate_value(&self, name: &str, value: &TrackedValue, hint: &TypeHint) -> TrackResult<()> {
        self.dispatcher.validate(name, value, hint)
    }

    /// Validates a caller-supplied value and marks it explicit.
    pub fn accept_explicit(
        &self,
        name: &str,
        value: TrackedValue,
        hint: &TypeHint,
    ) -> TrackResult<Resolution> {
        self.dispatcher.accept_explicit(name, value, hint)
    }

    /// Broadcasts a value to every output hook.
    pub fn dispatch(&self, name: &str, value: &TrackedValue, hint: &TypeHint) -> TrackResult<()> {
        self.dispatcher.dispatch(name, value, hint)
    }

    /// Returns the type registry.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Returns the hook dispatcher.
    pub fn dispatcher(&self) -> &HookDispatcher {
        &self.dispatcher
    }

    /// Returns the hook registry.
    pub fn hook_registry(&self) -> &Arc<HookRegistry> {
        &self.hook_registry
    }

    /// Returns input hook ids in registration order.
    pub fn input_hook_ids(&self) -> Vec<String> {
        self.hook_registry.input_ids()
    }

    /// Returns output hook ids in registration order.
    pub fn output_hook_ids(&self) -> Vec<String> {
        self.hook_registry.output_ids()
    }

    /// Returns the number of input hooks.
    pub fn input_hook_count(&self) -> usize {
        self.hook_registry.input_count()
    }

    /// Returns the number of output hooks.
    pub fn output_hook_count(&self) -> usize {
        self.hook_registry.output_count()
    }

    /// Clears all hooks and custom kinds.
    pub fn reset(&self) {
        self.hook_registry.clear();
        self.types.reset();
    }
}

impl Default for HookManager {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: OnceLock<Arc<HookManager>> = OnceLock::new();

/// Creates the process-wide manager if it does not exist yet.
///
/// Idempotent; returns the process-wide manager.
pub fn initialize() -> Arc<HookManager> {
    GLOBAL
        .get_or_init(|| {
            info!("Process-wide hook manager initialized");
            Arc::new(HookManager::new())
        })
        .clone()
}

/// Returns the process-wide manager.
///
/// Initializes it on first use when `initialize` was never called.
pub fn hook_manager() -> Arc<HookManager> {
    if let Some(manager) = GLOBAL.get() {
        return manager.clone();
    }
    debug!("Hook manager requested before initialize(), initializing now");
    initialize()
}

/// Clears the process-wide manager's hooks and custom kinds.
///
/// Declarations already bound to the manager stay bound; they see the
/// emptied hook lists. Tracked-ness of already built declarations is fixed
/// at build time and is not recomputed.
pub fn reset() {
    if let Some(manager) = GLOBAL.get() {
        manager.reset();
        info!("Process-wide hook manager reset");
    }
}

/// Registers a tag kind on the process-wide manager.
pub fn register_tracked_type(kind_name: impl Into<String>, tag: TagKind) {
    hook_manager().register_tracked_type(kind_name, tag);
}
