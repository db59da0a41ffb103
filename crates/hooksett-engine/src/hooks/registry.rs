//! Hook registry: ordered input and output hook lists.
//!
//! Order is registration order; there is no priority and no
//! deduplication. Registration is append-only and is expected to happen
//! at startup. Readers take a snapshot of the list so no lock is held
//! while a hook runs.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use hooksett_core::traits::{InputHook, OutputHook};

/// Registry of input and output hooks in registration order.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// Input hooks, consulted first-to-last.
    input: RwLock<Vec<Arc<dyn InputHook>>>,
    /// Output hooks, invoked first-to-last.
    output: RwLock<Vec<Arc<dyn OutputHook>>>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an input hook.
    pub fn add_input(&self, hook: Arc<dyn InputHook>) {
        let mut hooks = self.input.write().unwrap_or_else(PoisonError::into_inner);
        let id = hook.id().to_string();
        hooks.push(hook);

        info!(hook = %id, position = hooks.len() - 1, "Input hook registered");
    }

    /// Appends an output hook.
    pub fn add_output(&self, hook: Arc<dyn OutputHook>) {
        let mut hooks = self.output.write().unwrap_or_else(PoisonError::into_inner);
        let id = hook.id().to_string();
        hooks.push(hook);

        info!(hook = %id, position = hooks.len() - 1, "Output hook registered");
    }

    /// Returns a snapshot of the input hooks, in order.
    pub fn input_hooks(&self) -> Vec<Arc<dyn InputHook>> {
        self.input
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns a snapshot of the output hooks, in order.
    pub fn output_hooks(&self) -> Vec<Arc<dyn OutputHook>> {
        self.output
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns input hook ids, in order.
    pub fn input_ids(&self) -> Vec<String> {
        let hooks = self.input.read().unwrap_or_else(PoisonError::into_inner);
        hooks.iter().map(|h| h.id().to_string()).collect()
    }

    /// Returns output hook ids, in order.
    pub fn output_ids(&self) -> Vec<String> {
        let hooks = self.output.read().unwrap_or_else(PoisonError::into_inner);
        hooks.iter().map(|h| h.id().to_string()).collect()
    }

    /// Returns the number of input hooks.
    pub fn input_count(&self) -> usize {
        self.input.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns the number of output hooks.
    pub fn output_count(&self) -> usize {
        self.output
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Removes every hook. Only meant for lifecycle resets between runs.
    pub fn clear(&self) {
        self.input
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.output
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        info!("All hooks cleared");
    }
}
