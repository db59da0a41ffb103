//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hooksett_core::error::HookError;
use hooksett_core::traits::{InputHook, Verdict};
use hooksett_core::types::{TrackedValue, TypeHint};
use hooksett_engine::manager::HookManager;
use hooksett_hooks::RecordingOutput;

static GLOBAL_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests touching the process-wide manager and resets it.
pub fn global() -> (MutexGuard<'static, ()>, Arc<HookManager>) {
    let guard = GLOBAL_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let manager = hooksett_engine::initialize();
    hooksett_engine::reset();
    (guard, manager)
}

/// Isolated manager with a recording output installed.
pub fn isolated() -> (Arc<HookManager>, Arc<RecordingOutput>) {
    let manager = Arc::new(HookManager::new());
    let recorder = Arc::new(RecordingOutput::new());
    manager.add_output_hook(recorder.clone());
    (manager, recorder)
}

/// Input hook that records every call it receives.
#[derive(Debug, Default)]
pub struct SpyInput {
    pub id: &'static str,
    pub values: HashMap<String, TrackedValue>,
    pub gets: Mutex<Vec<String>>,
    pub validations: Mutex<Vec<(String, TrackedValue)>>,
}

impl SpyInput {
    pub fn new(id: &'static str, values: &[(&str, TrackedValue)]) -> Self {
        Self {
            id,
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn gets(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }

    pub fn validations(&self) -> Vec<(String, TrackedValue)> {
        self.validations.lock().unwrap().clone()
    }
}

impl InputHook for SpyInput {
    fn id(&self) -> &str {
        self.id
    }

    fn get(
        &self,
        name: &str,
        _hint: &TypeHint,
        _default: Option<&TrackedValue>,
    ) -> Option<TrackedValue> {
        self.gets.lock().unwrap().push(name.to_string());
        self.values.get(name).cloned()
    }

    fn validate(&self, name: &str, value: &TrackedValue, _hint: &TypeHint) -> Verdict {
        self.validations
            .lock()
            .unwrap()
            .push((name.to_string(), value.clone()));
        Verdict::Accept
    }
}

/// Output hook that always fails.
#[derive(Debug)]
pub struct FailingOutput;

impl hooksett_core::traits::OutputHook for FailingOutput {
    fn id(&self) -> &str {
        "failing"
    }

    fn save(&self, name: &str, _value: &TrackedValue, _hint: &TypeHint) -> Result<(), HookError> {
        Err(HookError::output(name, "failing", "backend unavailable"))
    }
}
