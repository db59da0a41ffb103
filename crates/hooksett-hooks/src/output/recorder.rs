//! In-memory record of every saved value.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hooksett_core::error::HookError;
use hooksett_core::traits::OutputHook;
use hooksett_core::types::{TrackedValue, TypeHint};

/// One saved value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    /// Tracked name.
    pub name: String,
    /// Tag kind of the declaration.
    pub kind: String,
    /// Saved value.
    pub value: TrackedValue,
    /// When the save happened.
    pub recorded_at: DateTime<Utc>,
}

/// Output hook appending every save to an in-memory list.
#[derive(Debug, Default)]
pub struct RecordingOutput {
    records: Mutex<Vec<SaveRecord>>,
}

impl RecordingOutput {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record, in save order.
    pub fn records(&self) -> Vec<SaveRecord> {
        self.lock().clone()
    }

    /// Returns the saved `(name, value)` pairs, in save order.
    pub fn saved(&self) -> Vec<(String, TrackedValue)> {
        self.lock()
            .iter()
            .map(|r| (r.name.clone(), r.value.clone()))
            .collect()
    }

    /// Returns every value saved under `name`, in save order.
    pub fn values_of(&self, name: &str) -> Vec<TrackedValue> {
        self.lock()
            .iter()
            .filter(|r| r.name == name)
            .map(|r| r.value.clone())
            .collect()
    }

    /// Returns the number of saves.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether nothing was saved.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every record.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SaveRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutputHook for RecordingOutput {
    fn id(&self) -> &str {
        "recorder"
    }

    fn save(&self, name: &str, value: &TrackedValue, hint: &TypeHint) -> Result<(), HookError> {
        self.lock().push(SaveRecord {
            name: name.to_string(),
            kind: hint.kind().to_string(),
            value: value.clone(),
            recorded_at: Utc::now(),
        });
        Ok(())
    }
}
