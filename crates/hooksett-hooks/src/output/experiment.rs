//! Experiment-tracker style output.
//!
//! Declarations tagged `Parameter` become logged params, `Metric` becomes
//! logged metrics, and `Artifact` becomes logged artifacts. Other kinds are
//! ignored.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::info;

use hooksett_core::error::HookError;
use hooksett_core::traits::OutputHook;
use hooksett_core::types::{TrackedValue, TypeHint};

use crate::kinds::{ARTIFACT, METRIC, PARAMETER};

/// One logged experiment entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExperimentRecord {
    /// A run parameter.
    Param { name: String, value: TrackedValue },
    /// A numeric run metric.
    Metric { name: String, value: f64 },
    /// A produced artifact.
    Artifact { name: String, value: TrackedValue },
}

impl ExperimentRecord {
    /// Returns the logged name.
    pub fn name(&self) -> &str {
        match self {
            Self::Param { name, .. } | Self::Metric { name, .. } | Self::Artifact { name, .. } => {
                name
            }
        }
    }
}

/// Output hook logging params, metrics, and artifacts of one run.
#[derive(Debug, Default)]
pub struct ExperimentOutput {
    run_name: String,
    records: Mutex<Vec<ExperimentRecord>>,
}

impl ExperimentOutput {
    /// Creates the hook for a named run.
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            run_name: run_name.into(),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Returns the run name.
    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// Returns every logged entry, in order.
    pub fn records(&self) -> Vec<ExperimentRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, record: ExperimentRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

impl OutputHook for ExperimentOutput {
    fn id(&self) -> &str {
        "experiment"
    }

    fn save(&self, name: &str, value: &TrackedValue, hint: &TypeHint) -> Result<(), HookError> {
        let record = match hint.kind() {
            PARAMETER => ExperimentRecord::Param {
                name: name.to_string(),
                value: value.clone(),
            },
            METRIC => {
                let Some(metric) = value.as_f64() else {
                    return Err(HookError::output(
                        name,
                        self.id(),
                        format!("metric value {value} is not a number"),
                    ));
                };
                ExperimentRecord::Metric {
                    name: name.to_string(),
                    value: metric,
                }
            }
            ARTIFACT => ExperimentRecord::Artifact {
                name: name.to_string(),
                value: value.clone(),
            },
            _ => return Ok(()),
        };

        info!(run = %self.run_name, record = ?record, "Experiment entry logged");
        self.push(record);
        Ok(())
    }
}
