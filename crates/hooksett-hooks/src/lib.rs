//! # hooksett-hooks
//!
//! Ready-made hooks for the Hooksett engine:
//!
//! - [`ConfigFileInput`] supplies initial values from a YAML, TOML, or JSON file
//! - [`RangeValidationHook`] and [`TypeValidationHook`] validate values
//!   without supplying any
//! - [`TracedOutput`] logs every saved value through `tracing`
//! - [`RecordingOutput`] keeps saved values in memory
//! - [`ExperimentOutput`] records parameters, metrics, and artifacts the way
//!   an experiment tracker would
//!
//! [`install`] wires them onto a manager from a [`HooksConfig`](hooksett_core::config::hooks::HooksConfig).

pub mod input;
pub mod kinds;
pub mod output;
pub mod setup;

pub use input::config_file::ConfigFileInput;
pub use input::range::RangeValidationHook;
pub use input::type_check::TypeValidationHook;
pub use kinds::{ARTIFACT, METRIC, PARAMETER, register_ml_kinds, register_ml_kinds_on};
pub use output::experiment::{ExperimentOutput, ExperimentRecord};
pub use output::recorder::{RecordingOutput, SaveRecord};
pub use output::traced::TracedOutput;
pub use setup::{InstalledHooks, install};
