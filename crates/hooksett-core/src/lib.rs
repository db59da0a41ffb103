//! # hooksett-core
//!
//! Core crate for Hooksett. Contains the input/output hook contracts,
//! type hints describing tracked declarations, configuration schemas,
//! typed identifiers, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Hooksett crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{ErrorKind, HookError};
pub use result::TrackResult;
pub use traits::{InputHook, OutputHook, Verdict};
pub use types::{Payload, PayloadShape, TrackedValue, TypeHint};
