//! Core type definitions used across the Hooksett workspace.

pub mod hint;
pub mod id;

pub use hint::{Payload, PayloadShape, TrackedValue, TypeHint};
pub use id::*;
