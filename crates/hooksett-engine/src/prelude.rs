//! Prelude for convenient imports.

pub use hooksett_core::error::HookError;
pub use hooksett_core::result::TrackResult;
pub use hooksett_core::traits::{InputHook, OutputHook, Verdict};
pub use hooksett_core::types::{Payload, PayloadShape, TrackedValue, TypeHint};

pub use crate::hooks::definitions::{Declaration, Provenance, Resolution};
pub use crate::manager::{HookManager, hook_manager, initialize, register_tracked_type, reset};
pub use crate::registry::{TRACED, TagKind};
pub use crate::tracking::{
    Args, CallFrame, Field, LocalScope, LocalVar, Signature, TrackedClass, TrackedInstance,
    track_function, track_function_with,
};

pub use crate::args;
