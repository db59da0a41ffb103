//! # hooksett-engine
//!
//! Hook dispatch and value tracking for Hooksett. Provides:
//!
//! - A type registry of tag kinds (`Traced`, `Parameter`, ...) that mark
//!   declarations as tracked
//! - An ordered input/output hook registry with first-match resolution,
//!   an all-hooks validation pass, and broadcast dispatch
//! - A process-wide hook manager with an explicit `initialize`/`reset`
//!   lifecycle
//! - Interception for class attributes (managed fields), function
//!   parameters (tracked functions), and locals captured at scope exit

pub mod hooks;
pub mod macros;
pub mod manager;
pub mod prelude;
pub mod registry;
pub mod tracking;

pub use hooks::definitions::{Declaration, Provenance, Resolution};
pub use hooks::dispatcher::HookDispatcher;
pub use hooks::registry::HookRegistry;
pub use manager::{HookManager, hook_manager, initialize, register_tracked_type, reset};
pub use registry::{TRACED, TagKind, TypeRegistry};
pub use tracking::{
    Args, CallFrame, Field, FieldDescriptor, FieldSlot, LocalScope, LocalVar, ManagedField, Param,
    Signature, TrackedClass, TrackedClassBuilder, TrackedFn, TrackedInstance, track_function,
    track_function_with,
};
