//! Interception layer: class attributes, function parameters, and locals.

pub mod field;
pub mod function;
pub mod local;

pub use field::{
    Field, FieldDescriptor, FieldSlot, ManagedField, TrackedClass, TrackedClassBuilder,
    TrackedInstance,
};
pub use function::{Args, CallFrame, Param, Signature, TrackedFn, track_function, track_function_with};
pub use local::{LocalScope, LocalVar};
