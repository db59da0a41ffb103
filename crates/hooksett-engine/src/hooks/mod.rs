//! Hook system: registry, dispatcher, and resolution definitions.

pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::{Declaration, Provenance, Resolution};
pub use dispatcher::HookDispatcher;
pub use registry::HookRegistry;
