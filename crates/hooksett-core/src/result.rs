//! Convenience result type alias for Hooksett.

use crate::error::HookError;

/// A specialized `Result` type for resolution, validation, and dispatch.
///
/// This is defined as a convenience so that every crate does not need to
/// write `Result<T, HookError>` explicitly.
pub type TrackResult<T> = Result<T, HookError>;
