//! Input and output hook contracts.
//!
//! An [`InputHook`] is a source of initial values plus a validation
//! capability; an [`OutputHook`] is a sink for final values. Concrete
//! implementations (file loaders, validators, loggers, experiment trackers)
//! live outside the engine and only need to satisfy these traits.

use std::fmt;

use crate::error::HookError;
use crate::types::{TrackedValue, TypeHint};

/// Outcome of an input hook's validation of a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The value is acceptable to this hook.
    Accept,
    /// The value is rejected; resolution aborts.
    Reject {
        /// Human-readable reason.
        reason: String,
    },
}

impl Verdict {
    /// Shorthand for `Reject { reason }`.
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Reject {
            reason: reason.into(),
        }
    }

    /// Returns `true` for `Accept`.
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// A pluggable source of initial values for tracked names.
///
/// Hooks run synchronously on the thread that touched the declaration.
/// A hook that blocks blocks that declaration site.
pub trait InputHook: Send + Sync + fmt::Debug {
    /// Identifier used in provenance, rejection errors, and logs.
    fn id(&self) -> &str;

    /// Looks up a value for `name`.
    ///
    /// Returns `None` when this hook has nothing for the name, letting the
    /// next hook try. `Some(Value::Null)` is a found value.
    fn get(
        &self,
        name: &str,
        hint: &TypeHint,
        default: Option<&TrackedValue>,
    ) -> Option<TrackedValue>;

    /// Checks a resolved value, whichever source produced it.
    ///
    /// Default: accept everything.
    fn validate(&self, name: &str, value: &TrackedValue, hint: &TypeHint) -> Verdict {
        let _ = (name, value, hint);
        Verdict::Accept
    }
}

/// A pluggable sink persisting final values of tracked names.
pub trait OutputHook: Send + Sync + fmt::Debug {
    /// Identifier used in logs and failure reports.
    fn id(&self) -> &str;

    /// Persists a value.
    ///
    /// Expected data must not produce an error. An error returned here
    /// aborts the current dispatch pass and reaches the caller of the
    /// tracked operation.
    fn save(&self, name: &str, value: &TrackedValue, hint: &TypeHint) -> Result<(), HookError>;
}
