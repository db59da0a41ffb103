//! Declarations and resolution results.

use std::fmt;

use serde::Serialize;

use hooksett_core::error::HookError;
use hooksett_core::types::{Payload, TrackedValue, TypeHint};

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Supplied by the input hook with this id.
    Hook(String),
    /// Taken from the declaration's default.
    Default,
    /// Given explicitly by the caller (argument or attribute write).
    Explicit,
}

impl Provenance {
    /// Returns the supplying hook's id, if a hook supplied the value.
    pub fn hook_id(&self) -> Option<&str> {
        match self {
            Self::Hook(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hook(id) => write!(f, "hook:{id}"),
            Self::Default => write!(f, "default"),
            Self::Explicit => write!(f, "explicit"),
        }
    }
}

/// A resolved value plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The resolved, validated value.
    pub value: TrackedValue,
    /// Where the value came from.
    pub provenance: Provenance,
}

/// A declared name with its type hint and optional default.
///
/// Built once when a class or function is defined; immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Declared name.
    name: String,
    /// Tag kind and payload type.
    hint: TypeHint,
    /// Source-level default.
    default: Option<TrackedValue>,
}

impl Declaration {
    /// Declares `name` with payload type `T` under `kind`, without default.
    pub fn new<T: Payload>(name: impl Into<String>, kind: &str) -> Self {
        Self {
            name: name.into(),
            hint: TypeHint::of::<T>(kind),
            default: None,
        }
    }

    /// Declares `name` with payload type `T` under `kind` and a default.
    pub fn with_default<T: Payload>(
        name: impl Into<String>,
        kind: &str,
        default: T,
    ) -> Result<Self, HookError> {
        let name = name.into();
        let default = to_tracked(&name, &default)?;
        Ok(Self {
            hint: TypeHint::of::<T>(kind),
            name,
            default: Some(default),
        })
    }

    /// Declares `name` from an existing hint and raw default.
    pub fn from_parts(
        name: impl Into<String>,
        hint: TypeHint,
        default: Option<TrackedValue>,
    ) -> Self {
        Self {
            name: name.into(),
            hint,
            default,
        }
    }

    /// Returns the declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type hint.
    pub fn hint(&self) -> &TypeHint {
        &self.hint
    }

    /// Returns the tag kind name.
    pub fn kind(&self) -> &str {
        self.hint.kind()
    }

    /// Returns the default, if declared.
    pub fn default_value(&self) -> Option<&TrackedValue> {
        self.default.as_ref()
    }

    /// Fails unless a handle of payload type `T` fits this declaration.
    pub fn check_payload<T: Payload>(&self) -> Result<(), HookError> {
        if self.hint.admits::<T>() {
            Ok(())
        } else {
            let requested = TypeHint::of::<T>(self.kind()).type_name();
            Err(HookError::mismatch(&self.name, &self.hint, requested))
        }
    }
}

/// Serializes a typed value for the slot called `name`.
pub(crate) fn to_tracked<T: Serialize>(name: &str, value: &T) -> Result<TrackedValue, HookError> {
    serde_json::to_value(value).map_err(|e| HookError::conversion(name, e))
}

/// Deserializes a slot's value into its payload type.
pub(crate) fn from_tracked<T: Payload>(name: &str, value: TrackedValue) -> Result<T, HookError> {
    serde_json::from_value(value).map_err(|e| HookError::conversion(name, e))
}
