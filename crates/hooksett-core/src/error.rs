//! Unified error types for Hooksett.
//!
//! Resolution and validation failures surface synchronously at the
//! declaration site that triggered them (attribute read, attribute write,
//! or tracked call). Output hook failures are never swallowed by the engine:
//! they propagate to whoever triggered the dispatch.

use std::fmt;

use thiserror::Error;

/// Error kind categorization used across the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No input hook supplied a value and no default exists.
    Unresolved,
    /// An input hook rejected a value.
    Validation,
    /// An output hook failed while persisting a value.
    Output,
    /// A value could not be converted to or from its payload type.
    Conversion,
    /// A declaration was used incorrectly at its call site.
    Declaration,
    /// A configuration error occurred.
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved => write!(f, "UNRESOLVED"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Output => write!(f, "OUTPUT"),
            Self::Conversion => write!(f, "CONVERSION"),
            Self::Declaration => write!(f, "DECLARATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
        }
    }
}

/// Error type for every resolution, validation, and dispatch operation.
#[derive(Debug, Error)]
pub enum HookError {
    /// No input hook reported a value and the declaration has no default.
    #[error("No value found for required '{name}': no input hook supplied one and no default exists")]
    UnresolvedRequiredValue {
        /// Declared name.
        name: String,
    },

    /// An input hook's validation rejected a value.
    #[error("Value for '{name}' rejected by hook '{hook}': {reason}")]
    ValidationRejected {
        /// Declared name.
        name: String,
        /// Identifier of the rejecting hook.
        hook: String,
        /// Reason reported by the hook.
        reason: String,
    },

    /// An output hook failed to persist a value.
    #[error("Output hook '{hook}' failed to save '{name}': {reason}")]
    OutputFailed {
        /// Declared name.
        name: String,
        /// Identifier of the failing hook.
        hook: String,
        /// Failure description.
        reason: String,
    },

    /// A value did not match the declared payload type.
    #[error("Value for '{name}' does not fit its declared type: {source}")]
    Conversion {
        /// Declared name.
        name: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// A typed handle does not fit the payload type a name was declared with.
    #[error("'{name}' is declared as {declared}, not {requested}")]
    PayloadMismatch {
        /// Declared name.
        name: String,
        /// Declared hint, e.g. `Traced[f64]`.
        declared: String,
        /// Payload type the handle asked for.
        requested: &'static str,
    },

    /// An untracked attribute was read before it was ever assigned.
    #[error("Attribute '{name}' has no value and no default")]
    AttributeUnset {
        /// Attribute name.
        name: String,
    },

    /// A class does not declare the requested attribute.
    #[error("'{owner}' declares no attribute named '{name}'")]
    UnknownAttribute {
        /// Class name.
        owner: String,
        /// Attribute name.
        name: String,
    },

    /// A call passed an argument the signature does not declare.
    #[error("'{function}' got an unexpected argument '{name}'")]
    UnknownArgument {
        /// Function name.
        function: String,
        /// Argument name.
        name: String,
    },

    /// An untracked parameter without a default was omitted.
    #[error("'{function}' is missing required argument '{name}'")]
    MissingArgument {
        /// Function name.
        function: String,
        /// Parameter name.
        name: String,
    },

    /// A body referenced a local that was never declared on its signature.
    #[error("'{scope}' declares no local named '{name}'")]
    UndeclaredLocal {
        /// Function or scope name.
        scope: String,
        /// Local name.
        name: String,
    },

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl HookError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnresolvedRequiredValue { .. } => ErrorKind::Unresolved,
            Self::ValidationRejected { .. } => ErrorKind::Validation,
            Self::OutputFailed { .. } => ErrorKind::Output,
            Self::Conversion { .. } | Self::PayloadMismatch { .. } => ErrorKind::Conversion,
            Self::AttributeUnset { .. }
            | Self::UnknownAttribute { .. }
            | Self::UnknownArgument { .. }
            | Self::MissingArgument { .. }
            | Self::UndeclaredLocal { .. } => ErrorKind::Declaration,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Create an unresolved-required-value error.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::UnresolvedRequiredValue { name: name.into() }
    }

    /// Create a validation rejection naming the hook and its reason.
    pub fn rejected(
        name: impl Into<String>,
        hook: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ValidationRejected {
            name: name.into(),
            hook: hook.into(),
            reason: reason.into(),
        }
    }

    /// Create an output failure, typically from inside `OutputHook::save`.
    pub fn output(
        name: impl Into<String>,
        hook: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::OutputFailed {
            name: name.into(),
            hook: hook.into(),
            reason: reason.into(),
        }
    }

    /// Create a conversion error for a named slot.
    pub fn conversion(name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Conversion {
            name: name.into(),
            source,
        }
    }

    /// Create a payload mismatch for a typed handle.
    pub fn mismatch(
        name: impl Into<String>,
        declared: impl fmt::Display,
        requested: &'static str,
    ) -> Self {
        Self::PayloadMismatch {
            name: name.into(),
            declared: declared.to_string(),
            requested,
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

impl From<serde_json::Error> for HookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Conversion {
            name: "<unnamed>".to_string(),
            source: err,
        }
    }
}

impl From<config::ConfigError> for HookError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<validator::ValidationErrors> for HookError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Configuration(format!("invalid configuration: {err}"))
    }
}
