//! Payload shape validation.

use hooksett_core::traits::{InputHook, Verdict};
use hooksett_core::types::{PayloadShape, TrackedValue, TypeHint};

/// Rejects values whose JSON shape does not fit the declared payload.
///
/// Never supplies values. Integers pass for float payloads; `null` passes
/// only for nullable payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeValidationHook;

impl TypeValidationHook {
    /// Creates the hook.
    pub fn new() -> Self {
        Self
    }
}

impl InputHook for TypeValidationHook {
    fn id(&self) -> &str {
        "type-check"
    }

    fn get(
        &self,
        _name: &str,
        _hint: &TypeHint,
        _default: Option<&TrackedValue>,
    ) -> Option<TrackedValue> {
        None
    }

    fn validate(&self, name: &str, value: &TrackedValue, hint: &TypeHint) -> Verdict {
        if hint.accepts(value) {
            return Verdict::Accept;
        }

        let got = if value.is_null() {
            "null"
        } else {
            PayloadShape::of_value(value).as_str()
        };
        Verdict::reject(format!(
            "{name} must be of type {} ({}), got {got}",
            hint.type_name(),
            hint.shape()
        ))
    }
}
