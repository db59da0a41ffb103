//! Inclusive numeric bounds per tracked name.

use std::collections::BTreeMap;

use tracing::debug;

use hooksett_core::config::hooks::RangeRule;
use hooksett_core::traits::{InputHook, Verdict};
use hooksett_core::types::{TrackedValue, TypeHint};

/// Rejects numbers outside the bounds configured for their name.
///
/// Never supplies values. Names without bounds always pass.
#[derive(Debug, Clone, Default)]
pub struct RangeValidationHook {
    ranges: BTreeMap<String, RangeRule>,
}

impl RangeValidationHook {
    /// Creates a hook with no bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a hook from configured rules.
    pub fn from_rules(ranges: BTreeMap<String, RangeRule>) -> Self {
        Self { ranges }
    }

    /// Adds inclusive bounds for `name`.
    pub fn with_range(mut self, name: impl Into<String>, min: f64, max: f64) -> Self {
        self.ranges.insert(name.into(), RangeRule { min, max });
        self
    }

    /// Returns the bounds configured for `name`.
    pub fn range(&self, name: &str) -> Option<&RangeRule> {
        self.ranges.get(name)
    }
}

impl InputHook for RangeValidationHook {
    fn id(&self) -> &str {
        "range"
    }

    fn get(
        &self,
        _name: &str,
        _hint: &TypeHint,
        _default: Option<&TrackedValue>,
    ) -> Option<TrackedValue> {
        None
    }

    fn validate(&self, name: &str, value: &TrackedValue, _hint: &TypeHint) -> Verdict {
        let Some(rule) = self.ranges.get(name) else {
            return Verdict::Accept;
        };

        match value.as_f64() {
            Some(v) if rule.min <= v && v <= rule.max => {
                debug!(name = %name, value = v, "Range check passed");
                Verdict::Accept
            }
            Some(v) => Verdict::reject(format!(
                "{name} value {v} must be between {} and {}",
                rule.min, rule.max
            )),
            None => Verdict::reject(format!("{name} has range bounds but {value} is not a number")),
        }
    }
}
