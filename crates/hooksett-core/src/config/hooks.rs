//! Hook installation configuration.
//!
//! Describes which concrete hooks the driver binary installs and how they
//! are parameterized. The engine itself never reads this; it only sees the
//! hooks that were registered.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Which hooks to install at startup.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct HooksConfig {
    /// File supplying initial values (YAML, TOML, or JSON).
    pub values_file: Option<String>,
    /// Whether to install the payload shape validator.
    pub type_check: bool,
    /// Inclusive numeric bounds per tracked name.
    pub ranges: BTreeMap<String, RangeRule>,
    /// Output sinks.
    #[validate(nested)]
    pub outputs: OutputsConfig,
}

/// Inclusive numeric bounds for one tracked name.
#[derive(Debug, Clone, Copy, PartialEq, Validate, Serialize, Deserialize)]
#[validate(schema(function = "validate_bounds"))]
pub struct RangeRule {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

/// Output hooks to install.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputsConfig {
    /// Emit a tracing event per saved value.
    pub traced: bool,
    /// Channel label attached to every traced event.
    #[validate(length(min = 1))]
    pub traced_channel: String,
    /// Record parameters, metrics, and artifacts experiment-tracker style.
    pub experiment: bool,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            values_file: None,
            type_check: true,
            ranges: BTreeMap::new(),
            outputs: OutputsConfig::default(),
        }
    }
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            traced: true,
            traced_channel: default_traced_channel(),
            experiment: false,
        }
    }
}

impl HooksConfig {
    /// Validates this section, including every range rule.
    pub fn check(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        for rule in self.ranges.values() {
            rule.validate()?;
        }
        Ok(())
    }
}

fn validate_bounds(rule: &RangeRule) -> Result<(), ValidationError> {
    if rule.min.is_nan() || rule.max.is_nan() || rule.min > rule.max {
        return Err(ValidationError::new("range_bounds"));
    }
    Ok(())
}

fn default_traced_channel() -> String {
    "traced".to_string()
}
