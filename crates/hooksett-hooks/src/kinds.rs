//! Tag kinds used by experiment tracking.

use hooksett_engine::manager::{HookManager, register_tracked_type};
use hooksett_engine::registry::TagKind;

/// Run configuration values.
pub const PARAMETER: &str = "Parameter";
/// Numeric run measurements.
pub const METRIC: &str = "Metric";
/// Files or other outputs a run produces.
pub const ARTIFACT: &str = "Artifact";

fn ml_kinds() -> [TagKind; 3] {
    [
        TagKind::new(PARAMETER).with_description("Run parameter"),
        TagKind::new(METRIC).with_description("Run metric"),
        TagKind::new(ARTIFACT).with_description("Run artifact"),
    ]
}

/// Registers `Parameter`, `Metric`, and `Artifact` on the process-wide manager.
pub fn register_ml_kinds() {
    for tag in ml_kinds() {
        register_tracked_type(tag.name().to_string(), tag);
    }
}

/// Registers `Parameter`, `Metric`, and `Artifact` on `manager`.
pub fn register_ml_kinds_on(manager: &HookManager) {
    for tag in ml_kinds() {
        manager.register_tracked_type(tag.name().to_string(), tag);
    }
}
