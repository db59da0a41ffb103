//! Integration tests for the process-wide manager lifecycle.

mod helpers;

use std::sync::Arc;

use serde_json::json;

use helpers::{SpyInput, global};
use hooksett_engine::prelude::*;
use hooksett_hooks::{METRIC, RecordingOutput, register_ml_kinds};

#[test]
fn test_initialize_is_idempotent() {
    let (_guard, manager) = global();
    assert!(Arc::ptr_eq(&manager, &initialize()));
    assert!(Arc::ptr_eq(&manager, &hook_manager()));
}

#[test]
fn test_reset_clears_hooks_between_cases() {
    let (_guard, manager) = global();
    manager.add_input_hook(Arc::new(SpyInput::new("spy", &[])));
    manager.add_output_hook(Arc::new(RecordingOutput::new()));
    register_ml_kinds();
    assert!(manager.types().is_tracked(METRIC));

    reset();

    assert_eq!(manager.input_hook_count(), 0);
    assert_eq!(manager.output_hook_count(), 0);
    assert!(!manager.types().is_tracked(METRIC));
    assert!(manager.types().is_tracked(TRACED));
}

#[test]
fn test_kind_must_be_registered_before_build() {
    let (_guard, manager) = global();
    let recorder = Arc::new(RecordingOutput::new());
    manager.add_output_hook(recorder.clone());

    let early = TrackedClass::builder("Early")
        .attribute_with_default("loss", METRIC, 1.0f64)
        .build()
        .expect("build");
    register_ml_kinds();
    let late = TrackedClass::builder("Late")
        .attribute_with_default("loss", METRIC, 1.0f64)
        .build()
        .expect("build");

    assert!(!early.is_tracked("loss"));
    assert!(late.is_tracked("loss"));

    early.instantiate().set("loss", 0.5).expect("write");
    late.instantiate().set("loss", 0.25).expect("write");
    assert_eq!(recorder.saved(), vec![("loss".to_string(), json!(0.25))]);
}

#[test]
fn test_global_function_tracking() {
    let (_guard, manager) = global();
    let recorder = Arc::new(RecordingOutput::new());
    manager.add_input_hook(Arc::new(SpyInput::new("cfg", &[("momentum", json!(0.9))])));
    manager.add_output_hook(recorder.clone());

    let step = track_function(
        Signature::new("step").param::<f64>("momentum", TRACED),
        |frame: &mut CallFrame| -> TrackResult<f64> { frame.param("momentum") },
    )
    .expect("wrap");

    assert_eq!(step.call_default().expect("call"), 0.9);
    assert_eq!(recorder.values_of("momentum"), vec![json!(0.9)]);
}

#[test]
fn test_standalone_scope_uses_global_manager() {
    let (_guard, manager) = global();
    let recorder = Arc::new(RecordingOutput::new());
    manager.add_output_hook(recorder.clone());

    {
        let mut scope = LocalScope::new("block");
        let total = scope.declare::<u64>("total", TRACED);
        scope.bind(total, 10).expect("bind");
        scope.bind(total, 20).expect("bind");
    }

    assert_eq!(recorder.saved(), vec![("total".to_string(), json!(20))]);
}
