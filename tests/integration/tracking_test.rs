//! Integration tests for resolution, validation, and dispatch semantics.

mod helpers;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde_json::json;

use helpers::{FailingOutput, SpyInput, isolated};
use hooksett_core::error::HookError;
use hooksett_engine::prelude::*;
use hooksett_hooks::{RangeValidationHook, TypeValidationHook};

#[test]
fn test_batch_size_default_scenario() {
    let (manager, recorder) = isolated();
    let empty = Arc::new(SpyInput::new("empty", &[]));
    manager.add_input_hook(empty.clone());

    let train = track_function_with(
        &manager,
        Signature::new("train").param_with_default("batch_size", TRACED, 32u32),
        |frame: &mut CallFrame| -> TrackResult<u32> { frame.param("batch_size") },
    )
    .expect("wrap");

    assert_eq!(train.call_default().expect("call"), 32);
    assert_eq!(empty.validations(), vec![("batch_size".to_string(), json!(32))]);
    assert_eq!(recorder.saved(), vec![("batch_size".to_string(), json!(32))]);
}

#[test]
fn test_learning_rate_first_match_scenario() {
    let (manager, _) = isolated();
    let first = Arc::new(SpyInput::new("first", &[("learning_rate", json!(0.01))]));
    let second = Arc::new(SpyInput::new("second", &[("learning_rate", json!(0.02))]));
    manager.add_input_hook(first.clone());
    manager.add_input_hook(second.clone());

    let resolved = manager
        .resolve("learning_rate", &TypeHint::of::<f64>(TRACED), None)
        .expect("resolve");

    assert_eq!(resolved.value, json!(0.01));
    assert_eq!(resolved.provenance, Provenance::Hook("first".into()));
    assert!(second.gets().is_empty());
    assert_eq!(second.validations().len(), 1);
}

#[test]
fn test_unresolved_required_value() {
    let (manager, recorder) = isolated();
    manager.add_input_hook(Arc::new(SpyInput::new("empty", &[])));

    let class = TrackedClass::builder("Model")
        .attribute::<f64>("learning_rate", TRACED)
        .build_with(&manager)
        .expect("build");
    let err = class.instantiate().get::<f64>("learning_rate").unwrap_err();
    assert!(matches!(err, HookError::UnresolvedRequiredValue { .. }));

    let train = track_function_with(
        &manager,
        Signature::new("train").param::<f64>("learning_rate", TRACED),
        |_frame: &mut CallFrame| -> TrackResult<()> { Ok(()) },
    )
    .expect("wrap");
    let err = train.call_default().unwrap_err();
    assert!(matches!(err, HookError::UnresolvedRequiredValue { ref name } if name == "learning_rate"));
    assert!(recorder.is_empty());
}

#[test]
fn test_validation_runs_on_default() {
    let (manager, _) = isolated();
    manager.add_input_hook(Arc::new(RangeValidationHook::new().with_range("epochs", 1.0, 100.0)));

    let class = TrackedClass::builder("Model")
        .attribute_with_default("epochs", TRACED, 500u32)
        .build_with(&manager)
        .expect("build");

    match class.instantiate().get::<u32>("epochs") {
        Err(HookError::ValidationRejected { hook, .. }) => assert_eq!(hook, "range"),
        other => panic!("Expected ValidationRejected, got: {:?}", other),
    }
}

#[test]
fn test_type_check_rejects_supplied_value() {
    let (manager, _) = isolated();
    manager.add_input_hook(Arc::new(SpyInput::new("cfg", &[("batch_size", json!("large"))])));
    manager.add_input_hook(Arc::new(TypeValidationHook::new()));

    let err = manager
        .resolve("batch_size", &TypeHint::of::<u32>(TRACED), None)
        .unwrap_err();
    assert!(matches!(err, HookError::ValidationRejected { ref hook, .. } if hook == "type-check"));
}

#[test]
fn test_attribute_write_redispatches_unchanged_value() {
    let (manager, recorder) = isolated();
    let class = TrackedClass::builder("Run")
        .attribute_with_default("accuracy", TRACED, 0.0f64)
        .build_with(&manager)
        .expect("build");

    let mut run = class.instantiate();
    run.set("accuracy", 0.95).expect("write");
    let first = recorder.saved();
    run.set("accuracy", 0.95).expect("write");

    assert_eq!(first.len(), 1);
    assert_eq!(recorder.saved(), [first.clone(), first].concat());
}

#[test]
fn test_local_exactly_once_for_any_reassignment_count() {
    for reassignments in 0..4u32 {
        let (manager, recorder) = isolated();
        let train = track_function_with(
            &manager,
            Signature::new("train").local::<u32>("step", TRACED),
            move |frame: &mut CallFrame| -> TrackResult<()> {
                let step = frame.local::<u32>("step")?;
                for i in 0..=reassignments {
                    frame.bind(step, i * 10)?;
                }
                Ok(())
            },
        )
        .expect("wrap");

        train.call_default().expect("call");
        assert_eq!(
            recorder.saved(),
            vec![("step".to_string(), json!(reassignments * 10))]
        );
    }
}

#[test]
fn test_local_persisted_on_error_exit() {
    let (manager, recorder) = isolated();
    let train = track_function_with(
        &manager,
        Signature::new("train").local::<f64>("loss", TRACED),
        |frame: &mut CallFrame| -> TrackResult<()> {
            let loss = frame.local::<f64>("loss")?;
            frame.bind(loss, 0.8)?;
            frame.bind(loss, 0.6)?;
            Err(HookError::configuration("diverged"))
        },
    )
    .expect("wrap");

    assert!(train.call_default().is_err());
    assert_eq!(recorder.saved(), vec![("loss".to_string(), json!(0.6))]);
}

#[test]
fn test_local_rebound_under_other_payload_rejected() {
    let (manager, recorder) = isolated();
    let train = track_function_with(
        &manager,
        Signature::new("train").local::<f64>("loss", TRACED),
        |frame: &mut CallFrame| -> TrackResult<()> {
            let loss = frame.local::<f64>("loss")?;
            frame.bind(loss, 0.5)?;
            let text = frame.local::<String>("loss")?;
            frame.bind(text, "not a number".to_string())?;
            Ok(())
        },
    )
    .expect("wrap");

    match train.call_default() {
        Err(HookError::PayloadMismatch { name, declared, requested }) => {
            assert_eq!(name, "loss");
            assert_eq!(declared, "Traced[f64]");
            assert_eq!(requested, "String");
        }
        other => panic!("Expected PayloadMismatch, got: {:?}", other),
    }
    assert_eq!(recorder.saved(), vec![("loss".to_string(), json!(0.5))]);
}

#[test]
fn test_local_persisted_on_panic() {
    let (manager, recorder) = isolated();
    let train = track_function_with(
        &manager,
        Signature::new("train")
            .param_with_default("epochs", TRACED, 3u32)
            .local::<f64>("loss", TRACED),
        |frame: &mut CallFrame| -> TrackResult<()> {
            let loss = frame.local::<f64>("loss")?;
            frame.bind(loss, 0.4)?;
            panic!("numerical blow-up");
        },
    )
    .expect("wrap");

    let outcome = catch_unwind(AssertUnwindSafe(|| train.call_default()));
    assert!(outcome.is_err());
    assert_eq!(
        recorder.saved(),
        vec![
            ("epochs".to_string(), json!(3)),
            ("loss".to_string(), json!(0.4)),
        ]
    );
}

#[test]
fn test_unbound_local_never_persisted() {
    let (manager, recorder) = isolated();
    let train = track_function_with(
        &manager,
        Signature::new("train").local::<f64>("loss", TRACED),
        |_frame: &mut CallFrame| -> TrackResult<()> { Ok(()) },
    )
    .expect("wrap");

    train.call_default().expect("call");
    assert!(recorder.is_empty());
}

#[test]
fn test_explicit_argument_precedence() {
    let (manager, recorder) = isolated();
    let spy = Arc::new(SpyInput::new("cfg", &[("learning_rate", json!(0.01))]));
    manager.add_input_hook(spy.clone());

    let train = track_function_with(
        &manager,
        Signature::new("train").param::<f64>("learning_rate", TRACED),
        |frame: &mut CallFrame| -> TrackResult<f64> { frame.param("learning_rate") },
    )
    .expect("wrap");

    let lr = train.call(args! { "learning_rate" => 0.2 }).expect("call");
    assert_eq!(lr, 0.2);
    assert!(spy.gets().is_empty());
    assert_eq!(spy.validations(), vec![("learning_rate".to_string(), json!(0.2))]);
    assert_eq!(recorder.saved(), vec![("learning_rate".to_string(), json!(0.2))]);
}

#[test]
fn test_output_failure_surfaces_at_call_site() {
    let manager = Arc::new(HookManager::new());
    manager.add_output_hook(Arc::new(FailingOutput));

    let class = TrackedClass::builder("Run")
        .attribute_with_default("loss", TRACED, 1.0f64)
        .build_with(&manager)
        .expect("build");
    let mut run = class.instantiate();
    let err = run.set("loss", 0.5).unwrap_err();
    assert!(matches!(err, HookError::OutputFailed { ref hook, .. } if hook == "failing"));

    let train = track_function_with(
        &manager,
        Signature::new("train").param_with_default("epochs", TRACED, 1u32),
        |_frame: &mut CallFrame| -> TrackResult<u32> { Ok(7) },
    )
    .expect("wrap");
    assert!(matches!(train.call_default(), Err(HookError::OutputFailed { .. })));
}

#[test]
fn test_standalone_scope_in_method() {
    let (manager, recorder) = isolated();
    let class = TrackedClass::builder("Trainer")
        .attribute_with_default("epochs", TRACED, 2u32)
        .build_with(&manager)
        .expect("build");
    let trainer = class.instantiate();

    let fit = |trainer: &TrackedInstance| -> TrackResult<()> {
        let mut scope = LocalScope::with_manager("Trainer::fit", manager.clone());
        let loss = scope.declare::<f64>("loss", TRACED);
        let epochs: u32 = trainer.get("epochs")?;
        for epoch in 0..epochs {
            scope.bind(loss, 1.0 / f64::from(epoch + 1))?;
        }
        scope.finish()
    };

    fit(&trainer).expect("fit");
    assert_eq!(recorder.saved(), vec![("loss".to_string(), json!(0.5))]);
}
