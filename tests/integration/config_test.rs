//! Integration tests for configuration-driven hook installation.

mod helpers;

use std::fs;
use std::sync::Arc;

use serde_json::json;

use hooksett_core::config::AppConfig;
use hooksett_core::error::HookError;
use hooksett_engine::prelude::*;
use hooksett_hooks::{ExperimentRecord, METRIC, PARAMETER, RecordingOutput, install};

fn write_config(dir: &std::path::Path, values: &str, default_toml: &str) {
    fs::write(dir.join("values.yaml"), values).expect("write values");
    fs::write(dir.join("default.toml"), default_toml).expect("write config");
}

#[test]
fn test_values_file_feeds_tracked_class() {
    let dir = tempfile::tempdir().expect("tempdir");
    let values = dir.path().join("values.yaml");
    write_config(
        dir.path(),
        "learning_rate: 0.01\nbatch_size: 64\n",
        &format!(
            "[hooks]\nvalues_file = {:?}\n\n[hooks.outputs]\ntraced = false\nexperiment = true\n",
            values.to_string_lossy()
        ),
    );

    let config = AppConfig::load(dir.path(), "test").expect("load");
    let manager = Arc::new(HookManager::new());
    let installed = install(&manager, &config.hooks).expect("install");
    let recorder = Arc::new(RecordingOutput::new());
    manager.add_output_hook(recorder.clone());

    let class = TrackedClass::builder("Trainer")
        .attribute::<f64>("learning_rate", PARAMETER)
        .attribute_with_default("batch_size", PARAMETER, 32u32)
        .attribute_with_default("accuracy", METRIC, 0.0f64)
        .build_with(&manager)
        .expect("build");

    let mut trainer = class.instantiate();
    assert_eq!(trainer.get::<f64>("learning_rate").expect("read"), 0.01);
    assert_eq!(trainer.get::<u32>("batch_size").expect("read"), 64);
    assert!(matches!(
        trainer.provenance("batch_size").expect("known"),
        Some(Provenance::Hook(_))
    ));

    trainer.set("accuracy", 0.75).expect("write");
    assert_eq!(recorder.saved(), vec![("accuracy".to_string(), json!(0.75))]);

    let experiment = installed.experiment.expect("experiment installed");
    assert_eq!(
        experiment.records(),
        vec![ExperimentRecord::Metric {
            name: "accuracy".into(),
            value: 0.75
        }]
    );
}

#[test]
fn test_configured_range_rejects_file_value() {
    let dir = tempfile::tempdir().expect("tempdir");
    let values = dir.path().join("values.yaml");
    write_config(
        dir.path(),
        "learning_rate: 0.5\n",
        &format!(
            "[hooks]\nvalues_file = {:?}\n\n[hooks.ranges.learning_rate]\nmin = 0.0001\nmax = 0.1\n",
            values.to_string_lossy()
        ),
    );

    let config = AppConfig::load(dir.path(), "test").expect("load");
    let manager = Arc::new(HookManager::new());
    install(&manager, &config.hooks).expect("install");

    let err = manager
        .resolve("learning_rate", &TypeHint::of::<f64>(TRACED), None)
        .unwrap_err();
    match err {
        HookError::ValidationRejected { hook, reason, .. } => {
            assert_eq!(hook, "range");
            assert!(reason.contains("0.5"));
        }
        other => panic!("Expected ValidationRejected, got: {:?}", other),
    }
}

#[test]
fn test_missing_values_file_fails_install() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("default.toml"),
        "[hooks]\nvalues_file = \"/nonexistent/values.yaml\"\n",
    )
    .expect("write");

    let config = AppConfig::load(dir.path(), "test").expect("load");
    let manager = HookManager::new();
    let err = install(&manager, &config.hooks).unwrap_err();
    assert!(matches!(err, HookError::Configuration(_)));
}
