//! Tracked training loop.
//!
//! Hyperparameters live on a tracked `Trainer` object and resolve through
//! the input hooks on first read. Each epoch is a tracked function whose
//! `learning_rate` parameter and `loss`/`accuracy` locals are dispatched to
//! the output hooks when the epoch returns.

use clap::Args;
use tracing::info;

use hooksett_core::config::AppConfig;
use hooksett_engine::prelude::*;
use hooksett_hooks::kinds::{METRIC, PARAMETER, register_ml_kinds};
use hooksett_hooks::setup::install;

/// Arguments for the train command
#[derive(Debug, Args)]
pub struct TrainArgs {
    /// Number of epochs to run
    #[arg(long, default_value_t = 3)]
    pub epochs: u32,

    /// Explicit learning rate; skips the input hooks for this value
    #[arg(long)]
    pub learning_rate: Option<f64>,
}

/// Summary printed when the loop finishes
#[derive(Debug, serde::Serialize)]
struct TrainSummary {
    epochs: u32,
    learning_rate: f64,
    batch_size: u32,
    best_accuracy: f64,
}

/// Run the training loop
pub fn execute(args: &TrainArgs, config: &AppConfig) -> anyhow::Result<()> {
    let manager = initialize();
    register_ml_kinds();
    let installed = install(&manager, &config.hooks)?;

    let trainer_class = TrackedClass::builder("Trainer")
        .attribute_with_default("learning_rate", PARAMETER, 0.001f64)
        .attribute_with_default("batch_size", PARAMETER, 32u32)
        .attribute_with_default("best_accuracy", METRIC, 0.0f64)
        .build()?;
    let mut trainer = trainer_class.instantiate();

    if let Some(lr) = args.learning_rate {
        trainer.set("learning_rate", lr)?;
    }
    let learning_rate: f64 = trainer.get("learning_rate")?;
    let batch_size: u32 = trainer.get("batch_size")?;
    info!(
        learning_rate,
        batch_size,
        provenance = ?trainer.provenance("learning_rate")?,
        "Trainer configured"
    );

    let train_epoch = track_function(
        Signature::new("train_epoch")
            .arg::<u32>("epoch")
            .param_with_default("learning_rate", PARAMETER, 0.001f64)
            .arg::<u32>("batch_size")
            .local::<f64>("loss", METRIC)
            .local::<f64>("accuracy", METRIC),
        |frame: &mut CallFrame| -> TrackResult<f64> {
            let epoch: u32 = frame.param("epoch")?;
            let lr: f64 = frame.param("learning_rate")?;
            let batch: u32 = frame.param("batch_size")?;

            let loss = frame.local::<f64>("loss")?;
            let accuracy = frame.local::<f64>("accuracy")?;

            let steps = (1024 / batch.max(1)).max(1);
            let mut current = 1.0;
            for _ in 0..steps {
                current *= 1.0 - lr.min(0.5);
                frame.bind(loss, current / f64::from(epoch + 1))?;
            }

            let acc = 1.0 - frame.read(loss)?.unwrap_or(1.0);
            frame.bind(accuracy, acc)?;
            Ok(acc)
        },
    )?;

    for epoch in 0..args.epochs {
        let accuracy = train_epoch.call(
            args!("epoch" => epoch, "learning_rate" => learning_rate, "batch_size" => batch_size),
        )?;

        let best: f64 = trainer.get("best_accuracy")?;
        if accuracy > best {
            trainer.set("best_accuracy", accuracy)?;
        }
        info!(epoch, accuracy, "Epoch complete");
    }

    let summary = TrainSummary {
        epochs: args.epochs,
        learning_rate,
        batch_size,
        best_accuracy: trainer.get("best_accuracy")?,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(experiment) = installed.experiment {
        println!("{}", serde_json::to_string_pretty(&experiment.records())?);
    }

    Ok(())
}
