//! Installs configured hooks onto a manager.

use std::sync::Arc;

use tracing::info;

use hooksett_core::config::hooks::HooksConfig;
use hooksett_core::error::HookError;
use hooksett_engine::manager::HookManager;

use crate::input::config_file::ConfigFileInput;
use crate::input::range::RangeValidationHook;
use crate::input::type_check::TypeValidationHook;
use crate::kinds::register_ml_kinds_on;
use crate::output::experiment::ExperimentOutput;
use crate::output::traced::TracedOutput;

/// Handles to the hooks [`install`] created, for later inspection.
#[derive(Debug, Default)]
pub struct InstalledHooks {
    /// Experiment output, when enabled.
    pub experiment: Option<Arc<ExperimentOutput>>,
}

/// Registers hooks on `manager` as described by `config`.
///
/// Input order: values file, then range checks, then type checks. Output
/// order: traced, then experiment. Enabling the experiment output also
/// registers the `Parameter`, `Metric`, and `Artifact` kinds.
pub fn install(manager: &HookManager, config: &HooksConfig) -> Result<InstalledHooks, HookError> {
    if let Some(path) = &config.values_file {
        manager.add_input_hook(Arc::new(ConfigFileInput::load(path)?));
    }
    if !config.ranges.is_empty() {
        manager.add_input_hook(Arc::new(RangeValidationHook::from_rules(
            config.ranges.clone(),
        )));
    }
    if config.type_check {
        manager.add_input_hook(Arc::new(TypeValidationHook::new()));
    }

    if config.outputs.traced {
        manager.add_output_hook(Arc::new(TracedOutput::new(
            config.outputs.traced_channel.clone(),
        )));
    }

    let mut installed = InstalledHooks::default();
    if config.outputs.experiment {
        register_ml_kinds_on(manager);
        let experiment = Arc::new(ExperimentOutput::new("default"));
        manager.add_output_hook(experiment.clone());
        installed.experiment = Some(experiment);
    }

    info!(
        inputs = manager.input_hook_count(),
        outputs = manager.output_hook_count(),
        "Hooks installed"
    );

    Ok(installed)
}
