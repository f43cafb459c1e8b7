//! `juju` CLI backend.
//!
//! Each call spawns the `juju` binary against one model:
//! 1. `status` runs `juju status -m <model> --format=json [patterns]` and
//!    decodes stdout into a [`FleetSnapshot`]
//! 2. `add_units` runs `juju add-unit -m <model> -n <count> <application>`
//! 3. `destroy_units` runs `juju remove-unit -m <model> --no-prompt <units>`
//!
//! A non-zero exit status becomes [`FleetError::Command`] carrying stderr.
//!
//! Targets Juju 3.x; `--no-prompt` does not exist on 2.9 `remove-unit`.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use fleetscale_core::JujuConfig;
use tracing::debug;

use crate::client::FleetClient;
use crate::error::{FleetError, FleetResult};
use crate::types::{AddUnitsParams, DestroyUnitResult, DestroyUnitsParams, FleetSnapshot, UnitId};

/// A [`FleetClient`] that shells out to the `juju` binary.
#[derive(Debug, Clone)]
pub struct JujuCli {
    binary: PathBuf,
    /// Model argument passed with `-m`, `controller:model` when a controller is set.
    model: String,
    data_dir: Option<PathBuf>,
}

impl JujuCli {
    /// Create a client for `model` using `juju` from `$PATH`.
    pub fn new(model: &str) -> Self {
        Self {
            binary: PathBuf::from("juju"),
            model: model.to_string(),
            data_dir: None,
        }
    }

    /// Create a client for `model` from the `[juju]` config section.
    pub fn from_config(config: &JujuConfig, model: &str) -> Self {
        let model = match &config.controller {
            Some(controller) => format!("{controller}:{model}"),
            None => model.to_string(),
        };
        Self {
            binary: config.binary.clone().unwrap_or_else(|| PathBuf::from("juju")),
            model,
            data_dir: config.data_dir.clone(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// The `-m` argument used for every call.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn status_args(&self, patterns: &[String]) -> Vec<String> {
        let mut args = vec![
            "status".to_string(),
            "-m".to_string(),
            self.model.clone(),
            "--format=json".to_string(),
        ];
        args.extend(patterns.iter().cloned());
        args
    }

    fn add_unit_args(&self, params: &AddUnitsParams) -> Vec<String> {
        vec![
            "add-unit".to_string(),
            "-m".to_string(),
            self.model.clone(),
            "-n".to_string(),
            params.num_units.to_string(),
            params.application.clone(),
        ]
    }

    fn remove_unit_args(&self, params: &DestroyUnitsParams) -> Vec<String> {
        let mut args = vec![
            "remove-unit".to_string(),
            "-m".to_string(),
            self.model.clone(),
            "--no-prompt".to_string(),
        ];
        if params.destroy_storage {
            args.push("--destroy-storage".to_string());
        }
        if params.force {
            args.push("--force".to_string());
        }
        args.extend(params.units.iter().cloned());
        args
    }

    /// Run the binary with `args` and return stdout.
    fn run(&self, args: &[String]) -> FleetResult<Vec<u8>> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args).stdin(Stdio::null());
        if let Some(dir) = &self.data_dir {
            cmd.env("JUJU_DATA", dir);
        }

        debug!(binary = %self.binary.display(), ?args, "running juju");

        let output = cmd.output().map_err(|e| {
            FleetError::Transport(format!("failed to execute {}: {e}", self.binary.display()))
        })?;

        if !output.status.success() {
            return Err(FleetError::Command {
                command: format!("juju {}", args.first().map(String::as_str).unwrap_or_default()),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

impl FleetClient for JujuCli {
    fn status(&self, patterns: &[String]) -> FleetResult<FleetSnapshot> {
        let stdout = self.run(&self.status_args(patterns))?;
        serde_json::from_slice(&stdout).map_err(|e| FleetError::Decode(e.to_string()))
    }

    fn add_units(&self, args: &AddUnitsParams) -> FleetResult<Vec<UnitId>> {
        self.run(&self.add_unit_args(args))?;
        // The CLI does not report the names of the units it created.
        Ok(Vec::new())
    }

    fn destroy_units(&self, args: &DestroyUnitsParams) -> FleetResult<Vec<DestroyUnitResult>> {
        self.run(&self.remove_unit_args(args))?;
        Ok(args
            .units
            .iter()
            .map(|unit| DestroyUnitResult {
                unit: unit.clone(),
                error: None,
            })
            .collect())
    }
}
