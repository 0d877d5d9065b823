// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning Engine Driver
//!
//! Wraps the `terraform` CLI operations the harness consumes: `validate`,
//! `init` + `apply`, `destroy`, `output <name>` and `output` (all).
//!
//! Every [`Terraform`] owns a [`Workspace`] copy of the definition set and a
//! var file rendered from its [`DefinitionInputs`], so parallel runs never
//! share engine state.

pub mod runner;
pub mod validate;
pub mod workspace;

pub use runner::{CliRunner, CommandOutput, CommandRunner, Invocation};
pub use validate::{Diagnostic, Severity, ValidateReport};
pub use workspace::Workspace;

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::inputs::{DefinitionInputs, ValidatedInputs};
use crate::outputs::{value_text, OutputName, Outputs};

/// Name of the var file written into each workspace
pub const VAR_FILE_NAME: &str = "harness.tfvars.json";

/// Options for driving the definition set
#[derive(Debug, Clone)]
pub struct TerraformOptions {
    /// Directory holding the definition set
    pub definitions_dir: PathBuf,
    /// Input configuration
    pub inputs: DefinitionInputs,
    /// Engine binary
    pub binary: PathBuf,
    /// Extra environment for the engine (credentials are inherited)
    pub env: BTreeMap<String, String>,
}

impl TerraformOptions {
    pub fn new(definitions_dir: impl Into<PathBuf>, inputs: DefinitionInputs) -> Self {
        Self {
            definitions_dir: definitions_dir.into(),
            inputs,
            binary: PathBuf::from("terraform"),
            env: BTreeMap::new(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// Engine driver bound to one working copy of the definition set
pub struct Terraform<R: CommandRunner> {
    options: TerraformOptions,
    runner: Arc<R>,
    workspace: Workspace,
}

impl<R: CommandRunner> Terraform<R> {
    /// Prepare a working copy and render the var file
    pub fn new(options: TerraformOptions, runner: Arc<R>) -> InfrastructureResult<Self> {
        let workspace = Workspace::copy_from(&options.definitions_dir)?;
        let vars = serde_json::to_vec_pretty(&options.inputs.to_var_map())?;
        std::fs::write(workspace.path().join(VAR_FILE_NAME), vars)?;

        Ok(Self {
            options,
            runner,
            workspace,
        })
    }

    pub fn options(&self) -> &TerraformOptions {
        &self.options
    }

    pub fn inputs(&self) -> &DefinitionInputs {
        &self.options.inputs
    }

    pub fn working_dir(&self) -> &Path {
        self.workspace.path()
    }

    /// Keep the working copy, state included, after this driver is dropped
    pub fn persist_working_dir(&mut self) -> &Path {
        self.workspace.persist()
    }

    fn invocation(&self, args: &[&str]) -> Invocation {
        let mut env = BTreeMap::from([
            ("TF_IN_AUTOMATION".to_string(), "1".to_string()),
            ("TF_INPUT".to_string(), "0".to_string()),
        ]);
        env.extend(self.options.env.clone());

        Invocation {
            program: self.options.binary.clone(),
            args: args.iter().map(|a| a.to_string()).collect(),
            working_dir: self.workspace.path().to_path_buf(),
            env,
        }
    }

    /// Run a command and return its output whatever the exit code
    async fn run_raw(&self, args: &[&str]) -> InfrastructureResult<CommandOutput> {
        let invocation = self.invocation(args);
        self.runner.run(&invocation).await
    }

    /// Run a command, failing on a non-zero exit
    async fn run(&self, args: &[&str]) -> InfrastructureResult<CommandOutput> {
        let output = self.run_raw(args).await?;
        if !output.is_success() {
            return Err(InfrastructureError::CommandFailed {
                command: args.join(" "),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }

    /// Check the definition set for errors without touching any backend
    pub async fn validate(&self) -> InfrastructureResult<ValidateReport> {
        self.run(&["init", "-backend=false", "-input=false", "-no-color"])
            .await?;

        // Exit code is 1 when invalid; the JSON report is still printed
        let output = self.run_raw(&["validate", "-json", "-no-color"]).await?;
        let report = ValidateReport::parse(&output.stdout)?;

        for warning in report.warnings() {
            warn!("Definition set warning: {}", warning.summary);
        }
        if !report.valid {
            return Err(InfrastructureError::InvalidDefinitions(report.error_summary()));
        }

        info!("Definition set in {} is valid", self.workspace.source().display());
        Ok(report)
    }

    pub async fn init(&self) -> InfrastructureResult<()> {
        self.run(&["init", "-input=false", "-no-color"]).await?;
        Ok(())
    }

    pub async fn apply(&self) -> InfrastructureResult<()> {
        let var_file = format!("-var-file={VAR_FILE_NAME}");
        self.run(&["apply", "-input=false", "-auto-approve", "-no-color", &var_file])
            .await?;
        Ok(())
    }

    /// Validate inputs, then `init` and `apply`
    ///
    /// Invalid inputs are rejected before the engine is invoked at all.
    pub async fn init_and_apply(&self) -> InfrastructureResult<ValidatedInputs> {
        let validated = self.options.inputs.validate()?;
        info!(
            "Provisioning {} resources in resource group {}",
            validated.declared_resources().len(),
            validated.resource_group_name
        );

        self.init().await?;
        self.apply().await?;
        Ok(validated)
    }

    pub async fn destroy(&self) -> InfrastructureResult<()> {
        let var_file = format!("-var-file={VAR_FILE_NAME}");
        self.run(&["destroy", "-auto-approve", "-input=false", "-no-color", &var_file])
            .await?;
        Ok(())
    }

    /// Read one output as raw JSON
    pub async fn output(&self, name: &str) -> InfrastructureResult<Value> {
        let output = self.run_raw(&["output", "-no-color", "-json", name]).await?;
        if !output.is_success() {
            if output.stderr.contains("not found") {
                return Err(InfrastructureError::OutputNotFound(name.to_string()));
            }
            return Err(InfrastructureError::CommandFailed {
                command: format!("output -no-color -json {name}"),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let value = serde_json::from_str(output.stdout.trim())
            .map_err(|e| InfrastructureError::Deserialization(format!("output {name}: {e}")))?;
        Ok(value)
    }

    /// Read one declared output as text
    pub async fn output_text(&self, name: OutputName) -> InfrastructureResult<String> {
        let value = self.output(name.as_str()).await?;
        if !name.is_sensitive() {
            debug!("Output {} = {}", name, value_text(&value));
        }
        Ok(value_text(&value))
    }

    /// Read every output
    pub async fn output_all(&self) -> InfrastructureResult<Outputs> {
        let output = self.run(&["output", "-no-color", "-json"]).await?;
        let outputs = Outputs::from_json(&output.stdout)?;
        debug!("Read {} outputs", outputs.len());
        Ok(outputs)
    }
}
