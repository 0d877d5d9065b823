// Copyright (c) 2025 - Cowboy AI, Inc.
//! Process execution seam for the provisioning engine
//!
//! [`CommandRunner`] is the only place the crate touches processes, so the
//! harness can be exercised against a recording fake.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use tracing::debug;

use crate::errors::{InfrastructureError, InfrastructureResult};

/// One engine command to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    /// Engine subcommand (`init`, `apply`, ...)
    pub fn subcommand(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or_default()
    }

    /// Arguments joined for logs and error messages
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

/// Command output for testability
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Trait for executing engine commands (allows fakes in tests)
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion and capture its output
    ///
    /// A non-zero exit is not an error at this level; only failing to start
    /// the process is.
    async fn run(&self, invocation: &Invocation) -> InfrastructureResult<CommandOutput>;
}

/// Runner that spawns the real binary
#[derive(Debug, Default, Clone)]
pub struct CliRunner;

#[async_trait::async_trait]
impl CommandRunner for CliRunner {
    async fn run(&self, invocation: &Invocation) -> InfrastructureResult<CommandOutput> {
        debug!(
            "Running {} {} in {}",
            invocation.program.display(),
            invocation.command_line(),
            invocation.working_dir.display()
        );

        let output = tokio::process::Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .envs(&invocation.env)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| InfrastructureError::Spawn {
                program: invocation.program.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(output.into())
    }
}
