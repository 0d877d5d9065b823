// Copyright (c) 2025 - Cowboy AI, Inc.
//! Scoped Provisioning Runs
//!
//! A [`ProvisioningRun`] applies the definition set, hands the outputs to a
//! check body and always tears down afterwards, whether the apply failed,
//! the checks failed or the body panicked. Inputs that fail validation are
//! rejected before the engine is invoked, and a failed `init` never reaches
//! `apply`, so neither needs tearing down. When teardown itself fails the
//! working copy is kept on disk, since its state file is the only record of
//! what remains in Azure.

use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::inputs::{DefinitionInputs, InputsError};
use crate::outputs::Outputs;
use crate::state_machine::{Recorder, RunEvent, RunState, Transition, TransitionError};
use crate::terraform::{CommandRunner, Terraform, TerraformOptions, ValidateReport};

/// Why a provisioning run did not succeed
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Inputs failed validation; the engine was never invoked
    #[error("Inputs rejected before provisioning: {0}")]
    Rejected(#[source] InputsError),

    /// `init` failed; nothing was applied, so there is nothing to tear down
    #[error("Init failed: {0}")]
    Init(#[source] InfrastructureError),

    /// `apply` failed; teardown was still attempted
    #[error("Apply failed: {source}{}", teardown_note(.teardown))]
    Apply {
        source: InfrastructureError,
        teardown: Option<TeardownFailure>,
    },

    /// Reading outputs or the check body failed; teardown was still attempted
    #[error("Checks failed: {reason}{}", teardown_note(.teardown))]
    Check {
        reason: anyhow::Error,
        teardown: Option<TeardownFailure>,
    },

    /// Everything passed but teardown failed
    #[error("Teardown failed: {0}")]
    Teardown(#[source] TeardownFailure),

    /// The run was already executed
    #[error(transparent)]
    Lifecycle(#[from] TransitionError),
}

/// A failed `destroy` and the working copy kept behind for cleanup
#[derive(Debug, thiserror::Error)]
#[error("{source} (state kept in {})", .state_dir.display())]
pub struct TeardownFailure {
    pub source: InfrastructureError,
    /// Persisted working copy holding the state of what remains
    pub state_dir: PathBuf,
}

fn teardown_note(teardown: &Option<TeardownFailure>) -> String {
    match teardown {
        Some(err) => format!(" (teardown also failed: {err})"),
        None => String::new(),
    }
}

impl RunError {
    /// Teardown error carried by this failure, if any
    pub fn teardown_error(&self) -> Option<&TeardownFailure> {
        match self {
            Self::Apply { teardown, .. } | Self::Check { teardown, .. } => teardown.as_ref(),
            Self::Teardown(err) => Some(err),
            Self::Rejected(_) | Self::Init(_) | Self::Lifecycle(_) => None,
        }
    }

    /// Working copy kept on disk because teardown failed
    pub fn kept_state_dir(&self) -> Option<&Path> {
        self.teardown_error().map(|failure| failure.state_dir.as_path())
    }
}

/// One apply/check/destroy cycle over a private copy of the definition set
pub struct ProvisioningRun<R: CommandRunner> {
    id: Uuid,
    terraform: Terraform<R>,
    lifecycle: Recorder<RunState>,
}

impl<R: CommandRunner> ProvisioningRun<R> {
    pub fn new(options: TerraformOptions, runner: Arc<R>) -> InfrastructureResult<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            terraform: Terraform::new(options, runner)?,
            lifecycle: Recorder::new(RunState::Pending),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn terraform(&self) -> &Terraform<R> {
        &self.terraform
    }

    pub fn state(&self) -> RunState {
        self.lifecycle.state()
    }

    pub fn history(&self) -> &[Transition<RunState, RunEvent>] {
        self.lifecycle.trail()
    }

    /// Working copy left on disk after a failed teardown
    pub fn kept_state_dir(&self) -> Option<&Path> {
        (self.state() == RunState::Leaked).then(|| self.terraform.working_dir())
    }

    /// Apply, run `body` over the outputs, then destroy
    ///
    /// A panic inside `body` is resumed after teardown has run.
    pub async fn execute<F, Fut, T>(&mut self, body: F) -> Result<T, RunError>
    where
        F: FnOnce(Outputs) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        if self.state() != RunState::Pending {
            return Err(TransitionError::InvalidTransition {
                from: self.state().to_string(),
                input: "execute".to_string(),
            }
            .into());
        }

        let resource_group = self
            .terraform
            .inputs()
            .text(crate::inputs::InputName::ResourceGroupName)
            .unwrap_or_default();
        let span = info_span!("provisioning_run", run_id = %self.id, resource_group = %resource_group);

        self.execute_inner(body).instrument(span).await
    }

    async fn execute_inner<F, Fut, T>(&mut self, body: F) -> Result<T, RunError>
    where
        F: FnOnce(Outputs) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let validated = match self.terraform.inputs().validate() {
            Ok(validated) => validated,
            Err(rejection) => {
                warn!("Rejecting run: {}", rejection);
                self.record(RunEvent::InputsRejected);
                return Err(RunError::Rejected(rejection));
            }
        };
        info!(
            "Provisioning {} resources in resource group {}",
            validated.declared_resources().len(),
            validated.resource_group_name
        );

        if let Err(source) = self.terraform.init().await {
            error!("Init failed, nothing was applied: {}", source);
            self.record(RunEvent::InitFailed);
            return Err(RunError::Init(source));
        }

        if let Err(source) = self.terraform.apply().await {
            error!("Apply failed: {}", source);
            self.record(RunEvent::ApplyFailed);
            let teardown = self.teardown().await.err();
            return Err(RunError::Apply { source, teardown });
        }
        self.record(RunEvent::ApplySucceeded);

        let checked = match self.terraform.output_all().await {
            Ok(outputs) => AssertUnwindSafe(async move { body(outputs).await })
                .catch_unwind()
                .await,
            Err(err) => Ok(Err(anyhow::Error::new(err).context("reading outputs"))),
        };

        match &checked {
            Ok(Ok(_)) => self.record(RunEvent::ChecksPassed),
            Ok(Err(err)) => {
                warn!("Checks failed: {:#}", err);
                self.record(RunEvent::ChecksFailed);
            }
            Err(panic) => {
                error!("Check body panicked: {}", panic_message(panic.as_ref()));
                self.record(RunEvent::ChecksFailed);
            }
        }

        let teardown = self.teardown().await;

        match checked {
            Err(panic) => std::panic::resume_unwind(panic),
            Ok(Err(reason)) => Err(RunError::Check {
                reason,
                teardown: teardown.err(),
            }),
            Ok(Ok(value)) => match teardown {
                Ok(()) => Ok(value),
                Err(err) => Err(RunError::Teardown(err)),
            },
        }
    }

    async fn teardown(&mut self) -> Result<(), TeardownFailure> {
        info!("Tearing down");
        match self.terraform.destroy().await {
            Ok(()) => {
                self.record(RunEvent::TeardownSucceeded);
                Ok(())
            }
            Err(source) => {
                let state_dir = self.terraform.persist_working_dir().to_path_buf();
                error!(
                    state_dir = %state_dir.display(),
                    "Teardown failed, resources may remain: {}", source
                );
                self.record(RunEvent::TeardownFailed);
                Err(TeardownFailure { source, state_dir })
            }
        }
    }

    fn record(&mut self, event: RunEvent) {
        let from = self.state();
        match self.lifecycle.apply(event, Utc::now()) {
            Ok(output) => {
                for warning in &output.warnings {
                    warn!("{}", warning);
                }
                info!("Run state {} -> {}", from, self.state());
            }
            Err(err) => warn!("Ignoring lifecycle event {}: {}", event, err),
        }
    }
}

impl<R: CommandRunner> Drop for ProvisioningRun<R> {
    fn drop(&mut self) {
        let state = self.state();
        if state.requires_teardown() {
            error!(run_id = %self.id, "Run dropped in state {} without teardown", state);
        }
    }
}

/// Validate a definition set without any inputs
pub async fn validate_definitions<R: CommandRunner>(
    definitions_dir: impl AsRef<Path>,
    binary: impl AsRef<Path>,
    runner: Arc<R>,
) -> InfrastructureResult<ValidateReport> {
    let options = TerraformOptions::new(definitions_dir.as_ref(), DefinitionInputs::default())
        .with_binary(binary.as_ref());
    Terraform::new(options, runner)?.validate().await
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }

    #[test]
    fn test_teardown_note() {
        assert_eq!(teardown_note(&None), "");
        let note = teardown_note(&Some(TeardownFailure {
            source: InfrastructureError::OutputNotFound("x".to_string()),
            state_dir: PathBuf::from("/tmp/aks-infra-1"),
        }));
        assert_eq!(
            note,
            " (teardown also failed: Output not found: x (state kept in /tmp/aks-infra-1))"
        );
    }
}
