// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning Run Lifecycle State Machine
//!
//! # States
//!
//! - Pending: nothing attempted yet
//! - Rejected: inputs failed validation, engine never invoked (terminal)
//! - InitFailed: `init` failed, nothing was applied (terminal)
//! - Applied: apply succeeded, checks not yet run
//! - ApplyFailed: apply failed, partial resources may exist
//! - Verified: every check passed
//! - CheckFailed: at least one check failed or panicked
//! - Destroyed: teardown succeeded (terminal)
//! - Leaked: teardown failed, resources may remain (terminal)
//!
//! Teardown is accepted from every state reached after an apply attempt.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{StateMachine, TransitionError, TransitionResult};

/// Lifecycle state of one provisioning run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Pending,
    Rejected,
    InitFailed,
    Applied,
    ApplyFailed,
    Verified,
    CheckFailed,
    Destroyed,
    Leaked,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::InitFailed | Self::Destroyed | Self::Leaked
        )
    }

    /// An apply was attempted and nothing has torn it down yet
    pub fn requires_teardown(&self) -> bool {
        matches!(
            self,
            Self::Applied | Self::ApplyFailed | Self::Verified | Self::CheckFailed
        )
    }

    /// Inputs this state accepts
    pub fn valid_inputs(&self) -> Vec<RunEvent> {
        use RunEvent::*;

        match self {
            RunState::Pending => vec![
                InputsRejected,
                RunEvent::InitFailed,
                ApplySucceeded,
                RunEvent::ApplyFailed,
            ],
            RunState::Applied => vec![ChecksPassed, ChecksFailed, TeardownSucceeded, TeardownFailed],
            RunState::ApplyFailed | RunState::Verified | RunState::CheckFailed => {
                vec![TeardownSucceeded, TeardownFailed]
            }
            RunState::Rejected | RunState::InitFailed | RunState::Destroyed | RunState::Leaked => {
                Vec::new()
            }
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Outcome of a harness step (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEvent {
    InputsRejected,
    InitFailed,
    ApplySucceeded,
    ApplyFailed,
    ChecksPassed,
    ChecksFailed,
    TeardownSucceeded,
    TeardownFailed,
}

impl fmt::Display for RunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Transition output with metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutput {
    /// Warnings generated during transition
    pub warnings: Vec<String>,

    /// Whether cloud resources may be left behind or half-created
    pub is_critical: bool,
}

impl TransitionOutput {
    pub fn ok() -> Self {
        Self {
            warnings: Vec::new(),
            is_critical: false,
        }
    }

    pub fn with_warning(warning: impl Into<String>) -> Self {
        Self {
            warnings: vec![warning.into()],
            is_critical: false,
        }
    }

    pub fn critical(warning: impl Into<String>) -> Self {
        Self {
            warnings: vec![warning.into()],
            is_critical: true,
        }
    }
}

impl StateMachine for RunState {
    type Input = RunEvent;
    type Output = TransitionOutput;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use RunEvent::*;
        use RunState::*;

        if self.is_terminal() {
            return Err(TransitionError::Terminal(self.to_string()));
        }

        match (self, input) {
            (Pending, InputsRejected) => Ok((Rejected, TransitionOutput::ok())),
            (Pending, RunEvent::InitFailed) => Ok((
                RunState::InitFailed,
                TransitionOutput::with_warning("Init failed; nothing was applied"),
            )),
            (Pending, ApplySucceeded) => Ok((Applied, TransitionOutput::ok())),
            (Pending, RunEvent::ApplyFailed) => Ok((
                RunState::ApplyFailed,
                TransitionOutput::critical("Apply failed; partial resources may exist"),
            )),

            (Applied, ChecksPassed) => Ok((Verified, TransitionOutput::ok())),
            (Applied, ChecksFailed) => Ok((
                CheckFailed,
                TransitionOutput::with_warning("Checks failed; teardown still runs"),
            )),

            (state, TeardownSucceeded) if state.requires_teardown() => {
                Ok((Destroyed, TransitionOutput::ok()))
            }
            (state, TeardownFailed) if state.requires_teardown() => Ok((
                Leaked,
                TransitionOutput::critical("Teardown failed; resources may remain"),
            )),

            (from, input) => Err(TransitionError::InvalidTransition {
                from: from.to_string(),
                input: input.to_string(),
            }),
        }
    }
}
