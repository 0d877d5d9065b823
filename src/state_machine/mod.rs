// Copyright (c) 2025 - Cowboy AI, Inc.
//! Run Lifecycle Modelling
//!
//! Transitions are pure: the harness performs apply and destroy, then feeds
//! the outcome in as an input. A [`Recorder`] keeps the timestamped trail so
//! a finished run can say how it got where it is.
//!
//! ```text
//! (State, Input) → (State, Output)
//! ```

pub mod run_lifecycle;

pub use run_lifecycle::{RunEvent, RunState, TransitionOutput};

use chrono::{DateTime, Utc};
use serde::Serialize;

pub type TransitionResult<S> = Result<S, TransitionError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Invalid transition from {from} on {input}")]
    InvalidTransition { from: String, input: String },

    /// The state accepts no further input
    #[error("{0} is a terminal state")]
    Terminal(String),
}

/// Mealy machine over `Self` as the state
pub trait StateMachine: Sized + Copy {
    type Input: Copy;
    type Output;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)>;

    fn accepts(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }
}

/// One recorded step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition<S, I> {
    pub from: S,
    pub to: S,
    pub input: I,
    pub at: DateTime<Utc>,
}

/// Current state plus every transition that led to it
#[derive(Debug, Clone)]
pub struct Recorder<M: StateMachine> {
    state: M,
    trail: Vec<Transition<M, M::Input>>,
}

impl<M: StateMachine> Recorder<M> {
    pub fn new(initial: M) -> Self {
        Self {
            state: initial,
            trail: Vec::new(),
        }
    }

    /// Feed `input`; the state is unchanged when the transition is refused
    pub fn apply(&mut self, input: M::Input, at: DateTime<Utc>) -> TransitionResult<M::Output> {
        let (to, output) = self.state.transition(&input)?;
        self.trail.push(Transition {
            from: self.state,
            to,
            input,
            at,
        });
        self.state = to;
        Ok(output)
    }

    pub fn state(&self) -> M {
        self.state
    }

    pub fn trail(&self) -> &[Transition<M, M::Input>] {
        &self.trail
    }

    pub fn last(&self) -> Option<&Transition<M, M::Input>> {
        self.trail.last()
    }
}
