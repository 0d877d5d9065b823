// Copyright (c) 2025 - Cowboy AI, Inc.
//! Output Expectations
//!
//! Declarative checks over the outputs of an applied run. Every expectation
//! is evaluated, so one report lists all mismatches of a run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::inputs::{DefinitionInputs, InputName};
use crate::outputs::{OutputName, Outputs};

/// Check over the outputs of an applied run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Expectation {
    /// Output text equals the value supplied for an input
    EqualsInput { output: OutputName, input: InputName },
    /// Output text equals a literal
    Equals { output: OutputName, expected: String },
    /// Output is declared and not empty
    NonEmpty { output: OutputName },
    /// Output text contains the value supplied for an input
    ContainsInput { output: OutputName, input: InputName },
    /// Output is declared with a non-null value (may be an empty string)
    Present { output: OutputName },
    /// At least one output was produced
    AnyOutputs,
}

impl Expectation {
    pub fn equals_input(output: OutputName, input: InputName) -> Self {
        Self::EqualsInput { output, input }
    }

    pub fn equals(output: OutputName, expected: impl Into<String>) -> Self {
        Self::Equals {
            output,
            expected: expected.into(),
        }
    }

    pub fn non_empty(output: OutputName) -> Self {
        Self::NonEmpty { output }
    }

    pub fn contains_input(output: OutputName, input: InputName) -> Self {
        Self::ContainsInput { output, input }
    }

    pub fn present(output: OutputName) -> Self {
        Self::Present { output }
    }

    /// Output this expectation reads, if any
    pub fn output(&self) -> Option<OutputName> {
        match self {
            Self::EqualsInput { output, .. }
            | Self::Equals { output, .. }
            | Self::NonEmpty { output }
            | Self::ContainsInput { output, .. }
            | Self::Present { output } => Some(*output),
            Self::AnyOutputs => None,
        }
    }

    /// Evaluate against outputs, resolving input references through `inputs`
    pub fn check(&self, inputs: &DefinitionInputs, outputs: &Outputs) -> Result<(), ExpectationFailure> {
        let fail = |reason: String| {
            Err(ExpectationFailure {
                expectation: self.clone(),
                reason,
            })
        };

        if let Self::AnyOutputs = self {
            if outputs.is_empty() {
                return fail("no outputs were produced".to_string());
            }
            return Ok(());
        }

        let Some(name) = self.output() else {
            return Ok(());
        };
        let Some(value) = outputs.get(name) else {
            return fail(format!("output {name} is not declared"));
        };
        // Sensitive values never appear in failure text
        let shown = |text: &str| {
            if name.is_sensitive() {
                "<redacted>".to_string()
            } else {
                format!("{text:?}")
            }
        };

        match self {
            Self::EqualsInput { input, .. } | Self::ContainsInput { input, .. } => {
                let Some(expected) = inputs.text(*input) else {
                    return fail(format!("input {input} was not supplied"));
                };
                let actual = value.as_text();
                let equals = matches!(self, Self::EqualsInput { .. });
                match (equals, actual == expected, actual.contains(&expected)) {
                    (true, true, _) | (false, _, true) => Ok(()),
                    (true, false, _) => fail(format!(
                        "{name} was {}, expected {input} value {expected:?}",
                        shown(&actual)
                    )),
                    (false, _, false) => fail(format!(
                        "{name} was {}, expected it to contain {input} value {expected:?}",
                        shown(&actual)
                    )),
                }
            }
            Self::Equals { expected, .. } => {
                let actual = value.as_text();
                if &actual == expected {
                    Ok(())
                } else {
                    fail(format!("{name} was {}, expected {expected:?}", shown(&actual)))
                }
            }
            Self::NonEmpty { .. } => {
                if value.is_empty() {
                    fail(format!("{name} is empty"))
                } else {
                    Ok(())
                }
            }
            Self::Present { .. } => {
                if value.is_present() {
                    Ok(())
                } else {
                    fail(format!("{name} is null"))
                }
            }
            Self::AnyOutputs => Ok(()),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EqualsInput { output, input } => write!(f, "{output} equals input {input}"),
            Self::Equals { output, expected } => write!(f, "{output} equals {expected:?}"),
            Self::NonEmpty { output } => write!(f, "{output} is not empty"),
            Self::ContainsInput { output, input } => write!(f, "{output} contains input {input}"),
            Self::Present { output } => write!(f, "{output} is present"),
            Self::AnyOutputs => write!(f, "outputs are produced"),
        }
    }
}

/// A failed expectation with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{expectation}: {reason}")]
pub struct ExpectationFailure {
    pub expectation: Expectation,
    pub reason: String,
}

/// Evaluate every expectation, collecting all failures
pub fn evaluate(
    expectations: &[Expectation],
    inputs: &DefinitionInputs,
    outputs: &Outputs,
) -> Vec<ExpectationFailure> {
    expectations
        .iter()
        .filter_map(|expectation| expectation.check(inputs, outputs).err())
        .collect()
}

/// Every failed expectation of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{} expectation(s) failed: {}", .0.len(), render(.0))]
pub struct ExpectationFailures(pub Vec<ExpectationFailure>);

fn render(failures: &[ExpectationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Like [`evaluate`], but as a result usable with `?`
pub fn require(
    expectations: &[Expectation],
    inputs: &DefinitionInputs,
    outputs: &Outputs,
) -> Result<(), ExpectationFailures> {
    let failures = evaluate(expectations, inputs, outputs);
    if failures.is_empty() {
        Ok(())
    } else {
        Err(ExpectationFailures(failures))
    }
}
