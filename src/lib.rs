// Copyright (c) 2025 - Cowboy AI, Inc.
//! Integration test harness for the AKS infrastructure definition set
//!
//! Drives the Terraform definitions under `infrastructure/` through
//! validate, apply, output and destroy, and checks the outputs of each
//! applied configuration. Every provisioning run is scoped: teardown runs
//! whether the run passed, failed or panicked.

pub mod config;
pub mod domain;
pub mod errors;
pub mod expectations;
pub mod harness;
pub mod inputs;
pub mod outputs;
pub mod state_machine;
pub mod suite;
pub mod terraform;

// Re-export commonly used types
pub use config::SuiteConfig;
pub use errors::{InfrastructureError, InfrastructureResult};
pub use expectations::{Expectation, ExpectationFailure, ExpectationFailures};
pub use harness::{validate_definitions, ProvisioningRun, RunError, TeardownFailure};
pub use inputs::{DefinitionInputs, InputName, InputsError, ValidatedInputs};
pub use outputs::{OutputName, OutputValue, Outputs};
pub use state_machine::{RunEvent, RunState};
pub use suite::{standard_scenarios, Scenario, ScenarioKind, ScenarioReport, ScenarioStatus, SuiteReport, SuiteRunner};
pub use terraform::{CliRunner, CommandOutput, CommandRunner, Invocation, Terraform, TerraformOptions};
