// Copyright (c) 2025 - Cowboy AI, Inc.
//! Suite configuration
//!
//! Read from the environment, the same way the other service binaries of
//! this repository are configured. Azure credentials (`ARM_CLIENT_ID`,
//! `ARM_SUBSCRIPTION_ID`, ...) are not read here; the engine process
//! inherits them.

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{InfrastructureError, InfrastructureResult};

pub const ENV_DEFINITIONS_DIR: &str = "AKS_SUITE_DEFINITIONS_DIR";
pub const ENV_TERRAFORM_BINARY: &str = "TERRAFORM_BINARY";
pub const ENV_MAX_PARALLEL: &str = "AKS_SUITE_MAX_PARALLEL";
pub const ENV_UNIQUE_NAMES: &str = "AKS_SUITE_UNIQUE_NAMES";
pub const ENV_LOCATION: &str = "AKS_SUITE_LOCATION";
pub const ENV_FILTER: &str = "AKS_SUITE_FILTER";

/// Configuration for a suite run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    /// Directory holding the definition set
    pub definitions_dir: PathBuf,
    /// Engine binary
    pub terraform_binary: PathBuf,
    /// Upper bound on scenarios provisioning at the same time
    pub max_parallel: usize,
    /// Append a unique suffix to each resource group name
    pub unique_names: bool,
    /// Azure region for every scenario
    pub location: String,
    /// Only run scenarios whose name contains this text
    pub filter: Option<String>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            definitions_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/infrastructure")),
            terraform_binary: PathBuf::from("terraform"),
            max_parallel: 4,
            unique_names: true,
            location: "eastus".to_string(),
            filter: None,
        }
    }
}

impl SuiteConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> InfrastructureResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> InfrastructureResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_parallel = match lookup(ENV_MAX_PARALLEL) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(InfrastructureError::Configuration(format!(
                        "{ENV_MAX_PARALLEL} must be a positive integer, got {raw:?}"
                    )))
                }
            },
            None => defaults.max_parallel,
        };

        let unique_names = match lookup(ENV_UNIQUE_NAMES) {
            Some(raw) => parse_bool(ENV_UNIQUE_NAMES, &raw)?,
            None => defaults.unique_names,
        };

        Ok(Self {
            definitions_dir: lookup(ENV_DEFINITIONS_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.definitions_dir),
            terraform_binary: lookup(ENV_TERRAFORM_BINARY)
                .map(PathBuf::from)
                .unwrap_or(defaults.terraform_binary),
            max_parallel,
            unique_names,
            location: lookup(ENV_LOCATION).unwrap_or(defaults.location),
            filter: lookup(ENV_FILTER).filter(|f| !f.is_empty()),
        })
    }

    /// Rough wall-clock budget hint for logs: AKS creation dominates
    pub fn expected_duration(&self, provisioning_scenarios: usize) -> Duration {
        let waves = provisioning_scenarios.div_ceil(self.max_parallel.max(1));
        Duration::from_secs(15 * 60 * waves as u64)
    }
}

fn parse_bool(key: &str, raw: &str) -> InfrastructureResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(InfrastructureError::Configuration(format!(
            "{key} must be a boolean, got {raw:?}"
        ))),
    }
}
