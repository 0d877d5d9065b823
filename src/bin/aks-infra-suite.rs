// Copyright (c) 2025 - Cowboy AI, Inc.
//! AKS Infrastructure Suite
//!
//! Provisions every standard scenario against a real Azure subscription,
//! checks the outputs and tears each one down again. Prints the suite
//! report as JSON on stdout.
//!
//! Run with: cargo run --bin aks-infra-suite
//!
//! Prerequisites:
//! 1. `terraform` on PATH (or TERRAFORM_BINARY)
//! 2. Azure credentials in the environment (ARM_CLIENT_ID, ARM_CLIENT_SECRET,
//!    ARM_TENANT_ID, ARM_SUBSCRIPTION_ID) or an `az login` session

use aks_infrastructure::{standard_scenarios, CliRunner, SuiteConfig, SuiteRunner};
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting AKS infrastructure suite");

    let config = SuiteConfig::from_env().context("Failed to load suite configuration")?;
    info!("Configuration loaded:");
    info!("  - Definitions: {}", config.definitions_dir.display());
    info!("  - Terraform: {}", config.terraform_binary.display());
    info!("  - Location: {}", config.location);
    info!("  - Max parallel: {}", config.max_parallel);
    if let Some(filter) = &config.filter {
        info!("  - Filter: {}", filter);
    }

    let scenarios = standard_scenarios(&config.location);
    info!(
        "Expect up to {} minutes of provisioning",
        config.expected_duration(scenarios.len()).as_secs() / 60
    );

    let runner = SuiteRunner::new(config, Arc::new(CliRunner));
    let report = runner.run(scenarios).await;

    let rendered = serde_json::to_string_pretty(&report).context("Failed to render report")?;
    println!("{rendered}");

    if report.scenarios.is_empty() {
        bail!("No scenario matched the filter");
    }
    if !report.is_success() {
        for scenario in report.scenarios.iter().filter(|s| !s.passed()) {
            error!("Scenario {} did not pass: {:?}", scenario.name, scenario.status);
        }
        bail!(
            "{} of {} scenarios did not pass",
            report.scenarios.len() - report.count(aks_infrastructure::ScenarioStatus::Passed),
            report.scenarios.len()
        );
    }

    info!("All {} scenarios passed", report.scenarios.len());
    Ok(())
}
