// Copyright (c) 2025 - Cowboy AI, Inc.
//! Live Azure Provisioning Tests
//!
//! Provision real resources with the shipped definition set and tear them
//! down again. Each test runs in its own resource group, so they can run in
//! parallel.
//!
//! Run with: cargo test --features azure-integration --test azure_live_tests
//!
//! Prerequisites:
//! 1. `terraform` on PATH (or TERRAFORM_BINARY)
//! 2. Azure credentials in the environment or an `az login` session
//!
//! Creating a cluster takes several minutes per test.

#![cfg(feature = "azure-integration")]

use anyhow::{ensure, Context, Result};
use std::sync::Arc;

use aks_infrastructure::suite::unique_name;
use aks_infrastructure::{
    CliRunner, DefinitionInputs, OutputName, Outputs, ProvisioningRun, RunState, SuiteConfig,
    TerraformOptions,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_test_writer()
        .try_init();
}

fn config() -> SuiteConfig {
    SuiteConfig::from_env().expect("suite configuration")
}

/// Apply `inputs` under a unique resource group, run `check`, always destroy
async fn provision<F>(base: &str, inputs: DefinitionInputs, check: F) -> Result<()>
where
    F: FnOnce(Outputs, DefinitionInputs) -> Result<()>,
{
    init_tracing();
    let config = config();
    let inputs = inputs
        .resource_group_name(unique_name(base))
        .location(config.location.as_str());
    let options = TerraformOptions::new(&config.definitions_dir, inputs.clone())
        .with_binary(&config.terraform_binary);

    let mut run = ProvisioningRun::new(options, Arc::new(CliRunner))?;
    let result = run
        .execute(|outputs| async move { check(outputs, inputs) })
        .await;

    assert_eq!(run.state(), RunState::Destroyed, "run did not tear down cleanly");
    result.map_err(anyhow::Error::from)
}

fn text(outputs: &Outputs, name: OutputName) -> Result<String> {
    outputs
        .text(name)
        .with_context(|| format!("output {name} is not declared"))
}

#[tokio::test]
async fn test_resource_group_creation() -> Result<()> {
    let inputs = DefinitionInputs::default().tag("environment", "test");

    provision("test-aks-rg", inputs, |outputs, inputs| {
        ensure!(outputs.get(OutputName::ResourceGroupName).is_some());
        let expected = inputs.text(aks_infrastructure::InputName::ResourceGroupName);
        ensure!(Some(text(&outputs, OutputName::ResourceGroupName)?) == expected);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_vnet_creation() -> Result<()> {
    let inputs = DefinitionInputs::default()
        .vnet_name("test-vnet")
        .vnet_address_space(["10.0.0.0/8"])
        .subnet_name("test-subnet")
        .subnet_prefix("10.240.0.0/16");

    provision("test-aks-rg-vnet", inputs, |outputs, _| {
        ensure!(!text(&outputs, OutputName::VnetId)?.is_empty());
        let subnet_id = text(&outputs, OutputName::SubnetId)?;
        ensure!(subnet_id.contains("test-subnet"), "subnet id {subnet_id}");
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_user_assigned_identity_creation() -> Result<()> {
    let inputs = DefinitionInputs::default()
        .identity_name("test-aks-uai")
        .use_user_assigned_identity(true);

    provision("test-aks-rg-identity", inputs, |outputs, _| {
        ensure!(!text(&outputs, OutputName::IdentityClientId)?.is_empty());
        ensure!(!text(&outputs, OutputName::IdentityPrincipalId)?.is_empty());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_aks_cluster_creation() -> Result<()> {
    let inputs = DefinitionInputs::default()
        .aks_name("test-aks-cluster")
        .dns_prefix("testaks")
        .agent_count(1)
        .agent_vm_size("Standard_B2s");

    provision("test-aks-rg-cluster", inputs, |outputs, _| {
        ensure!(text(&outputs, OutputName::AksName)? == "test-aks-cluster");
        ensure!(outputs.get(OutputName::KubeConfig).is_some_and(|v| v.is_present()));
        ensure!(outputs.get(OutputName::KubeAdminConfig).is_some());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_aks_node_pool_configuration() -> Result<()> {
    let inputs = DefinitionInputs::default()
        .aks_name("test-aks-np")
        .dns_prefix("testaksnp")
        .agent_count(2)
        .agent_vm_size("Standard_B2s");

    provision("test-aks-rg-nodepool", inputs, |outputs, _| {
        ensure!(!text(&outputs, OutputName::AksName)?.is_empty());
        ensure!(!outputs.is_empty(), "no outputs were produced");
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_network_profile() -> Result<()> {
    let inputs = DefinitionInputs::default()
        .aks_name("test-aks-net")
        .dns_prefix("testaksnet");

    provision("test-aks-rg-network", inputs, |outputs, _| {
        ensure!(!text(&outputs, OutputName::AksName)?.is_empty());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_terraform_validation() -> Result<()> {
    init_tracing();
    let config = config();
    let report = aks_infrastructure::validate_definitions(
        &config.definitions_dir,
        &config.terraform_binary,
        Arc::new(CliRunner),
    )
    .await?;
    ensure!(report.valid);
    Ok(())
}
