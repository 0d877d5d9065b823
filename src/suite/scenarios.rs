// Copyright (c) 2025 - Cowboy AI, Inc.
//! Standard scenarios for the AKS definition set

use serde::{Deserialize, Serialize};

use crate::expectations::Expectation;
use crate::inputs::{DefinitionInputs, InputName};
use crate::outputs::OutputName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Apply, check outputs, destroy
    Provision,
    /// Only validate the definition set
    Validate,
}

/// One independent test case of the suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub kind: ScenarioKind,
    pub inputs: DefinitionInputs,
    pub expectations: Vec<Expectation>,
}

impl Scenario {
    /// Provisioning scenario; every one checks the resource group name round-trips
    pub fn provision(name: impl Into<String>, inputs: DefinitionInputs) -> Self {
        Self {
            name: name.into(),
            kind: ScenarioKind::Provision,
            inputs,
            expectations: vec![Expectation::equals_input(
                OutputName::ResourceGroupName,
                InputName::ResourceGroupName,
            )],
        }
    }

    pub fn validate(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ScenarioKind::Validate,
            inputs: DefinitionInputs::default(),
            expectations: Vec::new(),
        }
    }

    pub fn expect(mut self, expectation: Expectation) -> Self {
        if !self.expectations.contains(&expectation) {
            self.expectations.push(expectation);
        }
        self
    }

    pub fn resource_group_name(&self) -> Option<String> {
        self.inputs.text(InputName::ResourceGroupName)
    }
}

/// The cases the definition set must pass
pub fn standard_scenarios(location: &str) -> Vec<Scenario> {
    vec![
        Scenario::provision(
            "resource_group_creation",
            DefinitionInputs::new("test-aks-rg")
                .location(location)
                .tag("environment", "test"),
        )
        .expect(Expectation::present(OutputName::ResourceGroupName)),
        Scenario::provision(
            "vnet_creation",
            DefinitionInputs::new("test-aks-rg-vnet")
                .location(location)
                .vnet_name("test-vnet")
                .vnet_address_space(["10.0.0.0/8"])
                .subnet_name("test-subnet")
                .subnet_prefix("10.240.0.0/16"),
        )
        .expect(Expectation::non_empty(OutputName::VnetId))
        .expect(Expectation::non_empty(OutputName::SubnetId))
        .expect(Expectation::contains_input(
            OutputName::SubnetId,
            InputName::SubnetName,
        )),
        Scenario::provision(
            "user_assigned_identity_creation",
            DefinitionInputs::new("test-aks-rg-identity")
                .location(location)
                .identity_name("test-aks-uai")
                .use_user_assigned_identity(true),
        )
        .expect(Expectation::non_empty(OutputName::IdentityClientId))
        .expect(Expectation::non_empty(OutputName::IdentityPrincipalId)),
        Scenario::provision(
            "aks_cluster_creation",
            DefinitionInputs::new("test-aks-rg-cluster")
                .location(location)
                .aks_name("test-aks-cluster")
                .dns_prefix("testaks")
                .agent_count(1)
                .agent_vm_size("Standard_B2s"),
        )
        .expect(Expectation::equals_input(OutputName::AksName, InputName::AksName))
        .expect(Expectation::present(OutputName::KubeConfig))
        .expect(Expectation::present(OutputName::KubeAdminConfig)),
        Scenario::provision(
            "aks_node_pool_configuration",
            DefinitionInputs::new("test-aks-rg-nodepool")
                .location(location)
                .aks_name("test-aks-np")
                .dns_prefix("testaksnp")
                .agent_count(2)
                .agent_vm_size("Standard_B2s"),
        )
        .expect(Expectation::non_empty(OutputName::AksName))
        .expect(Expectation::AnyOutputs),
        Scenario::provision(
            "network_profile",
            DefinitionInputs::new("test-aks-rg-network")
                .location(location)
                .aks_name("test-aks-net")
                .dns_prefix("testaksnet"),
        )
        .expect(Expectation::non_empty(OutputName::AksName)),
        Scenario::validate("terraform_validation"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scenarios_have_valid_inputs() {
        for scenario in standard_scenarios("eastus") {
            if scenario.kind == ScenarioKind::Provision {
                assert!(
                    scenario.inputs.validate().is_ok(),
                    "{} has invalid inputs",
                    scenario.name
                );
            }
        }
    }

    #[test]
    fn test_resource_groups_are_disjoint() {
        let scenarios = standard_scenarios("eastus");
        let mut groups: Vec<String> = scenarios
            .iter()
            .filter_map(Scenario::resource_group_name)
            .collect();
        let total = groups.len();
        groups.sort();
        groups.dedup();
        assert_eq!(groups.len(), total);
        assert_eq!(total, 6);
    }

    #[test]
    fn test_expect_is_idempotent() {
        let scenario = Scenario::provision("x", DefinitionInputs::new("rg"))
            .expect(Expectation::AnyOutputs)
            .expect(Expectation::AnyOutputs);
        assert_eq!(scenario.expectations.len(), 2);
    }
}
