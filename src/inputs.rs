// Copyright (c) 2025 - Cowboy AI, Inc.
//! Definition Set Inputs
//!
//! [`DefinitionInputs`] is the configuration map handed to the definition
//! set. Unset options fall back to the defaults declared in
//! `infrastructure/variables.tf`, mirrored in [`defaults`]. Values are held
//! raw so that [`DefinitionInputs::validate`] can report every problem at
//! once instead of stopping at the first.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use tracing::warn;

use crate::domain::invariants::{
    validate_dns_service_ip, validate_service_cidr, validate_subnet_in_address_space,
};
use crate::domain::{
    AddressSpace, AgentCount, AksName, CidrBlock, DnsPrefix, IdentityName, KubernetesVersion,
    Location, ResourceGroupName, ResourceKind, SubnetName, Tags, ValidationError, VmSize,
    VnetName,
};

/// Defaults declared by the definition set
pub mod defaults {
    pub const LOCATION: &str = "eastus";
    pub const VNET_NAME: &str = "aks-vnet";
    pub const VNET_ADDRESS_SPACE: &[&str] = &["10.0.0.0/8"];
    pub const SUBNET_NAME: &str = "aks-subnet";
    pub const SUBNET_PREFIX: &str = "10.240.0.0/16";
    pub const IDENTITY_NAME: &str = "aks-uai";
    pub const USE_USER_ASSIGNED_IDENTITY: bool = false;
    pub const AKS_NAME: &str = "aks-cluster";
    pub const DNS_PREFIX: &str = "aks";
    pub const AGENT_COUNT: i64 = 1;
    pub const AGENT_VM_SIZE: &str = "Standard_B2s";
    pub const SERVICE_CIDR: &str = "172.16.0.0/16";
    pub const DNS_SERVICE_IP: &str = "172.16.0.10";
}

/// Options recognized by the definition set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputName {
    ResourceGroupName,
    Location,
    VnetName,
    VnetAddressSpace,
    SubnetName,
    SubnetPrefix,
    IdentityName,
    UseUserAssignedIdentity,
    AksName,
    DnsPrefix,
    AgentCount,
    AgentVmSize,
    Tags,
    KubernetesVersion,
    ServiceCidr,
    DnsServiceIp,
}

impl InputName {
    pub const ALL: [InputName; 16] = [
        Self::ResourceGroupName,
        Self::Location,
        Self::VnetName,
        Self::VnetAddressSpace,
        Self::SubnetName,
        Self::SubnetPrefix,
        Self::IdentityName,
        Self::UseUserAssignedIdentity,
        Self::AksName,
        Self::DnsPrefix,
        Self::AgentCount,
        Self::AgentVmSize,
        Self::Tags,
        Self::KubernetesVersion,
        Self::ServiceCidr,
        Self::DnsServiceIp,
    ];

    /// Variable name in the definition set
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceGroupName => "resource_group_name",
            Self::Location => "location",
            Self::VnetName => "vnet_name",
            Self::VnetAddressSpace => "vnet_address_space",
            Self::SubnetName => "subnet_name",
            Self::SubnetPrefix => "subnet_prefix",
            Self::IdentityName => "identity_name",
            Self::UseUserAssignedIdentity => "use_user_assigned_identity",
            Self::AksName => "aks_name",
            Self::DnsPrefix => "dns_prefix",
            Self::AgentCount => "agent_count",
            Self::AgentVmSize => "agent_vm_size",
            Self::Tags => "tags",
            Self::KubernetesVersion => "kubernetes_version",
            Self::ServiceCidr => "service_cidr",
            Self::DnsServiceIp => "dns_service_ip",
        }
    }
}

impl fmt::Display for InputName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownOption(s.to_string()))
    }
}

/// Every violation found in a configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} invalid input(s): {}", .errors.len(), render(.errors))]
pub struct InputsError {
    pub errors: Vec<ValidationError>,
}

fn render(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration map for one provisioning run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionInputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource_group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vnet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vnet_address_space: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subnet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subnet_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identity_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    use_user_assigned_identity: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aks_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dns_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent_vm_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kubernetes_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    service_cidr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dns_service_ip: Option<String>,
}

impl DefinitionInputs {
    /// Start a configuration for the given resource group
    pub fn new(resource_group_name: impl Into<String>) -> Self {
        Self {
            resource_group_name: Some(resource_group_name.into()),
            ..Self::default()
        }
    }

    pub fn resource_group_name(mut self, value: impl Into<String>) -> Self {
        self.resource_group_name = Some(value.into());
        self
    }

    pub fn location(mut self, value: impl Into<String>) -> Self {
        self.location = Some(value.into());
        self
    }

    pub fn vnet_name(mut self, value: impl Into<String>) -> Self {
        self.vnet_name = Some(value.into());
        self
    }

    pub fn vnet_address_space<I, S>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vnet_address_space = Some(blocks.into_iter().map(Into::into).collect());
        self
    }

    pub fn subnet_name(mut self, value: impl Into<String>) -> Self {
        self.subnet_name = Some(value.into());
        self
    }

    pub fn subnet_prefix(mut self, value: impl Into<String>) -> Self {
        self.subnet_prefix = Some(value.into());
        self
    }

    pub fn identity_name(mut self, value: impl Into<String>) -> Self {
        self.identity_name = Some(value.into());
        self
    }

    pub fn use_user_assigned_identity(mut self, enabled: bool) -> Self {
        self.use_user_assigned_identity = Some(enabled);
        self
    }

    pub fn aks_name(mut self, value: impl Into<String>) -> Self {
        self.aks_name = Some(value.into());
        self
    }

    pub fn dns_prefix(mut self, value: impl Into<String>) -> Self {
        self.dns_prefix = Some(value.into());
        self
    }

    pub fn agent_count(mut self, count: i64) -> Self {
        self.agent_count = Some(count);
        self
    }

    pub fn agent_vm_size(mut self, value: impl Into<String>) -> Self {
        self.agent_vm_size = Some(value.into());
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn kubernetes_version(mut self, value: impl Into<String>) -> Self {
        self.kubernetes_version = Some(value.into());
        self
    }

    pub fn service_cidr(mut self, value: impl Into<String>) -> Self {
        self.service_cidr = Some(value.into());
        self
    }

    pub fn dns_service_ip(mut self, value: impl Into<String>) -> Self {
        self.dns_service_ip = Some(value.into());
        self
    }

    /// Build inputs from a loosely typed map, as a test would pass variables
    ///
    /// Unknown options and ill-typed values are all reported together.
    /// A `null` value leaves the option at its default.
    pub fn from_var_map(vars: BTreeMap<String, Value>) -> Result<Self, InputsError> {
        let mut inputs = Self::default();
        let mut errors = Vec::new();

        for (key, value) in vars {
            let name = match key.parse::<InputName>() {
                Ok(name) => name,
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            };

            match name {
                InputName::ResourceGroupName => {
                    inputs.resource_group_name = take(name, value, &mut errors)
                }
                InputName::Location => inputs.location = take(name, value, &mut errors),
                InputName::VnetName => inputs.vnet_name = take(name, value, &mut errors),
                InputName::VnetAddressSpace => {
                    inputs.vnet_address_space = take(name, value, &mut errors)
                }
                InputName::SubnetName => inputs.subnet_name = take(name, value, &mut errors),
                InputName::SubnetPrefix => inputs.subnet_prefix = take(name, value, &mut errors),
                InputName::IdentityName => inputs.identity_name = take(name, value, &mut errors),
                InputName::UseUserAssignedIdentity => {
                    inputs.use_user_assigned_identity = take(name, value, &mut errors)
                }
                InputName::AksName => inputs.aks_name = take(name, value, &mut errors),
                InputName::DnsPrefix => inputs.dns_prefix = take(name, value, &mut errors),
                InputName::AgentCount => inputs.agent_count = take(name, value, &mut errors),
                InputName::AgentVmSize => inputs.agent_vm_size = take(name, value, &mut errors),
                InputName::Tags => inputs.tags = take(name, value, &mut errors),
                InputName::KubernetesVersion => {
                    inputs.kubernetes_version = take(name, value, &mut errors)
                }
                InputName::ServiceCidr => inputs.service_cidr = take(name, value, &mut errors),
                InputName::DnsServiceIp => inputs.dns_service_ip = take(name, value, &mut errors),
            }
        }

        if errors.is_empty() {
            Ok(inputs)
        } else {
            Err(InputsError { errors })
        }
    }

    /// Explicitly set options, keyed by variable name
    pub fn to_var_map(&self) -> BTreeMap<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            // Every field serializes to plain JSON, so this arm is unreachable
            _ => BTreeMap::new(),
        }
    }

    /// Value of an explicitly set option
    pub fn get(&self, name: InputName) -> Option<Value> {
        self.to_var_map().remove(name.as_str())
    }

    /// Explicitly set option rendered as text (strings unquoted)
    pub fn text(&self, name: InputName) -> Option<String> {
        self.get(name).map(|value| match value {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }

    /// True when no option was set
    pub fn is_empty(&self) -> bool {
        self.to_var_map().is_empty()
    }

    /// Check every option and cross-field rule, applying defaults for unset options
    pub fn validate(&self) -> Result<ValidatedInputs, InputsError> {
        let mut errors = Vec::new();

        let resource_group_name = match &self.resource_group_name {
            Some(name) => check(
                &mut errors,
                ResourceGroupName::new(name.as_str()).map_err(|source| ValidationError::Name {
                    field: "resource_group_name",
                    source,
                }),
            ),
            None => {
                errors.push(ValidationError::Missing("resource_group_name"));
                None
            }
        };

        let location = check(
            &mut errors,
            Location::new(or_default(&self.location, defaults::LOCATION)).map_err(|source| {
                ValidationError::Name {
                    field: "location",
                    source,
                }
            }),
        );

        let tags = check(
            &mut errors,
            Tags::new(self.tags.clone().unwrap_or_default()).map_err(ValidationError::Tags),
        );

        let vnet_name = check(
            &mut errors,
            VnetName::new(or_default(&self.vnet_name, defaults::VNET_NAME)).map_err(|source| {
                ValidationError::Name {
                    field: "vnet_name",
                    source,
                }
            }),
        );

        let address_space = {
            let parsed = match &self.vnet_address_space {
                Some(blocks) => AddressSpace::parse(blocks),
                None => AddressSpace::parse(defaults::VNET_ADDRESS_SPACE),
            };
            check(
                &mut errors,
                parsed.map_err(|source| ValidationError::Network {
                    field: "vnet_address_space",
                    source,
                }),
            )
        };

        let subnet_name = check(
            &mut errors,
            SubnetName::new(or_default(&self.subnet_name, defaults::SUBNET_NAME)).map_err(
                |source| ValidationError::Name {
                    field: "subnet_name",
                    source,
                },
            ),
        );

        let subnet_prefix = check(
            &mut errors,
            CidrBlock::new(or_default(&self.subnet_prefix, defaults::SUBNET_PREFIX)).map_err(
                |source| ValidationError::Network {
                    field: "subnet_prefix",
                    source,
                },
            ),
        );

        if let (Some(space), Some(prefix)) = (&address_space, &subnet_prefix) {
            check(&mut errors, validate_subnet_in_address_space(prefix, space));
        }

        let use_identity = self
            .use_user_assigned_identity
            .unwrap_or(defaults::USE_USER_ASSIGNED_IDENTITY);
        if !use_identity && self.identity_name.is_some() {
            warn!("identity_name is set but use_user_assigned_identity is false; it will be ignored");
        }
        let identity_name = if use_identity {
            check(
                &mut errors,
                IdentityName::new(or_default(&self.identity_name, defaults::IDENTITY_NAME))
                    .map_err(|source| ValidationError::Name {
                        field: "identity_name",
                        source,
                    }),
            )
        } else {
            None
        };

        let aks_name = check(
            &mut errors,
            AksName::new(or_default(&self.aks_name, defaults::AKS_NAME)).map_err(|source| {
                ValidationError::Name {
                    field: "aks_name",
                    source,
                }
            }),
        );

        let dns_prefix = check(
            &mut errors,
            DnsPrefix::new(or_default(&self.dns_prefix, defaults::DNS_PREFIX)).map_err(
                |source| ValidationError::Name {
                    field: "dns_prefix",
                    source,
                },
            ),
        );

        let agent_count = check(
            &mut errors,
            AgentCount::new(self.agent_count.unwrap_or(defaults::AGENT_COUNT)).map_err(
                |source| ValidationError::Cluster {
                    field: "agent_count",
                    source,
                },
            ),
        );

        let agent_vm_size = check(
            &mut errors,
            VmSize::new(or_default(&self.agent_vm_size, defaults::AGENT_VM_SIZE)).map_err(
                |source| ValidationError::Name {
                    field: "agent_vm_size",
                    source,
                },
            ),
        );

        let kubernetes_version = match &self.kubernetes_version {
            Some(version) => check(
                &mut errors,
                KubernetesVersion::new(version.as_str()).map_err(|source| {
                    ValidationError::Cluster {
                        field: "kubernetes_version",
                        source,
                    }
                }),
            ),
            None => None,
        };

        let service_cidr = check(
            &mut errors,
            CidrBlock::new(or_default(&self.service_cidr, defaults::SERVICE_CIDR)).map_err(
                |source| ValidationError::Network {
                    field: "service_cidr",
                    source,
                },
            ),
        );

        let raw_dns_ip = or_default(&self.dns_service_ip, defaults::DNS_SERVICE_IP);
        let dns_service_ip = check(
            &mut errors,
            raw_dns_ip
                .parse::<IpAddr>()
                .map_err(|_| ValidationError::InvalidIpAddress {
                    field: "dns_service_ip",
                    value: raw_dns_ip.to_string(),
                }),
        );

        if let (Some(space), Some(service)) = (&address_space, &service_cidr) {
            check(&mut errors, validate_service_cidr(service, space));
        }
        if let (Some(ip), Some(service)) = (dns_service_ip, &service_cidr) {
            check(&mut errors, validate_dns_service_ip(ip, service));
        }

        match (
            resource_group_name,
            location,
            tags,
            vnet_name,
            address_space,
            subnet_name,
            subnet_prefix,
            aks_name,
            dns_prefix,
            agent_count,
            agent_vm_size,
            service_cidr,
            dns_service_ip,
        ) {
            (
                Some(resource_group_name),
                Some(location),
                Some(tags),
                Some(vnet_name),
                Some(address_space),
                Some(subnet_name),
                Some(subnet_prefix),
                Some(aks_name),
                Some(dns_prefix),
                Some(agent_count),
                Some(agent_vm_size),
                Some(service_cidr),
                Some(dns_service_ip),
            ) if errors.is_empty() => Ok(ValidatedInputs {
                resource_group_name,
                location,
                tags,
                network: NetworkInputs {
                    vnet_name,
                    address_space,
                    subnet_name,
                    subnet_prefix,
                },
                identity_name,
                cluster: ClusterInputs {
                    aks_name,
                    dns_prefix,
                    agent_count,
                    agent_vm_size,
                    kubernetes_version,
                    service_cidr,
                    dns_service_ip,
                },
            }),
            _ => Err(InputsError { errors }),
        }
    }
}

fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value.as_deref().unwrap_or(default)
}

fn check<T>(errors: &mut Vec<ValidationError>, result: Result<T, ValidationError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            errors.push(err);
            None
        }
    }
}

fn take<T: DeserializeOwned>(
    name: InputName,
    value: Value,
    errors: &mut Vec<ValidationError>,
) -> Option<T> {
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            errors.push(ValidationError::InvalidType {
                option: name.as_str().to_string(),
                reason: err.to_string(),
            });
            None
        }
    }
}

/// Virtual network section of a validated configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInputs {
    pub vnet_name: VnetName,
    pub address_space: AddressSpace,
    pub subnet_name: SubnetName,
    pub subnet_prefix: CidrBlock,
}

/// Cluster section of a validated configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterInputs {
    pub aks_name: AksName,
    pub dns_prefix: DnsPrefix,
    pub agent_count: AgentCount,
    pub agent_vm_size: VmSize,
    pub kubernetes_version: Option<KubernetesVersion>,
    pub service_cidr: CidrBlock,
    pub dns_service_ip: IpAddr,
}

/// Configuration with defaults applied and every invariant checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInputs {
    pub resource_group_name: ResourceGroupName,
    pub location: Location,
    pub tags: Tags,
    pub network: NetworkInputs,
    /// Present only when the user-assigned identity is enabled
    pub identity_name: Option<IdentityName>,
    pub cluster: ClusterInputs,
}

impl ValidatedInputs {
    pub fn uses_user_assigned_identity(&self) -> bool {
        self.identity_name.is_some()
    }

    /// Resources this configuration declares, in creation order
    pub fn declared_resources(&self) -> Vec<ResourceKind> {
        ResourceKind::declared(self.uses_user_assigned_identity())
    }
}
