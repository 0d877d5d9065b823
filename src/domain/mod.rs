// Copyright (c) 2025 - Cowboy AI, Inc.
//! Infrastructure Domain Models
//!
//! Value objects for the inputs of the AKS definition set, each enforcing the
//! Azure rules for its field, plus the cross-field invariants checked before
//! anything is provisioned.
//!
//! # Value Objects with Invariants
//!
//! - [`CidrBlock`] / [`AddressSpace`] - canonical network blocks
//! - [`ResourceGroupName`], [`VnetName`], [`SubnetName`], [`IdentityName`],
//!   [`AksName`], [`DnsPrefix`] - Azure naming rules
//! - [`Location`], [`VmSize`] - region and node SKU
//! - [`Tags`] - Azure tag limits
//! - [`AgentCount`], [`KubernetesVersion`] - node pool and control plane
//! - [`ResourceKind`] - declared resource taxonomy

pub mod cluster;
pub mod invariants;
pub mod names;
pub mod network;
pub mod resource_type;
pub mod tags;

pub use cluster::{AgentCount, ClusterError, KubernetesVersion};
pub use invariants::{ValidationError, ValidationResult};
pub use names::{
    AksName, DnsPrefix, IdentityName, Location, NameError, ResourceGroupName, SubnetName,
    VmSize, VnetName,
};
pub use network::{AddressSpace, CidrBlock, NetworkError};
pub use resource_type::ResourceKind;
pub use tags::{TagError, Tags};
