// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declared Resource Taxonomy
//!
//! The set of Azure resources the definition set can declare, with the
//! Terraform address and Azure resource type of each.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource declared by the definition set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Resource group owning every other resource of a run
    ResourceGroup,
    /// Virtual network
    VirtualNetwork,
    /// Subnet hosting the cluster nodes
    Subnet,
    /// Optional user-assigned managed identity
    UserAssignedIdentity,
    /// Network Contributor grant for the user-assigned identity
    RoleAssignment,
    /// Managed Kubernetes cluster
    KubernetesCluster,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        Self::ResourceGroup,
        Self::VirtualNetwork,
        Self::Subnet,
        Self::UserAssignedIdentity,
        Self::RoleAssignment,
        Self::KubernetesCluster,
    ];

    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceGroup => "resource_group",
            Self::VirtualNetwork => "virtual_network",
            Self::Subnet => "subnet",
            Self::UserAssignedIdentity => "user_assigned_identity",
            Self::RoleAssignment => "role_assignment",
            Self::KubernetesCluster => "kubernetes_cluster",
        }
    }

    /// Address of the resource inside the definition set
    pub fn terraform_address(&self) -> &'static str {
        match self {
            Self::ResourceGroup => "azurerm_resource_group.this",
            Self::VirtualNetwork => "azurerm_virtual_network.this",
            Self::Subnet => "azurerm_subnet.aks",
            Self::UserAssignedIdentity => "azurerm_user_assigned_identity.aks[0]",
            Self::RoleAssignment => "azurerm_role_assignment.aks_network[0]",
            Self::KubernetesCluster => "azurerm_kubernetes_cluster.this",
        }
    }

    /// Azure Resource Manager type
    pub fn azure_type(&self) -> &'static str {
        match self {
            Self::ResourceGroup => "Microsoft.Resources/resourceGroups",
            Self::VirtualNetwork => "Microsoft.Network/virtualNetworks",
            Self::Subnet => "Microsoft.Network/virtualNetworks/subnets",
            Self::UserAssignedIdentity => "Microsoft.ManagedIdentity/userAssignedIdentities",
            Self::RoleAssignment => "Microsoft.Authorization/roleAssignments",
            Self::KubernetesCluster => "Microsoft.ContainerService/managedClusters",
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ResourceGroup => "Resource Group",
            Self::VirtualNetwork => "Virtual Network",
            Self::Subnet => "Subnet",
            Self::UserAssignedIdentity => "User-Assigned Identity",
            Self::RoleAssignment => "Role Assignment",
            Self::KubernetesCluster => "AKS Cluster",
        }
    }

    /// True for resources only declared when the user-assigned identity is enabled
    pub fn requires_user_assigned_identity(&self) -> bool {
        matches!(self, Self::UserAssignedIdentity | Self::RoleAssignment)
    }

    /// Resources declared for a configuration, in creation order
    pub fn declared(use_user_assigned_identity: bool) -> Vec<ResourceKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| use_user_assigned_identity || !kind.requires_user_assigned_identity())
            .collect()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
