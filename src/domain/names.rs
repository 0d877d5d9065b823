// Copyright (c) 2025 - Cowboy AI, Inc.
//! Azure Resource Name Value Objects
//!
//! Each resource in the definition set has its own naming rules on Azure.
//! Checking them locally lets a malformed configuration fail before the
//! engine creates anything.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("{kind} is empty")]
    Empty { kind: &'static str },

    #[error("{kind} length {len} is outside {min}-{max} characters: {value}")]
    Length {
        kind: &'static str,
        value: String,
        len: usize,
        min: usize,
        max: usize,
    },

    #[error("{kind} contains invalid character {ch:?}: {value}")]
    InvalidCharacter {
        kind: &'static str,
        value: String,
        ch: char,
    },

    #[error("{kind} must start with {expected}: {value}")]
    InvalidStart {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{kind} must end with {expected}: {value}")]
    InvalidEnd {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Character and length rules for one kind of Azure name
#[derive(Debug, Clone, Copy)]
struct NameRules {
    kind: &'static str,
    min: usize,
    max: usize,
    /// Punctuation allowed besides ASCII letters and digits
    punctuation: &'static str,
    start: Edge,
    end: Edge,
}

#[derive(Debug, Clone, Copy)]
enum Edge {
    Any,
    Alphanumeric,
    AlphanumericOrUnderscore,
    NotPeriod,
}

impl Edge {
    fn accepts(self, ch: char) -> bool {
        match self {
            Edge::Any => true,
            Edge::Alphanumeric => ch.is_ascii_alphanumeric(),
            Edge::AlphanumericOrUnderscore => ch.is_ascii_alphanumeric() || ch == '_',
            Edge::NotPeriod => ch != '.',
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Edge::Any => "any character",
            Edge::Alphanumeric => "a letter or digit",
            Edge::AlphanumericOrUnderscore => "a letter, digit or underscore",
            Edge::NotPeriod => "something other than a period",
        }
    }
}

impl NameRules {
    fn check(&self, value: &str) -> Result<(), NameError> {
        if value.is_empty() {
            return Err(NameError::Empty { kind: self.kind });
        }

        let len = value.chars().count();
        if len < self.min || len > self.max {
            return Err(NameError::Length {
                kind: self.kind,
                value: value.to_string(),
                len,
                min: self.min,
                max: self.max,
            });
        }

        if let Some(ch) = value
            .chars()
            .find(|ch| !ch.is_ascii_alphanumeric() && !self.punctuation.contains(*ch))
        {
            return Err(NameError::InvalidCharacter {
                kind: self.kind,
                value: value.to_string(),
                ch,
            });
        }

        // Non-empty was checked above
        let first = value.chars().next().unwrap_or_default();
        let last = value.chars().last().unwrap_or_default();

        if !self.start.accepts(first) {
            return Err(NameError::InvalidStart {
                kind: self.kind,
                value: value.to_string(),
                expected: self.start.describe(),
            });
        }
        if !self.end.accepts(last) {
            return Err(NameError::InvalidEnd {
                kind: self.kind,
                value: value.to_string(),
                expected: self.end.describe(),
            });
        }

        Ok(())
    }
}

macro_rules! azure_name {
    ($(#[$meta:meta])* $name:ident, $rules:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            const RULES: NameRules = $rules;

            /// Longest name Azure accepts
            pub const MAX_LENGTH: usize = Self::RULES.max;

            /// Create a new name with validation
            pub fn new(value: impl Into<String>) -> Result<Self, NameError> {
                let value = value.into();
                Self::RULES.check(&value)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = NameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

azure_name!(
    /// Resource group name: 1-90 characters of letters, digits and `_-.()`,
    /// not ending in a period
    ResourceGroupName,
    NameRules {
        kind: "resource group name",
        min: 1,
        max: 90,
        punctuation: "_-.()",
        start: Edge::Any,
        end: Edge::NotPeriod,
    }
);

azure_name!(
    /// Virtual network name: 2-64 characters of letters, digits and `_-.`
    VnetName,
    NameRules {
        kind: "virtual network name",
        min: 2,
        max: 64,
        punctuation: "_-.",
        start: Edge::Alphanumeric,
        end: Edge::AlphanumericOrUnderscore,
    }
);

azure_name!(
    /// Subnet name: 1-80 characters of letters, digits and `_-.`
    SubnetName,
    NameRules {
        kind: "subnet name",
        min: 1,
        max: 80,
        punctuation: "_-.",
        start: Edge::Alphanumeric,
        end: Edge::AlphanumericOrUnderscore,
    }
);

azure_name!(
    /// User-assigned identity name: 3-128 characters of letters, digits and `_-`
    IdentityName,
    NameRules {
        kind: "identity name",
        min: 3,
        max: 128,
        punctuation: "_-",
        start: Edge::Alphanumeric,
        end: Edge::Any,
    }
);

azure_name!(
    /// Managed cluster name: 1-63 characters, letters and digits at both ends
    AksName,
    NameRules {
        kind: "AKS cluster name",
        min: 1,
        max: 63,
        punctuation: "_-",
        start: Edge::Alphanumeric,
        end: Edge::Alphanumeric,
    }
);

azure_name!(
    /// Cluster DNS prefix: 1-54 characters of letters, digits and hyphens
    DnsPrefix,
    NameRules {
        kind: "DNS prefix",
        min: 1,
        max: 54,
        punctuation: "-",
        start: Edge::Alphanumeric,
        end: Edge::Alphanumeric,
    }
);

/// Azure region name as used by the management API (`eastus`, `westeurope`)
///
/// Display names (`East US`) are accepted and normalised to the API form,
/// as azurerm does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    pub fn new(value: impl Into<String>) -> Result<Self, NameError> {
        let raw = value.into();
        let value: String = raw
            .chars()
            .filter(|ch| *ch != ' ')
            .map(|ch| ch.to_ascii_lowercase())
            .collect();
        if value.is_empty() {
            return Err(NameError::Empty { kind: "location" });
        }
        if let Some(ch) = value
            .chars()
            .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit()))
        {
            return Err(NameError::InvalidCharacter {
                kind: "location",
                value: raw,
                ch,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Virtual machine SKU for the default node pool (`Standard_B2s`,
/// constrained-vCPU sizes such as `Standard_E4-2s_v3`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VmSize(String);

impl VmSize {
    const TIERS: [&'static str; 2] = ["Standard_", "Basic_"];

    pub fn new(value: impl Into<String>) -> Result<Self, NameError> {
        let value = value.into();
        let Some(family) = Self::TIERS
            .iter()
            .find_map(|tier| value.strip_prefix(tier))
        else {
            return Err(NameError::InvalidStart {
                kind: "VM size",
                value,
                expected: "Standard_ or Basic_",
            });
        };

        if family.is_empty() {
            return Err(NameError::Empty { kind: "VM size" });
        }
        if let Some(ch) = family
            .chars()
            .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-'))
        {
            return Err(NameError::InvalidCharacter {
                kind: "VM size",
                value,
                ch,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VmSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for VmSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_group_names() {
        assert!(ResourceGroupName::new("test-aks-rg").is_ok());
        assert!(ResourceGroupName::new("rg_(prod).v2").is_ok());
        assert_eq!(
            ResourceGroupName::new(""),
            Err(NameError::Empty {
                kind: "resource group name"
            })
        );
        assert!(matches!(
            ResourceGroupName::new("trailing."),
            Err(NameError::InvalidEnd { .. })
        ));
        assert!(matches!(
            ResourceGroupName::new("a".repeat(91)),
            Err(NameError::Length { len: 91, .. })
        ));
        assert!(matches!(
            ResourceGroupName::new("has space"),
            Err(NameError::InvalidCharacter { ch: ' ', .. })
        ));
    }

    #[test]
    fn test_vnet_and_subnet_names() {
        assert!(VnetName::new("test-vnet").is_ok());
        assert!(VnetName::new("v").is_err());
        assert!(VnetName::new("-vnet").is_err());
        assert!(SubnetName::new("test-subnet").is_ok());
        assert!(SubnetName::new("subnet_").is_ok());
        assert!(SubnetName::new("subnet.").is_err());
    }

    #[test]
    fn test_cluster_names() {
        assert!(AksName::new("test-aks-cluster").is_ok());
        assert!(AksName::new("cluster-").is_err());
        assert!(AksName::new("c".repeat(64)).is_err());
        assert!(DnsPrefix::new("testaks").is_ok());
        assert!(DnsPrefix::new("test_aks").is_err());
        assert!(IdentityName::new("test-aks-uai").is_ok());
        assert!(IdentityName::new("ab").is_err());
    }

    #[test]
    fn test_location_and_vm_size() {
        assert!(Location::new("eastus").is_ok());
        assert_eq!(Location::new("East US").unwrap().as_str(), "eastus");
        assert_eq!(
            Location::new("Germany West Central").unwrap().as_str(),
            "germanywestcentral"
        );
        assert!(Location::new("   ").is_err());
        assert!(matches!(
            Location::new("east-us"),
            Err(NameError::InvalidCharacter { ch: '-', .. })
        ));
        assert!(VmSize::new("Standard_B2s").is_ok());
        assert!(VmSize::new("Standard_D4s_v5").is_ok());
        assert!(VmSize::new("Standard_E4-2s_v3").is_ok());
        assert!(VmSize::new("Standard_M64-32ms").is_ok());
        assert!(VmSize::new("Standard_B2s!").is_err());
        assert!(VmSize::new("B2s").is_err());
        assert!(VmSize::new("Standard_").is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: AksName = serde_json::from_str(r#""test-aks""#).unwrap();
        assert_eq!(ok.as_str(), "test-aks");
        assert!(serde_json::from_str::<AksName>(r#""-bad""#).is_err());
    }
}
