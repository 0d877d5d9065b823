// Copyright (c) 2025 - Cowboy AI, Inc.
//! Managed Cluster Value Objects

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClusterError {
    #[error("Invalid agent count: {0} (must be {min}-{max})", min = AgentCount::MIN, max = AgentCount::MAX)]
    InvalidAgentCount(i64),

    #[error("Invalid Kubernetes version: {0} (expected MAJOR.MINOR or MAJOR.MINOR.PATCH)")]
    InvalidKubernetesVersion(String),
}

/// Node count of the default node pool (1-1000)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AgentCount(u32);

impl AgentCount {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 1000;

    pub fn new(count: i64) -> Result<Self, ClusterError> {
        match u32::try_from(count) {
            Ok(n) if (Self::MIN..=Self::MAX).contains(&n) => Ok(Self(n)),
            _ => Err(ClusterError::InvalidAgentCount(count)),
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for AgentCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Kubernetes version pinned on the cluster (`1.29` or `1.29.2`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct KubernetesVersion(String);

impl KubernetesVersion {
    pub fn new(value: impl Into<String>) -> Result<Self, ClusterError> {
        let value = value.into();
        let parts: Vec<&str> = value.split('.').collect();
        let well_formed = matches!(parts.len(), 2 | 3)
            && parts
                .iter()
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));

        if !well_formed {
            return Err(ClusterError::InvalidKubernetesVersion(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for KubernetesVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_count_bounds() {
        assert_eq!(AgentCount::new(1).unwrap().get(), 1);
        assert_eq!(AgentCount::new(1000).unwrap().get(), 1000);
        assert_eq!(AgentCount::new(0), Err(ClusterError::InvalidAgentCount(0)));
        assert_eq!(AgentCount::new(-2), Err(ClusterError::InvalidAgentCount(-2)));
        assert_eq!(
            AgentCount::new(1001),
            Err(ClusterError::InvalidAgentCount(1001))
        );
    }

    #[test]
    fn test_kubernetes_version() {
        assert!(KubernetesVersion::new("1.29").is_ok());
        assert!(KubernetesVersion::new("1.29.2").is_ok());
        assert!(KubernetesVersion::new("1").is_err());
        assert!(KubernetesVersion::new("1.x").is_err());
        assert!(KubernetesVersion::new("v1.29").is_err());
    }
}
