// Copyright (c) 2025 - Cowboy AI, Inc.
//! Definition Set Outputs
//!
//! Parsed form of `terraform output -json`. Sensitive values are kept in
//! memory for assertions but never rendered by `Debug`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::{InfrastructureError, InfrastructureResult};

/// Outputs declared by the definition set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputName {
    ResourceGroupName,
    VnetId,
    SubnetId,
    IdentityClientId,
    IdentityPrincipalId,
    AksName,
    KubeConfig,
    KubeAdminConfig,
}

impl OutputName {
    pub const ALL: [OutputName; 8] = [
        Self::ResourceGroupName,
        Self::VnetId,
        Self::SubnetId,
        Self::IdentityClientId,
        Self::IdentityPrincipalId,
        Self::AksName,
        Self::KubeConfig,
        Self::KubeAdminConfig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceGroupName => "resource_group_name",
            Self::VnetId => "vnet_id",
            Self::SubnetId => "subnet_id",
            Self::IdentityClientId => "identity_client_id",
            Self::IdentityPrincipalId => "identity_principal_id",
            Self::AksName => "aks_name",
            Self::KubeConfig => "kube_config",
            Self::KubeAdminConfig => "kube_admin_config",
        }
    }

    /// Declared `sensitive = true` in the definition set
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Self::KubeConfig | Self::KubeAdminConfig)
    }
}

impl fmt::Display for OutputName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputName {
    type Err = InfrastructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| InfrastructureError::OutputNotFound(s.to_string()))
    }
}

/// Single output as reported by the engine
#[derive(Clone, PartialEq, Deserialize)]
pub struct OutputValue {
    #[serde(default)]
    pub sensitive: bool,
    #[serde(rename = "type", default)]
    pub value_type: Value,
    #[serde(default)]
    pub value: Value,
}

impl OutputValue {
    pub fn new(value: Value, sensitive: bool) -> Self {
        let value_type = match &value {
            Value::String(_) => Value::String("string".to_string()),
            Value::Number(_) => Value::String("number".to_string()),
            Value::Bool(_) => Value::String("bool".to_string()),
            _ => Value::Null,
        };
        Self {
            sensitive,
            value_type,
            value,
        }
    }

    /// Non-null value
    pub fn is_present(&self) -> bool {
        !self.value.is_null()
    }

    /// Null, empty string, empty list or empty map
    pub fn is_empty(&self) -> bool {
        match &self.value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// String values as-is, anything else as JSON text
    pub fn as_text(&self) -> String {
        value_text(&self.value)
    }
}

impl fmt::Debug for OutputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("OutputValue");
        debug.field("sensitive", &self.sensitive);
        debug.field("type", &self.value_type);
        if self.sensitive {
            debug.field("value", &"<redacted>");
        } else {
            debug.field("value", &self.value);
        }
        debug.finish()
    }
}

/// Render a JSON value the way a single output is read as text
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// All outputs of an applied definition set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outputs(BTreeMap<String, OutputValue>);

impl Outputs {
    /// Parse the document printed by `terraform output -json`
    pub fn from_json(raw: &str) -> InfrastructureResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let map: BTreeMap<String, OutputValue> = serde_json::from_str(trimmed)
            .map_err(|e| InfrastructureError::Deserialization(e.to_string()))?;
        Ok(Self(map))
    }

    pub fn from_map(map: BTreeMap<String, OutputValue>) -> Self {
        Self(map)
    }

    pub fn get(&self, name: OutputName) -> Option<&OutputValue> {
        self.0.get(name.as_str())
    }

    pub fn get_named(&self, name: &str) -> Option<&OutputValue> {
        self.0.get(name)
    }

    /// Text of an output, `None` when it is not declared
    pub fn text(&self, name: OutputName) -> Option<String> {
        self.get(name).map(OutputValue::as_text)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
