// Copyright (c) 2025 - Cowboy AI, Inc.
//! Suite results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::ScenarioKind;
use crate::state_machine::RunState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// Every expectation held and teardown succeeded
    Passed,
    /// At least one expectation did not hold
    Failed,
    /// Inputs failed validation; nothing was provisioned
    Rejected,
    /// The engine or the harness failed
    Errored,
}

/// Result of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub kind: ScenarioKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    pub status: ScenarioStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teardown_error: Option<String>,
    /// Working copy kept on disk after a failed teardown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kept_state_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_state: Option<RunState>,
    pub duration_ms: u64,
}

impl ScenarioReport {
    pub fn errored(name: impl Into<String>, kind: ScenarioKind, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            resource_group: None,
            status: ScenarioStatus::Errored,
            failures: Vec::new(),
            error: Some(error.into()),
            teardown_error: None,
            kept_state_dir: None,
            final_state: None,
            duration_ms: 0,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}

/// Result of a whole suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn count(&self, status: ScenarioStatus) -> usize {
        self.scenarios.iter().filter(|s| s.status == status).count()
    }

    pub fn is_success(&self) -> bool {
        self.scenarios.iter().all(ScenarioReport::passed)
    }

    /// Scenarios whose teardown failed and may have left resources behind
    pub fn leaked(&self) -> impl Iterator<Item = &ScenarioReport> {
        self.scenarios.iter().filter(|s| s.teardown_error.is_some())
    }

    pub fn get(&self, name: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}
