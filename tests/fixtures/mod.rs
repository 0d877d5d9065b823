// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for aks-infrastructure
//!
//! A scripted stand-in for the engine binary plus throwaway definition
//! directories. The fake engine answers `output` from the var file of the
//! working copy it is invoked in, so output checks see the inputs each run
//! actually supplied.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

use aks_infrastructure::terraform::VAR_FILE_NAME;

pub const STATE_FILE: &str = "terraform.tfstate";
use aks_infrastructure::{CommandOutput, CommandRunner, InfrastructureResult, Invocation};

pub const SUBSCRIPTION_ID: &str = "00000000-0000-0000-0000-000000000000";
pub const IDENTITY_CLIENT_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const IDENTITY_PRINCIPAL_ID: &str = "22222222-2222-2222-2222-222222222222";
pub const KUBE_CONFIG: &str = "apiVersion: v1\nkind: Config\nusers:\n- name: clusterUser\n";

pub const VALID_REPORT: &str = r#"{
  "format_version": "1.0",
  "valid": true,
  "error_count": 0,
  "warning_count": 0,
  "diagnostics": []
}"#;

pub const INVALID_REPORT: &str = r#"{
  "format_version": "1.0",
  "valid": false,
  "error_count": 1,
  "warning_count": 0,
  "diagnostics": [
    {
      "severity": "error",
      "summary": "Reference to undeclared input variable",
      "detail": "An input variable with the name \"subnet_prefixes\" has not been declared.",
      "range": {
        "filename": "main.tf",
        "start": {"line": 20, "column": 22, "byte": 410},
        "end": {"line": 20, "column": 41, "byte": 429}
      }
    }
  ]
}"#;

/// One recorded engine call
#[derive(Debug, Clone)]
pub struct Call {
    pub invocation: Invocation,
    /// Var file contents in the working copy at call time
    pub vars: Value,
}

impl Call {
    pub fn subcommand(&self) -> &str {
        self.invocation.subcommand()
    }

    pub fn resource_group(&self) -> Option<&str> {
        self.vars.get("resource_group_name").and_then(Value::as_str)
    }
}

/// Recording fake of the engine binary
#[derive(Debug, Default)]
pub struct FakeEngine {
    overrides: Mutex<BTreeMap<String, CommandOutput>>,
    calls: Mutex<Vec<Call>>,
    delay: Option<Duration>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every `apply`
    pub fn with_apply_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer every call of `subcommand` with `output`
    pub fn respond(self, subcommand: &str, output: CommandOutput) -> Self {
        self.overrides
            .lock()
            .unwrap()
            .insert(subcommand.to_string(), output);
        self
    }

    pub fn fail(self, subcommand: &str, stderr: &str) -> Self {
        self.respond(subcommand, CommandOutput::failure(1, stderr))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn subcommands(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|call| call.subcommand().to_string())
            .collect()
    }

    pub fn count(&self, subcommand: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.subcommand() == subcommand)
            .count()
    }

    /// Resource groups that were applied, in call order
    pub fn applied_resource_groups(&self) -> Vec<String> {
        self.resource_groups_for("apply")
    }

    pub fn destroyed_resource_groups(&self) -> Vec<String> {
        self.resource_groups_for("destroy")
    }

    fn resource_groups_for(&self, subcommand: &str) -> Vec<String> {
        self.calls()
            .iter()
            .filter(|call| call.subcommand() == subcommand)
            .filter_map(|call| call.resource_group().map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl CommandRunner for FakeEngine {
    async fn run(&self, invocation: &Invocation) -> InfrastructureResult<CommandOutput> {
        let vars = read_vars(&invocation.working_dir);
        self.calls.lock().unwrap().push(Call {
            invocation: invocation.clone(),
            vars: vars.clone(),
        });

        let subcommand = invocation.subcommand().to_string();
        if subcommand == "apply" {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
        }

        if let Some(output) = self.overrides.lock().unwrap().get(&subcommand) {
            return Ok(output.clone());
        }

        Ok(match subcommand.as_str() {
            "validate" => CommandOutput::success(VALID_REPORT),
            "apply" => {
                // Local state, as the real engine leaves it in the working copy
                let state = json!({"version": 4, "resource_group": vars["resource_group_name"]});
                std::fs::write(invocation.working_dir.join(STATE_FILE), state.to_string())?;
                CommandOutput::success("")
            }
            "output" => {
                let outputs = engine_outputs(&vars);
                // `output -no-color -json <name>` carries the name last
                match invocation.args.get(3) {
                    Some(name) => match outputs.get(name) {
                        Some(entry) => CommandOutput::success(entry["value"].to_string()),
                        None => CommandOutput::failure(
                            1,
                            format!("Error: Output \"{name}\" not found"),
                        ),
                    },
                    None => CommandOutput::success(Value::Object(outputs).to_string()),
                }
            }
            _ => CommandOutput::success(""),
        })
    }
}

fn read_vars(dir: &Path) -> Value {
    std::fs::read_to_string(dir.join(VAR_FILE_NAME))
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_else(|| json!({}))
}

fn var<'a>(vars: &'a Value, name: &str, default: &'a str) -> &'a str {
    vars.get(name).and_then(Value::as_str).unwrap_or(default)
}

fn output(value: Value, sensitive: bool) -> Value {
    json!({"sensitive": sensitive, "type": "string", "value": value})
}

/// Outputs the definition set would report for `vars`
pub fn engine_outputs(vars: &Value) -> Map<String, Value> {
    let rg = var(vars, "resource_group_name", "");
    let vnet = var(vars, "vnet_name", "aks-vnet");
    let subnet = var(vars, "subnet_name", "aks-subnet");
    let aks = var(vars, "aks_name", "aks-cluster");
    let use_identity = vars
        .get("use_user_assigned_identity")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let vnet_id = format!(
        "/subscriptions/{SUBSCRIPTION_ID}/resourceGroups/{rg}/providers/Microsoft.Network/virtualNetworks/{vnet}"
    );
    let (client_id, principal_id) = if use_identity {
        (IDENTITY_CLIENT_ID, IDENTITY_PRINCIPAL_ID)
    } else {
        ("", "")
    };

    let mut outputs = Map::new();
    outputs.insert("resource_group_name".into(), output(json!(rg), false));
    outputs.insert("vnet_id".into(), output(json!(vnet_id), false));
    outputs.insert(
        "subnet_id".into(),
        output(json!(format!("{vnet_id}/subnets/{subnet}")), false),
    );
    outputs.insert("identity_client_id".into(), output(json!(client_id), false));
    outputs.insert(
        "identity_principal_id".into(),
        output(json!(principal_id), false),
    );
    outputs.insert("aks_name".into(), output(json!(aks), false));
    outputs.insert("kube_config".into(), output(json!(KUBE_CONFIG), true));
    outputs.insert("kube_admin_config".into(), output(json!(""), true));
    outputs
}

/// Throwaway definition directory with a single declaration
pub fn definitions_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("main.tf"),
        "variable \"resource_group_name\" {\n  type = string\n}\n",
    )
    .unwrap();
    dir
}

/// The definition set shipped with this crate
pub fn repo_definitions_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("infrastructure")
}
