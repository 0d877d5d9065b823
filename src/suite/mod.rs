// Copyright (c) 2025 - Cowboy AI, Inc.
//! Parallel Scenario Runner
//!
//! Each scenario is an independent unit: it owns its resource group, its
//! own working copy of the definition set and its own teardown. Scenarios
//! share nothing but the semaphore bounding how many provision at once.

pub mod report;
pub mod scenarios;

pub use report::{ScenarioReport, ScenarioStatus, SuiteReport};
pub use scenarios::{standard_scenarios, Scenario, ScenarioKind};

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::SuiteConfig;
use crate::domain::ResourceGroupName;
use crate::expectations::{require, ExpectationFailures};
use crate::harness::{panic_message, validate_definitions, ProvisioningRun, RunError};
use crate::inputs::InputName;
use crate::terraform::{CommandRunner, TerraformOptions};

/// Length of the random suffix appended to resource group names
const SUFFIX_LEN: usize = 8;

/// Runs scenarios concurrently against one definition set
pub struct SuiteRunner<R: CommandRunner + 'static> {
    config: SuiteConfig,
    runner: Arc<R>,
}

impl<R: CommandRunner + 'static> SuiteRunner<R> {
    pub fn new(config: SuiteConfig, runner: Arc<R>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Give the scenario a resource group no other run can be using
    pub fn isolate(&self, mut scenario: Scenario) -> Scenario {
        if !self.config.unique_names || scenario.kind != ScenarioKind::Provision {
            return scenario;
        }
        if let Some(base) = scenario.resource_group_name() {
            let name = unique_name(&base);
            scenario.inputs = scenario.inputs.resource_group_name(name);
        }
        scenario
    }

    /// Run every selected scenario and collect their reports in input order
    pub async fn run(&self, scenarios: Vec<Scenario>) -> SuiteReport {
        let started_at = Utc::now();
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel.max(1)));
        let mut tasks = JoinSet::new();
        let mut names = Vec::new();

        let selected = scenarios.into_iter().filter(|scenario| match &self.config.filter {
            Some(filter) => scenario.name.contains(filter.as_str()),
            None => true,
        });

        for (index, scenario) in selected.enumerate() {
            let scenario = self.isolate(scenario);
            names.push((scenario.name.clone(), scenario.kind));

            let config = self.config.clone();
            let runner = Arc::clone(&self.runner);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();
                (index, run_scenario(&config, scenario, runner).await)
            });
        }

        info!(
            "Running {} scenarios, at most {} at a time",
            names.len(),
            self.config.max_parallel
        );

        let mut reports: Vec<Option<ScenarioReport>> = vec![None; names.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, report)) => reports[index] = Some(report),
                Err(err) if err.is_panic() => {
                    error!("Scenario task panicked: {}", panic_message(err.into_panic().as_ref()));
                }
                Err(err) => error!("Scenario task failed: {}", err),
            }
        }

        // A panicked task leaves its slot empty
        let scenarios = reports
            .into_iter()
            .zip(names)
            .map(|(report, (name, kind))| {
                report.unwrap_or_else(|| ScenarioReport::errored(name, kind, "scenario panicked"))
            })
            .collect();

        let report = SuiteReport {
            started_at,
            finished_at: Utc::now(),
            scenarios,
        };
        info!(
            "Suite finished: {} passed, {} failed, {} rejected, {} errored",
            report.count(ScenarioStatus::Passed),
            report.count(ScenarioStatus::Failed),
            report.count(ScenarioStatus::Rejected),
            report.count(ScenarioStatus::Errored)
        );
        for leaked in report.leaked() {
            warn!(
                "Scenario {} may have left resource group {} behind (state in {})",
                leaked.name,
                leaked.resource_group.as_deref().unwrap_or("<unknown>"),
                leaked
                    .kept_state_dir
                    .as_deref()
                    .map_or_else(|| "<none>".into(), |dir| dir.display().to_string())
            );
        }
        report
    }
}

/// `<base>-<suffix>`, trimming `base` so the result stays a valid resource group name
pub fn unique_name(base: &str) -> String {
    let suffix: String = Uuid::now_v7()
        .simple()
        .to_string()
        .chars()
        .rev()
        .take(SUFFIX_LEN)
        .collect();
    let max_base = ResourceGroupName::MAX_LENGTH - SUFFIX_LEN - 1;
    let base: String = base.chars().take(max_base).collect();
    format!("{base}-{suffix}")
}

async fn run_scenario<R: CommandRunner>(
    config: &SuiteConfig,
    scenario: Scenario,
    runner: Arc<R>,
) -> ScenarioReport {
    let started = Instant::now();
    info!("Starting scenario {}", scenario.name);

    let mut report = match scenario.kind {
        ScenarioKind::Validate => {
            match validate_definitions(&config.definitions_dir, &config.terraform_binary, runner)
                .await
            {
                Ok(_) => report_for(&scenario, ScenarioStatus::Passed),
                Err(err) => ScenarioReport {
                    error: Some(err.to_string()),
                    ..report_for(&scenario, ScenarioStatus::Errored)
                },
            }
        }
        ScenarioKind::Provision => provision(config, &scenario, runner).await,
    };

    report.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!("Scenario {} finished: {:?}", scenario.name, report.status);
    report
}

async fn provision<R: CommandRunner>(
    config: &SuiteConfig,
    scenario: &Scenario,
    runner: Arc<R>,
) -> ScenarioReport {
    let options = TerraformOptions::new(&config.definitions_dir, scenario.inputs.clone())
        .with_binary(&config.terraform_binary);

    let mut run = match ProvisioningRun::new(options, runner) {
        Ok(run) => run,
        Err(err) => {
            return ScenarioReport {
                error: Some(err.to_string()),
                ..report_for(scenario, ScenarioStatus::Errored)
            }
        }
    };

    let inputs = scenario.inputs.clone();
    let expectations = scenario.expectations.clone();
    let result = run
        .execute(|outputs| async move {
            require(&expectations, &inputs, &outputs)?;
            anyhow::Ok(())
        })
        .await;

    let mut report = match result {
        Ok(()) => report_for(scenario, ScenarioStatus::Passed),
        Err(RunError::Rejected(rejection)) => ScenarioReport {
            failures: rejection.errors.iter().map(ToString::to_string).collect(),
            ..report_for(scenario, ScenarioStatus::Rejected)
        },
        Err(RunError::Check { reason, teardown }) => {
            let mut report = match reason.downcast_ref::<ExpectationFailures>() {
                Some(failures) => ScenarioReport {
                    failures: failures.0.iter().map(ToString::to_string).collect(),
                    ..report_for(scenario, ScenarioStatus::Failed)
                },
                None => ScenarioReport {
                    error: Some(format!("{reason:#}")),
                    ..report_for(scenario, ScenarioStatus::Errored)
                },
            };
            report.teardown_error = teardown.map(|e| e.to_string());
            report
        }
        Err(err) => ScenarioReport {
            error: Some(err.to_string()),
            teardown_error: err.teardown_error().map(ToString::to_string),
            ..report_for(scenario, ScenarioStatus::Errored)
        },
    };

    report.final_state = Some(run.state());
    report.kept_state_dir = run.kept_state_dir().map(Path::to_path_buf);
    report
}

fn report_for(scenario: &Scenario, status: ScenarioStatus) -> ScenarioReport {
    ScenarioReport {
        name: scenario.name.clone(),
        kind: scenario.kind,
        resource_group: scenario.inputs.text(InputName::ResourceGroupName),
        status,
        failures: Vec::new(),
        error: None,
        teardown_error: None,
        kept_state_dir: None,
        final_state: None,
        duration_ms: 0,
    }
}
