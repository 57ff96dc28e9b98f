//! Sequential suite execution
//!
//! Scenarios run one at a time, each with a fresh [`ResourceTracker`].
//! Teardown runs after every scenario whatever its outcome, and a failed
//! scenario never stops the ones after it.

use crate::client::StorageClient;
use crate::config::SwiftTestConfig;
use crate::error::Result;
use crate::fixtures::FixtureProvider;
use crate::naming::ResourceNamer;
use crate::scenario::{Scenario, ScenarioContext};
use crate::tracker::{ResourceTracker, TeardownReport};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// How a scenario ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed { message: String },
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
    pub teardown: TeardownReport,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.outcome.is_passed()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.scenarios.iter().filter(|s| s.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.scenarios.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Resources some teardown could not release
    pub fn leaked(&self) -> Vec<String> {
        self.scenarios
            .iter()
            .flat_map(|s| s.teardown.failures.iter().map(|f| f.resource.clone()))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct SuiteRunner<'a> {
    client: &'a dyn StorageClient,
    fixtures: &'a dyn FixtureProvider,
    settings: &'a SwiftTestConfig,
    namer: ResourceNamer,
    region: Option<String>,
}

impl<'a> SuiteRunner<'a> {
    pub fn new(
        client: &'a dyn StorageClient,
        fixtures: &'a dyn FixtureProvider,
        settings: &'a SwiftTestConfig,
    ) -> Self {
        Self {
            client,
            fixtures,
            settings,
            namer: ResourceNamer::default(),
            region: None,
        }
    }

    pub fn namer(mut self, namer: ResourceNamer) -> Self {
        self.namer = namer;
        self
    }

    pub fn region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    /// Run one scenario and release what it left behind
    pub async fn run_scenario(&self, scenario: Scenario) -> ScenarioReport {
        info!("Running {}: {}", scenario, scenario.description());
        let started = Instant::now();
        let mut tracker = ResourceTracker::new();

        let result = {
            let mut ctx = ScenarioContext {
                client: self.client,
                fixtures: self.fixtures,
                settings: self.settings,
                namer: self.namer,
                tracker: &mut tracker,
            };
            scenario.run(&mut ctx).await
        };

        let teardown = tracker.teardown(self.client).await;
        if !teardown.is_clean() {
            warn!(
                "{} left {} resources behind",
                scenario,
                teardown.failures.len()
            );
        }

        let outcome = match result {
            Ok(()) => {
                info!("{} passed", scenario);
                Outcome::Passed
            }
            Err(e) => {
                error!("{} failed: {}", scenario, e);
                Outcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        ScenarioReport {
            scenario: scenario.name().to_string(),
            outcome,
            duration_ms: started.elapsed().as_millis() as u64,
            teardown,
        }
    }

    /// Run scenarios in order
    pub async fn run(&self, scenarios: &[Scenario]) -> SuiteReport {
        let started_at = Utc::now();
        let started = Instant::now();

        let mut reports = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            reports.push(self.run_scenario(*scenario).await);
        }

        let report = SuiteReport {
            region: self.region.clone(),
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
            scenarios: reports,
        };
        info!(
            "Suite finished: {} passed, {} failed",
            report.passed(),
            report.failed()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::stub::{http_client, Reply, StubServer};
    use crate::client::InMemoryStorage;
    use crate::fixtures::HttpFixtureProvider;

    #[tokio::test]
    async fn test_interrupted_fixture_fetch_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let server = StubServer::start(vec![Reply::status(200)
            .body(vec![7u8; 16])
            .truncated(1 << 20)])
        .await;

        let settings = SwiftTestConfig {
            resources_path: dir.path().to_path_buf(),
            big_file_url_1: Some(server.url("/big-1.bin")),
            big_file_url_2: Some(server.url("/big-2.bin")),
            min_big_object_size: 1,
            request_timeout_secs: None,
        };
        let fixtures = HttpFixtureProvider::new(http_client(), dir.path());
        let storage = InMemoryStorage::new();

        let report = SuiteRunner::new(&storage, &fixtures, &settings)
            .run(&[Scenario::BigObjectRoundTrip])
            .await;

        assert!(!report.scenarios[0].passed());
        assert!(report.scenarios[0].teardown.is_clean());
        assert!(storage.container_names().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&Outcome::Failed {
            message: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"failed","message":"boom"}"#);
    }
}
