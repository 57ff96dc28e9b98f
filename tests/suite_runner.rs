//! Suite runner integration tests
//!
//! The runner must release every scenario's resources whatever the outcome
//! and keep going after a failed scenario.

mod common;

use common::Workspace;
use swift_sanity::{
    InMemoryStorage, NamingStrategy, Operation, Outcome, ResourceNamer, Scenario, SuiteReport,
    SuiteRunner,
};

#[tokio::test]
async fn test_full_suite_passes_and_leaves_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::try_init();
    let workspace = Workspace::new();
    let storage = InMemoryStorage::new();

    let report = SuiteRunner::new(&storage, &workspace.fixtures, &workspace.settings)
        .region(Some("Spain2".to_string()))
        .run(&Scenario::ALL)
        .await;

    for scenario in &report.scenarios {
        assert_eq!(
            scenario.outcome,
            Outcome::Passed,
            "{} did not pass",
            scenario.scenario
        );
        assert!(scenario.teardown.is_clean());
    }
    assert!(report.is_success());
    assert_eq!(report.passed(), Scenario::ALL.len());
    assert!(report.leaked().is_empty());
    assert!(storage.container_names().is_empty());
    assert!(workspace.leftover_files().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_failed_scenario_is_cleaned_and_suite_continues() {
    let _ = env_logger::try_init();
    let workspace = Workspace::new();
    let storage = InMemoryStorage::new();
    storage.corrupt_downloads(true);

    let runner = SuiteRunner::new(&storage, &workspace.fixtures, &workspace.settings)
        .namer(ResourceNamer::new(NamingStrategy::TimestampWithToken));
    let report = runner
        .run(&[
            Scenario::TextObjectRoundTrip,
            Scenario::CreateContainer,
            Scenario::DeleteObject,
        ])
        .await;

    assert_eq!(report.scenarios.len(), 3);
    assert!(matches!(
        report.scenarios[0].outcome,
        Outcome::Failed { .. }
    ));
    assert!(report.scenarios[1].passed());
    assert!(report.scenarios[2].passed());
    assert_eq!(report.failed(), 1);
    assert!(!report.is_success());

    // The failed round trip still released its container, object and download
    assert_eq!(report.scenarios[0].teardown.released.len(), 3);
    assert!(storage.container_names().is_empty());
    assert!(workspace.leftover_files().is_empty());
}

#[tokio::test]
async fn test_objects_are_released_before_their_container() {
    let _ = env_logger::try_init();
    let workspace = Workspace::new();
    let storage = InMemoryStorage::new();

    let report = SuiteRunner::new(&storage, &workspace.fixtures, &workspace.settings)
        .run(&[Scenario::TextObjectRoundTrip])
        .await;
    assert!(report.is_success());

    let deletes: Vec<Operation> = storage
        .calls()
        .into_iter()
        .map(|call| call.operation)
        .filter(|op| matches!(op, Operation::DeleteObject | Operation::DeleteContainer))
        .collect();
    assert_eq!(
        deletes,
        vec![Operation::DeleteObject, Operation::DeleteContainer]
    );
}

#[tokio::test]
async fn test_leaked_resources_are_reported() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::try_init();
    let workspace = Workspace::new();
    let storage = InMemoryStorage::new();
    storage.fail_on(Operation::DeleteContainer);

    let report = SuiteRunner::new(&storage, &workspace.fixtures, &workspace.settings)
        .run(&[Scenario::CreateContainer])
        .await;

    // The scenario itself passed; only its cleanup failed
    assert!(report.scenarios[0].passed());
    let leaked = report.leaked();
    assert_eq!(leaked.len(), 1);
    assert!(leaked[0].starts_with("test-container-"));

    let json = report.to_json()?;
    let parsed: SuiteReport = serde_json::from_str(&json)?;
    assert_eq!(parsed.scenarios[0].scenario, "create_container");
    assert_eq!(parsed.scenarios[0].teardown.failures.len(), 1);
    Ok(())
}
