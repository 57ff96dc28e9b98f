//! Behavioral checks against the object store
//!
//! Each scenario receives a [`ScenarioContext`] holding the storage client,
//! the fixture provider and the resource tracker it must register every
//! created resource with. A scenario stops at its first failed check; the
//! runner releases whatever it left registered.
//!
//! ## Scenarios
//!
//! - [`Scenario::CreateContainer`] - a new container exists and is empty
//! - [`Scenario::DeleteContainer`] - a deleted container is gone
//! - [`Scenario::TextObjectRoundTrip`] - a text object downloads unchanged
//! - [`Scenario::DeleteObject`] - a deleted object is gone
//! - [`Scenario::BigObjectRoundTrip`] - a large object downloads unchanged
//!   and differs from another large payload

pub mod container;
pub mod object;

use crate::client::{ObjectReceipt, ObjectRef, Operation, StorageClient};
use crate::config::SwiftTestConfig;
use crate::error::{Result, SanityError};
use crate::fixtures::{Fixture, FixtureProvider, FixtureSource};
use crate::naming::{self, ResourceNamer};
use crate::tracker::ResourceTracker;
use log::debug;
use std::path::PathBuf;
use std::str::FromStr;

/// Everything a scenario may touch
pub struct ScenarioContext<'a> {
    pub client: &'a dyn StorageClient,
    pub fixtures: &'a dyn FixtureProvider,
    pub settings: &'a SwiftTestConfig,
    pub namer: ResourceNamer,
    pub tracker: &'a mut ResourceTracker,
}

impl ScenarioContext<'_> {
    /// Create a container named after `suffix` and register it
    pub async fn create_tracked_container(&mut self, suffix: &str) -> Result<String> {
        let name = naming::container_name(suffix);
        self.client.create_container(&name).await.map_err(|e| {
            SanityError::operation_failed(
                Operation::CreateContainer.as_str(),
                name.as_str(),
                format!("Container could not be created: {}", e),
            )
        })?;

        self.tracker.track_container(&name);
        debug!("Created {} container", name);
        Ok(name)
    }

    /// Resolve a fixture, registering it when the provider wrote it
    pub async fn materialize_tracked(&mut self, source: &FixtureSource) -> Result<Fixture> {
        let fixture = self.fixtures.materialize(source).await?;
        if fixture.materialized {
            self.tracker.track_local_file(&fixture.path);
        }
        Ok(fixture)
    }

    /// Upload a fixture and register the object
    pub async fn upload_tracked(
        &mut self,
        container: &str,
        fixture: &Fixture,
        object_name: &str,
    ) -> Result<ObjectReceipt> {
        let resource = ObjectRef::new(container, object_name).to_string();
        let receipt = self
            .client
            .create_object(container, &fixture.path, object_name)
            .await
            .map_err(|e| {
                SanityError::operation_failed(
                    Operation::CreateObject.as_str(),
                    resource.as_str(),
                    format!("Object could not be created: {}", e),
                )
            })?;

        self.tracker.track_object(container, object_name);
        debug!("Created {} object ({})", resource, fixture.size_string());
        Ok(receipt)
    }

    /// Download an object into the resources directory and register the copy
    pub async fn download_tracked(&mut self, container: &str, object_name: &str) -> Result<PathBuf> {
        let resource = ObjectRef::new(container, object_name).to_string();
        let path = self
            .client
            .get_object(container, object_name, &self.settings.resources_path)
            .await
            .map_err(|e| {
                SanityError::operation_failed(
                    Operation::GetObject.as_str(),
                    resource.as_str(),
                    format!("Object could not be downloaded: {}", e),
                )
            })?;

        self.tracker.track_local_file(&path);
        Ok(path)
    }
}

/// Turn the outcome of a call on a deleted resource into a check
///
/// `NotFound` is the expected outcome. Success means the resource survived
/// its deletion; any other error is reported as such.
pub fn expect_not_found<T>(result: Result<T>, operation: Operation, resource: &str) -> Result<()> {
    match result {
        Err(e) if e.is_not_found() => {
            debug!("{} was successfully removed from the object storage", resource);
            Ok(())
        }
        Err(e) => Err(SanityError::operation_failed(
            operation.as_str(),
            resource,
            format!("expected not found, got: {}", e),
        )),
        Ok(_) => Err(SanityError::operation_failed(
            operation.as_str(),
            resource,
            "resource still exists after deletion",
        )),
    }
}

/// The checks this suite can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    CreateContainer,
    DeleteContainer,
    TextObjectRoundTrip,
    DeleteObject,
    BigObjectRoundTrip,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::CreateContainer,
        Scenario::DeleteContainer,
        Scenario::TextObjectRoundTrip,
        Scenario::DeleteObject,
        Scenario::BigObjectRoundTrip,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::CreateContainer => "create_container",
            Scenario::DeleteContainer => "delete_container",
            Scenario::TextObjectRoundTrip => "create_text_object_and_download_it",
            Scenario::DeleteObject => "delete_an_object_from_a_container",
            Scenario::BigObjectRoundTrip => "create_big_object_and_download_it",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::CreateContainer => "Create a new container in the object storage",
            Scenario::DeleteContainer => "Delete a container",
            Scenario::TextObjectRoundTrip => "Upload a text file and download it",
            Scenario::DeleteObject => "Delete an object from a container",
            Scenario::BigObjectRoundTrip => "Upload a big file (more than 5MB) and download it",
        }
    }

    pub async fn run(&self, ctx: &mut ScenarioContext<'_>) -> Result<()> {
        match self {
            Scenario::CreateContainer => container::create_container(ctx).await,
            Scenario::DeleteContainer => container::delete_container(ctx).await,
            Scenario::TextObjectRoundTrip => object::text_object_round_trip(ctx).await,
            Scenario::DeleteObject => object::delete_object(ctx).await,
            Scenario::BigObjectRoundTrip => object::big_object_round_trip(ctx).await,
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = SanityError;

    fn from_str(s: &str) -> Result<Self> {
        Scenario::ALL
            .iter()
            .copied()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| {
                SanityError::invalid_parameter("scenario", format!("unknown scenario: {}", s))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_not_found() {
        let gone: Result<()> = Err(SanityError::not_found("c"));
        assert!(expect_not_found(gone, Operation::GetContainer, "c").is_ok());

        let still_there: Result<()> = Ok(());
        let err = expect_not_found(still_there, Operation::GetContainer, "c").unwrap_err();
        assert!(matches!(err, SanityError::OperationFailed { .. }));

        let wrong_kind: Result<()> = Err(SanityError::conflict("c"));
        let err = expect_not_found(wrong_kind, Operation::GetContainer, "c").unwrap_err();
        assert!(err.to_string().contains("expected not found"));
    }

    #[test]
    fn test_scenario_names_parse_back() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.name().parse::<Scenario>().unwrap(), scenario);
        }
        assert!("no_such_scenario".parse::<Scenario>().is_err());
    }
}
