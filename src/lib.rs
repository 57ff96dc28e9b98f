pub mod client;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod integrity;
pub mod logging;
pub mod naming;
pub mod runner;
pub mod scenario;
pub mod tracker;

pub use client::{
    ContainerListing, InMemoryStorage, ObjectEntry, ObjectReceipt, ObjectRef, Operation,
    StorageClient, SwiftClient, SwiftSession,
};

pub use config::{AuthConfig, KeystoneCredentials, SanityConfig, SwiftTestConfig};

pub use error::{Expectation, Result, SanityError};

pub use fixtures::{Fixture, FixtureProvider, FixtureSource, HttpFixtureProvider};

pub use integrity::{verify_distinct, verify_equal, Digest};

pub use logging::LogLevel;

pub use naming::{NamingStrategy, Resolution, ResourceNamer};

pub use runner::{Outcome, ScenarioReport, SuiteReport, SuiteRunner};

pub use scenario::{Scenario, ScenarioContext};

pub use tracker::{ResourceTracker, TeardownFailure, TeardownReport};
