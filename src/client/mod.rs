//! Storage clients used by the scenarios
//!
//! The scenarios only talk to the [`StorageClient`] trait. Two
//! implementations are provided:
//!
//! - [`SwiftClient`] - the Swift HTTP API, authenticated through Keystone v3,
//!   TempAuth or a pre-issued token
//! - [`InMemoryStorage`] - an in-process store with the same observable
//!   behavior and failure injection, for offline runs and tests
//!
//! Every call that targets a missing container or object fails with
//! [`SanityError::NotFound`](crate::error::SanityError::NotFound).

pub mod auth;
pub mod memory;
pub mod swift;
pub mod types;

#[cfg(test)]
pub(crate) mod stub;

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use auth::SwiftSession;
pub use memory::{Call, InMemoryStorage};
pub use swift::SwiftClient;
pub use types::{ContainerListing, ObjectEntry, ObjectReceipt, ObjectRef};

/// Operations a storage client exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateContainer,
    GetContainer,
    DeleteContainer,
    CreateObject,
    GetObject,
    DeleteObject,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateContainer => "create_container",
            Operation::GetContainer => "get_container",
            Operation::DeleteContainer => "delete_container",
            Operation::CreateObject => "create_object",
            Operation::GetObject => "get_object",
            Operation::DeleteObject => "delete_object",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container and object CRUD against an object store
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Create a container; creating an existing one is not an error
    async fn create_container(&self, name: &str) -> Result<()>;

    /// Container headers and its object listing
    async fn get_container(&self, name: &str) -> Result<ContainerListing>;

    /// Delete an empty container
    async fn delete_container(&self, name: &str) -> Result<()>;

    /// Upload the file at `local_path` as `object_name`
    async fn create_object(
        &self,
        container: &str,
        local_path: &Path,
        object_name: &str,
    ) -> Result<ObjectReceipt>;

    /// Download an object into `destination_dir`, keeping its name
    ///
    /// Returns the path of the written file.
    async fn get_object(
        &self,
        container: &str,
        object_name: &str,
        destination_dir: &Path,
    ) -> Result<PathBuf>;

    async fn delete_object(&self, container: &str, object_name: &str) -> Result<()>;
}
