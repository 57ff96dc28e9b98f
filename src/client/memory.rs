//! In-process object store
//!
//! Mirrors the Swift semantics the scenarios rely on: container creation is
//! idempotent, deleting a non-empty container is a conflict, and every call on
//! a missing resource is `NotFound`. Failures can be injected per operation.
//! Corrupted downloads and ignored deletes let the harness's own negative
//! paths be exercised without a live service.

use crate::client::types::{
    ContainerListing, ObjectEntry, ObjectReceipt, ObjectRef, BYTES_USED_HEADER, OBJECT_COUNT_HEADER,
};
use crate::client::{Operation, StorageClient};
use crate::error::{Result, SanityError};
use crate::integrity::Digest;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// A call recorded by [`InMemoryStorage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    pub resource: String,
}

#[derive(Default)]
struct State {
    containers: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    failures: HashSet<Operation>,
    corrupt_downloads: bool,
    ignore_deletes: bool,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct InMemoryStorage {
    state: Mutex<State>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every call of `operation` fail until cleared
    pub fn fail_on(&self, operation: Operation) {
        self.state().failures.insert(operation);
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Flip the first byte of every downloaded payload
    pub fn corrupt_downloads(&self, enabled: bool) {
        self.state().corrupt_downloads = enabled;
    }

    /// Acknowledge deletes without removing anything
    pub fn ignore_deletes(&self, enabled: bool) {
        self.state().ignore_deletes = enabled;
    }

    pub fn container_names(&self) -> Vec<String> {
        self.state().containers.keys().cloned().collect()
    }

    pub fn object_names(&self, container: &str) -> Option<Vec<String>> {
        self.state()
            .containers
            .get(container)
            .map(|objects| objects.keys().cloned().collect())
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Record the call and fail it if a failure is injected
    fn enter(&self, operation: Operation, resource: &str) -> Result<MutexGuard<'_, State>> {
        let mut state = self.state();
        state.calls.push(Call {
            operation,
            resource: resource.to_string(),
        });

        if state.failures.contains(&operation) {
            return Err(SanityError::operation_failed(
                operation.as_str(),
                resource,
                "injected failure",
            ));
        }
        Ok(state)
    }
}

#[async_trait]
impl StorageClient for InMemoryStorage {
    async fn create_container(&self, name: &str) -> Result<()> {
        let mut state = self.enter(Operation::CreateContainer, name)?;
        state.containers.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn get_container(&self, name: &str) -> Result<ContainerListing> {
        let state = self.enter(Operation::GetContainer, name)?;
        let objects = state
            .containers
            .get(name)
            .ok_or_else(|| SanityError::not_found(name))?;

        let entries = objects
            .iter()
            .map(|(object_name, payload)| ObjectEntry {
                name: object_name.clone(),
                bytes: payload.len() as u64,
                hash: Digest::of_bytes(payload).to_string(),
                content_type: None,
                last_modified: None,
            })
            .collect::<Vec<_>>();
        let bytes_used: u64 = entries.iter().map(|e| e.bytes).sum();

        Ok(ContainerListing::new(name)
            .header(OBJECT_COUNT_HEADER, entries.len().to_string())
            .header(BYTES_USED_HEADER, bytes_used.to_string())
            .objects(entries))
    }

    async fn delete_container(&self, name: &str) -> Result<()> {
        let mut state = self.enter(Operation::DeleteContainer, name)?;
        if state.ignore_deletes {
            return Ok(());
        }
        let empty = state.containers.get(name).map(BTreeMap::is_empty);
        match empty {
            None => Err(SanityError::not_found(name)),
            Some(false) => Err(SanityError::conflict(name)),
            Some(true) => {
                state.containers.remove(name);
                Ok(())
            }
        }
    }

    async fn create_object(
        &self,
        container: &str,
        local_path: &Path,
        object_name: &str,
    ) -> Result<ObjectReceipt> {
        let resource = ObjectRef::new(container, object_name).to_string();
        self.enter(Operation::CreateObject, &resource)?;

        let payload = tokio::fs::read(local_path).await?;
        let size = payload.len() as u64;
        let etag = Digest::of_bytes(&payload).to_string();

        let mut state = self.state();
        let objects = state
            .containers
            .get_mut(container)
            .ok_or_else(|| SanityError::not_found(container))?;
        objects.insert(object_name.to_string(), payload);

        Ok(ObjectReceipt {
            container: container.to_string(),
            name: object_name.to_string(),
            etag: Some(etag),
            size,
        })
    }

    async fn get_object(
        &self,
        container: &str,
        object_name: &str,
        destination_dir: &Path,
    ) -> Result<PathBuf> {
        let resource = ObjectRef::new(container, object_name).to_string();
        let payload = {
            let state = self.enter(Operation::GetObject, &resource)?;
            let payload = state
                .containers
                .get(container)
                .and_then(|objects| objects.get(object_name))
                .cloned()
                .ok_or_else(|| SanityError::not_found(resource.as_str()))?;
            if state.corrupt_downloads {
                corrupt(payload)
            } else {
                payload
            }
        };

        let target = destination_dir.join(object_name);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &payload).await?;
        Ok(target)
    }

    async fn delete_object(&self, container: &str, object_name: &str) -> Result<()> {
        let resource = ObjectRef::new(container, object_name).to_string();
        let mut state = self.enter(Operation::DeleteObject, &resource)?;
        if state.ignore_deletes {
            return Ok(());
        }
        state
            .containers
            .get_mut(container)
            .and_then(|objects| objects.remove(object_name))
            .map(|_| ())
            .ok_or_else(|| SanityError::not_found(resource))
    }
}

fn corrupt(mut payload: Vec<u8>) -> Vec<u8> {
    match payload.first_mut() {
        Some(byte) => *byte ^= 0xff,
        None => payload.push(0),
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_container_lifecycle() {
        let storage = InMemoryStorage::new();

        assert_ok!(storage.create_container("c").await);
        assert_ok!(storage.create_container("c").await);

        let listing = storage.get_container("c").await.unwrap();
        assert_eq!(listing.object_count(), Some(0));
        assert!(listing.is_empty());

        assert_ok!(storage.delete_container("c").await);
        assert!(storage.get_container("c").await.unwrap_err().is_not_found());
        assert!(storage.delete_container("c").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_object_round_trip_and_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.txt");
        std::fs::write(&source, b"payload").unwrap();
        let storage = InMemoryStorage::new();

        assert_ok!(storage.create_container("c").await);
        let receipt = storage.create_object("c", &source, "o.txt").await.unwrap();
        assert_eq!(receipt.size, 7);

        let listing = storage.get_container("c").await.unwrap();
        assert_eq!(listing.object_count(), Some(1));
        assert_eq!(listing.bytes_used(), Some(7));

        let err = storage.delete_container("c").await.unwrap_err();
        assert!(matches!(err, SanityError::Conflict { .. }));

        let out = dir.path().join("out");
        let path = storage.get_object("c", "o.txt", &out).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"payload");

        assert_ok!(storage.delete_object("c", "o.txt").await);
        assert!(storage
            .get_object("c", "o.txt", &out)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_upload_into_missing_container() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.txt");
        std::fs::write(&source, b"x").unwrap();

        let storage = InMemoryStorage::new();
        let err = storage.create_object("nope", &source, "o").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_injected_failure_and_calls() {
        let storage = InMemoryStorage::new();
        storage.fail_on(Operation::CreateContainer);

        let err = assert_err!(storage.create_container("c").await);
        assert!(matches!(err, SanityError::OperationFailed { .. }));
        assert!(storage.container_names().is_empty());

        storage.clear_failures();
        assert_ok!(storage.create_container("c").await);

        let calls = storage.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls
            .iter()
            .all(|c| c.operation == Operation::CreateContainer && c.resource == "c"));
    }

    #[tokio::test]
    async fn test_ignored_deletes_keep_resources() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.txt");
        std::fs::write(&source, b"x").unwrap();

        let storage = InMemoryStorage::new();
        storage.create_container("c").await.unwrap();
        storage.create_object("c", &source, "o").await.unwrap();
        storage.ignore_deletes(true);

        assert_ok!(storage.delete_object("c", "o").await);
        assert_ok!(storage.delete_container("c").await);
        assert_eq!(storage.object_names("c"), Some(vec!["o".to_string()]));

        storage.ignore_deletes(false);
        assert_ok!(storage.delete_object("c", "o").await);
        assert_ok!(storage.delete_container("c").await);
        assert!(storage.container_names().is_empty());
    }

    #[test]
    fn test_corrupt_changes_payload() {
        assert_ne!(corrupt(b"abc".to_vec()), b"abc".to_vec());
        assert_eq!(corrupt(Vec::new()), vec![0]);
    }
}
