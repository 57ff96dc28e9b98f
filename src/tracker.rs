//! Manifest of resources created by a scenario
//!
//! Every container, uploaded object and local file a scenario creates is
//! registered here and unregistered once the scenario removes it itself.
//! Whatever is still registered when the scenario ends is released by
//! [`ResourceTracker::teardown`]: objects first, then their containers, then
//! local files, newest first within each group.

use crate::client::{ObjectRef, StorageClient};
use crate::error::{Result, SanityError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    containers: Vec<String>,
    objects: Vec<ObjectRef>,
    local_files: Vec<PathBuf>,
}

/// A resource teardown could not release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownFailure {
    pub resource: String,
    pub message: String,
}

/// What teardown released and what it left behind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownReport {
    pub released: Vec<String>,
    pub failures: Vec<TeardownFailure>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn release(&mut self, resource: String) {
        debug!("Released {}", resource);
        self.released.push(resource);
    }

    fn fail(&mut self, resource: String, error: &SanityError) {
        warn!("Could not release {}: {}", resource, error);
        self.failures.push(TeardownFailure {
            resource,
            message: error.to_string(),
        });
    }
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) -> bool {
    if items.contains(&item) {
        return false;
    }
    items.push(item);
    true
}

fn remove_item<T: PartialEq>(items: &mut Vec<T>, item: &T) -> bool {
    match items.iter().position(|i| i == item) {
        Some(index) => {
            items.remove(index);
            true
        }
        None => false,
    }
}

/// A delete that hits nothing has nothing left to release
fn released(result: Result<()>) -> Result<()> {
    match result {
        Err(e) if e.is_not_found() => Ok(()),
        other => other,
    }
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_container(&mut self, name: &str) -> bool {
        push_unique(&mut self.containers, name.to_string())
    }

    pub fn untrack_container(&mut self, name: &str) -> bool {
        remove_item(&mut self.containers, &name.to_string())
    }

    pub fn track_object(&mut self, container: &str, name: &str) -> bool {
        push_unique(&mut self.objects, ObjectRef::new(container, name))
    }

    pub fn untrack_object(&mut self, container: &str, name: &str) -> bool {
        remove_item(&mut self.objects, &ObjectRef::new(container, name))
    }

    pub fn track_local_file(&mut self, path: &Path) -> bool {
        push_unique(&mut self.local_files, path.to_path_buf())
    }

    pub fn untrack_local_file(&mut self, path: &Path) -> bool {
        remove_item(&mut self.local_files, &path.to_path_buf())
    }

    pub fn containers(&self) -> &[String] {
        &self.containers
    }

    pub fn objects(&self) -> &[ObjectRef] {
        &self.objects
    }

    pub fn local_files(&self) -> &[PathBuf] {
        &self.local_files
    }

    pub fn len(&self) -> usize {
        self.containers.len() + self.objects.len() + self.local_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release everything still registered
    ///
    /// Resources that could not be released stay registered, in their
    /// original order, and are listed in the report.
    pub async fn teardown(&mut self, client: &dyn StorageClient) -> TeardownReport {
        let mut report = TeardownReport::default();

        let mut kept = Vec::new();
        for object in std::mem::take(&mut self.objects).into_iter().rev() {
            match released(client.delete_object(&object.container, &object.name).await) {
                Ok(()) => report.release(object.to_string()),
                Err(e) => {
                    report.fail(object.to_string(), &e);
                    kept.push(object);
                }
            }
        }
        kept.reverse();
        self.objects = kept;

        let mut kept = Vec::new();
        for container in std::mem::take(&mut self.containers).into_iter().rev() {
            match released(delete_container(client, &container).await) {
                Ok(()) => report.release(container),
                Err(e) => {
                    report.fail(container.clone(), &e);
                    kept.push(container);
                }
            }
        }
        kept.reverse();
        self.containers = kept;

        let mut kept = Vec::new();
        for path in std::mem::take(&mut self.local_files).into_iter().rev() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => report.release(path.display().to_string()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    report.release(path.display().to_string())
                }
                Err(e) => {
                    report.fail(path.display().to_string(), &SanityError::from(e));
                    kept.push(path);
                }
            }
        }
        kept.reverse();
        self.local_files = kept;

        report
    }
}

/// Delete a container, emptying it first if the service reports a conflict
async fn delete_container(client: &dyn StorageClient, name: &str) -> Result<()> {
    match client.delete_container(name).await {
        Err(SanityError::Conflict { .. }) => {
            let listing = client.get_container(name).await?;
            warn!(
                "Container {} still holds {} untracked objects, removing them",
                name,
                listing.objects.len()
            );
            for entry in &listing.objects {
                released(client.delete_object(name, &entry.name).await)?;
            }
            client.delete_container(name).await
        }
        other => other,
    }
}
