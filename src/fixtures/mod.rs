//! Upload payloads
//!
//! A fixture is either a local file shipped with the suite or a remote file
//! fetched over HTTP into the resources directory before use. Fetched copies
//! are reported as `materialized` so the scenario can track them for cleanup.

pub mod remote;

use crate::error::{Result, SanityError};
use crate::integrity::Digest;
use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};

pub use remote::HttpFixtureProvider;

/// Where a fixture comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureSource {
    /// A file already on disk
    Local(PathBuf),
    /// A URL to fetch into the working directory under `file_name`
    Remote { url: String, file_name: String },
}

impl FixtureSource {
    pub fn local<P: Into<PathBuf>>(path: P) -> Self {
        FixtureSource::Local(path.into())
    }

    pub fn remote(url: impl Into<String>, file_name: impl Into<String>) -> Self {
        FixtureSource::Remote {
            url: url.into(),
            file_name: file_name.into(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            FixtureSource::Local(path) => path.display().to_string(),
            FixtureSource::Remote { url, .. } => url.clone(),
        }
    }
}

/// A payload ready to upload
#[derive(Debug, Clone)]
pub struct Fixture {
    pub source: FixtureSource,
    pub path: PathBuf,
    pub size: u64,
    pub digest: Digest,
    /// The provider wrote `path`; it should be removed after the run
    pub materialized: bool,
}

impl Fixture {
    /// Describe a file already on disk
    pub async fn from_path(source: FixtureSource, path: &Path, materialized: bool) -> Result<Self> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| SanityError::fixture(source.label(), e.to_string()))?;
        if !metadata.is_file() {
            return Err(SanityError::fixture(
                source.label(),
                format!("{} is not a file", path.display()),
            ));
        }

        let digest = Digest::of_file(path).await?;
        let fixture = Fixture {
            source,
            path: path.to_path_buf(),
            size: metadata.len(),
            digest,
            materialized,
        };
        debug!(
            "Fixture {} ready at {} ({})",
            fixture.source.label(),
            fixture.path.display(),
            fixture.size_string()
        );
        Ok(fixture)
    }

    pub fn size_string(&self) -> String {
        bytesize::ByteSize::b(self.size).to_string()
    }
}

/// Resolves fixture sources to local files
#[async_trait]
pub trait FixtureProvider: Send + Sync {
    async fn materialize(&self, source: &FixtureSource) -> Result<Fixture>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swift-test-object.txt");
        std::fs::write(&path, b"hello swift").unwrap();

        let fixture = Fixture::from_path(FixtureSource::local(&path), &path, false)
            .await
            .unwrap();

        assert_eq!(fixture.size, 11);
        assert_eq!(fixture.digest, Digest::of_bytes(b"hello swift"));
        assert!(!fixture.materialized);
    }

    #[tokio::test]
    async fn test_from_path_missing_or_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");

        let err = Fixture::from_path(FixtureSource::local(&missing), &missing, false)
            .await
            .unwrap_err();
        assert!(matches!(err, SanityError::Fixture { .. }));

        let err = Fixture::from_path(FixtureSource::local(dir.path()), dir.path(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, SanityError::Fixture { .. }));
    }
}
