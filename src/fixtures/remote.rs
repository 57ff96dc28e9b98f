//! Default fixture provider
//!
//! Local sources are used in place. Remote sources are streamed into the
//! working directory; `file://` URLs are copied, which allows fully offline
//! runs against the in-memory backend. An interrupted transfer leaves
//! nothing in the working directory.

use crate::client::swift::{build_http_client, download_to_file};
use crate::error::{Result, SanityError};
use crate::fixtures::{Fixture, FixtureProvider, FixtureSource};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Url;
use std::path::{Path, PathBuf};

pub struct HttpFixtureProvider {
    http: reqwest::Client,
    work_dir: PathBuf,
}

impl HttpFixtureProvider {
    pub fn new(http: reqwest::Client, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            http,
            work_dir: work_dir.into(),
        }
    }

    /// Provider with its own HTTP client
    pub fn with_timeout(work_dir: impl Into<PathBuf>, timeout_secs: Option<u64>) -> Result<Self> {
        Ok(Self::new(build_http_client(timeout_secs)?, work_dir))
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    async fn fetch(&self, url: &str, dest_path: &Path) -> Result<u64> {
        let parsed = Url::parse(url)
            .map_err(|e| SanityError::fixture(url, format!("invalid URL: {}", e)))?;

        if parsed.scheme() == "file" {
            let source = parsed
                .to_file_path()
                .map_err(|_| SanityError::fixture(url, "not a local file path"))?;
            return tokio::fs::copy(&source, dest_path)
                .await
                .map_err(|e| SanityError::fixture(url, e.to_string()));
        }

        debug!("Fetching fixture {} to {}", url, dest_path.display());
        let response = self.http.get(parsed).send().await?;
        if !response.status().is_success() {
            return Err(SanityError::fixture(
                url,
                format!("download failed with status {}", response.status()),
            ));
        }

        download_to_file(response, dest_path).await
    }
}

#[async_trait]
impl FixtureProvider for HttpFixtureProvider {
    async fn materialize(&self, source: &FixtureSource) -> Result<Fixture> {
        match source {
            FixtureSource::Local(path) => Fixture::from_path(source.clone(), path, false).await,
            FixtureSource::Remote { url, file_name } => {
                tokio::fs::create_dir_all(&self.work_dir).await?;
                let dest_path = self.work_dir.join(file_name);

                let copied = self.fetch(url, &dest_path).await?;
                info!(
                    "Fetched {} ({})",
                    url,
                    bytesize::ByteSize::b(copied)
                );

                Fixture::from_path(source.clone(), &dest_path, true).await
            }
        }
    }
}
