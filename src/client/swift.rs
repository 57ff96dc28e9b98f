//! Swift HTTP API client
//!
//! Plain `reqwest` calls against the storage URL of an account. Status codes
//! are mapped onto the crate's error kinds: 404 becomes `NotFound`, 409
//! becomes `Conflict` and any other non-2xx status is an `OperationFailed`.

use crate::client::auth::{self, SwiftSession, AUTH_TOKEN_HEADER};
use crate::client::types::{ContainerListing, ObjectEntry, ObjectReceipt, ObjectRef};
use crate::client::{Operation, StorageClient};
use crate::config::SanityConfig;
use crate::error::{Result, SanityError};
use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, warn};
use reqwest::header::{CONTENT_LENGTH, ETAG};
use reqwest::{Body, Method, RequestBuilder, Response, StatusCode, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

const USER_AGENT: &str = concat!("swift-sanity/", env!("CARGO_PKG_VERSION"));

/// Client for one Swift account
pub struct SwiftClient {
    http: reqwest::Client,
    session: SwiftSession,
}

impl SwiftClient {
    pub fn new(http: reqwest::Client, session: SwiftSession) -> Self {
        Self { http, session }
    }

    /// Build the HTTP client, authenticate and resolve the region's endpoint
    pub async fn connect(config: &SanityConfig) -> Result<Self> {
        let auth = config
            .auth
            .as_ref()
            .ok_or_else(|| SanityError::config_error("No auth section configured"))?;

        let http = build_http_client(config.swift.request_timeout_secs)?;
        let session = auth::authenticate(&http, auth, config.region.as_deref()).await?;
        debug!("Using storage URL {}", session.storage_url);

        Ok(Self::new(http, session))
    }

    pub fn storage_url(&self) -> &Url {
        &self.session.storage_url
    }

    fn resource_url(&self, segments: &[&str]) -> Result<Url> {
        resource_url(&self.session.storage_url, segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTH_TOKEN_HEADER, &self.session.token)
    }
}

pub fn build_http_client(timeout_secs: Option<u64>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

fn resource_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SanityError::config_error(format!("Storage URL cannot be a base: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Stream a response body into `target`
///
/// A body that fails partway leaves no file behind.
pub(crate) async fn download_to_file(response: Response, target: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(target).await?;
    let mut stream = response.bytes_stream();

    let result = async {
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok::<_, SanityError>(written)
    }
    .await;

    if result.is_err() {
        drop(file);
        match tokio::fs::remove_file(target).await {
            Ok(()) => debug!("Removed partial download {}", target.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Could not remove partial download {}: {}",
                target.display(),
                e
            ),
        }
    }
    result
}

/// Map a response status onto the crate's error kinds
pub(crate) fn check_status(operation: Operation, resource: &str, status: StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::NOT_FOUND => Err(SanityError::not_found(resource)),
        StatusCode::CONFLICT => Err(SanityError::conflict(resource)),
        _ => Err(SanityError::operation_failed(
            operation.as_str(),
            resource,
            format!("unexpected status {}", status),
        )),
    }
}

#[async_trait]
impl StorageClient for SwiftClient {
    async fn create_container(&self, name: &str) -> Result<()> {
        let url = self.resource_url(&[name])?;
        let response = self.request(Method::PUT, url).send().await?;
        check_status(Operation::CreateContainer, name, response.status())?;

        debug!("Created {} container", name);
        Ok(())
    }

    async fn get_container(&self, name: &str) -> Result<ContainerListing> {
        let mut url = self.resource_url(&[name])?;
        url.query_pairs_mut().append_pair("format", "json");

        let response = self.request(Method::GET, url).send().await?;
        let status = response.status();
        check_status(Operation::GetContainer, name, status)?;

        let mut listing = ContainerListing::new(name);
        for (header, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                listing = listing.header(header.as_str(), value);
            }
        }

        let body = response.bytes().await?;
        if status != StatusCode::NO_CONTENT && !body.is_empty() {
            let objects: Vec<ObjectEntry> = serde_json::from_slice(&body)?;
            listing = listing.objects(objects);
        }

        debug!(
            "Got {} container details ({} objects)",
            name,
            listing.objects.len()
        );
        Ok(listing)
    }

    async fn delete_container(&self, name: &str) -> Result<()> {
        let url = self.resource_url(&[name])?;
        let response = self.request(Method::DELETE, url).send().await?;
        check_status(Operation::DeleteContainer, name, response.status())?;

        debug!("Deleted {} container", name);
        Ok(())
    }

    async fn create_object(
        &self,
        container: &str,
        local_path: &Path,
        object_name: &str,
    ) -> Result<ObjectReceipt> {
        let resource = ObjectRef::new(container, object_name).to_string();
        let file = tokio::fs::File::open(local_path).await?;
        let size = file.metadata().await?.len();

        let url = self.resource_url(&[container, object_name])?;
        let response = self
            .request(Method::PUT, url)
            .header(CONTENT_LENGTH, size)
            .body(Body::from(file))
            .send()
            .await?;
        check_status(Operation::CreateObject, &resource, response.status())?;

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim_matches('"').to_string());

        debug!(
            "Created {} object ({})",
            resource,
            bytesize::ByteSize::b(size)
        );
        Ok(ObjectReceipt {
            container: container.to_string(),
            name: object_name.to_string(),
            etag,
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
        let url = self.resource_url(&[container, object_name])?;

        let response = self.request(Method::GET, url).send().await?;
        check_status(Operation::GetObject, &resource, response.status())?;

        let target = destination_dir.join(object_name);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let written = download_to_file(response, &target).await?;

        debug!(
            "Downloaded {} to {} ({})",
            resource,
            target.display(),
            bytesize::ByteSize::b(written)
        );
        Ok(target)
    }

    async fn delete_object(&self, container: &str, object_name: &str) -> Result<()> {
        let resource = ObjectRef::new(container, object_name).to_string();
        let url = self.resource_url(&[container, object_name])?;

        let response = self.request(Method::DELETE, url).send().await?;
        check_status(Operation::DeleteObject, &resource, response.status())?;

        debug!("Deleted {} object", resource);
        Ok(())
    }
}
