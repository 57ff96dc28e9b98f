//! Obtaining a storage URL and token for the Swift API

use crate::config::{AuthConfig, KeystoneCredentials};
use crate::error::{Result, SanityError};
use log::{debug, info};
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;

const OBJECT_STORE_SERVICE: &str = "object-store";
const SUBJECT_TOKEN_HEADER: &str = "x-subject-token";
const AUTH_USER_HEADER: &str = "x-auth-user";
const AUTH_KEY_HEADER: &str = "x-auth-key";
const STORAGE_URL_HEADER: &str = "x-storage-url";
pub(crate) const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Storage endpoint and token for one account
#[derive(Debug, Clone)]
pub struct SwiftSession {
    pub storage_url: Url,
    pub token: String,
}

impl SwiftSession {
    pub fn new(storage_url: &str, token: impl Into<String>) -> Result<Self> {
        let storage_url = Url::parse(storage_url).map_err(|e| {
            SanityError::config_error(format!("Invalid storage URL {}: {}", storage_url, e))
        })?;
        Ok(Self {
            storage_url,
            token: token.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Token,
}

#[derive(Debug, Deserialize)]
struct Token {
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogEntry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

#[derive(Debug, Deserialize)]
struct Endpoint {
    interface: String,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    region_id: Option<String>,
    url: String,
}

impl Endpoint {
    fn in_region(&self, region: &str) -> bool {
        self.region.as_deref() == Some(region) || self.region_id.as_deref() == Some(region)
    }
}

/// Authenticate and resolve the storage URL for `region`
pub async fn authenticate(
    http: &reqwest::Client,
    auth: &AuthConfig,
    region: Option<&str>,
) -> Result<SwiftSession> {
    match auth {
        AuthConfig::KeystoneV3(credentials) => keystone_v3(http, credentials, region).await,
        AuthConfig::TempAuth {
            auth_url,
            user,
            key,
        } => temp_auth(http, auth_url, user, key).await,
        AuthConfig::PreAuth { storage_url, token } => SwiftSession::new(storage_url, token.clone()),
    }
}

async fn keystone_v3(
    http: &reqwest::Client,
    credentials: &KeystoneCredentials,
    region: Option<&str>,
) -> Result<SwiftSession> {
    let url = format!("{}/auth/tokens", credentials.auth_url.trim_end_matches('/'));
    debug!("Requesting Keystone token from {}", url);

    let body = json!({
        "auth": {
            "identity": {
                "methods": ["password"],
                "password": {
                    "user": {
                        "name": credentials.username,
                        "domain": { "name": credentials.user_domain_name },
                        "password": credentials.password,
                    }
                }
            },
            "scope": {
                "project": {
                    "name": credentials.project_name,
                    "domain": { "name": credentials.project_domain_name },
                }
            }
        }
    });

    let response = http.post(&url).json(&body).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SanityError::auth(format!(
            "Keystone rejected credentials for {} with status {}",
            credentials.username, status
        )));
    }

    let token = response
        .headers()
        .get(SUBJECT_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| SanityError::auth("Keystone response has no X-Subject-Token header"))?;

    let parsed: TokenResponse = response.json().await?;
    let endpoint = select_endpoint(&parsed.token.catalog, region, &credentials.interface)?;
    info!(
        "Authenticated as {} (region: {})",
        credentials.username,
        region.unwrap_or("any")
    );

    SwiftSession::new(&endpoint, token)
}

async fn temp_auth(
    http: &reqwest::Client,
    auth_url: &str,
    user: &str,
    key: &str,
) -> Result<SwiftSession> {
    debug!("Requesting TempAuth token from {}", auth_url);

    let response = http
        .get(auth_url)
        .header(AUTH_USER_HEADER, user)
        .header(AUTH_KEY_HEADER, key)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SanityError::auth(format!(
            "TempAuth rejected user {} with status {}",
            user, status
        )));
    }

    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| SanityError::auth(format!("TempAuth response has no {} header", name)))
    };

    let storage_url = header(STORAGE_URL_HEADER)?;
    let token = header(AUTH_TOKEN_HEADER)?;
    info!("Authenticated as {} via TempAuth", user);

    SwiftSession::new(&storage_url, token)
}

/// Pick the object-store endpoint for a region and interface
pub(crate) fn select_endpoint(
    catalog: &[CatalogEntry],
    region: Option<&str>,
    interface: &str,
) -> Result<String> {
    catalog
        .iter()
        .filter(|entry| entry.service_type == OBJECT_STORE_SERVICE)
        .flat_map(|entry| entry.endpoints.iter())
        .filter(|endpoint| endpoint.interface == interface)
        .find(|endpoint| region.map_or(true, |r| endpoint.in_region(r)))
        .map(|endpoint| endpoint.url.clone())
        .ok_or_else(|| {
            SanityError::auth(format!(
                "No {} {} endpoint in catalog for region {}",
                interface,
                OBJECT_STORE_SERVICE,
                region.unwrap_or("any")
            ))
        })
}
