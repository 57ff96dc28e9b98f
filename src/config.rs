//! Suite configuration
//!
//! Loaded from a JSON file and optionally overridden by the usual OpenStack
//! `OS_*` environment variables:
//!
//! ```json
//! {
//!   "region": "Spain2",
//!   "auth": {
//!     "type": "keystone_v3",
//!     "auth_url": "http://cloud.lab.fiware.org:4730/v3",
//!     "username": "user@example.com",
//!     "password": "secret",
//!     "project_name": "sanity-project"
//!   },
//!   "swift": {
//!     "resources_path": "resources",
//!     "big_file_url_1": "http://example.com/big-1.bin",
//!     "big_file_url_2": "http://example.com/big-2.bin"
//!   }
//! }
//! ```

use crate::error::{Result, SanityError};
use crate::naming::{NamingStrategy, TEXT_FIXTURE_NAME};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_AUTH_URL: &str = "OS_AUTH_URL";
pub const ENV_USERNAME: &str = "OS_USERNAME";
pub const ENV_PASSWORD: &str = "OS_PASSWORD";
pub const ENV_PROJECT_NAME: &str = "OS_PROJECT_NAME";
pub const ENV_USER_DOMAIN_NAME: &str = "OS_USER_DOMAIN_NAME";
pub const ENV_PROJECT_DOMAIN_NAME: &str = "OS_PROJECT_DOMAIN_NAME";
pub const ENV_REGION_NAME: &str = "OS_REGION_NAME";
pub const ENV_STORAGE_URL: &str = "OS_STORAGE_URL";
pub const ENV_AUTH_TOKEN: &str = "OS_AUTH_TOKEN";

/// Payloads at or below this size are not "big"
pub const DEFAULT_MIN_BIG_OBJECT_SIZE: u64 = 5 * 1024 * 1024;

fn default_domain() -> String {
    "Default".to_string()
}

fn default_interface() -> String {
    "public".to_string()
}

fn default_resources_path() -> PathBuf {
    PathBuf::from("resources")
}

fn default_min_big_object_size() -> u64 {
    DEFAULT_MIN_BIG_OBJECT_SIZE
}

/// Keystone v3 password credentials scoped to a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoneCredentials {
    pub auth_url: String,
    pub username: String,
    pub password: String,
    pub project_name: String,
    #[serde(default = "default_domain")]
    pub user_domain_name: String,
    #[serde(default = "default_domain")]
    pub project_domain_name: String,
    /// Catalog interface to use (public, internal, admin)
    #[serde(default = "default_interface")]
    pub interface: String,
}

impl Default for KeystoneCredentials {
    fn default() -> Self {
        Self {
            auth_url: String::new(),
            username: String::new(),
            password: String::new(),
            project_name: String::new(),
            user_domain_name: default_domain(),
            project_domain_name: default_domain(),
            interface: default_interface(),
        }
    }
}

/// How the client obtains a storage URL and token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    KeystoneV3(KeystoneCredentials),
    TempAuth {
        auth_url: String,
        user: String,
        key: String,
    },
    PreAuth {
        storage_url: String,
        token: String,
    },
}

/// Object storage test settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwiftTestConfig {
    /// Directory holding the text fixture; downloads and fetched fixtures land here too
    #[serde(default = "default_resources_path")]
    pub resources_path: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_file_url_1: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_file_url_2: Option<String>,

    #[serde(default = "default_min_big_object_size")]
    pub min_big_object_size: u64,

    /// Per-request timeout for storage and fixture requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for SwiftTestConfig {
    fn default() -> Self {
        Self {
            resources_path: default_resources_path(),
            big_file_url_1: None,
            big_file_url_2: None,
            min_big_object_size: DEFAULT_MIN_BIG_OBJECT_SIZE,
            request_timeout_secs: None,
        }
    }
}

impl SwiftTestConfig {
    pub fn text_fixture_path(&self) -> PathBuf {
        self.resources_path.join(TEXT_FIXTURE_NAME)
    }
}

/// Configuration for a suite run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanityConfig {
    /// Region whose object-store endpoint is exercised
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    #[serde(default)]
    pub swift: SwiftTestConfig,

    #[serde(default)]
    pub naming: NamingStrategy,
}

impl SanityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SanityError::config_error(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn resources_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.swift.resources_path = path.into();
        self
    }

    pub fn big_file_urls(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.swift.big_file_url_1 = Some(first.into());
        self.swift.big_file_url_2 = Some(second.into());
        self
    }

    pub fn min_big_object_size(mut self, bytes: u64) -> Self {
        self.swift.min_big_object_size = bytes;
        self
    }

    pub fn request_timeout(mut self, secs: u64) -> Self {
        self.swift.request_timeout_secs = Some(secs);
        self
    }

    pub fn naming(mut self, strategy: NamingStrategy) -> Self {
        self.naming = strategy;
        self
    }

    /// Apply `OS_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `OS_*` overrides from any lookup
    ///
    /// `OS_STORAGE_URL` together with `OS_AUTH_TOKEN` switches to
    /// pre-authenticated access; otherwise any Keystone variable present
    /// replaces the matching Keystone field.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(region) = lookup(ENV_REGION_NAME) {
            self.region = Some(region);
        }

        if let (Some(storage_url), Some(token)) = (lookup(ENV_STORAGE_URL), lookup(ENV_AUTH_TOKEN)) {
            self.auth = Some(AuthConfig::PreAuth { storage_url, token });
            return;
        }

        let mut credentials = match &self.auth {
            Some(AuthConfig::KeystoneV3(credentials)) => credentials.clone(),
            _ => KeystoneCredentials::default(),
        };

        let mut touched = false;
        for (key, field) in [
            (ENV_AUTH_URL, &mut credentials.auth_url),
            (ENV_USERNAME, &mut credentials.username),
            (ENV_PASSWORD, &mut credentials.password),
            (ENV_PROJECT_NAME, &mut credentials.project_name),
            (ENV_USER_DOMAIN_NAME, &mut credentials.user_domain_name),
            (ENV_PROJECT_DOMAIN_NAME, &mut credentials.project_domain_name),
        ] {
            if let Some(value) = lookup(key) {
                *field = value;
                touched = true;
            }
        }

        if touched {
            self.auth = Some(AuthConfig::KeystoneV3(credentials));
        }
    }

    /// Check the configuration before connecting
    pub fn validate(&self) -> Result<()> {
        match &self.auth {
            Some(AuthConfig::KeystoneV3(credentials)) => {
                for (name, value) in [
                    ("auth_url", &credentials.auth_url),
                    ("username", &credentials.username),
                    ("password", &credentials.password),
                    ("project_name", &credentials.project_name),
                ] {
                    if value.is_empty() {
                        return Err(SanityError::invalid_parameter(
                            format!("auth.{}", name),
                            "must not be empty",
                        ));
                    }
                }
            }
            Some(AuthConfig::TempAuth { auth_url, .. }) => check_url("auth.auth_url", auth_url)?,
            Some(AuthConfig::PreAuth { storage_url, .. }) => {
                check_url("auth.storage_url", storage_url)?
            }
            None => {}
        }

        if self.swift.min_big_object_size == 0 {
            return Err(SanityError::invalid_parameter(
                "swift.min_big_object_size",
                "must be greater than 0",
            ));
        }

        if let Some(0) = self.swift.request_timeout_secs {
            return Err(SanityError::invalid_parameter(
                "swift.request_timeout_secs",
                "must be greater than 0",
            ));
        }

        for (name, url) in [
            ("swift.big_file_url_1", &self.swift.big_file_url_1),
            ("swift.big_file_url_2", &self.swift.big_file_url_2),
        ] {
            if let Some(url) = url {
                check_url(name, url)?;
            }
        }

        Ok(())
    }
}

fn check_url(parameter: &str, url: &str) -> Result<()> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|e| SanityError::invalid_parameter(parameter, format!("invalid URL {}: {}", url, e)))
}
