//! Types returned by storage clients

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header carrying the number of objects in a container
pub const OBJECT_COUNT_HEADER: &str = "x-container-object-count";
/// Header carrying the bytes stored in a container
pub const BYTES_USED_HEADER: &str = "x-container-bytes-used";

/// A container as returned by a GET on it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerListing {
    pub name: String,
    /// Response headers, names lowercased
    pub headers: BTreeMap<String, String>,
    pub objects: Vec<ObjectEntry>,
}

impl ContainerListing {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set a header, lowercasing its name
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn objects(mut self, objects: Vec<ObjectEntry>) -> Self {
        self.objects = objects;
        self
    }

    /// Value of the object-count header, if the service sent a parseable one
    pub fn object_count(&self) -> Option<u64> {
        self.headers
            .get(OBJECT_COUNT_HEADER)
            .and_then(|v| v.trim().parse().ok())
    }

    pub fn has_object_count(&self) -> bool {
        self.headers.contains_key(OBJECT_COUNT_HEADER)
    }

    pub fn bytes_used(&self) -> Option<u64> {
        self.headers
            .get(BYTES_USED_HEADER)
            .and_then(|v| v.trim().parse().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn bytes_used_string(&self) -> String {
        bytesize::ByteSize::b(self.bytes_used().unwrap_or(0)).to_string()
    }
}

/// One entry of a JSON container listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub name: String,
    #[serde(default)]
    pub bytes: u64,
    /// MD5 of the content as computed by the service
    #[serde(default)]
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// Outcome of a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectReceipt {
    pub container: String,
    pub name: String,
    /// ETag header of the PUT response
    pub etag: Option<String>,
    pub size: u64,
}

/// A remote object, `container/object`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub container: String,
    pub name: String,
}

impl ObjectRef {
    pub fn new(container: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.container, self.name)
    }
}
