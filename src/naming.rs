//! Names for ephemeral containers, objects and local fixture copies
//!
//! Every name carries a UTC timestamp suffix so that runs against the same
//! account (for instance one process per region) do not collide. A short
//! random token is appended by default; it can be turned off to get the
//! bare `test-container-20240101120000` form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CONTAINER_PREFIX: &str = "test-container-";
pub const TEXT_OBJECT_PREFIX: &str = "test-object-";
pub const TEXT_FILE_EXTENSION: &str = ".txt";
pub const BIG_OBJECT_PREFIX: &str = "test-big-object";
pub const BIG_FILE_EXTENSION: &str = ".bin";
pub const BIG_CONTROL_MARKER: &str = "control";
/// Local text fixture shipped in the resources directory
pub const TEXT_FIXTURE_NAME: &str = "swift-test-object.txt";

const TOKEN_LEN: usize = 8;

/// Timestamp precision of a suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// `%Y%m%d%H%M%S`
    Seconds,
    /// `%Y%m%d%H%M%S` followed by microseconds
    SubSecond,
}

impl Resolution {
    fn format(self) -> &'static str {
        match self {
            Resolution::Seconds => "%Y%m%d%H%M%S",
            Resolution::SubSecond => "%Y%m%d%H%M%S%6f",
        }
    }
}

/// How names are made unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    /// Timestamp only
    Timestamp,
    /// Timestamp plus a random token
    TimestampWithToken,
}

impl Default for NamingStrategy {
    fn default() -> Self {
        NamingStrategy::TimestampWithToken
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceNamer {
    strategy: NamingStrategy,
}

impl ResourceNamer {
    pub fn new(strategy: NamingStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> NamingStrategy {
        self.strategy
    }

    /// Suffix for the current instant
    pub fn suffix(&self, resolution: Resolution) -> String {
        self.suffix_at(Utc::now(), resolution)
    }

    /// Suffix for a given instant
    pub fn suffix_at(&self, at: DateTime<Utc>, resolution: Resolution) -> String {
        let stamp = at.format(resolution.format()).to_string();
        match self.strategy {
            NamingStrategy::Timestamp => stamp,
            NamingStrategy::TimestampWithToken => {
                let token = Uuid::new_v4().simple().to_string();
                format!("{}-{}", stamp, &token[..TOKEN_LEN])
            }
        }
    }
}

pub fn container_name(suffix: &str) -> String {
    format!("{}{}", CONTAINER_PREFIX, suffix)
}

pub fn text_object_name(suffix: &str) -> String {
    format!("{}{}{}", TEXT_OBJECT_PREFIX, suffix, TEXT_FILE_EXTENSION)
}

pub fn big_object_name(suffix: &str) -> String {
    format!("{}-{}{}", BIG_OBJECT_PREFIX, suffix, BIG_FILE_EXTENSION)
}

/// Local file name of the primary big fixture
pub fn big_fixture_file_name() -> String {
    format!("{}{}", BIG_OBJECT_PREFIX, BIG_FILE_EXTENSION)
}

/// Local file name of the control big fixture
///
/// Never collides with a downloaded big object, whatever the suffix.
pub fn big_control_file_name(suffix: &str) -> String {
    format!(
        "{}-{}-{}{}",
        BIG_OBJECT_PREFIX, BIG_CONTROL_MARKER, suffix, BIG_FILE_EXTENSION
    )
}
