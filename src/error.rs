//! Error handling for the sanity suite
//!
//! This module defines the error type shared by the storage clients,
//! fixture providers and scenarios. The "not found" kind is a regular
//! variant so that scenarios checking a negative postcondition can match
//! on it instead of treating it as a failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SanityError>;

/// What a digest comparison was supposed to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expectation {
    /// Both digests must be identical
    Equal,
    /// The digests must differ
    Distinct,
}

impl std::fmt::Display for Expectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expectation::Equal => write!(f, "equal"),
            Expectation::Distinct => write!(f, "distinct"),
        }
    }
}

/// Error types that can occur while running the suite
#[derive(Error, Debug)]
pub enum SanityError {
    /// The targeted container or object does not exist
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// The service refused the operation because of the resource state
    #[error("Conflict on resource: {resource}")]
    Conflict { resource: String },

    /// A call that was required to succeed did not
    #[error("Operation failed: {operation} on {resource} - {message}")]
    OperationFailed {
        operation: String,
        resource: String,
        message: String,
    },

    /// Digest comparison did not hold
    #[error("Integrity mismatch ({context}): expected {expectation} digests, got {expected} and {actual}")]
    IntegrityMismatch {
        context: String,
        expectation: Expectation,
        expected: String,
        actual: String,
    },

    /// Authentication against the identity service failed
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A fixture could not be resolved or is unusable
    #[error("Fixture error: {fixture} - {message}")]
    Fixture { fixture: String, message: String },

    /// Invalid parameter
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SanityError {
    /// Create a new not-found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        SanityError::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a new conflict error
    pub fn conflict(resource: impl Into<String>) -> Self {
        SanityError::Conflict {
            resource: resource.into(),
        }
    }

    /// Create a new operation failure
    pub fn operation_failed(
        operation: impl Into<String>,
        resource: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SanityError::OperationFailed {
            operation: operation.into(),
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Create a new integrity mismatch
    pub fn integrity_mismatch(
        context: impl Into<String>,
        expectation: Expectation,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        SanityError::IntegrityMismatch {
            context: context.into(),
            expectation,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a new authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        SanityError::Auth {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        SanityError::Config {
            message: message.into(),
        }
    }

    /// Create a new fixture error
    pub fn fixture(fixture: impl Into<String>, message: impl Into<String>) -> Self {
        SanityError::Fixture {
            fixture: fixture.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        SanityError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Whether this is the "resource does not exist" kind
    pub fn is_not_found(&self) -> bool {
        matches!(self, SanityError::NotFound { .. })
    }
}
