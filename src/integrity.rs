//! Content digests and their comparison

use crate::error::{Expectation, Result, SanityError};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// SHA-256 digest of a payload, kept as lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Digest an in-memory payload
    pub fn of_bytes(data: &[u8]) -> Self {
        Digest(hex::encode(Sha256::digest(data)))
    }

    /// Digest a file without loading it whole
    pub async fn of_file(path: &Path) -> Result<Self> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];

        loop {
            let n = file.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        let digest = Digest(hex::encode(hasher.finalize()));
        debug!("Digest of {}: {}", path.display(), digest);
        Ok(digest)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Require `actual` to be identical to `expected`
pub fn verify_equal(context: &str, expected: &Digest, actual: &Digest) -> Result<()> {
    if expected != actual {
        error!(
            "Object uploaded and object downloaded are different ({}): {} != {}",
            context, expected, actual
        );
        return Err(SanityError::integrity_mismatch(
            context,
            Expectation::Equal,
            expected.as_str(),
            actual.as_str(),
        ));
    }
    Ok(())
}

/// Require `first` and `second` to differ
///
/// Used as a control check: a verifier that accepts two different payloads
/// as equal would make every round-trip assertion meaningless.
pub fn verify_distinct(context: &str, first: &Digest, second: &Digest) -> Result<()> {
    if first == second {
        error!(
            "Payloads expected to differ have the same digest ({}): {}",
            context, first
        );
        return Err(SanityError::integrity_mismatch(
            context,
            Expectation::Distinct,
            first.as_str(),
            second.as_str(),
        ));
    }
    Ok(())
}
