//! Shared setup for the integration tests
//!
//! Builds a resources directory with the text fixture and two distinct
//! "big" payloads reachable through `file://` URLs, so the whole suite can
//! run against the in-memory backend.

#![allow(dead_code)]

use reqwest::Url;
use std::fs;
use std::path::{Path, PathBuf};
use swift_sanity::{HttpFixtureProvider, SanityConfig, SwiftTestConfig};
use tempfile::TempDir;

pub const TEXT_PAYLOAD: &[u8] = b"Hello, Swift! This is the sanity test object.\n";
pub const BIG_PAYLOAD_SIZE: usize = 256 * 1024;
pub const MIN_BIG_SIZE: u64 = 128 * 1024;

pub struct Workspace {
    pub dir: TempDir,
    pub settings: SwiftTestConfig,
    pub fixtures: HttpFixtureProvider,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_big_payloads(patterned(BIG_PAYLOAD_SIZE, 1), patterned(BIG_PAYLOAD_SIZE, 2))
    }

    pub fn with_big_payloads(first: Vec<u8>, second: Vec<u8>) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let resources = dir.path().join("resources");
        let remote = dir.path().join("remote");
        fs::create_dir_all(&resources).unwrap();
        fs::create_dir_all(&remote).unwrap();

        fs::write(resources.join("swift-test-object.txt"), TEXT_PAYLOAD).unwrap();
        let first_path = remote.join("big-1.bin");
        let second_path = remote.join("big-2.bin");
        fs::write(&first_path, first).unwrap();
        fs::write(&second_path, second).unwrap();

        let config = SanityConfig::new()
            .resources_path(&resources)
            .big_file_urls(file_url(&first_path), file_url(&second_path))
            .min_big_object_size(MIN_BIG_SIZE);
        let fixtures = HttpFixtureProvider::with_timeout(&resources, None).unwrap();

        Self {
            dir,
            settings: config.swift,
            fixtures,
        }
    }

    pub fn resources(&self) -> PathBuf {
        self.settings.resources_path.clone()
    }

    /// Files in the resources directory other than the text fixture
    pub fn leftover_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.resources())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name != "swift-test-object.txt")
            .collect();
        names.sort();
        names
    }
}

pub fn file_url(path: &Path) -> String {
    Url::from_file_path(path).unwrap().to_string()
}

pub fn patterned(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}
