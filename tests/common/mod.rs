//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::PathBuf;

use changelog_core::{ChangeEntry, Changelog, ReleaseEntry};

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to a changelog document fixture.
pub fn document_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("documents").join(name)
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// A release entry with a single `Added` change.
pub fn release(version: &str) -> ReleaseEntry {
    ReleaseEntry::new(version).with_changes(vec![ChangeEntry::new(
        "Added",
        format!("Changes in {}", version),
    )])
}

/// A changelog whose stored order is exactly `versions`.
pub fn changelog_with(versions: &[&str]) -> Changelog {
    let mut changelog = Changelog::new();
    changelog.set_entries(versions.iter().map(|v| release(v)).collect());
    changelog
}

/// Versions of a list of matched entries.
pub fn versions_of(entries: &[&ReleaseEntry]) -> Vec<String> {
    entries.iter().map(|e| e.version.clone()).collect()
}
