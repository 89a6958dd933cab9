//! Error types for changelog-core modules using thiserror.

use thiserror::Error;

/// Errors from changelog collection and document operations.
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Expected a ReleaseEntry, got {found} at index {index}")]
    TypeMismatch { index: usize, found: String },

    #[error("Invalid changelog document: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    #[error("Failed to encode changelog document: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Kind registry error: {0}")]
    Registry(String),
}

/// Errors from version parsing and comparison.
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, #[source] semver::Error),

    #[error("Unknown comparison operator '{0}'")]
    UnknownOperator(String),

    #[error("Invalid version constraint '{0}'")]
    InvalidConstraint(String),
}
