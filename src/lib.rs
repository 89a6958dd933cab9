//! changelog-core - Changelog data model and semantic-version query engine.
//!
//! # Overview
//!
//! A [`Changelog`] holds release entries (newest first by convention) between
//! free-form prologue and epilogue text. Entries can be looked up by version
//! or filtered by a conjunction of semver constraints, and the whole structure
//! round-trips through a self-describing JSON document.

pub mod changelog;
pub mod error;
pub mod version;

// Re-export commonly used types
pub use changelog::{ChangeEntry, Changelog, ChangelogCategory, ReleaseEntry, Significance};
pub use error::{ChangelogError, VersionError};
pub use version::{Constraint, Operator};
