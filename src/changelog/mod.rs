//! Changelog data model, version queries and document round-tripping.

pub mod change;
pub mod collection;
pub mod document;
pub mod format;
pub mod registry;
pub mod release;

pub use change::ChangeEntry;
pub use collection::Changelog;
pub use document::{KIND_KEY, change_kinds, changelog_kinds, release_kinds};
pub use format::{CHANGELOG_HEADER, ChangelogCategory, Significance};
pub use registry::{Factory, KindRegistry};
pub use release::ReleaseEntry;
