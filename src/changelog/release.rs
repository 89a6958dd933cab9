//! One version's worth of changes.

use chrono::{DateTime, Utc};
use semver::Version;

use crate::error::VersionError;
use crate::version::parse_version;

use super::change::ChangeEntry;
use super::format::{ChangelogCategory, Significance};

/// A release section: version, optional release time and ordered changes.
///
/// `timestamp` is `None` for unreleased or pending entries. `changes` keeps
/// insertion order, which is display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEntry {
    pub(crate) kind: String,
    pub version: String,
    pub link: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub prologue: String,
    pub epilogue: String,
    pub changes: Vec<ChangeEntry>,
}

impl ReleaseEntry {
    /// Kind tag of the built-in release entry.
    pub const KIND: &'static str = "ReleaseEntry";

    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_changes(mut self, changes: Vec<ChangeEntry>) -> Self {
        self.changes = changes;
        self
    }

    /// Concrete kind this entry serializes as.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Append a change after the existing ones.
    pub fn add_change(&mut self, change: ChangeEntry) -> &mut Self {
        self.changes.push(change);
        self
    }

    /// Replace all changes.
    pub fn set_changes(&mut self, changes: Vec<ChangeEntry>) -> &mut Self {
        self.changes = changes;
        self
    }

    /// Parse `version` as a semantic version.
    pub fn parsed_version(&self) -> Result<Version, VersionError> {
        parse_version(&self.version)
    }

    /// Group changes by category.
    ///
    /// Standard categories are matched case-insensitively and labelled with
    /// their canonical name; they come first in Keep a Changelog order. Any
    /// other category is grouped by its exact text and follows in the order
    /// it first appears. Changes keep insertion order within a group.
    pub fn changes_by_category(&self) -> Vec<(&str, Vec<&ChangeEntry>)> {
        let mut grouped: Vec<(Option<ChangelogCategory>, &str, Vec<&ChangeEntry>)> = Vec::new();

        for change in &self.changes {
            let standard = change.standard_category();
            let label = standard.map_or(change.category.as_str(), |c| c.as_str());

            match grouped
                .iter_mut()
                .find(|(category, name, _)| *category == standard && *name == label)
            {
                Some((_, _, members)) => members.push(change),
                None => grouped.push((standard, label, vec![change])),
            }
        }

        // Stable sort keeps first-seen order among non-standard categories.
        grouped.sort_by_key(|(category, _, _)| category.map_or(u8::MAX, |c| c.order()));

        grouped
            .into_iter()
            .map(|(_, label, members)| (label, members))
            .collect()
    }

    /// Highest significance among the changes, if any change has one.
    pub fn highest_significance(&self) -> Option<Significance> {
        self.changes.iter().filter_map(|c| c.significance).max()
    }
}

impl Default for ReleaseEntry {
    fn default() -> Self {
        Self {
            kind: Self::KIND.to_string(),
            version: String::new(),
            link: None,
            timestamp: None,
            prologue: String::new(),
            epilogue: String::new(),
            changes: Vec::new(),
        }
    }
}
