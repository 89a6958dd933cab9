//! A single categorized change line.

use chrono::{DateTime, Utc};

use super::format::{ChangelogCategory, Significance};

/// One change within a release, e.g. `Fixed: Crash on empty input`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    pub(crate) kind: String,
    pub category: String,
    pub description: String,
    pub significance: Option<Significance>,
    pub author: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChangeEntry {
    /// Kind tag of the built-in change entry.
    pub const KIND: &'static str = "ChangeEntry";

    pub fn new(category: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_significance(mut self, significance: Significance) -> Self {
        self.significance = Some(significance);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Concrete kind this entry serializes as.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The Keep a Changelog category, if `category` names one.
    pub fn standard_category(&self) -> Option<ChangelogCategory> {
        self.category.parse().ok()
    }
}

impl Default for ChangeEntry {
    fn default() -> Self {
        Self {
            kind: Self::KIND.to_string(),
            category: String::new(),
            description: String::new(),
            significance: None,
            author: None,
            timestamp: None,
        }
    }
}
