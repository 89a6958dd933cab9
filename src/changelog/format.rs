//! Keep a Changelog categories, change significance and the default header.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Changelog categories per Keep a Changelog spec.
///
/// Change categories are free-form strings; this enum names the standard
/// ones so they can be recognised case-insensitively and ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangelogCategory {
    Added,
    Changed,
    Deprecated,
    Removed,
    Fixed,
    Security,
}

impl ChangelogCategory {
    /// Get the display name for the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Changed => "Changed",
            Self::Deprecated => "Deprecated",
            Self::Removed => "Removed",
            Self::Fixed => "Fixed",
            Self::Security => "Security",
        }
    }

    /// Get the order for sorting categories per Keep a Changelog convention.
    pub fn order(&self) -> u8 {
        match self {
            Self::Added => 0,
            Self::Changed => 1,
            Self::Deprecated => 2,
            Self::Removed => 3,
            Self::Fixed => 4,
            Self::Security => 5,
        }
    }
}

impl fmt::Display for ChangelogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangelogCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "added" => Ok(Self::Added),
            "changed" => Ok(Self::Changed),
            "deprecated" => Ok(Self::Deprecated),
            "removed" => Ok(Self::Removed),
            "fixed" => Ok(Self::Fixed),
            "security" => Ok(Self::Security),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// How significant a single change is.
///
/// Ordered `Patch < Minor < Major`. Serializes to lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    Patch,
    Minor,
    Major,
}

impl Significance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Significance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "patch" => Ok(Self::Patch),
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            _ => Err(format!("Unknown significance: {}", s)),
        }
    }
}

/// Keep a Changelog header, the default prologue of a `KeepAChangelog` document.
pub const CHANGELOG_HEADER: &str = r#"# Changelog

All notable changes to this project will be documented in this file.

The format is based on [Keep a Changelog](https://keepachangelog.com/en/1.1.0/),
and this project adheres to [Semantic Versioning](https://semver.org/spec/v2.0.0.html).
"#;
