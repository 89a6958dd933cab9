//! Version precedence and comparison operators.
//!
//! Ordering follows Semantic Versioning 2.0.0: `major.minor.patch` compare
//! numerically, a pre-release sorts below its release, and build metadata is
//! ignored. Pre-release identifiers are compared by [`semver::Prerelease`]'s
//! `Ord`, which implements the identifier-by-identifier rules.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::Version;

use crate::error::VersionError;

/// A version comparison operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    #[default]
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    /// Canonical symbol for the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// Whether `ordering` (left compared to right) satisfies this operator.
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "==" | "=" | "eq" => Ok(Self::Eq),
            "!=" | "<>" | "ne" => Ok(Self::Ne),
            "<" | "lt" => Ok(Self::Lt),
            "<=" | "le" => Ok(Self::Le),
            ">" | "gt" => Ok(Self::Gt),
            ">=" | "ge" => Ok(Self::Ge),
            _ => Err(VersionError::UnknownOperator(s.to_string())),
        }
    }
}

/// Parse a version string.
/// Accepts strict semver with an optional leading `v` ("v1.2.3" or "1.2.3").
pub fn parse_version(version: &str) -> Result<Version, VersionError> {
    let trimmed = version.trim();
    let raw = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(raw).map_err(|e| VersionError::ParseFailed(version.to_string(), e))
}

/// Compare two versions by precedence, disregarding build metadata.
pub fn compare_versions(left: &Version, right: &Version) -> Ordering {
    (left.major, left.minor, left.patch, &left.pre).cmp(&(
        right.major,
        right.minor,
        right.patch,
        &right.pre,
    ))
}

/// Evaluate `left <operator> right` for two version strings.
pub fn compare(left: &str, right: &str, operator: Operator) -> Result<bool, VersionError> {
    let left = parse_version(left)?;
    let right = parse_version(right)?;
    Ok(operator.holds(compare_versions(&left, &right)))
}
