//! Version constraints such as `>=1.5.0`, alone or as a conjunction.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex_lite::Regex;
use semver::Version;

use crate::error::VersionError;

use super::compare::{Operator, compare_versions, parse_version};

/// Matches `<op><version>` with optional whitespace between the two.
/// Longer symbols come first so `<=` is not read as `<`.
static CONSTRAINT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)\s*(==|!=|<>|<=|>=|=|<|>|eq|ne|lt|le|gt|ge)?\s*(\S+)\s*$")
        .expect("Invalid constraint regex")
});

/// A single (operator, version) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub operator: Operator,
    pub version: Version,
}

impl Constraint {
    pub fn new(operator: Operator, version: Version) -> Self {
        Self { operator, version }
    }

    /// Build a constraint from an operator and an unparsed version string.
    pub fn parse_with(operator: Operator, version: &str) -> Result<Self, VersionError> {
        Ok(Self::new(operator, parse_version(version)?))
    }

    /// Whether `version` satisfies this constraint.
    pub fn matches(&self, version: &Version) -> bool {
        self.operator
            .holds(compare_versions(version, &self.version))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

impl FromStr for Constraint {
    type Err = VersionError;

    /// A bare version means `==`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = CONSTRAINT_REGEX
            .captures(s)
            .ok_or_else(|| VersionError::InvalidConstraint(s.to_string()))?;

        let operator = match caps.get(1) {
            Some(op) => op.as_str().parse()?,
            None => Operator::Eq,
        };
        let version = caps
            .get(2)
            .map(|m| m.as_str())
            .ok_or_else(|| VersionError::InvalidConstraint(s.to_string()))?;

        Self::parse_with(operator, version)
    }
}

/// Parse a comma-separated conjunction, e.g. `">=1.5.0, <2.5.0"`.
///
/// Blank input yields no constraints, which every version satisfies.
pub fn parse_constraints(input: &str) -> Result<Vec<Constraint>, VersionError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    input.split(',').map(str::parse).collect()
}
