//! The changelog: ordered release entries between a prologue and an epilogue.

use semver::Version;
use tracing::debug;

use crate::error::ChangelogError;
use crate::version::{Constraint, Operator, compare_versions, parse_version};

use super::format::CHANGELOG_HEADER;
use super::release::ReleaseEntry;

/// An ordered history of releases, most recent first by convention.
///
/// Entries are never re-sorted: [`Changelog::add_entry`] always prepends and
/// [`Changelog::latest_entry`] trusts position 0. Version uniqueness is not
/// enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changelog {
    pub(crate) kind: String,
    prologue: String,
    epilogue: String,
    entries: Vec<ReleaseEntry>,
}

impl Changelog {
    /// Kind tag of the base changelog.
    pub const KIND: &'static str = "Changelog";

    /// Kind tag of the built-in Keep a Changelog subtype.
    pub const KEEP_A_CHANGELOG_KIND: &'static str = "KeepAChangelog";

    /// Create an empty changelog.
    pub fn new() -> Self {
        Self {
            kind: Self::KIND.to_string(),
            prologue: String::new(),
            epilogue: String::new(),
            entries: Vec::new(),
        }
    }

    /// Create an empty Keep a Changelog document with the standard header as prologue.
    pub fn keep_a_changelog() -> Self {
        Self {
            kind: Self::KEEP_A_CHANGELOG_KIND.to_string(),
            prologue: CHANGELOG_HEADER.to_string(),
            ..Self::new()
        }
    }

    /// Concrete kind this changelog serializes as.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn prologue(&self) -> &str {
        &self.prologue
    }

    pub fn set_prologue(&mut self, prologue: impl Into<String>) -> &mut Self {
        self.prologue = prologue.into();
        self
    }

    pub fn epilogue(&self) -> &str {
        &self.epilogue
    }

    pub fn set_epilogue(&mut self, epilogue: impl Into<String>) -> &mut Self {
        self.epilogue = epilogue.into();
        self
    }

    /// Entries in stored order.
    pub fn entries(&self) -> &[ReleaseEntry] {
        &self.entries
    }

    /// Mutable access to the stored entries.
    pub fn entries_mut(&mut self) -> &mut Vec<ReleaseEntry> {
        &mut self.entries
    }

    /// Replace all entries.
    pub fn set_entries(&mut self, entries: Vec<ReleaseEntry>) -> &mut Self {
        debug!(count = entries.len(), "Replacing changelog entries");
        self.entries = entries;
        self
    }

    /// Insert `entry` as the new latest entry at position 0.
    pub fn add_entry(&mut self, entry: ReleaseEntry) -> &mut Self {
        debug!(version = %entry.version, "Prepending changelog entry");
        self.entries.insert(0, entry);
        self
    }

    /// The entry at position 0, if any.
    pub fn latest_entry(&self) -> Option<&ReleaseEntry> {
        self.entries.first()
    }

    /// Version of every entry, in stored order.
    pub fn versions(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.version.as_str())
    }

    /// First entry, in stored order, whose version satisfies
    /// `entry.version <operator> version`.
    ///
    /// Fails with [`ChangelogError::InvalidVersion`] if `version` or any entry
    /// version scanned before a match is not a valid semantic version.
    pub fn find_entry_by_version(
        &self,
        version: &str,
        operator: Operator,
    ) -> Result<Option<&ReleaseEntry>, ChangelogError> {
        let target = parse_version(version)?;

        for entry in &self.entries {
            let entry_version = entry.parsed_version()?;
            if operator.holds(compare_versions(&entry_version, &target)) {
                return Ok(Some(entry));
            }
        }

        Ok(None)
    }

    /// All entries satisfying every `(operator, version)` constraint, in stored order.
    ///
    /// ```
    /// use changelog_core::{Changelog, Operator, ReleaseEntry};
    ///
    /// let mut changelog = Changelog::new();
    /// for version in ["1.0.0", "1.5.0", "2.0.0", "2.5.0"] {
    ///     changelog.add_entry(ReleaseEntry::new(version));
    /// }
    ///
    /// let found = changelog
    ///     .find_entries_by_versions([(Operator::Ge, "1.5.0"), (Operator::Lt, "2.5.0")])
    ///     .unwrap();
    /// let versions: Vec<&str> = found.iter().map(|e| e.version.as_str()).collect();
    /// assert_eq!(versions, ["2.0.0", "1.5.0"]);
    /// ```
    pub fn find_entries_by_versions<I, V>(
        &self,
        constraints: I,
    ) -> Result<Vec<&ReleaseEntry>, ChangelogError>
    where
        I: IntoIterator<Item = (Operator, V)>,
        V: AsRef<str>,
    {
        let constraints = constraints
            .into_iter()
            .map(|(operator, version)| Constraint::parse_with(operator, version.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        self.find_entries_matching(&constraints)
    }

    /// Typed form of [`Changelog::find_entries_by_versions`].
    ///
    /// An empty constraint list matches every entry without parsing versions.
    pub fn find_entries_matching(
        &self,
        constraints: &[Constraint],
    ) -> Result<Vec<&ReleaseEntry>, ChangelogError> {
        if constraints.is_empty() {
            return Ok(self.entries.iter().collect());
        }

        let mut matched = Vec::new();
        for entry in &self.entries {
            let version: Version = entry.parsed_version()?;
            if constraints.iter().all(|c| c.matches(&version)) {
                matched.push(entry);
            }
        }

        debug!(
            constraints = constraints.len(),
            matched = matched.len(),
            "Filtered entries by version constraints"
        );
        Ok(matched)
    }
}

impl Default for Changelog {
    fn default() -> Self {
        Self::new()
    }
}
