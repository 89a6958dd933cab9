//! Self-describing document form of changelogs, release entries and changes.
//!
//! Every document is a JSON object carrying its concrete kind under
//! [`KIND_KEY`]. Deserialization resolves that tag through the family's
//! [`KindRegistry`], builds a default instance from the registered factory
//! and then applies only the keys present in the document.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ChangelogError;

use super::change::ChangeEntry;
use super::collection::Changelog;
use super::format::Significance;
use super::registry::{Factory, KindRegistry};
use super::release::ReleaseEntry;

/// Document key holding the kind tag.
pub const KIND_KEY: &str = "__kind__";

static CHANGELOG_KINDS: LazyLock<KindRegistry<Changelog>> = LazyLock::new(|| {
    let registry = KindRegistry::new(Changelog::KIND, Changelog::new);
    // Seeding into a fresh registry cannot collide.
    let _ = registry.register(
        Changelog::KEEP_A_CHANGELOG_KIND,
        Changelog::KIND,
        Changelog::keep_a_changelog,
    );
    registry
});

static RELEASE_KINDS: LazyLock<KindRegistry<ReleaseEntry>> =
    LazyLock::new(|| KindRegistry::new(ReleaseEntry::KIND, ReleaseEntry::default));

static CHANGE_KINDS: LazyLock<KindRegistry<ChangeEntry>> =
    LazyLock::new(|| KindRegistry::new(ChangeEntry::KIND, ChangeEntry::default));

/// Registry of changelog kinds.
pub fn changelog_kinds() -> &'static KindRegistry<Changelog> {
    &CHANGELOG_KINDS
}

/// Registry of release entry kinds.
pub fn release_kinds() -> &'static KindRegistry<ReleaseEntry> {
    &RELEASE_KINDS
}

/// Registry of change entry kinds.
pub fn change_kinds() -> &'static KindRegistry<ChangeEntry> {
    &CHANGE_KINDS
}

/// Family that registers `kind`, if any.
fn family_of(kind: &str) -> Option<&'static str> {
    if CHANGELOG_KINDS.contains(kind) {
        Some(CHANGELOG_KINDS.family())
    } else if RELEASE_KINDS.contains(kind) {
        Some(RELEASE_KINDS.family())
    } else if CHANGE_KINDS.contains(kind) {
        Some(CHANGE_KINDS.family())
    } else {
        None
    }
}

/// JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read the kind tag of a document.
fn kind_tag(document: &Value) -> Result<&str, ChangelogError> {
    let object = document.as_object().ok_or_else(|| {
        ChangelogError::InvalidFormat(format!(
            "expected an object, got {}",
            json_type_name(document)
        ))
    })?;

    object
        .get(KIND_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| ChangelogError::InvalidFormat(format!("missing '{}' tag", KIND_KEY)))
}

/// Resolve `kind` to a factory, requiring it to be `base` or one of its subtypes.
fn resolve<T>(
    registry: &KindRegistry<T>,
    kind: &str,
    base: &str,
) -> Result<Factory<T>, ChangelogError> {
    let rejected = |reason: String| {
        debug!(kind, base, %reason, "Rejected document kind");
        ChangelogError::InvalidFormat(reason)
    };

    match registry.factory(kind) {
        Some(factory) if registry.is_a(kind, base) => Ok(factory),
        Some(_) => Err(rejected(format!("cannot instantiate {} via {}", kind, base))),
        None => match family_of(kind) {
            Some(family) => Err(rejected(format!(
                "cannot instantiate {} ({}) via {}",
                kind, family, base
            ))),
            None => Err(rejected(format!("unknown kind '{}'", kind))),
        },
    }
}

fn invalid_fields(kind: &str, err: serde_json::Error) -> ChangelogError {
    ChangelogError::InvalidFormat(format!("malformed {} document: {}", kind, err))
}

fn optional_string(value: &Option<String>) -> Value {
    value.clone().map_or(Value::Null, Value::String)
}

fn optional_timestamp(value: &Option<DateTime<Utc>>) -> Value {
    value.map_or(Value::Null, |ts| Value::String(ts.to_rfc3339()))
}

/// Distinguish a key set to `null` (`Some(None)`) from a missing key (`None`).
fn explicit<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Keys a change document may carry. Missing keys stay `None`; optional
/// fields written as `null` come through as `Some(None)`.
#[derive(Deserialize)]
struct ChangeFields {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "explicit")]
    significance: Option<Option<Significance>>,
    #[serde(default, deserialize_with = "explicit")]
    author: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit")]
    timestamp: Option<Option<DateTime<Utc>>>,
}

#[derive(Deserialize)]
struct ReleaseFields {
    #[serde(default)]
    version: Option<String>,
    #[serde(default, deserialize_with = "explicit")]
    link: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit")]
    timestamp: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    prologue: Option<String>,
    #[serde(default)]
    epilogue: Option<String>,
    #[serde(default)]
    changes: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct ChangelogFields {
    #[serde(default)]
    prologue: Option<String>,
    #[serde(default)]
    epilogue: Option<String>,
    #[serde(default)]
    entries: Option<Vec<Value>>,
}

impl ChangeEntry {
    /// Register a change kind beneath `parent`.
    pub fn register_kind(
        kind: &str,
        parent: &str,
        factory: Factory<ChangeEntry>,
    ) -> Result<(), ChangelogError> {
        CHANGE_KINDS.register(kind, parent, factory)
    }

    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert(KIND_KEY.to_string(), Value::String(self.kind.clone()));
        doc.insert("category".to_string(), Value::String(self.category.clone()));
        doc.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        doc.insert(
            "significance".to_string(),
            self.significance
                .map_or(Value::Null, |s| Value::String(s.as_str().to_string())),
        );
        doc.insert("author".to_string(), optional_string(&self.author));
        doc.insert("timestamp".to_string(), optional_timestamp(&self.timestamp));
        Value::Object(doc)
    }

    pub fn from_document(document: &Value) -> Result<Self, ChangelogError> {
        let kind = kind_tag(document)?;
        let factory = resolve(&CHANGE_KINDS, kind, ChangeEntry::KIND)?;
        let fields = ChangeFields::deserialize(document).map_err(|e| invalid_fields(kind, e))?;

        let mut change = factory();
        change.kind = kind.to_string();
        if let Some(category) = fields.category {
            change.category = category;
        }
        if let Some(description) = fields.description {
            change.description = description;
        }
        if let Some(significance) = fields.significance {
            change.significance = significance;
        }
        if let Some(author) = fields.author {
            change.author = author;
        }
        if let Some(timestamp) = fields.timestamp {
            change.timestamp = timestamp;
        }
        Ok(change)
    }
}

impl ReleaseEntry {
    /// Register a release entry kind beneath `parent`.
    pub fn register_kind(
        kind: &str,
        parent: &str,
        factory: Factory<ReleaseEntry>,
    ) -> Result<(), ChangelogError> {
        RELEASE_KINDS.register(kind, parent, factory)
    }

    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert(KIND_KEY.to_string(), Value::String(self.kind.clone()));
        doc.insert("version".to_string(), Value::String(self.version.clone()));
        doc.insert("link".to_string(), optional_string(&self.link));
        doc.insert("timestamp".to_string(), optional_timestamp(&self.timestamp));
        doc.insert("prologue".to_string(), Value::String(self.prologue.clone()));
        doc.insert("epilogue".to_string(), Value::String(self.epilogue.clone()));
        doc.insert(
            "changes".to_string(),
            Value::Array(self.changes.iter().map(ChangeEntry::to_document).collect()),
        );
        Value::Object(doc)
    }

    pub fn from_document(document: &Value) -> Result<Self, ChangelogError> {
        let kind = kind_tag(document)?;
        let factory = resolve(&RELEASE_KINDS, kind, ReleaseEntry::KIND)?;
        let fields = ReleaseFields::deserialize(document).map_err(|e| invalid_fields(kind, e))?;

        let mut entry = factory();
        entry.kind = kind.to_string();
        if let Some(version) = fields.version {
            entry.version = version;
        }
        if let Some(link) = fields.link {
            entry.link = link;
        }
        if let Some(timestamp) = fields.timestamp {
            entry.timestamp = timestamp;
        }
        if let Some(prologue) = fields.prologue {
            entry.prologue = prologue;
        }
        if let Some(epilogue) = fields.epilogue {
            entry.epilogue = epilogue;
        }
        if let Some(changes) = fields.changes {
            entry.changes = changes
                .iter()
                .map(ChangeEntry::from_document)
                .collect::<Result<_, _>>()?;
        }
        Ok(entry)
    }
}

impl Changelog {
    /// Register a changelog kind beneath `parent`.
    pub fn register_kind(
        kind: &str,
        parent: &str,
        factory: Factory<Changelog>,
    ) -> Result<(), ChangelogError> {
        CHANGELOG_KINDS.register(kind, parent, factory)
    }

    /// Document form: kind tag, prologue, epilogue and entry documents.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert(KIND_KEY.to_string(), Value::String(self.kind.clone()));
        doc.insert(
            "prologue".to_string(),
            Value::String(self.prologue().to_string()),
        );
        doc.insert(
            "epilogue".to_string(),
            Value::String(self.epilogue().to_string()),
        );
        doc.insert(
            "entries".to_string(),
            Value::Array(
                self.entries()
                    .iter()
                    .map(ReleaseEntry::to_document)
                    .collect(),
            ),
        );
        Value::Object(doc)
    }

    /// Rebuild a changelog of any registered changelog kind.
    pub fn from_document(document: &Value) -> Result<Self, ChangelogError> {
        Self::from_document_as(document, Self::KIND)
    }

    /// Rebuild a changelog whose kind must be `base` or a subtype of it.
    ///
    /// Keys missing from the document leave the factory's defaults in place.
    pub fn from_document_as(document: &Value, base: &str) -> Result<Self, ChangelogError> {
        let kind = kind_tag(document)?;
        let factory = resolve(&CHANGELOG_KINDS, kind, base)?;
        let fields =
            ChangelogFields::deserialize(document).map_err(|e| invalid_fields(kind, e))?;

        debug!(kind, "Deserializing changelog document");

        let mut changelog = factory();
        changelog.kind = kind.to_string();
        if let Some(prologue) = fields.prologue {
            changelog.set_prologue(prologue);
        }
        if let Some(epilogue) = fields.epilogue {
            changelog.set_epilogue(epilogue);
        }
        if let Some(entries) = fields.entries {
            changelog.set_entry_documents(&entries)?;
        }
        Ok(changelog)
    }

    /// Replace all entries from untyped entry documents.
    ///
    /// Every element must be an object tagged with a release entry kind.
    /// The first element that is not (a non-object, an untagged object, or
    /// another family's kind) fails with [`ChangelogError::TypeMismatch`]
    /// naming its index and what was found there. Other errors from
    /// rebuilding a release entry, such as an unknown tag, are returned
    /// as-is. On any failure the current entries are left untouched.
    pub fn set_entry_documents(&mut self, documents: &[Value]) -> Result<&mut Self, ChangelogError> {
        let mut entries = Vec::with_capacity(documents.len());

        for (index, document) in documents.iter().enumerate() {
            let mismatch = |found: String| {
                warn!(index, %found, "Rejected changelog entry");
                ChangelogError::TypeMismatch { index, found }
            };

            let Some(object) = document.as_object() else {
                return Err(mismatch(json_type_name(document).to_string()));
            };

            let Some(kind) = object.get(KIND_KEY).and_then(Value::as_str) else {
                return Err(mismatch("object without kind tag".to_string()));
            };
            if !RELEASE_KINDS.contains(kind) && family_of(kind).is_some() {
                return Err(mismatch(kind.to_string()));
            }

            entries.push(ReleaseEntry::from_document(document)?);
        }

        Ok(self.set_entries(entries))
    }

    /// Pretty-printed JSON of [`Changelog::to_document`].
    pub fn to_json_string(&self) -> Result<String, ChangelogError> {
        serde_json::to_string_pretty(&self.to_document()).map_err(ChangelogError::Serialization)
    }

    /// Parse JSON text and rebuild the changelog it describes.
    pub fn from_json_str(json: &str) -> Result<Self, ChangelogError> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| ChangelogError::InvalidFormat(format!("invalid JSON: {}", e)))?;
        Self::from_document(&document)
    }
}

impl Serialize for Changelog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_document().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Changelog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let document = Value::deserialize(deserializer)?;
        Changelog::from_document(&document).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn sample() -> Changelog {
        let mut changelog = Changelog::new();
        changelog.set_prologue("# Changelog").set_epilogue("[1.0.0]: https://example.com");
        changelog.add_entry(
            ReleaseEntry::new("1.0.0")
                .with_timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
                .with_link("https://example.com/compare/v0.9.0...v1.0.0")
                .with_changes(vec![
                    ChangeEntry::new("Added", "New feature")
                        .with_significance(Significance::Minor)
                        .with_author("octocat"),
                    ChangeEntry::new("Fixed", "Bug fix"),
                ]),
        );
        changelog.add_entry(ReleaseEntry::new("1.1.0-beta.1"));
        changelog
    }

    #[test]
    fn test_round_trip() {
        let changelog = sample();
        let restored = Changelog::from_document(&changelog.to_document()).unwrap();
        assert_eq!(restored, changelog);
    }

    #[test]
    fn test_round_trip_empty() {
        let changelog = Changelog::new();
        let restored = Changelog::from_document(&changelog.to_document()).unwrap();
        assert_eq!(restored, changelog);
        assert!(restored.entries().is_empty());
    }

    #[test]
    fn test_document_shape() {
        let doc = sample().to_document();
        assert_eq!(doc[KIND_KEY], "Changelog");
        assert_eq!(doc["prologue"], "# Changelog");
        assert_eq!(doc["entries"][0][KIND_KEY], "ReleaseEntry");
        assert_eq!(doc["entries"][1]["changes"][0][KIND_KEY], "ChangeEntry");
        assert_eq!(doc["entries"][1]["changes"][0]["significance"], "minor");
        assert_eq!(doc["entries"][0]["timestamp"], Value::Null);
    }

    #[test]
    fn test_missing_kind_tag() {
        let err = Changelog::from_document(&json!({ "prologue": "x" })).unwrap_err();
        assert!(matches!(err, ChangelogError::InvalidFormat(_)));

        let err = Changelog::from_document(&json!("Changelog")).unwrap_err();
        assert!(matches!(err, ChangelogError::InvalidFormat(_)));
    }

    #[test]
    fn test_unknown_kind_tag() {
        let err = Changelog::from_document(&json!({ KIND_KEY: "NoSuchKind" })).unwrap_err();
        assert!(err.to_string().contains("unknown kind"));
    }

    #[test]
    fn test_foreign_family_kind_tag() {
        let err = Changelog::from_document(&json!({ KIND_KEY: "ReleaseEntry" })).unwrap_err();
        assert!(matches!(err, ChangelogError::InvalidFormat(_)));
        assert!(err.to_string().contains("via Changelog"));
    }

    #[test]
    fn test_base_must_be_ancestor() {
        let doc = Changelog::new().to_document();
        let err = Changelog::from_document_as(&doc, Changelog::KEEP_A_CHANGELOG_KIND).unwrap_err();
        assert!(matches!(err, ChangelogError::InvalidFormat(_)));

        let doc = Changelog::keep_a_changelog().to_document();
        let restored = Changelog::from_document_as(&doc, Changelog::KIND).unwrap();
        assert_eq!(restored.kind(), Changelog::KEEP_A_CHANGELOG_KIND);
    }

    #[test]
    fn test_absent_keys_keep_factory_defaults() {
        let restored =
            Changelog::from_document(&json!({ KIND_KEY: "KeepAChangelog", "epilogue": "end" }))
                .unwrap();
        assert!(restored.prologue().starts_with("# Changelog"));
        assert_eq!(restored.epilogue(), "end");
        assert!(restored.entries().is_empty());
    }

    #[test]
    fn test_unknown_keys_tolerated() {
        let restored =
            Changelog::from_document(&json!({ KIND_KEY: "Changelog", "extra": [1, 2, 3] }))
                .unwrap();
        assert_eq!(restored, Changelog::new());
    }

    #[test]
    fn test_set_entry_documents_type_mismatch_is_atomic() {
        let mut changelog = sample();
        let before = changelog.clone();

        let docs = vec![ReleaseEntry::new("2.0.0").to_document(), json!("2.1.0")];
        let err = changelog.set_entry_documents(&docs).unwrap_err();
        assert!(matches!(
            err,
            ChangelogError::TypeMismatch { index: 1, ref found } if found == "string"
        ));
        assert_eq!(changelog, before);
    }

    #[test]
    fn test_set_entry_documents_foreign_kind() {
        let mut changelog = Changelog::new();
        let docs = vec![ChangeEntry::new("Added", "x").to_document()];
        let err = changelog.set_entry_documents(&docs).unwrap_err();
        assert!(matches!(
            err,
            ChangelogError::TypeMismatch { index: 0, ref found } if found == "ChangeEntry"
        ));
    }

    #[test]
    fn test_set_entry_documents_untagged_object() {
        let mut changelog = sample();
        let before = changelog.clone();

        let docs = vec![
            ReleaseEntry::new("2.0.0").to_document(),
            json!({ "version": "2.1.0", "changes": [] }),
        ];
        let err = changelog.set_entry_documents(&docs).unwrap_err();
        assert!(matches!(
            err,
            ChangelogError::TypeMismatch { index: 1, ref found } if found == "object without kind tag"
        ));
        assert_eq!(changelog, before);
    }

    #[test]
    fn test_explicit_null_clears_factory_default() {
        let doc = json!({
            KIND_KEY: "ReleaseEntry",
            "version": "1.0.0",
            "link": null,
            "changes": [{ KIND_KEY: "ChangeEntry", "author": null }]
        });
        let entry = ReleaseEntry::from_document(&doc).unwrap();
        assert!(entry.link.is_none());
        assert!(entry.changes[0].author.is_none());

        let fields: ReleaseFields = serde_json::from_value(json!({ "link": null })).unwrap();
        assert_eq!(fields.link, Some(None));
        let fields: ReleaseFields = serde_json::from_value(json!({})).unwrap();
        assert_eq!(fields.link, None);
    }

    #[test]
    fn test_nested_failure_propagates() {
        let doc = json!({
            KIND_KEY: "Changelog",
            "entries": [{
                KIND_KEY: "ReleaseEntry",
                "version": "1.0.0",
                "changes": [{ "category": "Added" }]
            }]
        });
        let err = Changelog::from_document(&doc).unwrap_err();
        assert!(matches!(err, ChangelogError::InvalidFormat(ref m) if m.contains(KIND_KEY)));
    }

    #[test]
    fn test_malformed_field_type() {
        let err = Changelog::from_document(&json!({ KIND_KEY: "Changelog", "prologue": 5 }))
            .unwrap_err();
        assert!(matches!(err, ChangelogError::InvalidFormat(_)));
    }

    #[test]
    fn test_serde_traits() {
        let changelog = sample();
        let json = serde_json::to_string(&changelog).unwrap();
        let restored: Changelog = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, changelog);
    }

    #[test]
    fn test_json_string_round_trip() {
        let changelog = sample();
        let restored = Changelog::from_json_str(&changelog.to_json_string().unwrap()).unwrap();
        assert_eq!(restored, changelog);
        assert!(Changelog::from_json_str("{not json").is_err());
    }
}
