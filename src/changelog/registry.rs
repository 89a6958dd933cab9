//! Kind registries: tag string to factory, one registry per document family.
//!
//! Each registry is seeded with its family's built-in kind. Further kinds are
//! registered at runtime under an existing parent, which gives deserialization
//! a subtype relation to check against.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::ChangelogError;

/// Produces a default instance of a kind; deserialization then fills it in.
pub type Factory<T> = fn() -> T;

struct Registration<T> {
    parent: Option<String>,
    factory: Factory<T>,
}

/// Registered kinds of one family (changelogs, release entries or changes).
pub struct KindRegistry<T> {
    family: &'static str,
    kinds: RwLock<HashMap<String, Registration<T>>>,
}

impl<T> KindRegistry<T> {
    /// Create a registry whose root kind is named after the family.
    pub(crate) fn new(family: &'static str, root: Factory<T>) -> Self {
        let mut kinds = HashMap::new();
        kinds.insert(
            family.to_string(),
            Registration {
                parent: None,
                factory: root,
            },
        );
        Self {
            family,
            kinds: RwLock::new(kinds),
        }
    }

    /// Name of the family, which is also the root kind.
    pub fn family(&self) -> &'static str {
        self.family
    }

    /// Register `kind` as a subtype of `parent`.
    ///
    /// Fails if `kind` is already registered or `parent` is not.
    pub fn register(
        &self,
        kind: &str,
        parent: &str,
        factory: Factory<T>,
    ) -> Result<(), ChangelogError> {
        let mut kinds = self.kinds.write().unwrap_or_else(PoisonError::into_inner);

        if kinds.contains_key(kind) {
            return Err(ChangelogError::Registry(format!(
                "{} kind '{}' is already registered",
                self.family, kind
            )));
        }
        if !kinds.contains_key(parent) {
            return Err(ChangelogError::Registry(format!(
                "cannot register '{}': unknown parent {} kind '{}'",
                kind, self.family, parent
            )));
        }

        debug!(family = self.family, kind, parent, "Registered kind");
        kinds.insert(
            kind.to_string(),
            Registration {
                parent: Some(parent.to_string()),
                factory,
            },
        );
        Ok(())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(kind)
    }

    /// Whether `kind` is `base` or registered (transitively) beneath it.
    pub fn is_a(&self, kind: &str, base: &str) -> bool {
        let kinds = self.kinds.read().unwrap_or_else(PoisonError::into_inner);
        let mut current = Some(kind);

        while let Some(name) = current {
            if name == base {
                return true;
            }
            current = kinds.get(name).and_then(|r| r.parent.as_deref());
        }

        false
    }

    /// Factory for `kind`, if registered.
    pub fn factory(&self, kind: &str) -> Option<Factory<T>> {
        self.kinds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(kind)
            .map(|r| r.factory)
    }

    /// All registered kinds, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .kinds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}
