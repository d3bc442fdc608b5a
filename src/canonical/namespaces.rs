//! Namespace prefix bindings and reserved-prefix normalization.
//!
//! Parsers hand back whatever prefixes a document declared, including
//! auto-disambiguated aliases such as `schema1:`. Normalization keeps every
//! unrelated binding, drops all aliases of the reserved namespace, and binds
//! the reserved prefix to its canonical IRI exactly once.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix name → namespace IRI, one IRI per prefix, ordered by prefix name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceBindings {
    prefixes: BTreeMap<String, String>,
}

impl NamespaceBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `prefix`, returning the IRI it replaced
    pub fn bind(&mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Option<String> {
        self.prefixes.insert(prefix.into(), iri.into())
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Prefixes currently bound to `iri`
    pub fn prefixes_for<'a>(&'a self, iri: &'a str) -> impl Iterator<Item = &'a str> {
        self.prefixes
            .iter()
            .filter(move |(_, bound)| bound.as_str() == iri)
            .map(|(prefix, _)| prefix.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes
            .iter()
            .map(|(prefix, iri)| (prefix.as_str(), iri.as_str()))
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Adds `other`'s bindings; on a prefix clash `other` wins
    pub fn merge(&mut self, other: &NamespaceBindings) {
        for (prefix, iri) in other.iter() {
            self.bind(prefix, iri);
        }
    }

    /// Drops aliases of the reserved namespace and binds `reserved_prefix`
    /// to `reserved_iri`.
    ///
    /// A binding is dropped when it points at `reserved_iri` or when its name
    /// starts with `reserved_prefix` (covers `schema1`, `schema2`, ...). An
    /// empty reserved prefix only replaces the empty prefix itself.
    pub fn normalized(&self, reserved_prefix: &str, reserved_iri: &str) -> NamespaceBindings {
        let is_alias = |prefix: &str| {
            if reserved_prefix.is_empty() {
                prefix.is_empty()
            } else {
                prefix.starts_with(reserved_prefix)
            }
        };
        let mut normalized: NamespaceBindings = self
            .iter()
            .filter(|(prefix, iri)| *iri != reserved_iri && !is_alias(prefix))
            .collect();
        normalized.bind(reserved_prefix, reserved_iri);
        normalized
    }
}

impl<P: Into<String>, I: Into<String>> FromIterator<(P, I)> for NamespaceBindings {
    fn from_iter<T: IntoIterator<Item = (P, I)>>(iter: T) -> Self {
        Self {
            prefixes: iter
                .into_iter()
                .map(|(prefix, iri)| (prefix.into(), iri.into()))
                .collect(),
        }
    }
}
