//! In-memory triple set.
//!
//! The store is a plain set: no duplicates, no meaningful order. Rule passes
//! read from a [`StoreSnapshot`] taken at pass start and write the whole
//! candidate delta back in one step.

use super::triple::Triple;
use std::collections::HashSet;

/// Mutable set of triples owned by one pipeline stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripleStore {
    triples: HashSet<Triple>,
}

impl TripleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        Self {
            triples: triples.into_iter().collect(),
        }
    }

    /// Inserts `triple`; true if it was not already present
    pub fn add(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    /// Removes `triple`; true if it was present
    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Frozen copy of the current content
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            triples: self.triples.clone(),
        }
    }

    pub fn size(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Set union with `other`; returns how many triples were new
    pub fn merge(&mut self, other: &TripleStore) -> usize {
        self.extend(other.triples.iter().cloned())
    }

    /// Adds every triple; returns how many were new
    pub fn extend(&mut self, triples: impl IntoIterator<Item = Triple>) -> usize {
        let before = self.triples.len();
        self.triples.extend(triples);
        self.triples.len() - before
    }

    /// Keeps only triples matching `keep`; returns how many were removed
    pub fn retain(&mut self, mut keep: impl FnMut(&Triple) -> bool) -> usize {
        let before = self.triples.len();
        self.triples.retain(|triple| keep(triple));
        before - self.triples.len()
    }

    /// Resets the content to a previously taken snapshot
    pub fn replace_with(&mut self, snapshot: &StoreSnapshot) {
        self.triples = snapshot.triples.clone();
    }
}

impl FromIterator<Triple> for TripleStore {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self::from_triples(iter)
    }
}

impl<'a> IntoIterator for &'a TripleStore {
    type Item = &'a Triple;
    type IntoIter = std::collections::hash_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

/// Read-only view of a store at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    triples: HashSet<Triple>,
}

impl StoreSnapshot {
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Triples present here but not in `other`
    pub fn difference<'a>(&'a self, other: &'a StoreSnapshot) -> impl Iterator<Item = &'a Triple> {
        self.triples.difference(&other.triples)
    }
}

impl<'a> IntoIterator for &'a StoreSnapshot {
    type Item = &'a Triple;
    type IntoIter = std::collections::hash_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::NamedNode;

    fn triple(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(
            NamedNode::new(format!("http://example.org/{s}")).unwrap(),
            NamedNode::new(format!("http://example.org/{p}")).unwrap(),
            NamedNode::new(format!("http://example.org/{o}")).unwrap(),
        )
    }

    #[test]
    fn add_is_idempotent() {
        let mut store = TripleStore::new();
        assert!(store.add(triple("a", "p", "b")));
        assert!(!store.add(triple("a", "p", "b")));
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn remove_reports_presence() {
        let mut store = TripleStore::from_triples([triple("a", "p", "b")]);
        assert!(store.remove(&triple("a", "p", "b")));
        assert!(!store.remove(&triple("a", "p", "b")));
        assert!(store.is_empty());
    }

    #[test]
    fn snapshot_is_frozen() {
        let mut store = TripleStore::from_triples([triple("a", "p", "b")]);
        let snapshot = store.snapshot();
        store.add(triple("b", "p", "c"));
        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot.contains(&triple("b", "p", "c")));
        assert_eq!(store.size(), 2);
    }

    #[test]
    fn merge_counts_new_triples() {
        let mut left = TripleStore::from_triples([triple("a", "p", "b"), triple("b", "p", "c")]);
        let right = TripleStore::from_triples([triple("b", "p", "c"), triple("c", "p", "d")]);
        assert_eq!(left.merge(&right), 1);
        assert_eq!(left.size(), 3);
    }

    #[test]
    fn retain_and_restore() {
        let mut store = TripleStore::from_triples([triple("a", "p", "b"), triple("a", "q", "b")]);
        let before = store.snapshot();
        let removed = store.retain(|t| t.predicate.as_str().ends_with('p'));
        assert_eq!(removed, 1);
        store.replace_with(&before);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn snapshot_difference() {
        let store = TripleStore::from_triples([triple("a", "p", "b")]);
        let before = store.snapshot();
        let mut after_store = store.clone();
        after_store.add(triple("x", "p", "y"));
        let after = after_store.snapshot();
        let added: Vec<_> = after.difference(&before).collect();
        assert_eq!(added, vec![&triple("x", "p", "y")]);
        assert_eq!(before.difference(&after).count(), 0);
    }
}
