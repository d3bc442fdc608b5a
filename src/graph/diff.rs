//! Triple-level differences between two snapshots

use super::store::StoreSnapshot;
use super::triple::Triple;
use serde::{Deserialize, Serialize};

/// Triples added and removed between a before and an after view
#[derive(Debug, Clone, Default)]
pub struct GraphDiff {
    pub added: Vec<Triple>,
    pub removed: Vec<Triple>,
}

impl GraphDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the difference between two snapshots
    pub fn compute(before: &StoreSnapshot, after: &StoreSnapshot) -> Self {
        Self {
            added: after.difference(before).cloned().collect(),
            removed: before.difference(after).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// One-line change summary
    pub fn report(&self) -> String {
        format!("+{}/-{} triples", self.added.len(), self.removed.len())
    }

    pub fn stats(&self) -> DiffStats {
        DiffStats {
            added_count: self.added.len(),
            removed_count: self.removed.len(),
        }
    }
}

/// Counts of a [`GraphDiff`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub added_count: usize,
    pub removed_count: usize,
}

impl DiffStats {
    pub fn total_changes(&self) -> usize {
        self.added_count + self.removed_count
    }
}
