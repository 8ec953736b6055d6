use serde::Serialize;
use std::collections::BTreeSet;
use std::ops::AddAssign;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnumerationStatus {
    Complete,
    /// Stopped by a [`Cancellation`](super::cancel::Cancellation); results are partial.
    Cancelled,
}

impl EnumerationStatus {
    pub(crate) fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Complete, Self::Complete) => Self::Complete,
            _ => Self::Cancelled,
        }
    }
}

/// Counters collected while walking a search tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Nodes visited, leaves included.
    pub visited: u64,
    /// Subtrees cut off before being entered.
    pub pruned: u64,
    /// Complete assignments reached.
    pub leaves: u64,
}

impl AddAssign for SearchStats {
    fn add_assign(&mut self, rhs: Self) {
        self.visited += rhs.visited;
        self.pruned += rhs.pruned;
        self.leaves += rhs.leaves;
    }
}

/// The result of an enumeration run: a deduplicated, ordered set of items plus how the run
/// ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration<T: Ord> {
    pub items: BTreeSet<T>,
    pub status: EnumerationStatus,
    pub stats: SearchStats,
}

impl<T: Ord> Enumeration<T> {
    pub(crate) fn empty() -> Self {
        Self {
            items: BTreeSet::new(),
            status: EnumerationStatus::Complete,
            stats: SearchStats::default(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == EnumerationStatus::Complete
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> BTreeSet<T> {
        self.items
    }

    /// Folds another partial result into this one, deduplicating by value.
    pub(crate) fn merge(&mut self, other: Self) {
        self.items.extend(other.items);
        self.status = self.status.combine(other.status);
        self.stats += other.stats;
    }
}
