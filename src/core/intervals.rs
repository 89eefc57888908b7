//! Offset-based annotations over a text document.

use super::operation::{Operation, Sticky};
use super::projection::{self, NewOffsetProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval<K, V> {
    pub key: K,
    pub from: usize,
    pub to: usize,
    pub value: V,
}

/// Immutable set of intervals ordered by `(from, to)`.
///
/// Editing maps both endpoints with right stickiness: text typed at an
/// interval's end extends it, text typed at its start pushes it along. The
/// mapping is monotone, so `from <= to` survives every edit. A deletion can
/// collapse two starts onto one offset, so edited entries are re-sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intervals<K, V> {
    entries: Vec<Interval<K, V>>,
}

impl<K, V> Default for Intervals<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Intervals<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the set with `[from, to)` added after any equal-ranged entries.
    ///
    /// # Panics
    ///
    /// Panics if `from > to`.
    pub fn insert(mut self, key: K, from: usize, to: usize, value: V) -> Self {
        assert!(from <= to, "interval start {from} is after end {to}");
        let index = self
            .entries
            .partition_point(|entry| (entry.from, entry.to) <= (from, to));
        self.entries.insert(
            index,
            Interval {
                key,
                from,
                to,
                value,
            },
        );
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interval<K, V>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Clone, V: Clone> Intervals<K, V> {
    pub fn edit(&self, operation: &Operation) -> Self {
        if operation.is_empty() {
            return self.clone();
        }
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|entry| Interval {
                key: entry.key.clone(),
                from: operation.transform_offset(entry.from, Sticky::Right),
                to: operation.transform_offset(entry.to, Sticky::Right),
                value: entry.value.clone(),
            })
            .collect();
        entries.sort_by_key(|entry| (entry.from, entry.to));
        Self { entries }
    }

    /// Remaps every interval through an offset function instead of an
    /// operation. See [`projection::project`].
    pub fn edit_offsets(&self, provider: &impl NewOffsetProvider) -> Self {
        self.edit(&projection::project(self, provider))
    }
}

impl<K, V> FromIterator<Interval<K, V>> for Intervals<K, V> {
    fn from_iter<I: IntoIterator<Item = Interval<K, V>>>(iter: I) -> Self {
        let mut entries: Vec<_> = iter.into_iter().collect();
        entries.sort_by_key(|entry| (entry.from, entry.to));
        Self { entries }
    }
}
