//! Persistent vector with structural sharing.
//!
//! A 32-way trie of `Arc`-shared nodes viewed through a `start..start + len`
//! window. Appends and point updates copy one root-to-leaf path; slicing only
//! moves the window. Once more than half of the trie sits in front of the
//! window the survivors are rebuilt into a fresh trie, so evicted history does
//! not stay reachable forever.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

const BITS: u32 = 5;
const WIDTH: usize = 1 << BITS;
const MASK: usize = WIDTH - 1;

enum Node<T> {
    Branch(Arc<Vec<Node<T>>>),
    Leaf(Arc<Vec<T>>),
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Node::Branch(children) => Node::Branch(Arc::clone(children)),
            Node::Leaf(items) => Node::Leaf(Arc::clone(items)),
        }
    }
}

impl<T> Node<T> {
    fn empty_leaf() -> Self {
        Node::Leaf(Arc::new(Vec::new()))
    }

    fn get(&self, mut level: u32, index: usize) -> &T {
        let mut node = self;
        loop {
            match node {
                Node::Branch(children) => {
                    node = &children[(index >> level) & MASK];
                    level -= BITS;
                }
                Node::Leaf(items) => return &items[index & MASK],
            }
        }
    }
}

impl<T: Clone> Node<T> {
    /// A fresh spine from `level` down to a leaf holding only `value`.
    fn path(level: u32, value: T) -> Self {
        if level == 0 {
            Node::Leaf(Arc::new(vec![value]))
        } else {
            Node::Branch(Arc::new(vec![Node::path(level - BITS, value)]))
        }
    }

    fn push(&self, level: u32, index: usize, value: T) -> Self {
        match self {
            Node::Leaf(items) => {
                let mut items = items.as_ref().clone();
                items.push(value);
                Node::Leaf(Arc::new(items))
            }
            Node::Branch(children) => {
                let slot = (index >> level) & MASK;
                let mut children = children.as_ref().clone();
                if slot < children.len() {
                    children[slot] = children[slot].push(level - BITS, index, value);
                } else {
                    children.push(Node::path(level - BITS, value));
                }
                Node::Branch(Arc::new(children))
            }
        }
    }

    fn set(&self, level: u32, index: usize, value: T) -> Self {
        match self {
            Node::Leaf(items) => {
                let mut items = items.as_ref().clone();
                items[index & MASK] = value;
                Node::Leaf(Arc::new(items))
            }
            Node::Branch(children) => {
                let slot = (index >> level) & MASK;
                let mut children = children.as_ref().clone();
                children[slot] = children[slot].set(level - BITS, index, value);
                Node::Branch(Arc::new(children))
            }
        }
    }
}

/// An immutable vector whose clones and slices share storage.
pub struct PersistentVec<T> {
    root: Node<T>,
    /// Bit shift of the root level; 0 when the root is a leaf.
    shift: u32,
    /// Number of slots written in the trie, including slots outside the window.
    size: usize,
    start: usize,
    len: usize,
}

impl<T> Clone for PersistentVec<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            shift: self.shift,
            size: self.size,
            start: self.start,
            len: self.len,
        }
    }
}

impl<T> Default for PersistentVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PersistentVec<T> {
    pub fn new() -> Self {
        Self {
            root: Node::empty_leaf(),
            shift: 0,
            size: 0,
            start: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        Some(self.root.get(self.shift, self.start + index))
    }

    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|index| self.get(index))
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            vec: self,
            front: 0,
            back: self.len,
        }
    }

    fn capacity(&self) -> usize {
        1 << (self.shift + BITS)
    }
}

impl<T: Clone> PersistentVec<T> {
    /// Returns a new vector with `value` appended; `self` is left untouched.
    pub fn push_back(&self, value: T) -> Self {
        let slot = self.start + self.len;
        let mut next = self.clone();
        if slot < self.size {
            // A shorter window over a longer trie: overwrite the hidden slot.
            next.root = self.root.set(self.shift, slot, value);
        } else if self.size == self.capacity() {
            next.root = Node::Branch(Arc::new(vec![
                self.root.clone(),
                Node::path(self.shift, value),
            ]));
            next.shift = self.shift + BITS;
            next.size += 1;
        } else {
            next.root = self.root.push(self.shift, slot, value);
            next.size += 1;
        }
        next.len += 1;
        next
    }

    /// Returns the half-open sub-range `from..to` of this vector.
    ///
    /// # Panics
    ///
    /// Panics if `from > to` or `to > self.len()`.
    pub fn slice(&self, from: usize, to: usize) -> Self {
        assert!(
            from <= to && to <= self.len,
            "slice {from}..{to} out of bounds for length {}",
            self.len
        );
        let start = self.start + from;
        if start >= WIDTH && start >= self.size / 2 {
            return (from..to).filter_map(|index| self.get(index)).cloned().collect();
        }
        let mut next = self.clone();
        next.start = start;
        next.len = to - from;
        next
    }
}

impl<T: Clone> FromIterator<T> for PersistentVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter()
            .fold(PersistentVec::new(), |vec, value| vec.push_back(value))
    }
}

impl<T: PartialEq> PartialEq for PersistentVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentVec<T> {}

impl<T: fmt::Debug> fmt::Debug for PersistentVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a PersistentVec<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a, T> {
    vec: &'a PersistentVec<T>,
    front: usize,
    back: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.vec.get(self.front);
        self.front += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.vec.get(self.back)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_back_grows_past_several_levels() {
        let vec: PersistentVec<usize> = (0..5_000).collect();
        assert_eq!(vec.len(), 5_000);
        for index in [0, 31, 32, 1023, 1024, 4999] {
            assert_eq!(vec.get(index), Some(&index));
        }
        assert_eq!(vec.get(5_000), None);
    }

    #[test]
    fn snapshots_are_not_affected_by_later_pushes() {
        let base: PersistentVec<u32> = (0..40).collect();
        let longer = base.push_back(99);
        assert_eq!(base.len(), 40);
        assert_eq!(longer.last(), Some(&99));
        assert_eq!(base.last(), Some(&39));
    }

    #[test]
    fn push_after_prefix_slice_overwrites_only_the_new_copy() {
        let full: PersistentVec<u32> = (0..10).collect();
        let prefix = full.slice(0, 4);
        let branched = prefix.push_back(100);
        assert_eq!(branched.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 100]);
        assert_eq!(full.get(4), Some(&4));
    }

    #[test]
    fn front_slices_compact_and_keep_contents() {
        let mut vec: PersistentVec<usize> = (0..300).collect();
        for i in 0..400 {
            vec = vec.slice(1, vec.len()).push_back(300 + i);
        }
        assert_eq!(vec.len(), 300);
        assert_eq!(vec.first(), Some(&400));
        assert_eq!(vec.last(), Some(&699));
        assert!(vec.size <= 600);
    }

    #[test]
    fn iterates_both_ways() {
        let vec: PersistentVec<u8> = (1..=5).collect();
        assert_eq!(vec.iter().rev().copied().collect::<Vec<_>>(), vec![5, 4, 3, 2, 1]);
        assert_eq!(vec.iter().len(), 5);
    }
}
