//! Text operations: retain/replace scripts over a char sequence.
//!
//! An [`Operation`] is a sequence of [`Op`]s that walks its input from left to
//! right. `Retain(n)` copies `n` chars, `Replace` consumes the chars of
//! `delete` and produces the chars of `insert`. An operation with no ops at all
//! is the universal no-op: it composes, transforms and maps offsets as the
//! identity regardless of document length.
//!
//! `compose`, `transform` and `transform_offset` only ever look at lengths.
//! Replace content is carried along for [`Operation::invert`] and
//! [`Operation::apply`], so offset-only callers may fill it with placeholder
//! chars.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Which side a zero-width position attaches to when text is inserted exactly
/// at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sticky {
    /// Stay before the inserted text.
    Left,
    /// Move past the inserted text.
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Retain(usize),
    Replace { delete: String, insert: String },
}

impl Op {
    pub fn len_before(&self) -> usize {
        match self {
            Op::Retain(n) => *n,
            Op::Replace { delete, .. } => char_len(delete),
        }
    }

    pub fn len_after(&self) -> usize {
        match self {
            Op::Retain(n) => *n,
            Op::Replace { insert, .. } => char_len(insert),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Op>", into = "Vec<Op>")]
pub struct Operation {
    ops: Vec<Op>,
    len_before: usize,
    len_after: usize,
}

impl From<Vec<Op>> for Operation {
    fn from(ops: Vec<Op>) -> Self {
        Operation::from_ops(ops)
    }
}

impl From<Operation> for Vec<Op> {
    fn from(operation: Operation) -> Self {
        operation.ops
    }
}

impl Operation {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_ops(ops: Vec<Op>) -> Self {
        let len_before = ops.iter().map(Op::len_before).sum();
        let len_after = ops.iter().map(Op::len_after).sum();
        Self {
            ops,
            len_before,
            len_after,
        }
    }

    /// Identity over a document of `len` chars.
    pub fn retain(len: usize) -> Self {
        let mut builder = Builder::default();
        builder.retain(len);
        builder.finish()
    }

    /// Replaces `deleted` at char offset `at` with `inserted` in a document of
    /// `doc_len` chars.
    ///
    /// # Panics
    ///
    /// Panics if the replaced range does not fit inside the document.
    pub fn replace(at: usize, deleted: &str, inserted: &str, doc_len: usize) -> Self {
        let deleted_len = char_len(deleted);
        assert!(
            at + deleted_len <= doc_len,
            "replace at {at} of {deleted_len} chars overruns document of {doc_len} chars"
        );
        let mut builder = Builder::default();
        builder.retain(at);
        builder.delete(deleted.to_string());
        builder.insert(inserted.to_string());
        builder.retain(doc_len - at - deleted_len);
        builder.finish()
    }

    pub fn insert(at: usize, text: &str, doc_len: usize) -> Self {
        Self::replace(at, "", text, doc_len)
    }

    pub fn delete(at: usize, deleted: &str, doc_len: usize) -> Self {
        Self::replace(at, deleted, "", doc_len)
    }

    /// Single-replace operation turning `old` into `new`, found by trimming
    /// their common prefix and suffix.
    pub fn diff(old: &str, new: &str) -> Self {
        let old_chars: Vec<char> = old.chars().collect();
        let new_chars: Vec<char> = new.chars().collect();
        let prefix = old_chars
            .iter()
            .zip(&new_chars)
            .take_while(|(a, b)| a == b)
            .count();
        let suffix = old_chars[prefix..]
            .iter()
            .rev()
            .zip(new_chars[prefix..].iter().rev())
            .take_while(|(a, b)| a == b)
            .count();
        let mut builder = Builder::default();
        builder.retain(prefix);
        builder.delete(old_chars[prefix..old_chars.len() - suffix].iter().collect());
        builder.insert(new_chars[prefix..new_chars.len() - suffix].iter().collect());
        builder.retain(suffix);
        builder.finish()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[inline]
    pub fn len_before(&self) -> usize {
        self.len_before
    }

    #[inline]
    pub fn len_after(&self) -> usize {
        self.len_after
    }

    /// Budget weight used by log trimming.
    pub fn size(&self) -> usize {
        self.len_before.max(self.len_after)
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// True when the operation changes no text.
    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(|op| match op {
            Op::Retain(_) => true,
            Op::Replace { delete, insert } => delete == insert,
        })
    }

    /// # Panics
    ///
    /// Panics if `text` is not `len_before` chars long, or if a replaced span
    /// differs from the text the operation records as deleted.
    pub fn apply(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }
        let mut chars = text.chars();
        let mut result = String::with_capacity(text.len());
        let mut consumed = 0usize;
        for op in &self.ops {
            match op {
                Op::Retain(n) => {
                    let before = result.len();
                    result.extend(chars.by_ref().take(*n));
                    consumed += char_len(&result[before..]);
                }
                Op::Replace { delete, insert } => {
                    let n = char_len(delete);
                    let found: String = chars.by_ref().take(n).collect();
                    let found_len = char_len(&found);
                    assert!(
                        found_len < n || found == *delete,
                        "operation deletes {delete:?} at {consumed}, text has {found:?}"
                    );
                    consumed += found_len;
                    result.push_str(insert);
                }
            }
        }
        assert!(
            consumed == self.len_before && chars.next().is_none(),
            "operation expects {} chars, text has a different length",
            self.len_before
        );
        result
    }

    /// The operation equivalent to applying `self` and then `next`.
    ///
    /// # Panics
    ///
    /// Panics if `next` does not start where `self` ends.
    pub fn compose(&self, next: &Operation) -> Operation {
        if self.is_empty() {
            return next.clone();
        }
        if next.is_empty() {
            return self.clone();
        }
        assert_eq!(
            self.len_after, next.len_before,
            "cannot compose: first produces {} chars, second expects {}",
            self.len_after, next.len_before
        );

        let mut first = pieces(self);
        let mut second = pieces(next);
        let mut out = Builder::default();
        loop {
            match (first.pop_front(), second.pop_front()) {
                (None, None) => break,
                (Some(Piece::Delete(text)), rest) => {
                    out.delete(text);
                    second.extend_front(rest);
                }
                (rest, Some(Piece::Insert(text))) => {
                    out.insert(text);
                    first.extend_front(rest);
                }
                (Some(Piece::Retain(n)), Some(Piece::Retain(m))) => {
                    let k = n.min(m);
                    out.retain(k);
                    first.requeue_retain(n - k);
                    second.requeue_retain(m - k);
                }
                (Some(Piece::Retain(n)), Some(Piece::Delete(text))) => {
                    let (head, tail) = split_chars(text, n);
                    let k = char_len(&head);
                    out.delete(head);
                    first.requeue_retain(n - k);
                    second.requeue_delete(tail);
                }
                (Some(Piece::Insert(text)), Some(Piece::Retain(m))) => {
                    let (head, tail) = split_chars(text, m);
                    let k = char_len(&head);
                    out.insert(head);
                    first.requeue_insert(tail);
                    second.requeue_retain(m - k);
                }
                (Some(Piece::Insert(text)), Some(Piece::Delete(deleted))) => {
                    let n = char_len(&text).min(char_len(&deleted));
                    first.requeue_insert(split_chars(text, n).1);
                    second.requeue_delete(split_chars(deleted, n).1);
                }
                // Lengths agree, so nothing else can be left over.
                (Some(piece), None) => out.push(piece),
                (None, Some(piece)) => out.push(piece),
            }
        }
        out.finish()
    }

    pub fn invert(&self) -> Operation {
        let ops = self
            .ops
            .iter()
            .map(|op| match op {
                Op::Retain(n) => Op::Retain(*n),
                Op::Replace { delete, insert } => Op::Replace {
                    delete: insert.clone(),
                    insert: delete.clone(),
                },
            })
            .collect();
        Operation {
            ops,
            len_before: self.len_after,
            len_after: self.len_before,
        }
    }

    /// Rewrites `self` so it applies after the concurrent operation `against`.
    ///
    /// When both insert at the same offset, `Sticky::Left` keeps this
    /// operation's text before `against`'s, `Sticky::Right` after it.
    ///
    /// # Panics
    ///
    /// Panics if both operations are non-empty and start from different lengths.
    pub fn transform(&self, against: &Operation, sticky: Sticky) -> Operation {
        if self.is_empty() || against.is_empty() {
            return self.clone();
        }
        assert_eq!(
            self.len_before, against.len_before,
            "cannot transform: operations expect {} and {} chars",
            self.len_before, against.len_before
        );

        let mut mine = pieces(self);
        let mut theirs = pieces(against);
        let mut out = Builder::default();
        loop {
            match (mine.pop_front(), theirs.pop_front()) {
                (None, None) => break,
                (Some(Piece::Insert(text)), Some(Piece::Insert(other))) => match sticky {
                    Sticky::Left => {
                        out.insert(text);
                        theirs.push_front(Piece::Insert(other));
                    }
                    Sticky::Right => {
                        out.retain(char_len(&other));
                        mine.push_front(Piece::Insert(text));
                    }
                },
                (rest, Some(Piece::Insert(other))) => {
                    out.retain(char_len(&other));
                    mine.extend_front(rest);
                }
                (Some(Piece::Insert(text)), rest) => {
                    out.insert(text);
                    theirs.extend_front(rest);
                }
                (Some(Piece::Retain(n)), Some(Piece::Retain(m))) => {
                    let k = n.min(m);
                    out.retain(k);
                    mine.requeue_retain(n - k);
                    theirs.requeue_retain(m - k);
                }
                (Some(Piece::Retain(n)), Some(Piece::Delete(deleted))) => {
                    let (head, tail) = split_chars(deleted, n);
                    mine.requeue_retain(n - char_len(&head));
                    theirs.requeue_delete(tail);
                }
                (Some(Piece::Delete(text)), Some(Piece::Retain(m))) => {
                    let (head, tail) = split_chars(text, m);
                    let k = char_len(&head);
                    out.delete(head);
                    mine.requeue_delete(tail);
                    theirs.requeue_retain(m - k);
                }
                (Some(Piece::Delete(text)), Some(Piece::Delete(deleted))) => {
                    let n = char_len(&text).min(char_len(&deleted));
                    mine.requeue_delete(split_chars(text, n).1);
                    theirs.requeue_delete(split_chars(deleted, n).1);
                }
                (Some(piece), None) => out.push(piece),
                (None, Some(_)) => {}
            }
        }
        out.finish()
    }

    /// Maps a char offset in the input onto the output.
    ///
    /// Offsets inside replaced text collapse to the start of the replacement
    /// (`Left`) or its end (`Right`). Offsets past `len_before` shift by the
    /// net length change.
    pub fn transform_offset(&self, offset: usize, sticky: Sticky) -> usize {
        let mut before = 0usize;
        let mut after = 0usize;
        for op in &self.ops {
            match op {
                Op::Retain(n) => {
                    if offset < before + n {
                        return after + (offset - before);
                    }
                    before += n;
                    after += n;
                }
                Op::Replace { delete, insert } => {
                    let deleted = char_len(delete);
                    let inserted = char_len(insert);
                    let touches = if deleted == 0 {
                        offset == before
                    } else {
                        offset < before + deleted
                    };
                    if touches {
                        match sticky {
                            Sticky::Left => return after,
                            // An insertion at the offset just pushes it along.
                            Sticky::Right if deleted == 0 => {}
                            Sticky::Right => return after + inserted,
                        }
                    }
                    before += deleted;
                    after += inserted;
                }
            }
        }
        (after + offset).saturating_sub(before)
    }

    /// Canonical form: empty ops dropped, neighbours merged, replacements
    /// shrunk to the chars that actually change. An operation that changes no
    /// text normalizes to [`Operation::empty`].
    pub fn normalize_hard(&self) -> Operation {
        let mut merged = Builder::default();
        for op in &self.ops {
            match op {
                Op::Retain(n) => merged.retain(*n),
                Op::Replace { delete, insert } => {
                    merged.delete(delete.clone());
                    merged.insert(insert.clone());
                }
            }
        }

        let mut out = Builder::default();
        for op in merged.ops {
            match op {
                Op::Retain(n) => out.retain(n),
                Op::Replace { delete, insert } => {
                    let deleted: Vec<char> = delete.chars().collect();
                    let inserted: Vec<char> = insert.chars().collect();
                    let prefix = deleted
                        .iter()
                        .zip(&inserted)
                        .take_while(|(a, b)| a == b)
                        .count();
                    let suffix = deleted[prefix..]
                        .iter()
                        .rev()
                        .zip(inserted[prefix..].iter().rev())
                        .take_while(|(a, b)| a == b)
                        .count();
                    out.retain(prefix);
                    out.delete(deleted[prefix..deleted.len() - suffix].iter().collect());
                    out.insert(inserted[prefix..inserted.len() - suffix].iter().collect());
                    out.retain(suffix);
                }
            }
        }

        if out.ops.iter().all(|op| matches!(op, Op::Retain(_))) {
            return Operation::empty();
        }
        out.finish()
    }
}

/// Compose a sequence of consecutive operations, oldest first.
pub fn compose_all<'a>(operations: impl IntoIterator<Item = &'a Operation>) -> Operation {
    operations
        .into_iter()
        .fold(Operation::empty(), |acc, op| acc.compose(op))
}

/// Unit of work for compose/transform: a replace split into its halves.
#[derive(Debug, Clone)]
enum Piece {
    Retain(usize),
    Delete(String),
    Insert(String),
}

fn pieces(operation: &Operation) -> VecDeque<Piece> {
    let mut out = VecDeque::with_capacity(operation.ops.len() * 2);
    for op in &operation.ops {
        match op {
            Op::Retain(0) => {}
            Op::Retain(n) => out.push_back(Piece::Retain(*n)),
            Op::Replace { delete, insert } => {
                if !delete.is_empty() {
                    out.push_back(Piece::Delete(delete.clone()));
                }
                if !insert.is_empty() {
                    out.push_back(Piece::Insert(insert.clone()));
                }
            }
        }
    }
    out
}

trait PieceQueue {
    fn extend_front(&mut self, piece: Option<Piece>);
    fn requeue_retain(&mut self, n: usize);
    fn requeue_delete(&mut self, text: String);
    fn requeue_insert(&mut self, text: String);
}

impl PieceQueue for VecDeque<Piece> {
    fn extend_front(&mut self, piece: Option<Piece>) {
        if let Some(piece) = piece {
            self.push_front(piece);
        }
    }

    fn requeue_retain(&mut self, n: usize) {
        if n > 0 {
            self.push_front(Piece::Retain(n));
        }
    }

    fn requeue_delete(&mut self, text: String) {
        if !text.is_empty() {
            self.push_front(Piece::Delete(text));
        }
    }

    fn requeue_insert(&mut self, text: String) {
        if !text.is_empty() {
            self.push_front(Piece::Insert(text));
        }
    }
}

/// Accumulates ops, merging neighbours of the same kind.
#[derive(Default)]
struct Builder {
    ops: Vec<Op>,
}

impl Builder {
    fn retain(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        if let Some(Op::Retain(m)) = self.ops.last_mut() {
            *m += n;
        } else {
            self.ops.push(Op::Retain(n));
        }
    }

    fn delete(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if let Some(Op::Replace { delete, .. }) = self.ops.last_mut() {
            delete.push_str(&text);
        } else {
            self.ops.push(Op::Replace {
                delete: text,
                insert: String::new(),
            });
        }
    }

    fn insert(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if let Some(Op::Replace { insert, .. }) = self.ops.last_mut() {
            insert.push_str(&text);
        } else {
            self.ops.push(Op::Replace {
                delete: String::new(),
                insert: text,
            });
        }
    }

    fn push(&mut self, piece: Piece) {
        match piece {
            Piece::Retain(n) => self.retain(n),
            Piece::Delete(text) => self.delete(text),
            Piece::Insert(text) => self.insert(text),
        }
    }

    fn finish(self) -> Operation {
        Operation::from_ops(self.ops)
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Splits after the first `n` chars (or at the end if shorter).
fn split_chars(mut text: String, n: usize) -> (String, String) {
    let at = text
        .char_indices()
        .nth(n)
        .map(|(index, _)| index)
        .unwrap_or(text.len());
    let tail = text.split_off(at);
    (text, tail)
}
