//! Documents that carry an edit log, and a plain-text implementation.
//!
//! [`Document`] is the read side rebasing needs: the current [`EditLog`]. The
//! `capture_*` helpers snapshot a value against the log as of some timestamp.
//! [`MutableDocument`] adds `edit`, and [`MutableDocument::apply_diff`] is
//! where a rebased operation re-enters the document.

use crate::core::{CaretPosition, Intervals, Operation, TextRange, Uid, new_uid};
use crate::log::{EditLog, LogError, TrimPolicy};
use crate::rebase::{
    CapturedCaretPosition, CapturedIntervals, CapturedOffset, CapturedOperation,
    CapturedTextRange,
};

pub trait Document {
    fn edits(&self) -> &EditLog;

    fn timestamp(&self) -> u64 {
        self.edits().timestamp()
    }

    /// Captures `operation` as computed against the document at `timestamp`.
    fn capture_operation(
        &self,
        operation: Operation,
        timestamp: u64,
    ) -> Result<CapturedOperation, LogError> {
        Ok(CapturedOperation::new(operation, self.edits().as_of(timestamp)?))
    }

    fn capture_offset(&self, offset: usize, timestamp: u64) -> Result<CapturedOffset, LogError> {
        Ok(CapturedOffset::new(offset, self.edits().as_of(timestamp)?))
    }

    fn capture_text_range(
        &self,
        range: TextRange,
        timestamp: u64,
    ) -> Result<CapturedTextRange, LogError> {
        Ok(CapturedTextRange::new(range, self.edits().as_of(timestamp)?))
    }

    fn capture_intervals<K: Clone, V: Clone>(
        &self,
        intervals: Intervals<K, V>,
        timestamp: u64,
    ) -> Result<CapturedIntervals<K, V>, LogError> {
        Ok(CapturedIntervals::new(intervals, self.edits().as_of(timestamp)?))
    }

    fn capture_caret_position(
        &self,
        caret: CaretPosition,
        timestamp: u64,
    ) -> Result<CapturedCaretPosition, LogError> {
        Ok(CapturedCaretPosition::new(caret, self.edits().as_of(timestamp)?))
    }
}

pub trait MutableDocument: Document {
    fn edit(&mut self, operation: Operation);

    /// Rebases `captured` onto this document and applies it. Returns `false`,
    /// leaving the document untouched, if the capture cannot be bridged.
    fn apply_diff(&mut self, captured: &CapturedOperation) -> bool
    where
        Self: Sized,
    {
        match captured.rebase_or_none(&*self) {
            Some(operation) => {
                self.edit(operation);
                true
            }
            None => false,
        }
    }
}

/// An in-memory text buffer with its edit history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    text: String,
    edits: EditLog,
    trim_policy: TrimPolicy,
}

impl TextDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document whose history starts with a single insertion of `text`.
    pub fn with_text(text: &str) -> Self {
        let mut document = Self::new();
        document.edit(Operation::insert(0, text, 0));
        document
    }

    pub fn with_trim_policy(mut self, trim_policy: TrimPolicy) -> Self {
        self.trim_policy = trim_policy;
        self.edits = self.edits.trim_to(&trim_policy);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn trim_policy(&self) -> &TrimPolicy {
        &self.trim_policy
    }

    /// Applies an edit that already has an id, such as one received from
    /// another replica.
    ///
    /// # Panics
    ///
    /// Panics if `operation` is non-empty and does not start from the
    /// document's current length, or if the text it records as deleted is not
    /// the text at that position. The document is left unchanged.
    pub fn edit_with_id(&mut self, id: Uid, operation: Operation) {
        let text = operation.apply(&self.text);
        let edits = self.edits.append(id, operation).trim_to(&self.trim_policy);
        self.text = text;
        self.edits = edits;
    }

    /// Replaces the whole text, recording the minimal single replacement.
    pub fn set_text(&mut self, text: &str) {
        let operation = Operation::diff(&self.text, text).normalize_hard();
        if !operation.is_empty() {
            self.edit(operation);
        }
    }
}

impl Document for TextDocument {
    fn edits(&self) -> &EditLog {
        &self.edits
    }
}

impl MutableDocument for TextDocument {
    fn edit(&mut self, operation: Operation) {
        self.edit_with_id(new_uid(), operation);
    }
}
