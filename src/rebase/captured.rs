//! Values paired with the edit log they were computed against.
//!
//! Each `Captured*` type is an independent snapshot: the value plus the
//! [`EditLog`] that was current when the value was valid. Rebasing bridges
//! that log with a document's current log and pushes the value through the
//! bridging operation. Positions stick to the left of text inserted exactly
//! at them.
//!
//! `rebase_or_none` returns `None` when the logs cannot be bridged, which is a
//! normal outcome for stale snapshots. The plain `rebase` variants panic
//! instead and are kept for call sites that have already established the
//! document descends from the capture.

use super::bridge_or_none;
use crate::core::{CaretPosition, Intervals, Operation, Sticky, TextRange};
use crate::doc::Document;
use crate::log::EditLog;

const STICKY: Sticky = Sticky::Left;

fn bridge_to(base: &EditLog, document: &impl Document) -> Option<Operation> {
    bridge_or_none(base, document.edits())
}

fn expect_rebased<T>(rebased: Option<T>) -> T {
    match rebased {
        Some(value) => value,
        None => panic!("captured value cannot be rebased onto this document"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOperation {
    pub operation: Operation,
    pub base: EditLog,
}

impl CapturedOperation {
    pub fn new(operation: Operation, base: EditLog) -> Self {
        Self { operation, base }
    }

    pub fn rebase_or_none(&self, document: &impl Document) -> Option<Operation> {
        let bridge = bridge_to(&self.base, document)?;
        Some(self.operation.transform(&bridge, STICKY))
    }

    #[deprecated(note = "use `rebase_or_none`")]
    pub fn rebase(&self, document: &impl Document) -> Operation {
        expect_rebased(self.rebase_or_none(document))
    }

    /// Rebases onto `document` and captures the result against its current
    /// log, so a long-lived edit can keep following a live document.
    pub fn update(&self, document: &impl Document) -> Option<CapturedOperation> {
        let operation = self.rebase_or_none(document)?;
        Some(CapturedOperation::new(operation, document.edits().clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOffset {
    pub offset: usize,
    pub base: EditLog,
}

impl CapturedOffset {
    pub fn new(offset: usize, base: EditLog) -> Self {
        Self { offset, base }
    }

    pub fn rebase_or_none(&self, document: &impl Document) -> Option<usize> {
        let bridge = bridge_to(&self.base, document)?;
        Some(bridge.transform_offset(self.offset, STICKY))
    }

    #[deprecated(note = "use `rebase_or_none`")]
    pub fn rebase(&self, document: &impl Document) -> usize {
        expect_rebased(self.rebase_or_none(document))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedTextRange {
    pub range: TextRange,
    pub base: EditLog,
}

impl CapturedTextRange {
    pub fn new(range: TextRange, base: EditLog) -> Self {
        Self { range, base }
    }

    pub fn rebase_or_none(&self, document: &impl Document) -> Option<TextRange> {
        self.rebase_with_or_none(document, STICKY)
    }

    /// `empty_range_stickiness` only matters when the range is zero-width.
    pub fn rebase_with_or_none(
        &self,
        document: &impl Document,
        empty_range_stickiness: Sticky,
    ) -> Option<TextRange> {
        let bridge = bridge_to(&self.base, document)?;
        Some(self.range.transform(&bridge, empty_range_stickiness))
    }

    #[deprecated(note = "use `rebase_with_or_none`")]
    pub fn rebase(&self, document: &impl Document, empty_range_stickiness: Sticky) -> TextRange {
        expect_rebased(self.rebase_with_or_none(document, empty_range_stickiness))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedIntervals<K, V> {
    pub intervals: Intervals<K, V>,
    pub base: EditLog,
}

impl<K: Clone, V: Clone> CapturedIntervals<K, V> {
    pub fn new(intervals: Intervals<K, V>, base: EditLog) -> Self {
        Self { intervals, base }
    }

    pub fn rebase_or_none(&self, document: &impl Document) -> Option<Intervals<K, V>> {
        let bridge = bridge_to(&self.base, document)?;
        Some(self.intervals.edit(&bridge))
    }

    #[deprecated(note = "use `rebase_or_none`")]
    pub fn rebase(&self, document: &impl Document) -> Intervals<K, V> {
        expect_rebased(self.rebase_or_none(document))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCaretPosition {
    pub caret: CaretPosition,
    pub base: EditLog,
}

impl CapturedCaretPosition {
    pub fn new(caret: CaretPosition, base: EditLog) -> Self {
        Self { caret, base }
    }

    pub fn rebase_or_none(&self, document: &impl Document) -> Option<CaretPosition> {
        let bridge = bridge_to(&self.base, document)?;
        Some(self.caret.transform(&bridge, STICKY))
    }

    #[deprecated(note = "use `rebase_or_none`")]
    pub fn rebase(&self, document: &impl Document) -> CaretPosition {
        expect_rebased(self.rebase_or_none(document))
    }
}
