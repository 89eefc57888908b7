//! Value primitives the rebasing core is built on.
//!
//! - [`Operation`] - composable, invertible text operations
//! - [`PersistentVec`] - structurally shared vector backing edit logs
//! - [`Intervals`] - offset annotations edited through operations
//! - [`TextRange`] and [`CaretPosition`] - positions that follow edits

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod intervals;
pub mod operation;
pub mod projection;
pub mod vector;

pub use intervals::{Interval, Intervals};
pub use operation::{Op, Operation, Sticky, compose_all};
pub use projection::{NewOffsetProvider, PLACEHOLDER};
pub use vector::PersistentVec;

/// Identity of one edit in a log. Only equality is meaningful.
pub type Uid = Uuid;

pub fn new_uid() -> Uid {
    Uuid::new_v4()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "range start {start} is after end {end}");
        Self { start, end }
    }

    pub fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Maps the range through `operation`.
    ///
    /// A non-empty range does not grow when text is inserted at its edges. A
    /// zero-width range has no inside, so both ends follow
    /// `empty_range_stickiness`. A range whose text is deleted collapses to a
    /// point next to whatever replaced it.
    pub fn transform(&self, operation: &Operation, empty_range_stickiness: Sticky) -> TextRange {
        if self.is_empty() {
            return TextRange::point(operation.transform_offset(self.start, empty_range_stickiness));
        }
        let start = operation.transform_offset(self.start, Sticky::Right);
        let end = operation.transform_offset(self.end, Sticky::Left);
        if start > end {
            TextRange::point(end)
        } else {
            TextRange { start, end }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaretPosition {
    pub offset: usize,
    pub selection: Option<TextRange>,
}

impl CaretPosition {
    pub fn at(offset: usize) -> Self {
        Self {
            offset,
            selection: None,
        }
    }

    pub fn with_selection(offset: usize, selection: TextRange) -> Self {
        Self {
            offset,
            selection: Some(selection),
        }
    }

    pub fn transform(&self, operation: &Operation, sticky: Sticky) -> CaretPosition {
        CaretPosition {
            offset: operation.transform_offset(self.offset, sticky),
            selection: self
                .selection
                .map(|selection| selection.transform(operation, sticky)),
        }
    }
}
