//! ot-rebase: edit history and rebasing for collaborative plain-text editing.
//!
//! A document keeps an [`EditLog`] of the operations that produced its
//! current text. Anything computed against an older state of the document
//! (an edit, a cursor, a selection, a set of annotations) can be captured
//! together with the log at that time and later rebased onto the live
//! document, even when the two logs come from different replicas or have been
//! trimmed to different windows.
//!
//! - **Operations** - retain/replace edits with compose, invert and transform
//! - **Edit log** - persistent, trimmable history keyed by logical timestamps
//! - **Bridging** - one operation between any two related logs
//! - **Captured values** - offsets, ranges, carets and intervals that follow edits
//!
//! # Quick Start
//!
//! ```rust
//! use ot_rebase::{Document, MutableDocument, Operation, TextDocument};
//!
//! let mut doc = TextDocument::with_text("hello world");
//! let cursor = doc.capture_offset(6, doc.timestamp()).unwrap();
//!
//! doc.edit(Operation::insert(0, ">> ", 11));
//!
//! assert_eq!(cursor.rebase_or_none(&doc), Some(9));
//! ```

// Operations, positions, intervals and persistent storage
pub mod core;

// Documents and the capture entry points
pub mod doc;

// Edit history
pub mod log;

// Bridging and captured values
pub mod rebase;

pub use core::{
    CaretPosition, Interval, Intervals, NewOffsetProvider, Op, Operation, PersistentVec, Sticky,
    TextRange, Uid, compose_all, new_uid,
};
pub use doc::{Document, MutableDocument, TextDocument};
pub use log::{EditLog, LogError, TrimPolicy};
pub use rebase::{
    BridgeError, CapturedCaretPosition, CapturedIntervals, CapturedOffset, CapturedOperation,
    CapturedTextRange, bridge_or_none, try_bridge,
};
