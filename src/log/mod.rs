//! Append-only, trimmable history of edits.
//!
//! An [`EditLog`] is an immutable value: every method that changes it returns
//! a new log sharing storage with the old one, so snapshots are cheap to keep
//! around and safe to hand to other threads.
//!
//! Every entry has a logical timestamp: the entry appended when the log's
//! timestamp was `t` has timestamp `t`. Trimming evicts the oldest entries but
//! never rewinds the timestamp, so lookups into evicted history fail with
//! [`LogError::Trimmed`] instead of silently reading the wrong entry.

use crate::core::{Operation, PersistentVec, Uid};
use serde::{Deserialize, Serialize};

/// Lookup failures a caller is expected to handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    #[error("edit id is not among the retained entries")]
    NotFound,
    #[error("timestamp {timestamp} refers to trimmed history")]
    Trimmed { timestamp: u64 },
    #[error("timestamp {timestamp} is not before log timestamp {log_timestamp}")]
    OutOfRange { timestamp: u64, log_timestamp: u64 },
}

/// Bounds enforced by [`EditLog::trim_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimPolicy {
    pub max_entry_count: usize,
    /// Upper bound on the sum of [`Operation::size`] over retained entries.
    pub max_op_size: usize,
}

impl Default for TrimPolicy {
    fn default() -> Self {
        Self {
            max_entry_count: 10_000,
            max_op_size: 10 * 1024 * 1024, // 10M chars
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditLog {
    operations: PersistentVec<Operation>,
    ids: PersistentVec<Uid>,
    timestamp: u64,
    sum_of_operation_sizes: usize,
}

impl EditLog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn operations(&self) -> &PersistentVec<Operation> {
        &self.operations
    }

    pub fn ids(&self) -> &PersistentVec<Uid> {
        &self.ids
    }

    /// Number of edits ever appended to this log's lineage.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn sum_of_operation_sizes(&self) -> usize {
        self.sum_of_operation_sizes
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// True if entries have been evicted from the front.
    pub fn is_trimmed(&self) -> bool {
        self.timestamp > self.operations.len() as u64
    }

    /// Timestamp of the oldest retained entry.
    pub fn first_timestamp(&self) -> u64 {
        self.timestamp - self.operations.len() as u64
    }

    /// Id of the newest entry.
    pub fn version(&self) -> Option<Uid> {
        self.ids.last().copied()
    }

    /// Position in the retained window of the entry with timestamp `t`.
    /// Negative when `t` is evicted.
    fn window_offset(&self, timestamp: u64) -> i64 {
        self.operations.len() as i64 - (self.timestamp - timestamp) as i64
    }

    /// # Panics
    ///
    /// Panics if `operation` cannot follow the newest non-empty operation in
    /// the log. Empty operations are accepted anywhere.
    pub fn append(&self, id: Uid, operation: Operation) -> EditLog {
        if !operation.is_empty()
            && let Some(previous) = self.operations.iter().rev().find(|op| !op.is_empty())
        {
            assert_eq!(
                previous.len_after(),
                operation.len_before(),
                "operation {id} expects {} chars but the log ends at {}",
                operation.len_before(),
                previous.len_after()
            );
        }
        EditLog {
            sum_of_operation_sizes: self.sum_of_operation_sizes + operation.size(),
            operations: self.operations.push_back(operation),
            ids: self.ids.push_back(id),
            timestamp: self.timestamp + 1,
        }
    }

    /// The log as it was when its timestamp was `timestamp`.
    ///
    /// # Panics
    ///
    /// Panics if `timestamp` is ahead of the log.
    pub fn as_of(&self, timestamp: u64) -> Result<EditLog, LogError> {
        assert!(
            timestamp <= self.timestamp,
            "timestamp {timestamp} is ahead of log timestamp {}",
            self.timestamp
        );
        let offset = self.window_offset(timestamp);
        if offset < 0 {
            return Err(LogError::Trimmed { timestamp });
        }
        Ok(self.prefix(offset as usize))
    }

    /// The log truncated just after `edit_id`, or the empty log for `None`.
    pub fn as_of_id(&self, edit_id: Option<&Uid>) -> Result<EditLog, LogError> {
        let Some(edit_id) = edit_id else {
            return Ok(EditLog::empty());
        };
        let index = self.position(edit_id)?;
        Ok(self.prefix(index + 1))
    }

    /// Operations appended after `edit_id`, or every retained operation for
    /// `None`.
    pub fn operations_since(&self, edit_id: Option<&Uid>) -> Result<PersistentVec<Operation>, LogError> {
        let Some(edit_id) = edit_id else {
            return Ok(self.operations.clone());
        };
        let index = self.position(edit_id)?;
        Ok(self.operations.slice(index + 1, self.operations.len()))
    }

    /// Operations with timestamps in `from..to`.
    ///
    /// # Panics
    ///
    /// Panics if `from > to` or `to` is ahead of the log.
    pub fn slice(&self, from: u64, to: u64) -> Result<PersistentVec<Operation>, LogError> {
        assert!(
            from <= to && to <= self.timestamp,
            "slice {from}..{to} is outside log timestamp {}",
            self.timestamp
        );
        let start = self.window_offset(from);
        if start < 0 {
            return Err(LogError::Trimmed { timestamp: from });
        }
        let end = self.window_offset(to);
        Ok(self.operations.slice(start as usize, end as usize))
    }

    /// Evicts the oldest entries until at most `max_entry_count` remain and
    /// their sizes sum to at most `max_op_size`. The timestamp is kept.
    pub fn trim(&self, max_entry_count: usize, max_op_size: usize) -> EditLog {
        let len = self.operations.len();
        let mut evicted = 0usize;
        let mut sum = self.sum_of_operation_sizes;
        for operation in self.operations.iter() {
            if len - evicted <= max_entry_count && sum <= max_op_size {
                break;
            }
            sum -= operation.size();
            evicted += 1;
        }
        if evicted == 0 {
            return self.clone();
        }
        tracing::trace!(
            evicted,
            retained = len - evicted,
            timestamp = self.timestamp,
            "trimmed edit log"
        );
        EditLog {
            operations: self.operations.slice(evicted, len),
            ids: self.ids.slice(evicted, len),
            timestamp: self.timestamp,
            sum_of_operation_sizes: sum,
        }
    }

    pub fn trim_to(&self, policy: &TrimPolicy) -> EditLog {
        self.trim(policy.max_entry_count, policy.max_op_size)
    }

    /// Id of the entry appended at `timestamp`.
    pub fn id_at_timestamp(&self, timestamp: u64) -> Result<Uid, LogError> {
        if timestamp >= self.timestamp {
            return Err(LogError::OutOfRange {
                timestamp,
                log_timestamp: self.timestamp,
            });
        }
        let offset = self.window_offset(timestamp);
        if offset < 0 {
            return Err(LogError::Trimmed { timestamp });
        }
        self.ids
            .get(offset as usize)
            .copied()
            .ok_or(LogError::Trimmed { timestamp })
    }

    /// Window index of `edit_id`, searching newest first.
    fn position(&self, edit_id: &Uid) -> Result<usize, LogError> {
        self.ids
            .iter()
            .rposition(|id| id == edit_id)
            .ok_or(LogError::NotFound)
    }

    /// The first `keep` retained entries, with the timestamp rolled back to
    /// match.
    fn prefix(&self, keep: usize) -> EditLog {
        let len = self.operations.len();
        if keep == len {
            return self.clone();
        }
        let dropped: usize = self
            .operations
            .iter()
            .skip(keep)
            .map(Operation::size)
            .sum();
        EditLog {
            operations: self.operations.slice(0, keep),
            ids: self.ids.slice(0, keep),
            timestamp: self.timestamp - (len - keep) as u64,
            sum_of_operation_sizes: self.sum_of_operation_sizes - dropped,
        }
    }
}
