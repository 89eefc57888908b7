//! Turning an offset remapping into an operation.
//!
//! Some callers only know where each old offset lands (a foreign editor's
//! cursor model, for example), not which edit produced the move. [`project`]
//! synthesizes an [`Operation`] that moves every interval boundary of an
//! [`Intervals`] set exactly as the offset function says, so the set can be
//! edited through the usual operation path.
//!
//! The synthesized operation only visits the breakpoints that matter: each
//! interval's `from`, the offset just before it, and its `to`. Work is linear
//! in the number of intervals, not in document length. Inserted and deleted
//! text is made of [`PLACEHOLDER`] chars; operations never look at content
//! when mapping offsets.

use super::intervals::Intervals;
use super::operation::{Op, Operation};

/// Filler for synthesized insertions and deletions.
pub const PLACEHOLDER: char = '\u{FFFC}';

pub trait NewOffsetProvider {
    fn new_offset(&self, offset: usize) -> usize;
}

impl<F> NewOffsetProvider for F
where
    F: Fn(usize) -> usize,
{
    fn new_offset(&self, offset: usize) -> usize {
        self(offset)
    }
}

/// Sorted, deduplicated offsets at which `intervals` can be observed.
pub fn breakpoints<K, V>(intervals: &Intervals<K, V>) -> Vec<usize> {
    let mut points = Vec::new();
    for interval in intervals.iter() {
        if interval.from > 0 {
            push_breakpoint(&mut points, interval.from - 1);
        }
        points.push(interval.from);
        points.push(interval.to);
    }
    points.sort_unstable();
    points.dedup();
    points
}

/// Adds `point` only if it lies beyond the last added breakpoint.
fn push_breakpoint(points: &mut Vec<usize>, point: usize) {
    if points.last().is_none_or(|&last| point > last) {
        points.push(point);
    }
}

/// Builds the operation that maps every breakpoint `p` of `intervals` to
/// `provider.new_offset(p)` under right stickiness.
///
/// A shrink at `p` deletes the chars just before `p`, but never more than the
/// distance back to the previous breakpoint.
pub fn project<K, V>(intervals: &Intervals<K, V>, provider: &impl NewOffsetProvider) -> Operation {
    let mut ops = Vec::new();
    let mut current_shift: isize = 0;
    let mut emitted_at = 0usize;
    let mut previous_point = 0usize;

    for point in std::iter::once(0).chain(breakpoints(intervals)) {
        let target = provider.new_offset(point) as isize;
        let to_shift = target - point as isize - current_shift;
        if to_shift < 0 {
            let deleted = to_shift.unsigned_abs().min(point - previous_point);
            if deleted > 0 {
                push_retain(&mut ops, point - deleted - emitted_at);
                ops.push(Op::Replace {
                    delete: placeholder(deleted),
                    insert: String::new(),
                });
                current_shift -= deleted as isize;
                emitted_at = point;
            }
        } else if to_shift > 0 {
            push_retain(&mut ops, point - emitted_at);
            ops.push(Op::Replace {
                delete: String::new(),
                insert: placeholder(to_shift.unsigned_abs()),
            });
            current_shift += to_shift;
            emitted_at = point;
        }
        previous_point = point;
    }

    Operation::from_ops(ops)
}

fn push_retain(ops: &mut Vec<Op>, n: usize) {
    if n > 0 {
        ops.push(Op::Retain(n));
    }
}

fn placeholder(len: usize) -> String {
    std::iter::repeat_n(PLACEHOLDER, len).collect()
}
