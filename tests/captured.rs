use ot_rebase::core::{CaretPosition, Intervals, Operation, Sticky, TextRange, compose_all};
use ot_rebase::doc::{Document, MutableDocument, TextDocument};
use ot_rebase::log::{LogError, TrimPolicy};
use ot_rebase::rebase::CapturedOperation;
use proptest::prelude::*;

fn ranges(intervals: &Intervals<&'static str, u32>) -> Vec<(&'static str, usize, usize)> {
    intervals
        .iter()
        .map(|entry| (entry.key, entry.from, entry.to))
        .collect()
}

/// A document whose history only keeps the newest `max_entry_count` edits.
fn short_memory(text: &str, max_entry_count: usize) -> TextDocument {
    let mut doc = TextDocument::new().with_trim_policy(TrimPolicy {
        max_entry_count,
        max_op_size: usize::MAX,
    });
    doc.edit(Operation::insert(0, text, 0));
    doc
}

#[test]
fn offset_round_trip_matches_composed_edits() {
    let mut doc = TextDocument::with_text("abcdef");
    let cursor = doc.capture_offset(3, doc.timestamp()).unwrap();

    let op1 = Operation::insert(1, "XY", 6);
    let op2 = Operation::delete(4, "cd", 8);
    doc.edit(op1.clone());
    doc.edit(op2.clone());
    assert_eq!(doc.text(), "aXYbef");

    let direct = op1.compose(&op2).transform_offset(3, Sticky::Left);
    assert_eq!(cursor.rebase_or_none(&doc), Some(direct));
    assert_eq!(direct, 4);
}

#[test]
fn capture_at_an_older_timestamp() {
    let mut doc = TextDocument::with_text("hello");
    doc.edit(Operation::insert(5, " world", 5));
    // Offset 5 was the end of "hello", before " world" existed.
    let cursor = doc.capture_offset(5, 1).unwrap();
    assert_eq!(cursor.base.timestamp(), 1);
    doc.edit(Operation::insert(0, "> ", 11));
    assert_eq!(cursor.rebase_or_none(&doc), Some(7));
}

#[test]
fn captured_operation_follows_concurrent_edits() {
    let mut doc = TextDocument::with_text("the cat sat");
    let fix = doc
        .capture_operation(Operation::replace(4, "cat", "dog", 11), doc.timestamp())
        .unwrap();

    doc.edit(Operation::insert(0, "Today ", 11));
    doc.edit(Operation::insert(17, " down", 17));
    assert_eq!(doc.text(), "Today the cat sat down");

    assert!(doc.apply_diff(&fix));
    assert_eq!(doc.text(), "Today the dog sat down");
}

#[test]
fn update_recaptures_against_the_current_log() {
    let mut doc = TextDocument::with_text("abc");
    let pending = doc
        .capture_operation(Operation::insert(3, "!", 3), doc.timestamp())
        .unwrap();
    doc.edit(Operation::insert(0, "xx", 3));

    let updated = pending.update(&doc).unwrap();
    assert_eq!(updated.base, doc.edits().clone());
    assert_eq!(updated.operation, Operation::insert(5, "!", 5));

    doc.edit(Operation::delete(0, "x", 5));
    assert!(doc.apply_diff(&updated));
    assert_eq!(doc.text(), "xabc!");
}

#[test]
fn stale_capture_is_not_applied() {
    let mut doc = short_memory("abc", 2);
    let stale = doc
        .capture_operation(Operation::insert(0, "!", 3), doc.timestamp())
        .unwrap();
    for n in 3..6 {
        doc.edit(Operation::insert(n, "z", n));
    }

    let before = doc.clone();
    assert!(!doc.apply_diff(&stale));
    assert_eq!(doc, before);
    assert_eq!(stale.rebase_or_none(&doc), None);
    assert_eq!(stale.update(&doc), None);
}

#[test]
fn capturing_evicted_history_fails() {
    let mut doc = short_memory("abc", 1);
    doc.edit(Operation::insert(3, "d", 3));
    assert_eq!(
        doc.capture_offset(1, 0).err(),
        Some(LogError::Trimmed { timestamp: 0 })
    );
}

#[test]
fn text_range_keeps_its_text() {
    let mut doc = TextDocument::with_text("abcdef");
    let range = doc.capture_text_range(TextRange::new(2, 4), doc.timestamp()).unwrap();

    doc.edit(Operation::insert(2, "Z", 6));
    doc.edit(Operation::insert(5, "Z", 7));
    assert_eq!(doc.text(), "abZcdZef");
    assert_eq!(range.rebase_or_none(&doc), Some(TextRange::new(3, 5)));
}

#[test]
fn empty_range_uses_the_override() {
    let mut doc = TextDocument::with_text("abc");
    let caret = doc.capture_text_range(TextRange::point(1), doc.timestamp()).unwrap();
    doc.edit(Operation::insert(1, "__", 3));

    assert_eq!(caret.rebase_or_none(&doc), Some(TextRange::point(1)));
    assert_eq!(
        caret.rebase_with_or_none(&doc, Sticky::Right),
        Some(TextRange::point(3))
    );
}

#[test]
fn deleted_range_collapses() {
    let mut doc = TextDocument::with_text("abcdef");
    let range = doc.capture_text_range(TextRange::new(2, 4), doc.timestamp()).unwrap();
    doc.edit(Operation::delete(1, "bcde", 6));
    assert_eq!(range.rebase_or_none(&doc), Some(TextRange::point(1)));
}

#[test]
fn caret_and_selection_move_together() {
    let mut doc = TextDocument::with_text("select me");
    let caret = doc
        .capture_caret_position(
            CaretPosition::with_selection(9, TextRange::new(7, 9)),
            doc.timestamp(),
        )
        .unwrap();
    doc.edit(Operation::insert(0, ">>", 9));

    let rebased = caret.rebase_or_none(&doc).unwrap();
    assert_eq!(rebased, CaretPosition::with_selection(11, TextRange::new(9, 11)));
    assert_eq!(rebased.offset, doc.len());
}

#[test]
fn intervals_grow_at_their_end() {
    let mut doc = TextDocument::with_text("bold plain");
    let marks = Intervals::new().insert("bold", 0, 4, 1).insert("plain", 5, 10, 2);
    let captured = doc.capture_intervals(marks, doc.timestamp()).unwrap();

    doc.edit(Operation::insert(4, "er", 10));
    let rebased = captured.rebase_or_none(&doc).unwrap();
    assert_eq!(ranges(&rebased), vec![("bold", 0, 6), ("plain", 7, 12)]);
    assert_eq!(rebased.iter().map(|entry| entry.value).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn captures_rebase_across_replicas() {
    let mut local = TextDocument::with_text("shared");
    let mut remote = local.clone();
    let cursor = local.capture_offset(6, local.timestamp()).unwrap();

    local.edit(Operation::insert(0, "local ", 6));
    remote.edit(Operation::insert(6, " remote", 6));

    // Text appended right at the cursor lands after it.
    assert_eq!(cursor.rebase_or_none(&remote), Some(6));
    assert_eq!(cursor.rebase_or_none(&local), Some(12));
}

#[test]
#[allow(deprecated)]
fn deprecated_rebase_agrees_when_bridgeable() {
    let mut doc = TextDocument::with_text("abc");
    let offset = doc.capture_offset(2, doc.timestamp()).unwrap();
    let range = doc.capture_text_range(TextRange::point(2), doc.timestamp()).unwrap();
    doc.edit(Operation::insert(2, "Q", 3));
    assert_eq!(offset.rebase(&doc), 2);
    assert_eq!(range.rebase(&doc, Sticky::Right), TextRange::point(3));
}

#[test]
#[allow(deprecated)]
#[should_panic(expected = "cannot be rebased")]
fn deprecated_rebase_panics_when_stale() {
    let mut doc = short_memory("abc", 1);
    let stale = doc.capture_offset(0, doc.timestamp()).unwrap();
    doc.edit(Operation::insert(3, "d", 3));
    doc.edit(Operation::insert(4, "e", 4));
    let _ = stale.rebase(&doc);
}

#[derive(Clone, Debug)]
struct Step {
    at: prop::sample::Index,
    delete: usize,
    insert: String,
}

fn steps() -> impl Strategy<Value = Vec<Step>> {
    proptest::collection::vec(
        (any::<prop::sample::Index>(), 0usize..3, "[xyz]{0,3}")
            .prop_map(|(at, delete, insert)| Step { at, delete, insert }),
        1..10,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_config::cases()))]
    #[test]
    fn prop_round_trip_equals_direct_transform(
        text in "[a-e]{0,12}",
        offset in any::<prop::sample::Index>(),
        steps in steps(),
    ) {
        let mut doc = TextDocument::with_text(&text);
        let offset = offset.index(doc.len() + 1);
        let captured = doc.capture_offset(offset, doc.timestamp()).unwrap();

        let mut applied = Vec::new();
        for step in &steps {
            let len = doc.len();
            let at = step.at.index(len + 1);
            let deleted: String = doc.text().chars().skip(at).take(step.delete).collect();
            let operation = Operation::replace(at, &deleted, &step.insert, len);
            doc.edit(operation.clone());
            applied.push(operation);
        }

        let direct = compose_all(&applied)
            .normalize_hard()
            .transform_offset(offset, Sticky::Left);
        prop_assert_eq!(captured.rebase_or_none(&doc), Some(direct));
    }

    #[test]
    fn prop_captured_operation_lands_on_current_text(
        text in "[a-e]{1,12}",
        at in any::<prop::sample::Index>(),
        steps in steps(),
    ) {
        let mut doc = TextDocument::with_text(&text);
        let len = doc.len();
        let insert_at = at.index(len + 1);
        let captured: CapturedOperation = doc
            .capture_operation(Operation::insert(insert_at, "#", len), doc.timestamp())
            .unwrap();

        for step in &steps {
            let len = doc.len();
            let at = step.at.index(len + 1);
            let deleted: String = doc.text().chars().skip(at).take(step.delete).collect();
            doc.edit(Operation::replace(at, &deleted, &step.insert, len));
        }

        let before = doc.len();
        prop_assert!(doc.apply_diff(&captured));
        prop_assert_eq!(doc.len(), before + 1);
        prop_assert_eq!(doc.text().matches('#').count(), 1);
    }
}
