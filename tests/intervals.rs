use ot_rebase::core::projection::{breakpoints, project};
use ot_rebase::core::{Interval, Intervals, Operation, PLACEHOLDER};
use proptest::collection::vec;
use proptest::prelude::*;

fn spans(intervals: &Intervals<u32, ()>) -> Vec<(usize, usize)> {
    intervals.iter().map(|entry| (entry.from, entry.to)).collect()
}

fn interval_set() -> impl Strategy<Value = Intervals<u32, ()>> {
    vec((0usize..40, 0usize..10), 0..12).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .fold(Intervals::new(), |set, (key, (from, len))| {
                set.insert(key as u32, from, from + len, ())
            })
    })
}

/// Intervals stacked inside each other, sharing or nearly sharing a start.
fn nested_set() -> impl Strategy<Value = Intervals<u32, ()>> {
    (0usize..30, vec((0usize..3, 0usize..20), 1..6)).prop_map(|(start, layers)| {
        layers
            .into_iter()
            .enumerate()
            .fold(Intervals::new(), |set, (key, (indent, len))| {
                set.insert(key as u32, start + indent, start + indent + len, ())
            })
    })
}

#[test]
fn identity_projection_is_a_no_op() {
    let set = Intervals::new()
        .insert(1, 0, 3, ())
        .insert(2, 3, 3, ())
        .insert(3, 10, 20, ());
    assert!(project(&set, &|offset: usize| offset).is_empty());
    assert_eq!(set.edit_offsets(&|offset: usize| offset), set);
}

#[test]
fn projection_only_uses_placeholders() {
    let set = Intervals::new().insert(1, 2, 6, ());
    let op = project(&set, &|offset: usize| offset * 2);
    for part in op.ops() {
        if let ot_rebase::core::Op::Replace { delete, insert } = part {
            assert!(delete.chars().chain(insert.chars()).all(|ch| ch == PLACEHOLDER));
        }
    }
    assert_eq!(spans(&set.edit_offsets(&|offset: usize| offset * 2)), vec![(4, 12)]);
}

#[test]
fn nested_intervals_keep_inner_endpoints() {
    let set = Intervals::new().insert(1, 2, 12, ()).insert(2, 5, 8, ());
    assert_eq!(breakpoints(&set), vec![1, 2, 5, 8, 12]);
    let shifted = set.edit_offsets(&|offset: usize| if offset >= 6 { offset + 4 } else { offset });
    assert_eq!(spans(&shifted), vec![(2, 16), (5, 12)]);
}

#[test]
fn edit_keeps_keys_and_values() {
    let set: Intervals<&str, &str> = [
        Interval {
            key: "link",
            from: 4,
            to: 9,
            value: "https://example.org",
        },
        Interval {
            key: "em",
            from: 0,
            to: 2,
            value: "",
        },
    ]
    .into_iter()
    .collect();
    let edited = set.edit(&Operation::delete(0, "ab", 12));
    let entries: Vec<_> = edited
        .iter()
        .map(|entry| (entry.key, entry.from, entry.to, entry.value))
        .collect();
    assert_eq!(
        entries,
        vec![("em", 0, 0, ""), ("link", 2, 7, "https://example.org")]
    );
}

#[test]
fn deletion_over_nested_starts_keeps_the_set_sorted() {
    let set = Intervals::new().insert(1, 2, 10, ()).insert(2, 3, 5, ());
    let edited = set.edit(&Operation::delete(2, "ab", 12));
    assert_eq!(spans(&edited), vec![(2, 3), (2, 8)]);
    assert_eq!(edited, Intervals::new().insert(1, 2, 8, ()).insert(2, 2, 3, ()));
}

#[test]
fn empty_operation_leaves_intervals_alone() {
    let set = Intervals::new().insert(7, 1, 4, ());
    assert_eq!(set.edit(&Operation::empty()), set);
    assert!(Intervals::<u32, ()>::default().is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_config::cases()))]
    #[test]
    fn prop_identity_provider_is_a_no_op(set in interval_set()) {
        prop_assert_eq!(set.edit_offsets(&|offset: usize| offset), set);
    }

    #[test]
    fn prop_uniform_shift_moves_every_endpoint(set in interval_set(), shift in 0usize..50) {
        let shifted = set.edit_offsets(&|offset: usize| offset + shift);
        let expected: Vec<_> = spans(&set)
            .into_iter()
            .map(|(from, to)| (from + shift, to + shift))
            .collect();
        prop_assert_eq!(spans(&shifted), expected);
    }

    #[test]
    fn prop_edit_preserves_order_and_shape(
        set in prop_oneof![interval_set(), nested_set()],
        at in 0usize..50,
        delete in 0usize..12,
        text in "[a-z]{0,6}",
    ) {
        let len = 60;
        let deleted = "x".repeat(delete.min(len - at));
        let edited = set.edit(&Operation::replace(at, &deleted, &text, len));
        prop_assert_eq!(edited.len(), set.len());
        let rebuilt = edited
            .iter()
            .fold(Intervals::new(), |rebuilt, entry| {
                rebuilt.insert(entry.key, entry.from, entry.to, ())
            });
        prop_assert_eq!(spans(&rebuilt), spans(&edited));
        let mut previous = (0, 0);
        for entry in edited.iter() {
            prop_assert!(entry.from <= entry.to);
            prop_assert!((entry.from, entry.to) >= previous);
            previous = (entry.from, entry.to);
        }
    }
}
