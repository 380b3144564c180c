#![cfg(feature = "baseline")]
//! Integration tests for the flat-array baselines.

use chunkset::prelude::*;
use rstest::rstest;

fn run_contract<S: OrderedSet<i32>>(mut set: S) -> Vec<i32> {
    for value in [7, 3, 9, 3, 1, 7] {
        set.insert(value);
    }
    set.erase(&9);
    set.erase(&100);
    assert!(set.contains(&7));
    assert!(!set.contains(&9));

    let mut values = Vec::new();
    set.enumerate(|value| values.push(*value));
    values
}

#[rstest]
fn test_sorted_array_set_enumerates_ascending() {
    assert_eq!(run_contract(SortedArraySet::new()), vec![1, 3, 7]);
}

#[rstest]
fn test_array_set_holds_same_members_as_sorted() {
    let mut unordered = run_contract(ArraySet::new());
    unordered.sort_unstable();
    assert_eq!(unordered, vec![1, 3, 7]);
}

#[rstest]
fn test_std_btreeset_satisfies_contract() {
    assert_eq!(
        run_contract(std::collections::BTreeSet::new()),
        vec![1, 3, 7]
    );
}

#[rstest]
#[case(0..1000)]
#[case(-50..50)]
fn test_sorted_array_set_stays_sorted(#[case] range: std::ops::Range<i32>) {
    let mut set: SortedArraySet<i32> = range.clone().rev().collect();
    assert_eq!(set.validate(), Ok(()));
    assert_eq!(set.len(), range.len());

    for value in range.clone().step_by(2) {
        set.erase(&value);
    }
    assert_eq!(set.validate(), Ok(()));
    assert!(set.iter().copied().eq(range.skip(1).step_by(2)));
}

#[rstest]
fn test_array_set_ignores_duplicate_inserts() {
    let set: ArraySet<i32> = [4, 4, 4, 2].into_iter().collect();
    assert_eq!(set.len(), 2);
    assert_eq!(format!("{set:?}"), "{4, 2}");
}
