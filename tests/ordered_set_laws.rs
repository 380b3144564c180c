#![cfg(all(feature = "chunked", feature = "balanced", feature = "multilevel"))]
//! Property-based tests for the ordered set structures.
//!
//! Every structure is driven with random operation sequences and compared
//! against `std::collections::BTreeSet`, auditing the structural invariants
//! after each step.

use std::collections::BTreeSet;

use chunkset::prelude::*;
use paste::paste;
use proptest::prelude::*;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Operation {
    Insert(i16),
    Erase(i16),
}

/// Values are drawn from a narrow range so that erases usually hit.
fn arbitrary_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (-200i16..200).prop_map(Operation::Insert),
        2 => (-200i16..200).prop_map(Operation::Erase),
    ]
}

fn arbitrary_operations(max_size: usize) -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(arbitrary_operation(), 0..max_size)
}

/// Strategy for bounds including the degenerate `max = min + 1` shapes.
fn arbitrary_bounds() -> impl Strategy<Value = ChunkBounds> {
    (1usize..8)
        .prop_flat_map(|min| (Just(min), (min + 1)..(min * 3 + 2)))
        .prop_map(|(min, max)| ChunkBounds::new(min, max).unwrap())
}

fn collect<S: OrderedSet<i16>>(set: &S) -> Vec<i16> {
    let mut values = Vec::new();
    set.enumerate(|value| values.push(*value));
    values
}

// =============================================================================
// Model Laws
// =============================================================================

macro_rules! model_laws {
    ($name:ident, $structure:ident) => {
        paste! {
            proptest! {
                /// Law: every operation sequence agrees with `BTreeSet` and
                /// leaves the structure valid.
                #[test]
                fn [<prop_ $name _agrees_with_btreeset>](
                    bounds in arbitrary_bounds(),
                    operations in arbitrary_operations(400)
                ) {
                    let mut set: $structure<i16> = $structure::with_bounds(bounds);
                    let mut model = BTreeSet::new();

                    for operation in operations {
                        match operation {
                            Operation::Insert(value) => {
                                set.insert(value);
                                model.insert(value);
                                prop_assert!(set.contains(&value));
                            }
                            Operation::Erase(value) => {
                                set.erase(&value);
                                model.remove(&value);
                                prop_assert!(!set.contains(&value));
                            }
                        }
                        prop_assert_eq!(set.validate(), Ok(()));
                        prop_assert_eq!(set.len(), model.len());
                    }

                    prop_assert_eq!(collect(&set), model.iter().copied().collect::<Vec<_>>());
                    prop_assert!(set.iter().eq(model.iter()));
                }

                /// Law: membership matches the model for values never touched.
                #[test]
                fn [<prop_ $name _contains_matches_model>](
                    values in prop::collection::vec(-500i16..500, 0..300),
                    probes in prop::collection::vec(any::<i16>(), 0..50)
                ) {
                    let set: $structure<i16> = values.iter().copied().collect();
                    let model: BTreeSet<i16> = values.iter().copied().collect();

                    for probe in probes {
                        prop_assert_eq!(set.contains(&probe), model.contains(&probe));
                    }
                }

                /// Law: inserting the same value twice is the same as once.
                #[test]
                fn [<prop_ $name _insert_is_idempotent>](
                    values in prop::collection::vec(any::<i16>(), 0..100),
                    value: i16
                ) {
                    let mut once: $structure<i16> = values.iter().copied().collect();
                    once.insert(value);
                    let mut twice = once.clone();
                    twice.insert(value);

                    prop_assert_eq!(collect(&once), collect(&twice));
                    prop_assert_eq!(once.len(), twice.len());
                }

                /// Law: erasing every inserted value empties the structure.
                #[test]
                fn [<prop_ $name _erase_all_empties>](
                    bounds in arbitrary_bounds(),
                    values in prop::collection::vec(any::<i16>(), 0..300)
                ) {
                    let mut set: $structure<i16> = $structure::with_bounds(bounds);
                    set.extend(values.iter().copied());
                    for value in values.iter().rev() {
                        set.erase(value);
                    }

                    prop_assert!(set.is_empty());
                    prop_assert!(collect(&set).is_empty());
                    prop_assert_eq!(set.validate(), Ok(()));
                }
            }
        }
    };
}

model_laws!(chunked_set, ChunkedSet);
model_laws!(balanced_tree, BalancedTree);
model_laws!(multilevel_chunked_tree, MultilevelChunkedTree);

// =============================================================================
// Structure-Specific Laws
// =============================================================================

proptest! {
    /// Law: the cached smallest value of a multilevel tree is the first value
    /// enumerated.
    #[test]
    fn prop_multilevel_smallest_is_first_value(
        bounds in arbitrary_bounds(),
        operations in arbitrary_operations(300)
    ) {
        let mut tree = MultilevelChunkedTree::with_bounds(bounds);
        for operation in operations {
            match operation {
                Operation::Insert(value) => tree.insert(value),
                Operation::Erase(value) => tree.erase(&value),
            }
            prop_assert_eq!(tree.smallest(), tree.iter().next());
        }
    }

    /// Law: chunked set never keeps an empty chunk around.
    #[test]
    fn prop_chunked_set_chunk_count_is_bounded_by_len(
        bounds in arbitrary_bounds(),
        operations in arbitrary_operations(300)
    ) {
        let mut set = ChunkedSet::with_bounds(bounds);
        for operation in operations {
            match operation {
                Operation::Insert(value) => set.insert(value),
                Operation::Erase(value) => set.erase(&value),
            }
            prop_assert!(set.chunk_count() <= set.len());
            prop_assert!(set.chunk_count() * bounds.max() >= set.len());
        }
    }

    /// Law: both trees enumerate identical sequences for identical input.
    #[test]
    fn prop_trees_agree(
        bounds in arbitrary_bounds(),
        operations in arbitrary_operations(300)
    ) {
        let mut balanced = BalancedTree::with_bounds(bounds);
        let mut multilevel = MultilevelChunkedTree::with_bounds(bounds);
        for operation in operations {
            match operation {
                Operation::Insert(value) => {
                    balanced.insert(value);
                    multilevel.insert(value);
                }
                Operation::Erase(value) => {
                    balanced.erase(&value);
                    multilevel.erase(&value);
                }
            }
        }

        prop_assert!(balanced.iter().eq(multilevel.iter()));
        prop_assert_eq!(balanced.iter().len(), multilevel.len());
    }
}
