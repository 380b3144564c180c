//! IAI-Callgrind benchmark for ordered set insertion and lookup.
//!
//! Measures instruction counts for building each structure from the same
//! scrambled input, then probing every value once.

use chunkset::prelude::*;
use iai_callgrind::{library_benchmark, library_benchmark_group, main};
use std::collections::BTreeSet;
use std::hint::black_box;

fn setup_values_10000() -> Vec<i32> {
    (0..10000)
        .map(|index: i32| index.wrapping_mul(-1_640_531_535).rem_euclid(11111))
        .collect()
}

fn probe<S: OrderedSet<i32>>(set: &S, values: &[i32]) -> usize {
    values.iter().filter(|value| set.contains(value)).count()
}

#[library_benchmark]
#[bench::with_setup(setup_values_10000())]
fn chunked_set_10000(values: Vec<i32>) -> usize {
    let set: ChunkedSet<i32> = black_box(&values).iter().copied().collect();
    black_box(probe(&set, &values))
}

#[library_benchmark]
#[bench::with_setup(setup_values_10000())]
fn multilevel_chunked_tree_10000(values: Vec<i32>) -> usize {
    let set: MultilevelChunkedTree<i32> = black_box(&values).iter().copied().collect();
    black_box(probe(&set, &values))
}

#[library_benchmark]
#[bench::with_setup(setup_values_10000())]
fn balanced_tree_10000(values: Vec<i32>) -> usize {
    let set: BalancedTree<i32> = black_box(&values).iter().copied().collect();
    black_box(probe(&set, &values))
}

#[library_benchmark]
#[bench::with_setup(setup_values_10000())]
fn std_btreeset_10000(values: Vec<i32>) -> usize {
    let set: BTreeSet<i32> = black_box(&values).iter().copied().collect();
    black_box(probe(&set, &values))
}

library_benchmark_group!(
    name = ordered_set_group;
    benchmarks =
        chunked_set_10000, multilevel_chunked_tree_10000, balanced_tree_10000, std_btreeset_10000
);

main!(library_benchmark_groups = ordered_set_group);
