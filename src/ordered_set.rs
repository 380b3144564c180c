//! The four-operation contract shared by every set in this crate.

use std::collections::BTreeSet;

/// A dynamic collection of unique, totally ordered values.
///
/// Harnesses and benchmarks drive every structure exclusively through this
/// trait, so structures can be compared without reaching into their
/// internals. Inserting a present value and erasing an absent one are
/// no-ops, never errors.
///
/// # Examples
///
/// ```rust
/// use chunkset::prelude::*;
///
/// fn fill<S: OrderedSet<i32>>(set: &mut S) {
///     for value in [5, 1, 3, 1] {
///         set.insert(value);
///     }
/// }
///
/// let mut tree = BalancedTree::new(2, 4).unwrap();
/// fill(&mut tree);
///
/// let mut seen = Vec::new();
/// OrderedSet::enumerate(&tree, |value| seen.push(*value));
/// assert_eq!(seen, vec![1, 3, 5]);
/// ```
pub trait OrderedSet<T> {
    /// Adds `value` if it is absent.
    fn insert(&mut self, value: T);

    /// Removes `value` if it is present.
    fn erase(&mut self, value: &T);

    /// Returns `true` if `value` is a member.
    fn contains(&self, value: &T) -> bool;

    /// Calls `visitor` once per member, in the structure's traversal order.
    ///
    /// Every structure except the unsorted `ArraySet` baseline visits members
    /// in strictly ascending order.
    fn enumerate<F>(&self, visitor: F)
    where
        F: FnMut(&T);
}

/// The standard library's B-tree, used as the reference in comparisons.
impl<T: Ord> OrderedSet<T> for BTreeSet<T> {
    fn insert(&mut self, value: T) {
        Self::insert(self, value);
    }

    fn erase(&mut self, value: &T) {
        self.remove(value);
    }

    fn contains(&self, value: &T) -> bool {
        Self::contains(self, value)
    }

    fn enumerate<F>(&self, visitor: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(visitor);
    }
}
