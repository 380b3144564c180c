//! Sorted vector baseline.

use std::borrow::Borrow;
use std::fmt;
use std::slice;

use crate::OrderedSet;
use crate::invariant::{InvariantViolation, check_strictly_increasing};
use crate::search::find_index_for_value;

/// A set stored as a single sorted vector.
///
/// Lookups are O(log n); insertions and erasures shift the tail of the
/// vector and are O(n).
#[derive(Clone)]
pub struct SortedArraySet<T> {
    sorted: Vec<T>,
}

impl<T: Ord> SortedArraySet<T> {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { sorted: Vec::new() }
    }

    /// Returns the number of values in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Returns `true` if the set holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Adds `value` at its sorted position unless it is already present.
    pub fn insert(&mut self, value: T) {
        let index = find_index_for_value(&self.sorted, &value);
        if self.sorted.get(index) != Some(&value) {
            self.sorted.insert(index, value);
        }
    }

    /// Removes `value` if present.
    pub fn erase<Q>(&mut self, value: &Q)
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let index = find_index_for_value(&self.sorted, value);
        if self.sorted.get(index).is_some_and(|found| found.borrow() == value) {
            self.sorted.remove(index);
        }
    }

    /// Returns `true` if `value` is in the set.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let index = find_index_for_value(&self.sorted, value);
        self.sorted.get(index).is_some_and(|found| found.borrow() == value)
    }

    /// Calls `visitor` once per value, in ascending order.
    pub fn enumerate<F>(&self, visitor: F)
    where
        F: FnMut(&T),
    {
        self.sorted.iter().for_each(visitor);
    }

    /// Returns an iterator over the values in ascending order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.sorted.iter()
    }

    /// Returns the values as a sorted slice.
    pub fn as_slice(&self) -> &[T] {
        &self.sorted
    }

    /// Checks that the backing vector is strictly increasing.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::OutOfOrder`] at the first misplaced value.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        check_strictly_increasing(&self.sorted).map(|_| ())
    }
}

impl<T> Default for SortedArraySet<T> {
    fn default() -> Self {
        Self { sorted: Vec::new() }
    }
}

impl<T: Ord> OrderedSet<T> for SortedArraySet<T> {
    fn insert(&mut self, value: T) {
        Self::insert(self, value);
    }

    fn erase(&mut self, value: &T) {
        Self::erase(self, value);
    }

    fn contains(&self, value: &T) -> bool {
        Self::contains(self, value)
    }

    fn enumerate<F>(&self, visitor: F)
    where
        F: FnMut(&T),
    {
        Self::enumerate(self, visitor);
    }
}

impl<T: Ord> FromIterator<T> for SortedArraySet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord> Extend<T> for SortedArraySet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a SortedArraySet<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.sorted.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for SortedArraySet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.sorted.iter()).finish()
    }
}
