//! Unsorted vector baseline.

use std::borrow::Borrow;
use std::fmt;
use std::slice;

use crate::OrderedSet;

/// A set stored as an unsorted vector.
///
/// Every operation is a linear scan. Erasing swaps the hit with the last
/// element, so traversal follows insertion order only until the first erase.
/// This is the one set in the crate that does not enumerate in ascending
/// order.
#[derive(Clone)]
pub struct ArraySet<T> {
    values: Vec<T>,
}

impl<T: PartialEq> ArraySet<T> {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Returns the number of values in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the set holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Appends `value` unless it is already present.
    pub fn insert(&mut self, value: T) {
        if !self.values.contains(&value) {
            self.values.push(value);
        }
    }

    /// Removes `value` if present by swapping it with the last element.
    pub fn erase<Q>(&mut self, value: &Q)
    where
        T: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        if let Some(position) = self.values.iter().position(|item| item.borrow() == value) {
            self.values.swap_remove(position);
        }
    }

    /// Returns `true` if `value` is in the set.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.values.iter().any(|item| item.borrow() == value)
    }

    /// Calls `visitor` once per value, in storage order.
    pub fn enumerate<F>(&self, visitor: F)
    where
        F: FnMut(&T),
    {
        self.values.iter().for_each(visitor);
    }

    /// Returns an iterator over the values in storage order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.values.iter()
    }
}

impl<T> Default for ArraySet<T> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<T: PartialEq> OrderedSet<T> for ArraySet<T> {
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

impl<T: PartialEq> FromIterator<T> for ArraySet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: PartialEq> Extend<T> for ArraySet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a ArraySet<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for ArraySet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.values.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_insert_skips_duplicates() {
        let set: ArraySet<i32> = [1, 2, 1, 3, 2].into_iter().collect();
        assert_eq!(set.len(), 3);
    }

    #[rstest]
    fn test_erase_swaps_last_into_hole() {
        let mut set: ArraySet<i32> = [1, 2, 3, 4].into_iter().collect();
        set.erase(&2);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 4, 3]);
    }

    #[rstest]
    fn test_erase_absent_is_noop() {
        let mut set: ArraySet<i32> = [1, 2].into_iter().collect();
        set.erase(&9);
        assert_eq!(set.len(), 2);
    }
}
