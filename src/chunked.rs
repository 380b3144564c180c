//! Single-level hashed array tree.
//!
//! [`ChunkedSet`] keeps its values in a flat list of bounded sorted chunks.
//! A chunk that grows past the maximum size is split at its midpoint; a chunk
//! that becomes empty is dropped. Nothing else is rebalanced, so chunks may
//! stay underfilled after erasures.
//!
//! # Time Complexity
//!
//! With `c` chunks of at most `m` values:
//!
//! | Operation  | Cost              |
//! |------------|-------------------|
//! | `insert`   | O(c + m)          |
//! | `erase`    | O(c + m)          |
//! | `contains` | O(c + log m)      |
//! | `iter`     | O(1) + O(n)       |
//!
//! Chunk lookup is a linear scan over chunk fronts: the structure is meant
//! for large chunks and therefore few of them.
//!
//! # Examples
//!
//! ```rust
//! use chunkset::ChunkedSet;
//!
//! let mut set = ChunkedSet::new(2, 4).unwrap();
//! for value in [8, 3, 5, 1, 9, 4] {
//!     set.insert(value);
//! }
//! set.erase(&5);
//!
//! assert!(set.contains(&4));
//! assert!(!set.contains(&5));
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3, 4, 8, 9]);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::iter::{Flatten, FusedIterator};
use std::slice;

use crate::OrderedSet;
use crate::bounds::{ChunkBounds, ChunkBoundsError};
use crate::invariant::{InvariantViolation, check_strictly_increasing};
use crate::search::find_index_for_value;

/// An ordered set stored as a flat sequence of bounded sorted chunks.
///
/// Every value in `chunks[i]` is less than every value in `chunks[i + 1]`,
/// no chunk is empty, and no chunk holds more than `bounds.max()` values.
#[derive(Clone)]
pub struct ChunkedSet<T> {
    bounds: ChunkBounds,
    chunks: Vec<Vec<T>>,
    length: usize,
}

impl<T: Ord> ChunkedSet<T> {
    /// Creates an empty set with the given chunk sizes.
    ///
    /// # Errors
    ///
    /// Returns a [`ChunkBoundsError`] when the sizes do not form valid bounds.
    pub fn new(min_chunk_size: usize, max_chunk_size: usize) -> Result<Self, ChunkBoundsError> {
        ChunkBounds::new(min_chunk_size, max_chunk_size).map(Self::with_bounds)
    }

    /// Creates an empty set with already validated bounds.
    #[must_use]
    pub const fn with_bounds(bounds: ChunkBounds) -> Self {
        Self {
            bounds,
            chunks: Vec::new(),
            length: 0,
        }
    }

    /// Returns the bounds this set was created with.
    #[inline]
    pub const fn bounds(&self) -> ChunkBounds {
        self.bounds
    }

    /// Returns the number of values in the set.
    #[inline]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the set holds no values.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the number of chunk levels, which is always 1.
    #[inline]
    pub const fn depth(&self) -> usize {
        1
    }

    /// Returns the number of chunks currently allocated.
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Adds `value` to the set. Does nothing if it is already present.
    pub fn insert(&mut self, value: T) {
        if self.chunks.is_empty() {
            self.chunks.push(vec![value]);
            self.length = 1;
            return;
        }
        let chunk_index = self.find_chunk_index(&value);
        let chunk = &mut self.chunks[chunk_index];
        let index = find_index_for_value(chunk, &value);
        if chunk.get(index) != Some(&value) {
            chunk.insert(index, value);
            self.length += 1;
            self.split_chunk_if_needed(chunk_index);
        }
    }

    /// Removes `value` from the set. Does nothing if it is absent.
    pub fn erase<Q>(&mut self, value: &Q)
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.chunks.is_empty() {
            return;
        }
        let chunk_index = self.find_chunk_index(value);
        let chunk = &mut self.chunks[chunk_index];
        let index = find_index_for_value(chunk, value);
        if chunk.get(index).is_some_and(|found| found.borrow() == value) {
            chunk.remove(index);
            self.length -= 1;
            if chunk.is_empty() {
                self.chunks.remove(chunk_index);
            }
        }
    }

    /// Returns `true` if `value` is in the set.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.chunks.get(self.find_chunk_index(value)).is_some_and(|chunk| {
            let index = find_index_for_value(chunk, value);
            chunk.get(index).is_some_and(|found| found.borrow() == value)
        })
    }

    /// Calls `visitor` once per value, in ascending order.
    pub fn enumerate<F>(&self, visitor: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(visitor);
    }

    /// Returns an iterator over the values in ascending order.
    pub fn iter(&self) -> ChunkedSetIterator<'_, T> {
        ChunkedSetIterator {
            inner: self.chunks.iter().flatten(),
            remaining: self.length,
        }
    }

    /// Audits chunk ordering, chunk sizes and the tracked length.
    ///
    /// Chunks may hold fewer than `bounds.min()` values, but never zero.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        for (position, chunk) in self.chunks.iter().enumerate() {
            if chunk.is_empty() {
                return Err(InvariantViolation::EmptyChunk { position });
            }
            if chunk.len() > self.bounds.max() {
                return Err(InvariantViolation::Overflow {
                    depth: 0,
                    size: chunk.len(),
                    max: self.bounds.max(),
                });
            }
        }
        let counted = check_strictly_increasing(self.chunks.iter().flatten())?;
        if counted != self.length {
            return Err(InvariantViolation::LengthMismatch {
                tracked: self.length,
                counted,
            });
        }
        Ok(())
    }

    /// Index of the last chunk whose front is not greater than `value`, or 0.
    fn find_chunk_index<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut index = 0;
        while index + 1 < self.chunks.len()
            && self.chunks[index + 1]
                .first()
                .is_some_and(|front| front.borrow() <= value)
        {
            index += 1;
        }
        index
    }

    fn split_chunk_if_needed(&mut self, chunk_index: usize) {
        let chunk = &mut self.chunks[chunk_index];
        if chunk.len() > self.bounds.max() {
            let second_half = chunk.split_off(chunk.len() / 2);
            self.chunks.insert(chunk_index + 1, second_half);
        }
    }
}

impl<T: Ord> Default for ChunkedSet<T> {
    fn default() -> Self {
        Self::with_bounds(ChunkBounds::default())
    }
}

impl<T: Ord> OrderedSet<T> for ChunkedSet<T> {
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

impl<T: Ord> FromIterator<T> for ChunkedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T: Ord> Extend<T> for ChunkedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Ord> IntoIterator for &'a ChunkedSet<T> {
    type Item = &'a T;
    type IntoIter = ChunkedSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for ChunkedSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

/// Ascending iterator over a [`ChunkedSet`].
pub struct ChunkedSetIterator<'a, T> {
    inner: Flatten<slice::Iter<'a, Vec<T>>>,
    remaining: usize,
}

impl<'a, T> Iterator for ChunkedSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.inner.next()?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for ChunkedSetIterator<'_, T> {}

impl<T> FusedIterator for ChunkedSetIterator<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn smoke_set() -> ChunkedSet<i32> {
        ChunkedSet::with_bounds(ChunkBounds::SMOKE)
    }

    #[rstest]
    fn test_first_insert_creates_single_chunk() {
        let mut set = smoke_set();
        assert_eq!(set.chunk_count(), 0);
        set.insert(7);
        assert_eq!(set.chunk_count(), 1);
        assert_eq!(set.len(), 1);
    }

    #[rstest]
    fn test_overflowing_chunk_splits_at_midpoint() {
        let mut set = smoke_set();
        for value in 0..20 {
            set.insert(value);
        }
        assert_eq!(set.chunk_count(), 2);
        assert_eq!(set.chunks[0], (0..10).collect::<Vec<_>>());
        assert_eq!(set.chunks[1], (10..20).collect::<Vec<_>>());
        assert_eq!(set.validate(), Ok(()));
    }

    #[rstest]
    fn test_value_below_first_chunk_goes_to_first_chunk() {
        let mut set = smoke_set();
        for value in 10..40 {
            set.insert(value);
        }
        set.insert(-5);
        assert_eq!(set.chunks[0].first(), Some(&-5));
        assert_eq!(set.validate(), Ok(()));
    }

    #[rstest]
    fn test_duplicate_insert_is_noop() {
        let mut set = smoke_set();
        set.insert(3);
        set.insert(3);
        assert_eq!(set.len(), 1);
        assert_eq!(set.chunks, vec![vec![3]]);
    }

    #[rstest]
    fn test_emptied_chunk_is_dropped_without_merging() {
        let mut set = smoke_set();
        for value in 0..20 {
            set.insert(value);
        }
        for value in 0..9 {
            set.erase(&value);
        }
        // Underfilled chunks are left alone.
        assert_eq!(set.chunk_count(), 2);
        assert_eq!(set.chunks[0], vec![9]);

        set.erase(&9);
        assert_eq!(set.chunk_count(), 1);
        assert_eq!(set.validate(), Ok(()));
    }

    #[rstest]
    fn test_erase_on_empty_set_is_noop() {
        let mut set = smoke_set();
        set.erase(&1);
        assert!(set.is_empty());
        assert!(!set.contains(&1));
    }

    #[rstest]
    fn test_depth_is_always_one() {
        let mut set = smoke_set();
        assert_eq!(set.depth(), 1);
        set.extend(0..500);
        assert_eq!(set.depth(), 1);
    }

    #[rstest]
    fn test_validate_reports_empty_chunk() {
        let mut set = smoke_set();
        set.insert(1);
        set.chunks.push(Vec::new());
        assert_eq!(
            set.validate(),
            Err(InvariantViolation::EmptyChunk { position: 1 })
        );
    }

    #[rstest]
    fn test_debug_formats_as_set() {
        let set: ChunkedSet<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!(format!("{set:?}"), "{1, 2, 3}");
    }
}
