//! B-tree over bounded sorted arrays.
//!
//! This module provides [`BalancedTree`], an ordered set where every node is
//! a bounded sorted array of separator values and internal nodes own one more
//! child than they have values.
//!
//! # Overview
//!
//! - Insertion descends to a leaf; on the way back up a child holding more
//!   than `max` values is split around its median, which moves up into the
//!   parent. A root that overflows is wrapped in a new root and split, so the
//!   tree only grows at the top.
//! - Erasing a separator replaces it with the smallest value of its right
//!   subtree and erases that value from the subtree instead.
//! - On the way back up from an erase, a child holding fewer than `min`
//!   values is merged with a neighbor (pulling the separator between them
//!   down). A merge result that overflows is split again, which takes the
//!   place of a separate borrow-from-sibling step. A root left with a single
//!   child is replaced by it.
//!
//! All leaves are always at the same depth.
//!
//! # Examples
//!
//! ```rust
//! use chunkset::BalancedTree;
//!
//! let mut tree = BalancedTree::new(2, 4).unwrap();
//! for value in 0..100 {
//!     tree.insert(value);
//! }
//! assert!(tree.depth() > 0);
//!
//! for value in (0..100).step_by(2) {
//!     tree.erase(&value);
//! }
//! assert_eq!(tree.len(), 50);
//! assert!(tree.contains(&51));
//! assert!(!tree.contains(&50));
//! assert_eq!(tree.validate(), Ok(()));
//! ```
//!
//! # Internal Structure
//!
//! ```text
//!                 [ 20 | 40 ]
//!               /      |      \
//!       [ 5 | 12 ]  [ 27 ]  [ 44 | 51 | 60 ]
//! ```
//!
//! For an internal node, every value in `children[i]` is less than
//! `values[i]`, and every value in `children[i + 1]` is greater. Separators
//! are members of the set and are stored exactly once.

use std::borrow::Borrow;
use std::fmt;
use std::iter::FusedIterator;

use smallvec::SmallVec;

use crate::OrderedSet;
use crate::bounds::{ChunkBounds, ChunkBoundsError};
use crate::invariant::{self, InvariantViolation, check_strictly_increasing};
use crate::search::find_index_for_value;

/// Typical descent depth; deeper trees spill the iterator stack to the heap.
const INLINE_DEPTH: usize = 8;

// =============================================================================
// Node Definition
// =============================================================================

/// A B-tree node: a leaf when `children` is empty, internal otherwise.
#[derive(Clone)]
struct Node<T> {
    values: Vec<T>,
    children: Vec<Self>,
}

impl<T> Node<T> {
    const fn empty() -> Self {
        Self {
            values: Vec::new(),
            children: Vec::new(),
        }
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the smallest value of this subtree by leftmost descent.
    fn min_value(&self) -> Option<&T> {
        self.children
            .first()
            .map_or_else(|| self.values.first(), Self::min_value)
    }
}

impl<T: Ord + Clone> Node<T> {
    /// Returns `true` if the value was not present before.
    fn insert(&mut self, value: T, bounds: ChunkBounds) -> bool {
        let index = find_index_for_value(&self.values, &value);
        if self.values.get(index) == Some(&value) {
            return false;
        }
        if self.is_leaf() {
            self.values.insert(index, value);
            return true;
        }
        let inserted = self.children[index].insert(value, bounds);
        if self.children[index].values.len() > bounds.max() {
            self.split_child(index);
        }
        inserted
    }

    /// Returns `true` if the value was present before.
    fn erase<Q>(&mut self, value: &Q, bounds: ChunkBounds) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let index = find_index_for_value(&self.values, value);
        let found = self
            .values
            .get(index)
            .is_some_and(|separator| separator.borrow() == value);
        if self.is_leaf() {
            if found {
                self.values.remove(index);
            }
            return found;
        }
        if !found {
            return self.erase_from_child_with_rebalancing(value, index, bounds);
        }
        let Some(replacement) = self.children[index + 1].min_value().cloned() else {
            invariant::violated(InvariantViolation::MissingMinimum);
        };
        // The separator must already hold the replacement in case the right
        // child gets merged with its left neighbor and pulls it down.
        self.values[index] = replacement.clone();
        self.erase_from_child_with_rebalancing::<T>(&replacement, index + 1, bounds);
        true
    }

    fn erase_from_child_with_rebalancing<Q>(
        &mut self,
        value: &Q,
        child_index: usize,
        bounds: ChunkBounds,
    ) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let erased = self.children[child_index].erase(value, bounds);
        if self.children[child_index].values.len() < bounds.min() && self.children.len() > 1 {
            let merged_index = self.merge_child(child_index);
            if self.children[merged_index].values.len() > bounds.max() {
                self.split_child(merged_index);
            }
        }
        erased
    }
}

impl<T: Ord> Node<T> {
    fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self;
        loop {
            let index = find_index_for_value(&node.values, value);
            if node
                .values
                .get(index)
                .is_some_and(|separator| separator.borrow() == value)
            {
                return true;
            }
            match node.children.get(index) {
                Some(child) => node = child,
                None => return false,
            }
        }
    }

    fn enumerate<F>(&self, visitor: &mut F)
    where
        F: FnMut(&T),
    {
        for (index, value) in self.values.iter().enumerate() {
            if let Some(child) = self.children.get(index) {
                child.enumerate(visitor);
            }
            visitor(value);
        }
        if let Some(child) = self.children.get(self.values.len()) {
            child.enumerate(visitor);
        }
    }

    /// Moves the median of `children[child_index]` up into this node and the
    /// upper half of the child into a new sibling at `child_index + 1`.
    fn split_child(&mut self, child_index: usize) {
        let child = &mut self.children[child_index];
        let left_half_size = child.values.len() / 2;
        let second_values = child.values.split_off(left_half_size + 1);
        let second_children = if child.is_leaf() {
            Vec::new()
        } else {
            child.children.split_off(left_half_size + 1)
        };
        let Some(median) = child.values.pop() else {
            invariant::violated(InvariantViolation::EmptyChunk {
                position: child_index,
            });
        };
        self.values.insert(child_index, median);
        self.children.insert(
            child_index + 1,
            Self {
                values: second_values,
                children: second_children,
            },
        );
    }

    /// Merges `children[child_index]` with a neighbor and returns the index of
    /// the merged node.
    ///
    /// The right neighbor is preferred unless the child is the last one or
    /// its left neighbor is the smaller of the two.
    fn merge_child(&mut self, child_index: usize) -> usize {
        let target_index = if child_index + 1 >= self.children.len()
            || (child_index > 0
                && self.children[child_index - 1].values.len()
                    < self.children[child_index + 1].values.len())
        {
            child_index - 1
        } else {
            child_index
        };
        let donor = self.children.remove(target_index + 1);
        let separator = self.values.remove(target_index);
        let target = &mut self.children[target_index];
        target.values.push(separator);
        target.values.extend(donor.values);
        target.children.extend(donor.children);
        target_index
    }

    /// Audits this subtree and returns the depth of its leaves.
    fn validate(
        &self,
        depth: usize,
        bounds: ChunkBounds,
        lower_bound: usize,
    ) -> Result<usize, InvariantViolation> {
        let size = self.values.len();
        if size > bounds.max() {
            return Err(InvariantViolation::Overflow {
                depth,
                size,
                max: bounds.max(),
            });
        }
        if depth > 0 && size < lower_bound {
            return Err(InvariantViolation::Underflow {
                depth,
                size,
                min: lower_bound,
            });
        }
        if self.is_leaf() {
            return Ok(depth);
        }
        if self.children.len() != size + 1 {
            return Err(InvariantViolation::ChildCountMismatch {
                depth,
                values: size,
                children: self.children.len(),
            });
        }
        let mut leaf_depth = None;
        for child in &self.children {
            let found = child.validate(depth + 1, bounds, lower_bound)?;
            match leaf_depth {
                Some(expected) if expected != found => {
                    return Err(InvariantViolation::UnevenDepth { expected, found });
                }
                _ => leaf_depth = Some(found),
            }
        }
        Ok(leaf_depth.unwrap_or(depth))
    }
}

// =============================================================================
// BalancedTree Definition
// =============================================================================

/// An ordered set backed by a B-tree of bounded sorted arrays.
///
/// # Type Parameters
///
/// * `T` - The value type. `Clone` is needed because erasing a separator
///   copies its successor into the separator slot.
///
/// # Examples
///
/// ```rust
/// use chunkset::{BalancedTree, ChunkBounds};
///
/// let mut tree = BalancedTree::with_bounds(ChunkBounds::SMOKE);
/// tree.insert("kiwi".to_string());
/// tree.insert("apple".to_string());
///
/// assert!(tree.contains("kiwi"));
/// let values: Vec<&String> = tree.iter().collect();
/// assert_eq!(values, ["apple", "kiwi"]);
/// ```
#[derive(Clone)]
pub struct BalancedTree<T> {
    bounds: ChunkBounds,
    root: Node<T>,
    length: usize,
}

impl<T: Ord + Clone> BalancedTree<T> {
    /// Creates an empty tree with the given chunk sizes.
    ///
    /// # Errors
    ///
    /// Returns a [`ChunkBoundsError`] when the sizes do not form valid bounds.
    pub fn new(min_chunk_size: usize, max_chunk_size: usize) -> Result<Self, ChunkBoundsError> {
        ChunkBounds::new(min_chunk_size, max_chunk_size).map(Self::with_bounds)
    }

    /// Creates an empty tree with already validated bounds.
    #[must_use]
    pub const fn with_bounds(bounds: ChunkBounds) -> Self {
        Self {
            bounds,
            root: Node::empty(),
            length: 0,
        }
    }

    /// Returns the bounds this tree was created with.
    #[inline]
    pub const fn bounds(&self) -> ChunkBounds {
        self.bounds
    }

    /// Returns the number of values in the tree.
    #[inline]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the tree holds no values.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the number of edges between the root and the leaves; 0 when
    /// the root is itself a leaf.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = &self.root;
        while let Some(child) = node.children.first() {
            depth += 1;
            node = child;
        }
        depth
    }

    /// Adds `value` to the tree. Does nothing if it is already present.
    pub fn insert(&mut self, value: T) {
        if self.root.insert(value, self.bounds) {
            self.length += 1;
        }
        self.increase_depth_if_needed();
    }

    /// Removes `value` from the tree. Does nothing if it is absent.
    pub fn erase<Q>(&mut self, value: &Q)
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.root.erase(value, self.bounds) {
            self.length -= 1;
        }
        self.decrease_depth_if_needed();
    }

    /// Returns `true` if `value` is in the tree.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root.contains(value)
    }

    /// Calls `visitor` once per value, in ascending order.
    pub fn enumerate<F>(&self, mut visitor: F)
    where
        F: FnMut(&T),
    {
        self.root.enumerate(&mut visitor);
    }

    /// Returns an iterator over the values in ascending order.
    pub fn iter(&self) -> BalancedTreeIterator<'_, T> {
        let mut stack = SmallVec::new();
        stack.push((&self.root, 0));
        BalancedTreeIterator {
            stack,
            remaining: self.length,
        }
    }

    /// Audits node sizes, separator/child counts, leaf depths, value order
    /// and the tracked length.
    ///
    /// Sizes are not audited against the nominal `[min, max]` range. The upper
    /// bound is exact, but non-root nodes only need `min(min, max / 2)`
    /// values: splitting an overflowing node moves the median up and leaves
    /// the right half with `max / 2` values, which is below `min` whenever
    /// `min > max / 2`.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let lower_bound = self.bounds.min().min(self.bounds.max() / 2);
        self.root.validate(0, self.bounds, lower_bound)?;
        let counted = check_strictly_increasing(self.iter())?;
        if counted != self.length {
            return Err(InvariantViolation::LengthMismatch {
                tracked: self.length,
                counted,
            });
        }
        Ok(())
    }

    fn increase_depth_if_needed(&mut self) {
        if self.root.values.len() <= self.bounds.max() {
            return;
        }
        let old_root = std::mem::replace(&mut self.root, Node::empty());
        self.root.children.push(old_root);
        self.root.split_child(0);
        tracing::trace!(depth = self.depth(), length = self.length, "balanced tree grew");
    }

    fn decrease_depth_if_needed(&mut self) {
        if self.root.children.len() != 1 {
            return;
        }
        if let Some(child) = self.root.children.pop() {
            self.root = child;
            tracing::trace!(depth = self.depth(), length = self.length, "balanced tree shrank");
        }
    }
}

impl<T: Ord + Clone> Default for BalancedTree<T> {
    fn default() -> Self {
        Self::with_bounds(ChunkBounds::default())
    }
}

impl<T: Ord + Clone> OrderedSet<T> for BalancedTree<T> {
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

impl<T: Ord + Clone> FromIterator<T> for BalancedTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord + Clone> Extend<T> for BalancedTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Ord + Clone> IntoIterator for &'a BalancedTree<T> {
    type Item = &'a T;
    type IntoIter = BalancedTreeIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord + Clone + fmt::Debug> fmt::Debug for BalancedTree<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// Ascending iterator over a [`BalancedTree`].
///
/// Each stack frame holds a node and a cursor over its interleaved slots:
/// even cursors descend into `children[cursor / 2]`, odd cursors yield
/// `values[cursor / 2]`. Leaves only have value slots.
pub struct BalancedTreeIterator<'a, T> {
    stack: SmallVec<[(&'a Node<T>, usize); INLINE_DEPTH]>,
    remaining: usize,
}

impl<'a, T> Iterator for BalancedTreeIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, cursor) = self.stack.last_mut()?;
            let node: &'a Node<T> = *node;
            if node.is_leaf() {
                if let Some(value) = node.values.get(*cursor) {
                    *cursor += 1;
                    self.remaining -= 1;
                    return Some(value);
                }
                self.stack.pop();
                continue;
            }
            let slot = *cursor;
            *cursor += 1;
            if slot % 2 == 1 {
                match node.values.get(slot / 2) {
                    Some(value) => {
                        self.remaining -= 1;
                        return Some(value);
                    }
                    None => {
                        self.stack.pop();
                        continue;
                    }
                }
            }
            match node.children.get(slot / 2) {
                Some(child) => self.stack.push((child, 0)),
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for BalancedTreeIterator<'_, T> {}

impl<T> FusedIterator for BalancedTreeIterator<'_, T> {}
