//! Multilevel hashed array tree with cached subtree minimums.
//!
//! This module provides [`MultilevelChunkedTree`]. Unlike a B-tree, its
//! internal nodes hold no set members at all: every value lives in a leaf
//! chunk, and an internal node is just a bounded array of children. Each
//! node caches the smallest value of its subtree, which is all the routing
//! information a descent needs.
//!
//! # Overview
//!
//! - A child is chosen by searching the children's cached minimums for the
//!   last one not greater than the target.
//! - Leaves and internal nodes are split the same way: their content is
//!   bisected by count. Leaf sizes count values; internal sizes count
//!   children.
//! - An erase that leaves a child below `min` entries merges it with a
//!   neighbor, re-splitting the result if it overflows.
//! - The cached minimum is recomputed from the front element (leaf) or front
//!   child (internal) after every change that can move it, never patched.
//!
//! # Examples
//!
//! ```rust
//! use chunkset::MultilevelChunkedTree;
//!
//! let mut tree = MultilevelChunkedTree::new(2, 4).unwrap();
//! tree.extend([40, 10, 30, 20, 50, 60]);
//! assert_eq!(tree.smallest(), Some(&10));
//!
//! tree.erase(&10);
//! assert_eq!(tree.smallest(), Some(&20));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![20, 30, 40, 50, 60]);
//! assert_eq!(tree.validate(), Ok(()));
//! ```
//!
//! # Internal Structure
//!
//! ```text
//!                   Internal(smallest = 1)
//!               /                          \
//!    Leaf(smallest = 1)              Leaf(smallest = 9)
//!      [1, 3, 4, 7]                    [9, 12, 15]
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::iter::FusedIterator;
use std::slice;

use smallvec::SmallVec;

use crate::OrderedSet;
use crate::bounds::{ChunkBounds, ChunkBoundsError};
use crate::invariant::{self, InvariantViolation, check_strictly_increasing};
use crate::search::{find_index_for_value, find_routing_index};

/// Typical descent depth; deeper trees spill the iterator stack to the heap.
const INLINE_DEPTH: usize = 8;

// =============================================================================
// Node Definition
// =============================================================================

/// The payload of a node: a sorted chunk of values or an array of children.
#[derive(Clone)]
enum Content<T> {
    Leaf(Vec<T>),
    Internal(Vec<Node<T>>),
}

#[derive(Clone)]
struct Node<T> {
    content: Content<T>,
    /// Minimum of the subtree; `None` only for an empty root leaf.
    smallest: Option<T>,
}

impl<T: Clone> Node<T> {
    const fn empty_leaf() -> Self {
        Self {
            content: Content::Leaf(Vec::new()),
            smallest: None,
        }
    }

    fn from_content(content: Content<T>) -> Self {
        let mut node = Self {
            content,
            smallest: None,
        };
        node.refresh_smallest();
        node
    }

    /// Number of values for a leaf, number of children for an internal node.
    fn size(&self) -> usize {
        match &self.content {
            Content::Leaf(values) => values.len(),
            Content::Internal(children) => children.len(),
        }
    }

    fn refresh_smallest(&mut self) {
        self.smallest = match &self.content {
            Content::Leaf(values) => values.first().cloned(),
            Content::Internal(children) => {
                children.first().and_then(|child| child.smallest.clone())
            }
        };
    }

    /// Splits off the upper half of this node's content into a new node.
    fn split_off_upper_half(&mut self) -> Self {
        let upper = match &mut self.content {
            Content::Leaf(values) => Content::Leaf(values.split_off(values.len() / 2)),
            Content::Internal(children) => {
                Content::Internal(children.split_off(children.len() / 2))
            }
        };
        self.refresh_smallest();
        Self::from_content(upper)
    }
}

impl<T: Ord + Clone> Node<T> {
    /// Returns `true` if the value was not present before.
    fn insert(&mut self, value: T, bounds: ChunkBounds) -> bool {
        let inserted = match &mut self.content {
            Content::Leaf(values) => {
                let index = find_index_for_value(values, &value);
                if values.get(index) == Some(&value) {
                    return false;
                }
                values.insert(index, value);
                true
            }
            Content::Internal(children) => {
                let index = find_child_index_for_value(children, &value);
                let inserted = children[index].insert(value, bounds);
                if children[index].size() > bounds.max() {
                    split_child(children, index);
                }
                inserted
            }
        };
        self.refresh_smallest();
        inserted
    }

    /// Returns `true` if the value was present before.
    fn erase<Q>(&mut self, value: &Q, bounds: ChunkBounds) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let erased = match &mut self.content {
            Content::Leaf(values) => {
                let index = find_index_for_value(values, value);
                let found = values
                    .get(index)
                    .is_some_and(|candidate| candidate.borrow() == value);
                if found {
                    values.remove(index);
                }
                found
            }
            Content::Internal(children) => {
                let index = find_child_index_for_value(children, value);
                let erased = children[index].erase(value, bounds);
                if children[index].size() < bounds.min() {
                    if children.len() > 1 {
                        let merged_index = merge_child(children, index);
                        if children[merged_index].size() > bounds.max() {
                            split_child(children, merged_index);
                        }
                    } else if children[index].size() == 0 {
                        // Only reachable with `min == 1`: an emptied only child
                        // leaves this node empty for the parent to merge away.
                        children.clear();
                    }
                }
                erased
            }
        };
        self.refresh_smallest();
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
            match &node.content {
                Content::Leaf(values) => {
                    let index = find_index_for_value(values, value);
                    return values
                        .get(index)
                        .is_some_and(|candidate| candidate.borrow() == value);
                }
                Content::Internal(children) => {
                    let Some(child) = children.get(find_child_index_for_value(children, value))
                    else {
                        return false;
                    };
                    node = child;
                }
            }
        }
    }

    fn enumerate<F>(&self, visitor: &mut F)
    where
        F: FnMut(&T),
    {
        match &self.content {
            Content::Leaf(values) => values.iter().for_each(visitor),
            Content::Internal(children) => {
                for child in children {
                    child.enumerate(visitor);
                }
            }
        }
    }

    /// Audits this subtree and returns the depth of its leaves.
    fn validate(
        &self,
        depth: usize,
        bounds: ChunkBounds,
        lower_bound: usize,
    ) -> Result<usize, InvariantViolation> {
        let size = match &self.content {
            Content::Leaf(values) => values.len(),
            Content::Internal(children) => children.len(),
        };
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
        match &self.content {
            Content::Leaf(values) => {
                if self.smallest.as_ref() != values.first() {
                    return Err(InvariantViolation::StaleSmallest { depth });
                }
                Ok(depth)
            }
            Content::Internal(children) => {
                if children.is_empty() {
                    return Err(InvariantViolation::EmptyChunk { position: depth });
                }
                if self.smallest.as_ref() != children[0].smallest.as_ref() {
                    return Err(InvariantViolation::StaleSmallest { depth });
                }
                let mut leaf_depth = None;
                for child in children {
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
    }
}

/// Index of the last child whose cached minimum is not greater than `value`.
fn find_child_index_for_value<T, Q>(children: &[Node<T>], value: &Q) -> usize
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    find_routing_index(children, |child| {
        child
            .smallest
            .as_ref()
            .is_none_or(|smallest| value < smallest.borrow())
    })
}

/// Bisects `children[child_index]` into two siblings.
fn split_child<T: Clone>(children: &mut Vec<Node<T>>, child_index: usize) {
    let upper = children[child_index].split_off_upper_half();
    children.insert(child_index + 1, upper);
}

/// Merges `children[child_index]` with a neighbor and returns the index of
/// the merged node.
///
/// The right neighbor is preferred unless the child is the last one or its
/// left neighbor is the smaller of the two.
///
/// # Panics
///
/// Panics if the two siblings do not hold the same kind of content, which
/// can only happen if the tree is already corrupted.
fn merge_child<T: Clone>(children: &mut Vec<Node<T>>, child_index: usize) -> usize {
    let target_index = if child_index + 1 >= children.len()
        || (child_index > 0
            && children[child_index - 1].size() < children[child_index + 1].size())
    {
        child_index - 1
    } else {
        child_index
    };
    let donor = children.remove(target_index + 1);
    let target = &mut children[target_index];
    match (&mut target.content, donor.content) {
        (Content::Leaf(values), Content::Leaf(donor_values)) => values.extend(donor_values),
        (Content::Internal(nodes), Content::Internal(donor_nodes)) => nodes.extend(donor_nodes),
        (Content::Leaf(_), Content::Internal(_)) | (Content::Internal(_), Content::Leaf(_)) => {
            invariant::violated(InvariantViolation::MixedSiblings {
                index: target_index,
            })
        }
    }
    target.refresh_smallest();
    target_index
}

// =============================================================================
// MultilevelChunkedTree Definition
// =============================================================================

/// An ordered set backed by a multilevel hashed array tree whose nodes cache
/// their subtree minimum.
///
/// # Type Parameters
///
/// * `T` - The value type. `Clone` is needed to keep a copy of each
///   subtree's minimum in its node.
#[derive(Clone)]
pub struct MultilevelChunkedTree<T> {
    bounds: ChunkBounds,
    root: Node<T>,
    length: usize,
}

impl<T: Ord + Clone> MultilevelChunkedTree<T> {
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
            root: Node::empty_leaf(),
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

    /// Returns the smallest value, read from the root's cache.
    #[inline]
    pub const fn smallest(&self) -> Option<&T> {
        self.root.smallest.as_ref()
    }

    /// Returns the number of edges between the root and the leaves; 0 when
    /// the root is itself a leaf.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = &self.root;
        while let Content::Internal(children) = &node.content {
            let Some(child) = children.first() else {
                break;
            };
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
    pub fn iter(&self) -> MultilevelChunkedTreeIterator<'_, T> {
        let mut iterator = MultilevelChunkedTreeIterator {
            stack: SmallVec::new(),
            leaf: slice::Iter::default(),
            remaining: self.length,
        };
        match &self.root.content {
            Content::Leaf(values) => iterator.leaf = values.iter(),
            Content::Internal(children) => iterator.stack.push(children.iter()),
        }
        iterator
    }

    /// Audits node sizes, cached minimums, leaf depths, value order and the
    /// tracked length.
    ///
    /// Sizes are not audited against the nominal `[min, max]` range. The upper
    /// bound is exact, but non-root nodes only need `min(min, (max + 1) / 2)`
    /// entries: bisecting a node that reached `max + 1` entries leaves each
    /// half with at least `(max + 1) / 2`, which is below `min` whenever
    /// `min > (max + 1) / 2`.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let lower_bound = self.bounds.min().min((self.bounds.max() + 1) / 2);
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
        if self.root.size() <= self.bounds.max() {
            return;
        }
        let old_root = std::mem::replace(&mut self.root, Node::empty_leaf());
        let mut children = vec![old_root];
        split_child(&mut children, 0);
        self.root = Node::from_content(Content::Internal(children));
        tracing::trace!(depth = self.depth(), length = self.length, "multilevel tree grew");
    }

    fn decrease_depth_if_needed(&mut self) {
        while let Content::Internal(children) = &mut self.root.content {
            let replacement = match children.len() {
                0 => Node::empty_leaf(),
                1 => match children.pop() {
                    Some(child) => child,
                    None => return,
                },
                _ => return,
            };
            self.root = replacement;
            tracing::trace!(depth = self.depth(), length = self.length, "multilevel tree shrank");
        }
    }
}

impl<T: Ord + Clone> Default for MultilevelChunkedTree<T> {
    fn default() -> Self {
        Self::with_bounds(ChunkBounds::default())
    }
}

impl<T: Ord + Clone> OrderedSet<T> for MultilevelChunkedTree<T> {
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

impl<T: Ord + Clone> FromIterator<T> for MultilevelChunkedTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord + Clone> Extend<T> for MultilevelChunkedTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Ord + Clone> IntoIterator for &'a MultilevelChunkedTree<T> {
    type Item = &'a T;
    type IntoIter = MultilevelChunkedTreeIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord + Clone + fmt::Debug> fmt::Debug for MultilevelChunkedTree<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// Ascending iterator over a [`MultilevelChunkedTree`].
pub struct MultilevelChunkedTreeIterator<'a, T> {
    stack: SmallVec<[slice::Iter<'a, Node<T>>; INLINE_DEPTH]>,
    leaf: slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T> Iterator for MultilevelChunkedTreeIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.leaf.next() {
                self.remaining -= 1;
                return Some(value);
            }
            let siblings = self.stack.last_mut()?;
            match siblings.next() {
                Some(node) => match &node.content {
                    Content::Leaf(values) => self.leaf = values.iter(),
                    Content::Internal(children) => self.stack.push(children.iter()),
                },
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

impl<T> ExactSizeIterator for MultilevelChunkedTreeIterator<'_, T> {}

impl<T> FusedIterator for MultilevelChunkedTreeIterator<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn smoke_tree() -> MultilevelChunkedTree<i32> {
        MultilevelChunkedTree::with_bounds(ChunkBounds::SMOKE)
    }

    fn leaf(values: Vec<i32>) -> Node<i32> {
        Node::from_content(Content::Leaf(values))
    }

    fn internal(children: Vec<Node<i32>>) -> Node<i32> {
        Node::from_content(Content::Internal(children))
    }

    #[rstest]
    fn test_empty_tree_is_single_empty_leaf() {
        let tree = smoke_tree();
        assert!(matches!(&tree.root.content, Content::Leaf(values) if values.is_empty()));
        assert_eq!(tree.smallest(), None);
        assert_eq!(tree.depth(), 0);
    }

    #[rstest]
    fn test_insert_into_leaf_refreshes_smallest() {
        let mut tree = smoke_tree();
        tree.insert(5);
        tree.insert(3);
        tree.insert(8);
        assert_eq!(tree.smallest(), Some(&3));
    }

    #[rstest]
    fn test_duplicate_insert_into_leaf_is_noop() {
        let mut tree = smoke_tree();
        tree.insert(5);
        tree.insert(5);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root.size(), 1);
    }

    #[rstest]
    fn test_split_child_bisects_leaf_and_recomputes_smallest() {
        let mut children = vec![leaf((0..20).collect())];
        split_child(&mut children, 0);

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].size(), 10);
        assert_eq!(children[1].size(), 10);
        assert_eq!(children[0].smallest, Some(0));
        assert_eq!(children[1].smallest, Some(10));
    }

    #[rstest]
    fn test_split_child_bisects_internal_node() {
        let grandchildren: Vec<Node<i32>> = (0..5).map(|index| leaf(vec![index * 10])).collect();
        let mut children = vec![internal(grandchildren)];
        split_child(&mut children, 0);

        assert_eq!(children[0].size(), 2);
        assert_eq!(children[1].size(), 3);
        assert_eq!(children[1].smallest, Some(20));
    }

    #[rstest]
    fn test_merge_child_concatenates_leaves() {
        let mut children = vec![leaf(vec![1, 2]), leaf(vec![5]), leaf(vec![9, 10, 11])];
        assert_eq!(merge_child(&mut children, 1), 0);
        assert_eq!(children.len(), 2);
        assert!(matches!(&children[0].content, Content::Leaf(values) if *values == vec![1, 2, 5]));
    }

    #[rstest]
    fn test_merge_first_child_refreshes_its_smallest() {
        let mut empty = leaf(vec![0]);
        if let Content::Leaf(values) = &mut empty.content {
            values.clear();
        }
        let mut children = vec![empty, leaf(vec![5, 6])];
        assert_eq!(merge_child(&mut children, 0), 0);
        assert_eq!(children[0].smallest, Some(5));
    }

    #[rstest]
    #[should_panic(expected = "cannot merge a leaf with an internal node")]
    fn test_merge_mixed_siblings_fails_loudly() {
        let mut children = vec![leaf(vec![1]), internal(vec![leaf(vec![5])])];
        merge_child(&mut children, 0);
    }

    #[rstest]
    fn test_root_growth_keeps_smallest() {
        let mut tree = smoke_tree();
        tree.extend(0..20);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.smallest(), Some(&0));
        assert_eq!(tree.validate(), Ok(()));
    }

    #[rstest]
    fn test_erasing_front_updates_cached_smallest_up_the_tree() {
        let mut tree = smoke_tree();
        tree.extend(0..400);
        assert!(tree.depth() >= 2);

        tree.erase(&0);
        tree.erase(&1);
        assert_eq!(tree.smallest(), Some(&2));
        assert_eq!(tree.validate(), Ok(()));
    }

    #[rstest]
    fn test_root_shrinks_after_merge() {
        let mut tree = smoke_tree();
        tree.extend(0..20);
        tree.erase(&0);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.root.size(), 19);
    }

    #[rstest]
    fn test_validate_detects_stale_smallest() {
        let mut tree = smoke_tree();
        tree.extend(0..50);
        tree.root.smallest = Some(-1);
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::StaleSmallest { depth: 0 })
        );
    }

    #[rstest]
    fn test_emptied_only_child_is_dropped_with_unit_minimum() {
        let mut tree = MultilevelChunkedTree::new(1, 2).unwrap();
        tree.extend(0..64);
        for value in (0..64).rev() {
            tree.erase(&value);
            assert_eq!(tree.validate(), Ok(()), "after erasing {value}");
        }
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.smallest(), None);
    }

    #[rstest]
    fn test_validate_accepts_bisected_half_below_minimum() {
        let mut tree = MultilevelChunkedTree::new(6, 7).unwrap();
        tree.extend(0..8);
        assert_eq!(tree.depth(), 1);
        let Content::Internal(children) = &tree.root.content else {
            panic!("root should have grown");
        };
        assert_eq!(
            children.iter().map(Node::size).collect::<Vec<_>>(),
            vec![4, 4]
        );
        assert_eq!(tree.validate(), Ok(()));
    }

    #[rstest]
    fn test_contains_below_smallest_is_false() {
        let mut tree = smoke_tree();
        tree.extend(10..100);
        assert!(!tree.contains(&5));
        assert!(tree.contains(&10));
    }
}
