//! # chunkset
//!
//! In-memory ordered sets built from bounded sorted chunks.
//!
//! ## Overview
//!
//! Every set in this crate stores unique, totally ordered values and supports
//! the same four operations: insert, erase, membership test and ordered
//! enumeration. They differ in how they keep values sorted under mutation:
//!
//! - **[`BalancedTree`]**: a B-tree of bounded sorted arrays with separator
//!   values and split/merge rebalancing
//! - **[`MultilevelChunkedTree`]**: a multilevel hashed array tree whose
//!   internal nodes only cache their subtree minimum
//! - **[`ChunkedSet`]**: a single level of bounded chunks that splits on
//!   overflow and drops chunks once they are empty
//! - **Baselines**: [`baseline::ArraySet`] and [`baseline::SortedArraySet`]
//!
//! All of them implement [`OrderedSet`], the contract the smoke and
//! throughput harnesses drive.
//!
//! ## Feature Flags
//!
//! - `chunked`: [`ChunkedSet`]
//! - `balanced`: [`BalancedTree`]
//! - `multilevel`: [`MultilevelChunkedTree`]
//! - `baseline`: flat-array baselines
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use chunkset::prelude::*;
//!
//! let mut tree = MultilevelChunkedTree::with_bounds(ChunkBounds::SMOKE);
//! for value in (0..100).rev() {
//!     tree.insert(value);
//! }
//! tree.erase(&42);
//!
//! assert!(!tree.contains(&42));
//! assert_eq!(tree.len(), 99);
//! assert_eq!(tree.iter().next(), Some(&0));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the contract, the bounds type and every enabled structure.
///
/// # Usage
///
/// ```rust
/// use chunkset::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{ChunkBounds, ChunkBoundsError, InvariantViolation, OrderedSet};

    #[cfg(feature = "chunked")]
    pub use crate::chunked::ChunkedSet;

    #[cfg(feature = "balanced")]
    pub use crate::balanced::BalancedTree;

    #[cfg(feature = "multilevel")]
    pub use crate::multilevel::MultilevelChunkedTree;

    #[cfg(feature = "baseline")]
    pub use crate::baseline::{ArraySet, SortedArraySet};
}

mod bounds;
mod invariant;
mod ordered_set;
pub mod search;

#[cfg(feature = "chunked")]
pub mod chunked;

#[cfg(feature = "balanced")]
pub mod balanced;

#[cfg(feature = "multilevel")]
pub mod multilevel;

#[cfg(feature = "baseline")]
pub mod baseline;

pub use bounds::{ChunkBounds, ChunkBoundsError};
pub use invariant::InvariantViolation;
pub use ordered_set::OrderedSet;

#[cfg(feature = "chunked")]
pub use chunked::ChunkedSet;

#[cfg(feature = "balanced")]
pub use balanced::BalancedTree;

#[cfg(feature = "multilevel")]
pub use multilevel::MultilevelChunkedTree;

#[cfg(feature = "chunked")]
static_assertions::assert_impl_all!(ChunkedSet<i32>: Send, Sync, Clone);

#[cfg(feature = "balanced")]
static_assertions::assert_impl_all!(BalancedTree<i32>: Send, Sync, Clone);

#[cfg(feature = "multilevel")]
static_assertions::assert_impl_all!(MultilevelChunkedTree<i32>: Send, Sync, Clone);

#[cfg(feature = "baseline")]
static_assertions::assert_impl_all!(baseline::SortedArraySet<i32>: Send, Sync, Clone);
