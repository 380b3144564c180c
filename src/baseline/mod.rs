//! Flat-array baselines.
//!
//! These sets keep every value in a single vector and exist as reference
//! points for the chunked structures:
//!
//! - [`ArraySet`]: unsorted vector with linear scans
//! - [`SortedArraySet`]: sorted vector with one-sided binary search
//!
//! # Examples
//!
//! ```rust
//! use chunkset::baseline::{ArraySet, SortedArraySet};
//!
//! let mut unsorted = ArraySet::new();
//! let mut sorted = SortedArraySet::new();
//! for value in [3, 1, 2] {
//!     unsorted.insert(value);
//!     sorted.insert(value);
//! }
//!
//! // ArraySet keeps insertion order, SortedArraySet keeps ascending order.
//! assert_eq!(unsorted.iter().copied().collect::<Vec<_>>(), vec![3, 1, 2]);
//! assert_eq!(sorted.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
//! ```

mod array_set;
mod sorted_array_set;

pub use array_set::ArraySet;
pub use sorted_array_set::SortedArraySet;
