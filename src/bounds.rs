//! Chunk size bounds shared by every chunked structure.

use std::fmt;

/// The `(min_chunk_size, max_chunk_size)` pair that parameterizes a chunked
/// structure.
///
/// Every chunk or node except the root holds at most `max` entries (values
/// for leaves and B-tree nodes, children for internal multilevel nodes), and
/// rebalancing kicks in once a non-root node drops below `min`.
///
/// # Examples
///
/// ```rust
/// use chunkset::ChunkBounds;
///
/// let bounds = ChunkBounds::new(10, 19).unwrap();
/// assert_eq!(bounds.min(), 10);
/// assert_eq!(bounds.max(), 19);
///
/// assert!(ChunkBounds::new(19, 10).is_err());
/// assert!(ChunkBounds::new(0, 10).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkBounds {
    min: usize,
    max: usize,
}

impl ChunkBounds {
    /// Small bounds that make splits and merges happen after a handful of
    /// operations.
    pub const SMOKE: Self = Self { min: 10, max: 19 };

    /// Bounds used by the multilevel structures in throughput runs.
    pub const THROUGHPUT: Self = Self {
        min: 1000,
        max: 1999,
    };

    /// Creates a validated pair of bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkBoundsError::ZeroMinimum`] when `min` is zero and
    /// [`ChunkBoundsError::MinimumNotBelowMaximum`] when `min >= max`.
    pub const fn new(min: usize, max: usize) -> Result<Self, ChunkBoundsError> {
        if min == 0 {
            return Err(ChunkBoundsError::ZeroMinimum);
        }
        if min >= max {
            return Err(ChunkBoundsError::MinimumNotBelowMaximum { min, max });
        }
        Ok(Self { min, max })
    }

    /// The size below which a non-root node is merged with a neighbor.
    #[inline]
    #[must_use]
    pub const fn min(self) -> usize {
        self.min
    }

    /// The size above which a node is split.
    #[inline]
    #[must_use]
    pub const fn max(self) -> usize {
        self.max
    }
}

impl Default for ChunkBounds {
    fn default() -> Self {
        Self::THROUGHPUT
    }
}

impl fmt::Display for ChunkBounds {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[{}, {}]", self.min, self.max)
    }
}

/// Represents an invalid `(min_chunk_size, max_chunk_size)` pair.
///
/// # Examples
///
/// ```rust
/// use chunkset::{ChunkBounds, ChunkBoundsError};
///
/// let error = ChunkBounds::new(8, 8).unwrap_err();
/// assert_eq!(error, ChunkBoundsError::MinimumNotBelowMaximum { min: 8, max: 8 });
/// assert_eq!(
///     format!("{error}"),
///     "min_chunk_size (8) must be less than max_chunk_size (8)"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkBoundsError {
    /// `min_chunk_size` was zero, so underfilled nodes could never be detected.
    ZeroMinimum,
    /// `min_chunk_size` was not strictly less than `max_chunk_size`.
    MinimumNotBelowMaximum {
        /// The rejected minimum.
        min: usize,
        /// The rejected maximum.
        max: usize,
    },
}

impl fmt::Display for ChunkBoundsError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMinimum => write!(formatter, "min_chunk_size must be at least 1"),
            Self::MinimumNotBelowMaximum { min, max } => write!(
                formatter,
                "min_chunk_size ({min}) must be less than max_chunk_size ({max})"
            ),
        }
    }
}

impl std::error::Error for ChunkBoundsError {}
