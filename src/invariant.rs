//! Structural invariant violations.
//!
//! A violation is never a valid input condition: it means the structure
//! itself is broken. Mutating operations that run into one abort through
//! [`violated`]; the `validate` audits on each structure return one as an
//! error instead so tests can report what went wrong.

use std::fmt;

/// Describes a broken structural invariant.
///
/// Positions are reported as depth (0 for the root) and entry counts so the
/// type stays independent of the stored value type.
///
/// # Examples
///
/// ```rust
/// use chunkset::InvariantViolation;
///
/// let violation = InvariantViolation::Overflow { depth: 1, size: 20, max: 19 };
/// assert_eq!(
///     format!("{violation}"),
///     "node at depth 1 holds 20 entries, above the maximum of 19"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A node holds more entries than the maximum chunk size.
    Overflow {
        /// Depth of the offending node.
        depth: usize,
        /// Number of entries it holds.
        size: usize,
        /// The configured maximum.
        max: usize,
    },
    /// A non-root node holds fewer entries than the structure guarantees.
    Underflow {
        /// Depth of the offending node.
        depth: usize,
        /// Number of entries it holds.
        size: usize,
        /// The lowest size the structure guarantees for non-root nodes.
        min: usize,
    },
    /// Two consecutive values in traversal order are not strictly increasing.
    OutOfOrder {
        /// Position of the second value in traversal order.
        position: usize,
    },
    /// An internal B-tree node does not hold exactly one more child than values.
    ChildCountMismatch {
        /// Depth of the offending node.
        depth: usize,
        /// Number of separator values.
        values: usize,
        /// Number of children.
        children: usize,
    },
    /// Leaves were found at different depths.
    UnevenDepth {
        /// Depth of the first leaf reached.
        expected: usize,
        /// Depth of the leaf that disagrees.
        found: usize,
    },
    /// A cached subtree minimum disagrees with the subtree contents.
    StaleSmallest {
        /// Depth of the node whose cache is stale.
        depth: usize,
    },
    /// A chunk or non-root node is empty.
    EmptyChunk {
        /// Depth of the empty node, or the chunk index for flat structures.
        position: usize,
    },
    /// Two sibling nodes being merged do not have the same kind of content.
    MixedSiblings {
        /// Index of the merge target among its siblings.
        index: usize,
    },
    /// A subtree that must hold values turned out to be empty.
    MissingMinimum,
    /// The tracked element count disagrees with the stored values.
    LengthMismatch {
        /// The tracked count.
        tracked: usize,
        /// The number of values actually stored.
        counted: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow { depth, size, max } => write!(
                formatter,
                "node at depth {depth} holds {size} entries, above the maximum of {max}"
            ),
            Self::Underflow { depth, size, min } => write!(
                formatter,
                "node at depth {depth} holds {size} entries, below the minimum of {min}"
            ),
            Self::OutOfOrder { position } => write!(
                formatter,
                "value at traversal position {position} is not greater than its predecessor"
            ),
            Self::ChildCountMismatch {
                depth,
                values,
                children,
            } => write!(
                formatter,
                "internal node at depth {depth} has {values} values but {children} children"
            ),
            Self::UnevenDepth { expected, found } => write!(
                formatter,
                "leaf found at depth {found}, expected every leaf at depth {expected}"
            ),
            Self::StaleSmallest { depth } => {
                write!(formatter, "cached smallest value is stale at depth {depth}")
            }
            Self::EmptyChunk { position } => {
                write!(formatter, "empty chunk at position {position}")
            }
            Self::MixedSiblings { index } => write!(
                formatter,
                "cannot merge a leaf with an internal node (siblings {index} and {})",
                index + 1
            ),
            Self::MissingMinimum => write!(formatter, "a subtree that must hold values is empty"),
            Self::LengthMismatch { tracked, counted } => write!(
                formatter,
                "tracked length {tracked} disagrees with {counted} stored values"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Aborts the current operation because the structure is corrupted.
///
/// # Panics
///
/// Always.
#[cold]
#[track_caller]
pub(crate) fn violated(violation: InvariantViolation) -> ! {
    panic!("ordered set invariant violated: {violation}")
}

/// Reports the first position at which `values` stops strictly increasing.
pub(crate) fn check_strictly_increasing<'a, T, I>(values: I) -> Result<usize, InvariantViolation>
where
    T: Ord + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut previous: Option<&T> = None;
    let mut count = 0;
    for value in values {
        if previous.is_some_and(|previous| previous >= value) {
            return Err(InvariantViolation::OutOfOrder { position: count });
        }
        previous = Some(value);
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_check_strictly_increasing_counts_values() {
        assert_eq!(check_strictly_increasing(&[1, 2, 3]), Ok(3));
        assert_eq!(check_strictly_increasing::<i32, _>(&[]), Ok(0));
    }

    #[rstest]
    #[case(&[1, 1], 1)]
    #[case(&[1, 3, 2], 2)]
    fn test_check_strictly_increasing_reports_position(#[case] values: &[i32], #[case] position: usize) {
        assert_eq!(
            check_strictly_increasing(values),
            Err(InvariantViolation::OutOfOrder { position })
        );
    }

    #[rstest]
    #[should_panic(expected = "ordered set invariant violated: cannot merge a leaf with an internal node")]
    fn test_violated_panics_with_distinguishable_message() {
        violated(InvariantViolation::MixedSiblings { index: 0 });
    }

    #[rstest]
    fn test_display_child_count_mismatch() {
        let violation = InvariantViolation::ChildCountMismatch {
            depth: 0,
            values: 2,
            children: 2,
        };
        assert_eq!(
            violation.to_string(),
            "internal node at depth 0 has 2 values but 2 children"
        );
    }
}
