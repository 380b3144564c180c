//! One-sided search over bounded sorted sequences.
//!
//! Every structure in this crate locates values with the same primitive:
//! a step-halving search that starts at one end of the sequence and only
//! ever moves towards the answer. Chunks are small and bounded, so the
//! search never leaves a single cache-friendly slice.
//!
//! - [`find_index_for_value`] walks down from the end and returns the first
//!   position whose element is not less than the target.
//! - [`find_routing_index`] walks up from the start and returns the last
//!   position whose routing key does not exceed the target. It is used to
//!   pick a child by its cached minimum.

use std::borrow::Borrow;

/// Returns the index of the first element that is `>= value`.
///
/// The result lies in `[0, values.len()]`; `values.len()` means every element
/// is smaller than `value`. The answer is the same as
/// `values.partition_point(|element| element < value)`.
///
/// # Examples
///
/// ```rust
/// use chunkset::search::find_index_for_value;
///
/// let values = [10, 20, 30];
/// assert_eq!(find_index_for_value(&values, &5), 0);
/// assert_eq!(find_index_for_value(&values, &20), 1);
/// assert_eq!(find_index_for_value(&values, &25), 2);
/// assert_eq!(find_index_for_value(&values, &99), 3);
/// ```
#[inline]
pub fn find_index_for_value<T, Q>(values: &[T], value: &Q) -> usize
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut current = values.len();
    let mut step = values.len();
    while step > 0 {
        if current < step || values[current - step].borrow() < value {
            step /= 2;
        } else {
            current -= step;
        }
    }
    current
}

/// Returns the index of the last element whose routing key is not greater
/// than the target, or `0` when there is none.
///
/// `starts_after(element)` must report whether the element's routing key is
/// greater than the target, and must be monotone over `elements` (once an
/// element starts after the target, so do all later ones).
///
/// # Examples
///
/// ```rust
/// use chunkset::search::find_routing_index;
///
/// let minimums = [0, 100, 200];
/// assert_eq!(find_routing_index(&minimums, |minimum| *minimum > 150), 1);
/// assert_eq!(find_routing_index(&minimums, |minimum| *minimum > -1), 0);
/// assert_eq!(find_routing_index(&minimums, |minimum| *minimum > 500), 2);
/// ```
#[inline]
pub fn find_routing_index<E>(elements: &[E], mut starts_after: impl FnMut(&E) -> bool) -> usize {
    let mut current = 0;
    let mut step = elements.len();
    while step > 0 {
        if current + step >= elements.len() || starts_after(&elements[current + step]) {
            step /= 2;
        } else {
            current += step;
        }
    }
    current
}
