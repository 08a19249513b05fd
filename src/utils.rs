//! Assorted utilities and helpers.

use std::num::NonZeroUsize;
use std::thread;

/// Detected hardware concurrency, or 1 if it cannot be determined.
///
/// This is the parallelism hint used by [`crate::ForkJoinSorter::new`] and
/// by the builder when none is configured.
#[inline]
pub fn default_parallelism() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Returns true if no element of `v` is less than its predecessor.
pub fn is_sorted_by<T, F>(v: &[T], is_less: F) -> bool
where
    F: Fn(&T, &T) -> bool,
{
    v.windows(2).all(|w| !is_less(&w[1], &w[0]))
}
