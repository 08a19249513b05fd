//! Splitting `[0, len)` into contiguous spans, one per unit of parallelism.

use crate::span::Span;

/// Partition `[0, len)` into at most `parallelism` adjacent spans.
///
/// With `count = min(len, parallelism)`, the chunk size is `len / count`.
/// `count - 1` full chunks are emitted and the last span takes everything
/// that is left, which is at least one chunk. When `len < parallelism` every
/// element gets a span of its own.
///
/// The result covers `[0, len)` exactly once, in order, without gaps. An empty
/// range yields no spans. A `parallelism` of zero is treated as one.
///
/// ```
/// use fj_sort::partition::partition_range;
/// use fj_sort::Span;
///
/// assert_eq!(partition_range(5, 2), vec![Span::new(0, 2), Span::new(2, 5)]);
/// assert!(partition_range(0, 8).is_empty());
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace"))]
pub fn partition_range(len: usize, parallelism: usize) -> Vec<Span> {
    if len == 0 {
        return Vec::new();
    }
    let count = parallelism.clamp(1, len);
    let chunk = len / count;

    let mut spans = Vec::with_capacity(count);
    let mut start = 0;
    for _ in 1..count {
        spans.push(Span::new(start, start + chunk));
        start += chunk;
    }
    spans.push(Span::new(start, len));
    spans
}
