//! Index ranges over the sequence being sorted.
//!
//! A `Span` covers `[start, end)` of one caller-owned slice. Spans are plain
//! bookkeeping: they own nothing and are only meaningful for the duration of
//! a single sort.

use std::marker::PhantomData;
use std::ops::Range;
use std::ptr::NonNull;

/// Half-open index range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Inclusive start index.
    pub start: usize,
    /// Exclusive end index.
    pub end: usize,
}

impl Span {
    /// # Panics
    /// Panics if `start > end`.
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "span start {start} is past its end {end}");
        Self { start, end }
    }

    /// Number of elements covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the span covers no element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The span as a `Range`, for slicing.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// `self` ends exactly where `next` starts.
    #[inline]
    pub fn is_adjacent_to(&self, next: &Span) -> bool {
        self.end == next.start
    }

    /// The span covering `self` followed by `next`.
    ///
    /// # Panics
    /// Panics unless `self.end == next.start`.
    #[inline]
    pub fn join(self, next: Span) -> Span {
        assert!(
            self.is_adjacent_to(&next),
            "spans {:?} and {:?} are not adjacent",
            self.range(),
            next.range()
        );
        Span {
            start: self.start,
            end: next.end,
        }
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// Unchecked shared handle to the slice under sort.
///
/// Jobs running on other threads reach their part of the slice through this
/// handle. Callers of [`SharedSlice::span_mut`] must guarantee that the
/// borrowed slice is still alive and that no two live borrows overlap; the
/// engine upholds both by handing out disjoint spans and by not returning
/// before every job has resolved.
pub(crate) struct SharedSlice<T> {
    ptr: NonNull<T>,
    len: usize,
    _marker: PhantomData<*mut T>,
}

// Each span is accessed by one thread at a time, so moving `T` across threads
// is all that is required.
unsafe impl<T: Send> Send for SharedSlice<T> {}
unsafe impl<T: Send> Sync for SharedSlice<T> {}

impl<T> Clone for SharedSlice<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SharedSlice<T> {}

impl<T> SharedSlice<T> {
    pub(crate) fn new(slice: &mut [T]) -> Self {
        let len = slice.len();
        Self {
            // A slice pointer is never null, even for an empty slice.
            ptr: NonNull::from(slice).cast(),
            len,
            _marker: PhantomData,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Mutable view of `span`.
    ///
    /// # Safety
    /// The slice this handle was created from must still be borrowed by the
    /// engine, and no other live reference may overlap `span`.
    ///
    /// # Panics
    /// Panics if `span` reaches past the end of the slice.
    pub(crate) unsafe fn span_mut<'a>(&self, span: Span) -> &'a mut [T] {
        assert!(
            span.end <= self.len,
            "span {:?} out of bounds for length {}",
            span.range(),
            self.len
        );
        // SAFETY: bounds checked above; exclusivity and liveness are the
        // caller's obligation.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr().add(span.start), span.len()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_span_is_empty() {
        let s = Span::new(5, 5);
        assert_eq!(s.len(), 0);
        assert!(s.is_empty());
    }

    #[test]
    fn typical_span_len() {
        let s = Span::new(2, 7);
        assert_eq!(s.len(), 5);
        assert!(!s.is_empty());
        assert_eq!(s.range(), 2..7);
    }

    #[test]
    fn join_adjacent() {
        assert_eq!(Span::new(0, 3).join(Span::new(3, 5)), Span::new(0, 5));
    }

    #[test]
    #[should_panic(expected = "not adjacent")]
    fn join_rejects_gap() {
        let _ = Span::new(0, 3).join(Span::new(4, 5));
    }

    #[test]
    #[should_panic]
    fn inverted_span_panics() {
        let _ = Span::new(4, 2);
    }

    #[test]
    fn shared_slice_views_disjoint_spans() {
        let mut data = [1, 2, 3, 4, 5];
        let shared = SharedSlice::new(&mut data);
        assert_eq!(shared.len(), 5);
        let (left, right) = unsafe { (shared.span_mut(Span::new(0, 2)), shared.span_mut(Span::new(2, 5))) };
        left.swap(0, 1);
        right.reverse();
        assert_eq!(data, [2, 1, 5, 4, 3]);
    }
}
