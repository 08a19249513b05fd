//! Fork-join sorting engine.
//!
//! A sort runs in three stages:
//! 1. [`partition_range`] splits the slice into adjacent spans, one per unit
//!    of parallelism.
//! 2. Each span is sorted in place by a job submitted to the executor; every
//!    job yields a `Future<Span>`.
//! 3. The futures are reduced pairwise ([`reduce_futures`]); each pair merges
//!    its two sorted neighbours in place as soon as both are done.
//!
//! The calling thread blocks exactly once, on the root of the reduction.
//! Worker threads never wait for each other: whichever finishes a pair last
//! performs the merge before returning to its executor.

use std::cmp::Ordering;
use std::mem;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{Outcome, TaskError};
use crate::executor::package;
use crate::future::Future;
use crate::merge::MergeStrategy;
use crate::partition::partition_range;
use crate::reduce::reduce_futures;
use crate::span::{SharedSlice, Span};
use crate::traits::Executor;
use crate::utils::default_parallelism;

/// Algorithm used to sort each segment before merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentSort {
    /// `slice::sort_unstable_by`.
    #[default]
    Unstable,
    /// `slice::sort_by`. Together with the stable merge this makes the whole
    /// sort stable.
    Stable,
}

impl SegmentSort {
    /// Sort `v` in place according to `is_less`.
    pub fn sort<T, F>(self, v: &mut [T], is_less: &F)
    where
        F: Fn(&T, &T) -> bool,
    {
        let compare = |a: &T, b: &T| ordering(is_less, a, b);
        match self {
            SegmentSort::Unstable => v.sort_unstable_by(compare),
            SegmentSort::Stable => v.sort_by(compare),
        }
    }
}

#[inline]
fn ordering<T, F>(is_less: &F, a: &T, b: &T) -> Ordering
where
    F: Fn(&T, &T) -> bool,
{
    if is_less(a, b) {
        Ordering::Less
    } else if is_less(b, a) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Parallel in-place sorter bound to an executor.
///
/// Typical usage:
/// ```
/// use fj_sort::{executor::ThreadExecutor, ForkJoinSorter};
///
/// let sorter = ForkJoinSorter::with_parallelism(ThreadExecutor::new(), 4);
/// let mut data = vec![9, 4, 7, 1, 8, 2, 6, 3, 5, 0];
/// sorter.sort(&mut data).unwrap();
/// assert_eq!(data, (0..10).collect::<Vec<_>>());
/// ```
#[derive(Debug, Clone)]
pub struct ForkJoinSorter<E> {
    executor: E,
    parallelism: usize,
    segment_sort: SegmentSort,
    merge_strategy: MergeStrategy,
}

impl<E: Executor> ForkJoinSorter<E> {
    /// Create a sorter that splits work by the detected hardware concurrency.
    pub fn new(executor: E) -> Self {
        Self::with_parallelism(executor, default_parallelism())
    }

    /// Create a sorter with an explicit parallelism hint.
    ///
    /// The hint only controls how many segments the input is cut into; it
    /// does not limit the threads the executor may use.
    ///
    /// # Panics
    /// Panics if `parallelism == 0`.
    pub fn with_parallelism(executor: E, parallelism: usize) -> Self {
        Self::from_parts(
            executor,
            parallelism,
            SegmentSort::default(),
            MergeStrategy::default(),
        )
    }

    pub(crate) fn from_parts(
        executor: E,
        parallelism: usize,
        segment_sort: SegmentSort,
        merge_strategy: MergeStrategy,
    ) -> Self {
        assert!(parallelism > 0, "parallelism must be positive");
        Self {
            executor,
            parallelism,
            segment_sort,
            merge_strategy,
        }
    }

    /// The executor segment jobs are submitted to.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Return the configured parallelism hint.
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Algorithm used for each segment before merging.
    pub fn segment_sort(&self) -> SegmentSort {
        self.segment_sort
    }

    /// Kernel used to merge neighbouring segments.
    pub fn merge_strategy(&self) -> MergeStrategy {
        self.merge_strategy
    }

    /// Sort `data` in ascending order.
    pub fn sort<T>(&self, data: &mut [T]) -> Outcome<()>
    where
        T: Ord + Send + 'static,
    {
        self.sort_by(data, T::lt)
    }

    /// Sort `data` by the key extracted with `key`.
    pub fn sort_by_key<T, K, F>(&self, data: &mut [T], key: F) -> Outcome<()>
    where
        T: Send + 'static,
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.sort_by(data, move |a, b| key(a) < key(b))
    }

    /// Sort `data` with `is_less`, which must be a strict weak ordering.
    ///
    /// Returns once the whole slice is sorted, or with the first failure that
    /// reached the root of the reduction (for example a comparator panic).
    /// After a failure the slice still holds exactly its original elements,
    /// in unspecified order.
    ///
    /// Elements and the comparator must be `'static`: segment jobs are
    /// boxed [`Job`](crate::traits::Job)s that an executor may hold on to,
    /// so they cannot borrow from the caller's stack. Sort owned values (or
    /// indices into borrowed data) instead:
    ///
    /// ```compile_fail
    /// use fj_sort::{executor::InlineExecutor, ForkJoinSorter};
    ///
    /// let text = String::from("pear fig apple");
    /// let mut words: Vec<&str> = text.split(' ').collect();
    /// ForkJoinSorter::with_parallelism(InlineExecutor, 2)
    ///     .sort(&mut words)
    ///     .unwrap();
    /// ```
    ///
    /// # Panics
    /// Panics if the engine pairs non-adjacent spans, which would be a bug in
    /// the partitioner or the reduction. A panic raised by the executor while
    /// a job is submitted propagates once every job already handed out has
    /// resolved.
    pub fn sort_by<T, F>(&self, data: &mut [T], is_less: F) -> Outcome<()>
    where
        T: Send + 'static,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "fork_join_sort",
            len = data.len(),
            parallelism = self.parallelism
        );
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let spans = partition_range(data.len(), self.parallelism);
        if spans.is_empty() {
            return Ok(());
        }

        let target = SharedSlice::new(data);
        let is_less = Arc::new(is_less);

        let segments = {
            #[cfg(feature = "tracing")]
            let span = tracing::debug_span!("sort_segments", segments = spans.len());
            #[cfg(feature = "tracing")]
            let _enter = span.enter();
            self.sort_segments(target, &spans, &is_less)
        };

        let merge_strategy = self.merge_strategy;
        let Some(root) = reduce_futures(segments, move |left, right| {
            merge_step(target, left, right, merge_strategy, &*is_less)
        }) else {
            return Ok(());
        };

        // Every job and every merge has finished touching `data` once the
        // root resolves.
        let result = root.get();
        #[cfg(feature = "tracing")]
        if let Err(err) = &result {
            tracing::debug!(error = %err, "fork-join sort failed");
        }
        let whole = result?;
        debug_assert_eq!(whole, Span::new(0, target.len()));
        Ok(())
    }

    /// Submit one in-place sort job per span.
    fn sort_segments<T, F>(
        &self,
        target: SharedSlice<T>,
        spans: &[Span],
        is_less: &Arc<F>,
    ) -> Vec<Future<Span>>
    where
        T: Send + 'static,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        let mut pending = PendingSegments {
            futures: Vec::with_capacity(spans.len()),
        };
        for &span in spans {
            let is_less = Arc::clone(is_less);
            let segment_sort = self.segment_sort;
            let (job, future) = package(move || {
                #[cfg(feature = "tracing")]
                let _enter =
                    tracing::trace_span!("sort_segment", start = span.start, end = span.end)
                        .entered();
                // SAFETY: partition spans are pairwise disjoint, and the driver
                // does not release `data` before this job has resolved.
                let segment = unsafe { target.span_mut(span) };
                segment_sort.sort(segment, &*is_less);
                span
            });
            // Tracked before submission: if `execute` keeps the job and then
            // unwinds, the guard still waits for it.
            pending.futures.push(future);
            self.executor.execute(job);
        }
        mem::take(&mut pending.futures)
    }
}

/// Merge two adjacent sorted spans of `target` in place.
///
/// # Panics
/// Panics if `left.end != right.start`.
fn merge_step<T, F>(
    target: SharedSlice<T>,
    left: Span,
    right: Span,
    strategy: MergeStrategy,
    is_less: &F,
) -> Outcome<Span>
where
    F: Fn(&T, &T) -> bool,
{
    let merged = left.join(right);
    #[cfg(feature = "tracing")]
    let _enter = tracing::trace_span!(
        "merge_spans",
        start = merged.start,
        mid = left.end,
        end = merged.end
    )
    .entered();
    // SAFETY: both inputs resolved, so the jobs and merges that produced them
    // are done with this range; sibling pairs cover disjoint ranges.
    let range = unsafe { target.span_mut(merged) };
    catch_unwind(AssertUnwindSafe(|| strategy.merge(range, left.len(), is_less)))
        .map_err(TaskError::from_panic)?;
    Ok(merged)
}

/// Segment futures handed to the executor so far, including the one whose
/// submission is in progress.
///
/// If submitting a job unwinds, the jobs already handed out may still be
/// working on the caller's slice; dropping this waits for them first. A job
/// the executor dropped resolves as a broken promise and ends the wait.
struct PendingSegments {
    futures: Vec<Future<Span>>,
}

impl Drop for PendingSegments {
    fn drop(&mut self) {
        for future in &self.futures {
            future.wait();
        }
    }
}

/// Sort `data` with `is_less` on `executor`, using the default configuration.
///
/// Same `'static` requirements as [`ForkJoinSorter::sort_by`].
///
/// ```
/// use fj_sort::{executor::InlineExecutor, fork_join_sort};
///
/// let mut data = vec![5, 3, 1, 4, 2];
/// fork_join_sort(&InlineExecutor, &mut data, |a: &i32, b: &i32| a < b).unwrap();
/// assert_eq!(data, [1, 2, 3, 4, 5]);
/// ```
pub fn fork_join_sort<E, T, F>(executor: &E, data: &mut [T], is_less: F) -> Outcome<()>
where
    E: Executor + ?Sized,
    T: Send + 'static,
    F: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    ForkJoinSorter::new(executor).sort_by(data, is_less)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::InlineExecutor;
    use crate::traits::Job;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    #[derive(Default)]
    struct Counting {
        submitted: AtomicUsize,
    }

    impl Executor for Counting {
        fn execute(&self, job: Job) {
            self.submitted.fetch_add(1, AtomicOrdering::SeqCst);
            job();
        }
    }

    #[test]
    fn empty_input_submits_nothing() {
        let sorter = ForkJoinSorter::with_parallelism(Counting::default(), 4);
        let mut data: Vec<u8> = Vec::new();
        sorter.sort(&mut data).unwrap();
        assert!(data.is_empty());
        assert_eq!(sorter.executor().submitted.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn five_elements_two_segments() {
        let sorter = ForkJoinSorter::with_parallelism(Counting::default(), 2);
        let mut data = vec![5, 3, 1, 4, 2];
        sorter.sort(&mut data).unwrap();
        assert_eq!(data, [1, 2, 3, 4, 5]);
        assert_eq!(sorter.executor().submitted.load(AtomicOrdering::SeqCst), 2);
    }

    #[test]
    fn single_element() {
        let sorter = ForkJoinSorter::with_parallelism(InlineExecutor, 8);
        let mut data = vec![42];
        sorter.sort(&mut data).unwrap();
        assert_eq!(data, [42]);
    }

    #[test]
    fn descending_comparator() {
        let sorter = ForkJoinSorter::with_parallelism(InlineExecutor, 3);
        let mut data: Vec<i32> = (0..20).collect();
        sorter.sort_by(&mut data, |a, b| a > b).unwrap();
        assert_eq!(data, (0..20).rev().collect::<Vec<_>>());
    }

    #[test]
    fn sort_by_key_orders_by_key() {
        let sorter = ForkJoinSorter::with_parallelism(InlineExecutor, 2);
        let mut words = vec!["ccc", "a", "dddd", "bb"];
        sorter.sort_by_key(&mut words, |w| w.len()).unwrap();
        assert_eq!(words, ["a", "bb", "ccc", "dddd"]);
    }

    #[test]
    fn segment_sort_orders_by_predicate() {
        for kind in [SegmentSort::Unstable, SegmentSort::Stable] {
            let mut v = [3, 1, 2];
            kind.sort(&mut v, &|a: &i32, b: &i32| a < b);
            assert_eq!(v, [1, 2, 3]);
        }
    }

    #[test]
    #[should_panic(expected = "not adjacent")]
    fn merge_step_rejects_non_adjacent_spans() {
        let mut data = [1, 2, 3, 4];
        let target = SharedSlice::new(&mut data);
        let _ = merge_step(
            target,
            Span::new(0, 1),
            Span::new(2, 4),
            MergeStrategy::Buffered,
            &|a: &i32, b: &i32| a < b,
        );
    }

    #[test]
    #[should_panic]
    fn with_parallelism_panics_on_zero() {
        let _ = ForkJoinSorter::with_parallelism(InlineExecutor, 0);
    }
}
