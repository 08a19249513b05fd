use crate::engine::{ForkJoinSorter, SegmentSort};
use crate::merge::MergeStrategy;
use crate::traits::Executor;
use crate::utils::default_parallelism;

/// Step-by-step configuration of a [`ForkJoinSorter`].
///
/// ```
/// use fj_sort::{executor::InlineExecutor, ForkJoinSorterBuilder, MergeStrategy, SegmentSort};
///
/// let sorter = ForkJoinSorterBuilder::new(InlineExecutor)
///     .with_parallelism(3)
///     .with_segment_sort(SegmentSort::Stable)
///     .with_merge_strategy(MergeStrategy::Rotation)
///     .build();
/// assert_eq!(sorter.parallelism(), 3);
/// ```
pub struct ForkJoinSorterBuilder<E: Executor> {
    executor: E,
    parallelism: Option<usize>,
    segment_sort: SegmentSort,
    merge_strategy: MergeStrategy,
}

impl<E: Executor> ForkJoinSorterBuilder<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            parallelism: None,
            segment_sort: SegmentSort::default(),
            merge_strategy: MergeStrategy::default(),
        }
    }
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = Some(parallelism);
        self
    }
    pub fn with_segment_sort(mut self, segment_sort: SegmentSort) -> Self {
        self.segment_sort = segment_sort;
        self
    }
    pub fn with_merge_strategy(mut self, merge_strategy: MergeStrategy) -> Self {
        self.merge_strategy = merge_strategy;
        self
    }
    /// Shorthand for a stable segment sort; the merge is always stable.
    pub fn stable(self) -> Self {
        self.with_segment_sort(SegmentSort::Stable)
    }
    /// # Panics
    /// Panics if an explicit parallelism of zero was configured.
    pub fn build(self) -> ForkJoinSorter<E> {
        let parallelism = match self.parallelism {
            Some(p) => p,
            None => default_parallelism(),
        };
        ForkJoinSorter::from_parts(
            self.executor,
            parallelism,
            self.segment_sort,
            self.merge_strategy,
        )
    }
}
