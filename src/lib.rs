//! Fork-join parallel sorting (fj-sort)
//!
//! This crate sorts a contiguous slice in place by cutting it into one
//! segment per unit of parallelism, sorting the segments concurrently, and
//! merging neighbours pairwise in a reduction tree until the whole slice is
//! sorted.
//!
//! ## Core idea
//! 1. The slice is partitioned into adjacent, disjoint spans.
//! 2. Every span is sorted by a job on a caller-supplied [`Executor`];
//!    each job hands back a [`Future`] of its span.
//! 3. Pairs of span futures are joined with continuations that merge the two
//!    runs in place once both are ready, level by level, until a single
//!    future covers the whole slice.
//!
//! Only the caller blocks, once, on the root of the tree. Worker threads never
//! wait for one another: the thread completing the second half of a pair runs
//! the merge itself.
//!
//! ## Quick start
//! ```
//! use fj_sort::{executor::ThreadExecutor, fork_join_sort};
//!
//! let mut data = vec![5, 3, 1, 4, 2];
//! fork_join_sort(&ThreadExecutor::new(), &mut data, |a: &i32, b: &i32| a < b).unwrap();
//! assert_eq!(data, [1, 2, 3, 4, 5]);
//! ```
//!
//! ## Building blocks
//! The pieces are usable on their own:
//! - [`future`]: single-assignment future/promise with continuation chaining
//! - [`reduce`]: pairwise tree reduction over futures with any binary op
//! - [`partition`]: splitting a range into adjacent spans
//! - [`merge`]: stable in-place merge kernels
//! - [`executor`]: inline, thread-per-job and rayon-backed executors
//!
//! ## Features
//! - `parallel` (default): rayon-backed executors.
//! - `tracing`: spans around sorts, segments and merges.

pub mod builder;
pub mod engine;
pub mod error;
pub mod executor;
pub mod future;
pub mod merge;
pub mod partition;
pub mod reduce;
pub mod span;
pub mod traits;
pub mod utils;

pub use crate::builder::ForkJoinSorterBuilder;
pub use crate::engine::{fork_join_sort, ForkJoinSorter, SegmentSort};
pub use crate::error::{Outcome, TaskError};
pub use crate::future::{promise, Future, FutureStatus, Promise};
pub use crate::merge::MergeStrategy;
pub use crate::span::Span;
pub use crate::traits::{Executor, Job};
