//! The task-submission capability the engine is parameterised over.
//!
//! The engine never owns threads. Everything it runs asynchronously is
//! handed to an [`Executor`] supplied by the caller, which is free to run the
//! job on a pool, on a fresh thread, or right away on the calling thread.
//!
//! Contract for implementors:
//! - every job handed to [`Executor::execute`] is either run exactly once or
//!   dropped without running (dropping resolves the job's future with
//!   [`TaskError::BrokenPromise`](crate::error::TaskError::BrokenPromise));
//! - jobs never block on each other, so any number of worker threads
//!   (including zero extra threads) is enough to make progress, as long as
//!   the thread blocked in the final wait is not the only one able to run
//!   jobs.

use std::sync::Arc;

/// A type-erased unit of work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run [`Job`]s.
pub trait Executor {
    /// Run `job`, now or later, on any thread.
    fn execute(&self, job: Job);
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, job: Job) {
        (**self).execute(job);
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, job: Job) {
        (**self).execute(job);
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&self, job: Job) {
        (**self).execute(job);
    }
}
