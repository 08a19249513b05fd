//! Ready-made [`Executor`]s and the packaged-task helper [`spawn`].

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

use crate::error::TaskError;
use crate::future::{promise, Future};
use crate::traits::{Executor, Job};

/// Submit `f` to `executor` and return a future of its result.
///
/// A panic inside `f` resolves the future with [`TaskError::Panicked`]
/// instead of unwinding through the worker. If the executor drops the job
/// without running it, the future resolves with
/// [`TaskError::BrokenPromise`].
pub fn spawn<E, F, R>(executor: &E, f: F) -> Future<R>
where
    E: Executor + ?Sized,
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let (job, future) = package(f);
    executor.execute(job);
    future
}

/// Wrap `f` into a [`Job`] without submitting it.
///
/// The future is available before the job is handed to any executor, so a
/// caller can start tracking it even if submission unwinds.
pub(crate) fn package<F, R>(f: F) -> (Job, Future<R>)
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let (promise, future) = promise();
    let job: Job = Box::new(move || {
        let outcome = catch_unwind(AssertUnwindSafe(f)).map_err(TaskError::from_panic);
        promise.complete(outcome);
    });
    (job, future)
}

/// Runs every job immediately on the submitting thread.
///
/// Turns the engine into a sequential sort; handy for tests and for
/// comparing against the parallel executors.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) {
        job();
    }
}

/// Runs each job on its own freshly spawned OS thread.
///
/// If the thread cannot be created the job is dropped, which surfaces as a
/// broken promise on the corresponding future.
#[derive(Debug, Clone)]
pub struct ThreadExecutor {
    name: String,
    stack_size: Option<usize>,
}

impl ThreadExecutor {
    /// Executor with default-sized stacks and threads named `fj-sort-worker`.
    pub fn new() -> Self {
        Self {
            name: "fj-sort-worker".to_owned(),
            stack_size: None,
        }
    }

    /// Name given to spawned threads.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Stack size for spawned threads, in bytes.
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }
}

impl Default for ThreadExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for ThreadExecutor {
    fn execute(&self, job: Job) {
        let mut builder = thread::Builder::new().name(self.name.clone());
        if let Some(bytes) = self.stack_size {
            builder = builder.stack_size(bytes);
        }
        if let Err(_err) = builder.spawn(job) {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, "failed to spawn worker thread; job dropped");
        }
    }
}

/// Submits jobs to rayon's global thread pool.
#[cfg(feature = "parallel")]
#[derive(Debug, Default, Clone, Copy)]
pub struct RayonExecutor;

#[cfg(feature = "parallel")]
impl Executor for RayonExecutor {
    fn execute(&self, job: Job) {
        rayon::spawn(job);
    }
}

#[cfg(feature = "parallel")]
impl Executor for rayon::ThreadPool {
    fn execute(&self, job: Job) {
        self.spawn(job);
    }
}
