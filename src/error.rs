//! Error types carried through futures and returned by the sorting engine.
//!
//! Failures never escape a worker thread as a panic: they are captured where
//! they happen and travel through the owning [`Future`](crate::future::Future)
//! like an ordinary value until somebody awaits it.

use std::any::Any;

use thiserror::Error;

/// Result of an asynchronous unit of work.
pub type Outcome<T> = Result<T, TaskError>;

/// Failure transported by a future.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The task (typically the comparator during a segment sort or a merge)
    /// panicked. The panic payload is kept as text when it was a string.
    #[error("task panicked: {message}")]
    Panicked {
        /// Panic message, or a placeholder for non-string payloads.
        message: String,
    },

    /// The promise side was dropped before it produced a value, for example
    /// because an executor discarded the job instead of running it.
    #[error("broken promise: the producer was dropped without setting a value")]
    BrokenPromise,
}

impl TaskError {
    /// Convert a payload obtained from [`std::panic::catch_unwind`].
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        TaskError::Panicked { message }
    }

    /// Returns true for [`TaskError::BrokenPromise`].
    pub fn is_broken_promise(&self) -> bool {
        matches!(self, TaskError::BrokenPromise)
    }
}
