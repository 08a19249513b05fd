//! Single-assignment future/promise with continuation chaining.
//!
//! A [`Promise`] and its [`Future`] share one result cell. The cell starts
//! *empty* and is resolved exactly once, either with a value or with a
//! [`TaskError`]. Two ways exist to consume the result:
//!
//! * block on it with [`Future::wait`] / [`Future::get`] (a mutex plus a
//!   condition variable), or
//! * attach a continuation with [`Future::set_continuation`] (or one of its
//!   wrappers), which runs on whichever thread resolves the cell. If the cell
//!   is already resolved the continuation runs immediately on the caller.
//!
//! Attaching a continuation consumes the future, so a cell can never carry
//! more than one. The mutex guards O(1) state swaps only; user code
//! (continuations, notifications) always runs after the guard is released.
//!
//! ```
//! use fj_sort::future::promise;
//!
//! let (p, f) = promise::<u32>();
//! let doubled = f.then(|v| v * 2);
//! p.set_value(21);
//! assert_eq!(doubled.get(), Ok(42));
//! ```

use std::fmt;
use std::mem;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{Outcome, TaskError};

type Continuation<T> = Box<dyn FnOnce(Outcome<T>) + Send>;

enum State<T> {
    Empty,
    Value(T),
    Error(TaskError),
    Continuation(Continuation<T>),
    /// Value taken by `get` or handed to a continuation.
    Consumed,
}

impl<T> State<T> {
    #[inline]
    fn is_pending(&self) -> bool {
        matches!(self, State::Empty | State::Continuation(_))
    }

    fn name(&self) -> &'static str {
        match self {
            State::Empty => "empty",
            State::Value(_) => "value",
            State::Error(_) => "error",
            State::Continuation(_) => "continuation",
            State::Consumed => "consumed",
        }
    }
}

struct Shared<T> {
    state: Mutex<State<T>>,
    resolved: Condvar,
}

impl<T> Shared<T> {
    fn new(state: State<T>) -> Self {
        Self {
            state: Mutex::new(state),
            resolved: Condvar::new(),
        }
    }

    // User code never runs under the lock, so poisoning carries no meaning here.
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_resolved(&self) -> MutexGuard<'_, State<T>> {
        let guard = self.lock();
        self.resolved
            .wait_while(guard, |state| state.is_pending())
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Store the outcome, or hand it to the installed continuation.
    ///
    /// # Panics
    /// Panics if the cell was already resolved.
    fn resolve(&self, outcome: Outcome<T>) {
        let mut state = self.lock();
        match mem::replace(&mut *state, State::Consumed) {
            State::Empty => {
                *state = match outcome {
                    Ok(value) => State::Value(value),
                    Err(error) => State::Error(error),
                };
                drop(state);
                self.resolved.notify_all();
            }
            State::Continuation(continuation) => {
                drop(state);
                continuation(outcome);
            }
            previous => {
                let name = previous.name();
                *state = previous;
                drop(state);
                panic!("future resolved twice (state was {name})");
            }
        }
    }

    /// Install `continuation`, or run it right away if the outcome is known.
    ///
    /// # Panics
    /// Panics if a continuation is already installed or the value was taken.
    fn subscribe(&self, continuation: Continuation<T>) {
        let mut state = self.lock();
        match mem::replace(&mut *state, State::Consumed) {
            State::Empty => *state = State::Continuation(continuation),
            State::Value(value) => {
                drop(state);
                continuation(Ok(value));
            }
            State::Error(error) => {
                drop(state);
                continuation(Err(error));
            }
            previous => {
                let name = previous.name();
                *state = previous;
                drop(state);
                panic!("continuation attached to a future in state {name}");
            }
        }
    }
}

/// Create a connected promise/future pair sharing an empty cell.
pub fn promise<T>() -> (Promise<T>, Future<T>) {
    let shared = Arc::new(Shared::new(State::Empty));
    (
        Promise {
            shared: Some(Arc::clone(&shared)),
        },
        Future { shared },
    )
}

/// Result of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureStatus {
    /// The cell holds a value or an error.
    Ready,
    /// The timeout elapsed first.
    Timeout,
}

/// Write side of a result cell.
///
/// Every resolving method consumes the promise, so resolving twice does not
/// compile. Dropping an unresolved promise resolves the cell with
/// [`TaskError::BrokenPromise`] so that no waiter can hang on it.
pub struct Promise<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> Promise<T> {
    /// Resolve with a value.
    pub fn set_value(self, value: T) {
        self.complete(Ok(value));
    }

    /// Resolve with an error.
    pub fn set_error(self, error: TaskError) {
        self.complete(Err(error));
    }

    /// Resolve with a ready-made outcome.
    ///
    /// If a continuation is installed it runs on the current thread before
    /// this call returns.
    pub fn complete(mut self, outcome: Outcome<T>) {
        if let Some(shared) = self.shared.take() {
            shared.resolve(outcome);
        }
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.resolve(Err(TaskError::BrokenPromise));
        }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("resolved", &self.shared.is_none())
            .finish()
    }
}

/// Read side of a result cell.
#[must_use = "futures do nothing unless awaited or chained"]
pub struct Future<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Future<T> {
    /// A future that is already resolved with `value`.
    pub fn ready(value: T) -> Self {
        Self {
            shared: Arc::new(Shared::new(State::Value(value))),
        }
    }

    /// A future that is already resolved with `error`.
    pub fn failed(error: TaskError) -> Self {
        Self {
            shared: Arc::new(Shared::new(State::Error(error))),
        }
    }

    /// Non-blocking readiness check.
    pub fn is_ready(&self) -> bool {
        !self.shared.lock().is_pending()
    }

    /// Block until the cell holds a value or an error.
    pub fn wait(&self) {
        drop(self.shared.wait_resolved());
    }

    /// Block for at most `timeout`.
    pub fn wait_for(&self, timeout: Duration) -> FutureStatus {
        let guard = self.shared.lock();
        let (guard, _) = self
            .shared
            .resolved
            .wait_timeout_while(guard, timeout, |state| state.is_pending())
            .unwrap_or_else(PoisonError::into_inner);
        if guard.is_pending() {
            FutureStatus::Timeout
        } else {
            FutureStatus::Ready
        }
    }

    /// Block until `deadline` at the latest.
    pub fn wait_until(&self, deadline: Instant) -> FutureStatus {
        self.wait_for(deadline.saturating_duration_since(Instant::now()))
    }

    /// Wait, then take the value or the error.
    pub fn get(self) -> Outcome<T> {
        let mut state = self.shared.wait_resolved();
        match mem::replace(&mut *state, State::Consumed) {
            State::Value(value) => Ok(value),
            State::Error(error) => Err(error),
            other => unreachable!("resolved future in state {}", other.name()),
        }
    }
}

impl<T: Send + 'static> Future<T> {
    /// Attach a raw continuation that receives the outcome.
    ///
    /// Runs immediately on this thread if the future is already resolved,
    /// otherwise later on the thread that resolves it. Panics inside `f` are
    /// not caught; use [`set_continuation`](Self::set_continuation) for that.
    pub fn on_ready<F>(self, f: F)
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        self.shared.subscribe(Box::new(f));
    }

    /// Attach `f` and return a future of its result.
    ///
    /// `f` sees errors as well as values and decides what to forward. A panic
    /// in `f` resolves the returned future with [`TaskError::Panicked`].
    pub fn set_continuation<U, F>(self, f: F) -> Future<U>
    where
        U: Send + 'static,
        F: FnOnce(Outcome<T>) -> Outcome<U> + Send + 'static,
    {
        let (promise, derived) = promise();
        self.on_ready(move |outcome| {
            let result = catch_unwind(AssertUnwindSafe(move || f(outcome)))
                .unwrap_or_else(|payload| Err(TaskError::from_panic(payload)));
            promise.complete(result);
        });
        derived
    }

    /// Map the value; errors pass through without calling `f`.
    pub fn then<U, F>(self, f: F) -> Future<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.set_continuation(move |outcome| outcome.map(f))
    }

    /// Future of both values, resolved once both inputs are resolved.
    ///
    /// The right future is only subscribed to after the left one resolved,
    /// so no thread ever blocks. If either side failed the result is that
    /// error, the left one taking precedence.
    pub fn join<U>(self, other: Future<U>) -> Future<(T, U)>
    where
        U: Send + 'static,
    {
        let (promise, joined) = promise();
        self.on_ready(move |left| {
            other.on_ready(move |right| {
                let pair = match (left, right) {
                    (Ok(l), Ok(r)) => Ok((l, r)),
                    (Err(e), _) | (_, Err(e)) => Err(e),
                };
                promise.complete(pair);
            });
        });
        joined
    }
}

impl<T> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("Future")
            .field("state", &state.name())
            .finish()
    }
}
