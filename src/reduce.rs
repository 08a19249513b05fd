//! Pairwise tree reduction over futures.
//!
//! A pass pairs futures by position, `(0, 1)`, `(2, 3)`, ..., and replaces
//! each pair by a future of `op(left, right)`; an odd trailing future is
//! carried over untouched. Passes repeat until one future is left. The
//! pairing depends only on positions, never on completion order, so the
//! result is deterministic.
//!
//! Nothing here blocks: a pair's `op` runs as a continuation on the thread
//! that resolves the later of the two inputs.

use std::sync::Arc;

use crate::error::Outcome;
use crate::future::{promise, Future};

/// One reduction pass: `n` futures in, `ceil(n / 2)` futures out.
///
/// If either input of a pair fails, `op` is skipped and the error is
/// forwarded (the left one when both failed). A pair's output resolves only
/// after both of its inputs have resolved, even on failure.
///
/// `op` runs outside of any panic guard; it is expected to capture
/// recoverable failures itself and return them as errors.
pub fn reduce_pass<T, F>(futures: Vec<Future<T>>, op: &Arc<F>) -> Vec<Future<T>>
where
    T: Send + 'static,
    F: Fn(T, T) -> Outcome<T> + Send + Sync + 'static,
{
    let mut reduced = Vec::with_capacity(futures.len().div_ceil(2));
    let mut futures = futures.into_iter();
    while let Some(left) = futures.next() {
        match futures.next() {
            Some(right) => reduced.push(combine(left, right, Arc::clone(op))),
            None => reduced.push(left),
        }
    }
    reduced
}

/// Reduce all `futures` to a single one, or `None` if there are none.
///
/// ```
/// use fj_sort::future::Future;
/// use fj_sort::reduce::reduce_futures;
///
/// let parts = (1..=5).map(Future::ready).collect();
/// let total = reduce_futures(parts, |a: u32, b: u32| Ok(a + b)).unwrap();
/// assert_eq!(total.get(), Ok(15));
/// ```
pub fn reduce_futures<T, F>(futures: Vec<Future<T>>, op: F) -> Option<Future<T>>
where
    T: Send + 'static,
    F: Fn(T, T) -> Outcome<T> + Send + Sync + 'static,
{
    let op = Arc::new(op);
    let mut level = futures;
    let mut _depth = 0usize;
    while level.len() > 1 {
        #[cfg(feature = "tracing")]
        tracing::trace!(depth = _depth, width = level.len(), "reduction pass");
        level = reduce_pass(level, &op);
        _depth += 1;
    }
    level.pop()
}

fn combine<T, F>(left: Future<T>, right: Future<T>, op: Arc<F>) -> Future<T>
where
    T: Send + 'static,
    F: Fn(T, T) -> Outcome<T> + Send + Sync + 'static,
{
    let (promise, combined) = promise();
    left.join(right).on_ready(move |pair| {
        let outcome = pair.and_then(|(l, r)| op(l, r));
        promise.complete(outcome);
    });
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::future::promise;

    fn concat(a: String, b: String) -> Outcome<String> {
        Ok(a + &b)
    }

    #[test]
    fn empty_input_reduces_to_nothing() {
        assert!(reduce_futures(Vec::<Future<String>>::new(), concat).is_none());
    }

    #[test]
    fn single_future_passes_through() {
        let root = reduce_futures(vec![Future::ready("x".to_owned())], concat).unwrap();
        assert_eq!(root.get(), Ok("x".to_owned()));
    }

    #[test]
    fn odd_pass_carries_last_future() {
        let op = Arc::new(concat);
        let parts = ["a", "b", "c"].map(|s| Future::ready(s.to_owned())).into();
        let level = reduce_pass(parts, &op);
        assert_eq!(level.len(), 2);
        let got: Vec<_> = level.into_iter().map(|f| f.get().unwrap()).collect();
        assert_eq!(got, ["ab", "c"]);
    }

    #[test]
    fn order_follows_position_not_completion() {
        let (promises, futures): (Vec<_>, Vec<_>) = (0..7).map(|_| promise::<String>()).unzip();
        let root = reduce_futures(futures, concat).unwrap();
        for (i, p) in promises.into_iter().enumerate().rev() {
            p.set_value(i.to_string());
        }
        assert_eq!(root.get(), Ok("0123456".to_owned()));
    }

    #[test]
    fn error_short_circuits_op() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let parts = vec![
            Future::ready(1),
            Future::failed(TaskError::BrokenPromise),
            Future::ready(3),
            Future::ready(4),
        ];
        let root = reduce_futures(parts, move |a: i32, b: i32| {
            seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(a + b)
        })
        .unwrap();
        assert_eq!(root.get(), Err(TaskError::BrokenPromise));
        // only the (3, 4) pair was combined
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn pair_waits_for_right_even_after_left_failed() {
        let (left, lf) = promise::<i32>();
        let (right, rf) = promise::<i32>();
        let root = reduce_futures(vec![lf, rf], |a, b| Ok(a + b)).unwrap();
        left.set_error(TaskError::BrokenPromise);
        assert!(!root.is_ready());
        right.set_value(2);
        assert_eq!(root.get(), Err(TaskError::BrokenPromise));
    }
}
