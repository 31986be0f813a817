use std::future::Future;
use std::time::Duration;

use tokio::task::JoinError;
use tracing::{trace, warn};

use crate::error::ExecError;

/// Race the task produced by `factory` against a deadline.
///
/// The task is spawned onto the current tokio runtime:
/// - if it settles first, its result is returned and the timer is released;
/// - if the deadline fires first, [`ExecError::Timeout`] is returned and the task is detached.
///   It keeps running to completion, but its outcome is discarded.
///
/// A panic inside the task is resumed in the caller.
pub async fn timeout<F, Fut, T, E>(factory: F, duration: Duration) -> Result<T, ExecError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let handle = tokio::spawn(factory());

    // `tokio::time::timeout` owns the timer; it is dropped on every exit path.
    match tokio::time::timeout(duration, handle).await {
        Ok(joined) => {
            trace!(target: "taskkit_exec::timeout", "task settled before deadline");
            unwrap_join::<_, E>(joined)?.map_err(ExecError::Task)
        }
        Err(_) => {
            warn!(
                target: "taskkit_exec::timeout",
                timeout_ms = duration.as_millis() as u64,
                "task exceeded its deadline; detaching"
            );
            Err(ExecError::timed_out(duration))
        }
    }
}

/// Unwrap a join result, resuming panics and reporting runtime cancellation.
pub(crate) fn unwrap_join<R, E>(joined: Result<R, JoinError>) -> Result<R, ExecError<E>> {
    match joined {
        Ok(value) => Ok(value),
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(ExecError::Aborted(e.to_string())),
    }
}
