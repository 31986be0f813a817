//! Bounded-concurrency execution of a fixed list of task factories.
//!
//! ## Scheduling
//!
//! Tasks are started one at a time in ascending index order. Before each start, the scheduler waits
//! until fewer than `limit` tasks are in flight (any-of wait, not a fixed batch), so a freed slot is
//! refilled immediately.
//!
//! Results are written into the slot of the task that produced them, so the output order always
//! matches the input order regardless of completion order.
//!
//! ## Failure policy
//!
//! - [`limit`]: first failure wins. The error is returned as soon as it is observed; in-flight
//!   siblings are detached (not aborted) and tasks not yet started are never started.
//! - [`limit_settled`]: never short-circuits; every task runs and every outcome is returned.
//!
//! Every task is spawned onto the current tokio runtime, which is why futures must be
//! `Send + 'static`.
use std::future::Future;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::{debug, trace, warn};

use crate::error::ExecError;
use crate::timeout::unwrap_join;

/// Run `tasks` with at most `limit` in flight, failing on the first task error.
///
/// Resolves with one value per task, in input order. An empty task list resolves immediately.
/// A `limit` of zero is rejected with [`ExecError::InvalidLimit`].
pub async fn limit<I, F, Fut, T, E>(tasks: I, limit: usize) -> Result<Vec<T>, ExecError<E>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let mut slots: Vec<Option<T>> = Vec::new();

    let started = drive(tasks, limit, |index, outcome| {
        let value = outcome?;
        fill(&mut slots, index, value);
        Ok(())
    })
    .await?;

    debug_assert_eq!(slots.len(), started);
    Ok(slots.into_iter().flatten().collect())
}

/// Run `tasks` with at most `limit` in flight and collect every outcome.
///
/// Resolves with one `Result` per task, in input order.
/// Only wrapper failures ([`ExecError::InvalidLimit`], [`ExecError::Aborted`]) fail the call.
pub async fn limit_settled<I, F, Fut, T, E>(
    tasks: I,
    limit: usize,
) -> Result<Vec<Result<T, E>>, ExecError<E>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let mut slots: Vec<Option<Result<T, E>>> = Vec::new();

    drive(tasks, limit, |index, outcome| {
        fill(&mut slots, index, outcome);
        Ok(())
    })
    .await?;

    Ok(slots.into_iter().flatten().collect())
}

fn fill<V>(slots: &mut Vec<Option<V>>, index: usize, value: V) {
    if slots.len() <= index {
        slots.resize_with(index + 1, || None);
    }
    slots[index] = Some(value);
}

/// Scheduler shared by both failure policies.
///
/// `settle` receives each outcome with its task index; returning `Err` stops scheduling and
/// detaches whatever is still in flight. Returns the number of tasks started.
async fn drive<I, F, Fut, T, E, S>(tasks: I, limit: usize, mut settle: S) -> Result<usize, ExecError<E>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    S: FnMut(usize, Result<T, E>) -> Result<(), E>,
{
    if limit == 0 {
        return Err(ExecError::InvalidLimit(limit));
    }

    let mut in_flight = FuturesUnordered::new();
    let mut started = 0usize;

    for (index, task) in tasks.into_iter().enumerate() {
        while in_flight.len() >= limit {
            let Some((done, joined)) = in_flight.next().await else {
                break;
            };
            settle_one(&mut settle, done, joined, in_flight.len())?;
        }

        let handle = tokio::spawn(task());
        in_flight.push(async move { (index, handle.await) });
        started += 1;
        trace!(target: "taskkit_exec::limit", index, in_flight = in_flight.len(), "task started");
    }

    while let Some((done, joined)) = in_flight.next().await {
        settle_one(&mut settle, done, joined, in_flight.len())?;
    }

    debug!(target: "taskkit_exec::limit", started, limit, "all tasks settled");
    Ok(started)
}

fn settle_one<T, E, S>(
    settle: &mut S,
    index: usize,
    joined: Result<Result<T, E>, tokio::task::JoinError>,
    still_in_flight: usize,
) -> Result<(), ExecError<E>>
where
    S: FnMut(usize, Result<T, E>) -> Result<(), E>,
{
    let outcome = unwrap_join::<_, E>(joined)?;
    trace!(target: "taskkit_exec::limit", index, ok = outcome.is_ok(), "task settled");

    settle(index, outcome).map_err(|e| {
        warn!(
            target: "taskkit_exec::limit",
            index,
            detached = still_in_flight,
            "task failed; detaching in-flight siblings"
        );
        ExecError::Task(e)
    })
}
