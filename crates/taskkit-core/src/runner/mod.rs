use std::future::Future;
use std::time::Duration;

use taskkit_exec::{ExecError, limit, limit_settled, retry, timeout};
use taskkit_model::RunPolicy;
use tracing::instrument;

use crate::error::CoreError;

/// Policy-driven batch runner.
///
/// Every task is bounded per attempt by the policy deadline (if any), retried up to
/// `policy.retries` extra times, and scheduled so that at most `policy.limit` tasks are in flight.
/// Tasks are factories (`Fn`) because a retry needs a fresh future per attempt.
#[derive(Debug, Clone)]
pub struct Runner {
    policy: RunPolicy,
}

impl Runner {
    /// Create a runner, rejecting a policy it cannot honor.
    pub fn new(policy: RunPolicy) -> Result<Self, CoreError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &RunPolicy {
        &self.policy
    }

    fn deadline(&self) -> Option<Duration> {
        self.policy.timeout_ms.map(Duration::from_millis)
    }

    /// Run every task; the first task to exhaust its retries fails the whole batch.
    ///
    /// Values are returned in input order.
    #[instrument(
        level = "debug",
        skip_all,
        fields(limit = self.policy.limit, retries = self.policy.retries, timeout_ms = ?self.policy.timeout_ms)
    )]
    pub async fn run<I, F, Fut, T, E>(&self, tasks: I) -> Result<Vec<T>, ExecError<E>>
    where
        I: IntoIterator<Item = F>,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let (retries, deadline) = (self.policy.retries, self.deadline());
        let jobs = tasks
            .into_iter()
            .map(move |task| move || attempt(task, retries, deadline));

        limit(jobs, self.policy.limit)
            .await
            .map_err(ExecError::flatten)
    }

    /// Run every task to completion and report each outcome in input order.
    #[instrument(
        level = "debug",
        skip_all,
        fields(limit = self.policy.limit, retries = self.policy.retries, timeout_ms = ?self.policy.timeout_ms)
    )]
    pub async fn run_settled<I, F, Fut, T, E>(
        &self,
        tasks: I,
    ) -> Result<Vec<Result<T, ExecError<E>>>, ExecError<E>>
    where
        I: IntoIterator<Item = F>,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let (retries, deadline) = (self.policy.retries, self.deadline());
        let jobs = tasks
            .into_iter()
            .map(move |task| move || attempt(task, retries, deadline));

        limit_settled(jobs, self.policy.limit)
            .await
            .map_err(ExecError::flatten)
    }
}

/// One task with its retry budget; each attempt is individually bounded by `deadline`.
async fn attempt<F, Fut, T, E>(
    task: F,
    retries: u32,
    deadline: Option<Duration>,
) -> Result<T, ExecError<E>>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let task = &task;
    retry(
        move || async move {
            match deadline {
                Some(after) => timeout(task, after).await,
                None => task().await.map_err(ExecError::Task),
            }
        },
        retries,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time::{Instant, sleep};

    #[derive(Default)]
    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Gauge {
        fn enter(&self) {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
        }

        fn leave(&self) {
            self.current.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn zero_limit_policy_is_rejected() {
        let err = Runner::new(RunPolicy::new(0)).unwrap_err();
        assert!(matches!(err, CoreError::Policy(_)));
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let flaky = move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(format!("flaky #{n}"))
                } else {
                    Ok(n)
                }
            }
        };

        let runner = Runner::new(RunPolicy::new(1).with_retries(2)).unwrap();
        let out = runner.run(vec![flaky]).await;

        assert_eq!(out, Ok(vec![2]));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_fail_the_batch_with_the_task_error() {
        let runner = Runner::new(RunPolicy::new(2).with_retries(1)).unwrap();
        let out: Result<Vec<u8>, _> = runner
            .run(vec![|| async { Err::<u8, _>("boom".to_string()) }])
            .await;

        assert_eq!(out, Err(ExecError::Task("boom".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_attempt_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let slow_then_fast = move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    sleep(Duration::from_millis(200)).await;
                }
                Ok::<_, String>(n)
            }
        };

        let policy = RunPolicy::new(1).with_retries(1).with_timeout_ms(100);
        let runner = Runner::new(policy).unwrap();

        let started = Instant::now();
        let out = runner.run(vec![slow_then_fast]).await;

        assert_eq!(out, Ok(vec![1]));
        assert_eq!(started.elapsed(), Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_timeout_surfaces_as_timeout_error() {
        let policy = RunPolicy::new(1).with_retries(2).with_timeout_ms(50);
        let runner = Runner::new(policy).unwrap();

        let out = runner
            .run(vec![|| async {
                sleep(Duration::from_secs(1)).await;
                Ok::<_, String>(())
            }])
            .await;

        let err = out.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "task timed out after 50ms");
    }

    #[tokio::test(start_paused = true)]
    async fn policy_limit_bounds_concurrency() {
        let gauge = Arc::new(Gauge::default());
        let tasks = (0..6u32).map(|i| {
            let gauge = Arc::clone(&gauge);
            move || {
                let gauge = Arc::clone(&gauge);
                async move {
                    gauge.enter();
                    sleep(Duration::from_millis(50)).await;
                    gauge.leave();
                    Ok::<_, String>(i)
                }
            }
        });

        let runner = Runner::new(RunPolicy::new(2).with_retries(0)).unwrap();
        let started = Instant::now();
        let out = runner.run(tasks).await.unwrap();

        assert_eq!(out, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(gauge.peak.load(Ordering::SeqCst), 2);
        assert_eq!(started.elapsed(), Duration::from_millis(150));
    }

    #[tokio::test]
    async fn settled_run_reports_each_outcome_in_order() {
        let tasks = (0..4u32).map(|i| {
            move || async move {
                if i % 2 == 0 {
                    Ok(i)
                } else {
                    Err(format!("odd {i}"))
                }
            }
        });

        let runner = Runner::new(RunPolicy::new(3).with_retries(0)).unwrap();
        let out = runner.run_settled(tasks).await.unwrap();

        assert_eq!(
            out,
            vec![
                Ok(0),
                Err(ExecError::Task("odd 1".to_string())),
                Ok(2),
                Err(ExecError::Task("odd 3".to_string())),
            ]
        );
    }
}
