use std::future::Future;

use tracing::{debug, trace};

/// Invoke `factory` until it succeeds or the retry budget is spent.
///
/// Total attempts are `retries + 1`. Attempts are strictly sequential and immediate (no backoff).
/// On exhaustion the error of the last attempt is returned; earlier errors are dropped.
pub async fn retry<F, Fut, T, E>(mut factory: F, retries: u32) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut remaining = retries;
    let mut attempt: u32 = 1;

    loop {
        match factory().await {
            Ok(value) => {
                trace!(target: "taskkit_exec::retry", attempt, "attempt succeeded");
                return Ok(value);
            }
            Err(e) if remaining == 0 => {
                debug!(target: "taskkit_exec::retry", attempt, "retry budget exhausted");
                return Err(e);
            }
            Err(_) => {
                remaining -= 1;
                debug!(
                    target: "taskkit_exec::retry",
                    attempt,
                    remaining,
                    "attempt failed; retrying"
                );
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exhaustion_invokes_retries_plus_one_and_returns_last_error() {
        let mut calls = 0u32;
        let result: Result<(), String> = retry(
            || {
                calls += 1;
                let n = calls;
                async move { Err(format!("failure #{n}")) }
            },
            3,
        )
        .await;

        assert_eq!(calls, 4);
        assert_eq!(result.unwrap_err(), "failure #4");
    }

    #[tokio::test]
    async fn early_success_stops_invoking() {
        let mut calls = 0u32;
        let result = retry(
            || {
                calls += 1;
                let n = calls;
                async move { if n <= 2 { Err("flaky") } else { Ok(n * 10) } }
            },
            5,
        )
        .await;

        assert_eq!(result, Ok(30));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let mut calls = 0u32;
        let result: Result<u8, &str> = retry(
            || {
                calls += 1;
                async { Err("nope") }
            },
            0,
        )
        .await;

        assert_eq!(result, Err("nope"));
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_never_overlap() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::time::Duration;

        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let result: Result<(), ()> = retry(
            || {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Err(())
                }
            },
            4,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
