use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use taskkit_core::{Runner, cached, memoize};
use taskkit_exec::{delay, try_catch};
use taskkit_model::RunPolicy;
use taskkit_observe::{LoggerConfig, logger_init};

/// Usage: `bounded-run ['{"limit":3,"retries":2,"timeoutMs":250}']`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Logger
    let cfg = LoggerConfig::from_env()?;
    logger_init(&cfg)?;
    info!(format = %cfg.format, level = %cfg.level, "logger initialized");

    // 2) Policy
    let policy = match std::env::args().nth(1) {
        Some(raw) => serde_json::from_str::<RunPolicy>(&raw).context("parsing run policy")?,
        None => RunPolicy::default().with_timeout_ms(250),
    };
    let runner = Runner::new(policy)?;
    info!(policy = ?runner.policy(), "runner ready");

    // 3) Batch: every third job is flaky on its first attempt, job 7 never answers in time
    let attempts = Arc::new(AtomicUsize::new(0));
    let jobs = (0..10u64).map(|id| {
        let attempts = Arc::clone(&attempts);
        move || {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed);
            async move {
                let work = Duration::from_millis(if id == 7 { 1_000 } else { 20 + id * 10 });
                delay(work, ()).await;
                if id % 3 == 0 && attempt % 2 == 0 {
                    return Err(format!("job {id}: transient failure"));
                }
                Ok(id * id)
            }
        }
    });

    let outcomes = runner.run_settled(jobs).await?;
    for (id, outcome) in outcomes.iter().enumerate() {
        match outcome {
            Ok(value) => info!(id, value, "job finished"),
            Err(e) => warn!(id, error = %e, "job failed"),
        }
    }
    info!(attempts = attempts.load(Ordering::Relaxed), "batch settled");

    // 4) Outcome capture
    let outcome = try_catch(async { "not a number".parse::<u32>() }).await;
    info!(is_err = outcome.is_err(), "parsed with try_catch");

    // 5) Memoized lookup
    let config = memoize(|| async {
        delay(Duration::from_millis(50), "loaded config".to_string()).await
    });
    let (a, b) = tokio::join!(config.call(), config.call());
    info!(same = a == b, "memoized lookup shared");

    // 6) Keyed cache
    let square = cached(|(n,): (u64,)| n * n, Duration::from_secs(60));
    for n in [3, 4, 3] {
        let value = square.call((n,))?;
        info!(n, value, entries = square.len(), "cached square");
    }

    Ok(())
}
