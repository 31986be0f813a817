use std::future::Future;
use std::sync::OnceLock;

use futures::FutureExt;
use futures::future::Shared;
use tracing::debug;

/// Single-slot memoizer for a niladic task factory.
///
/// The first [`Memo::call`] invokes the factory and stores its future; every later call, concurrent
/// or not, gets a handle to that same future. The factory runs at most once per `Memo`, and the
/// stored outcome (success or failure) is never invalidated.
pub struct Memo<F, Fut: Future> {
    factory: F,
    slot: OnceLock<Shared<Fut>>,
}

/// Wrap `factory` in a [`Memo`].
pub fn memoize<F, Fut>(factory: F) -> Memo<F, Fut>
where
    F: Fn() -> Fut,
    Fut: Future,
    Fut::Output: Clone,
{
    Memo::new(factory)
}

impl<F, Fut> Memo<F, Fut>
where
    F: Fn() -> Fut,
    Fut: Future,
    Fut::Output: Clone,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            slot: OnceLock::new(),
        }
    }

    /// Handle to the one stored future, invoking the factory on first use.
    pub fn call(&self) -> Shared<Fut> {
        self.slot
            .get_or_init(|| {
                debug!(target: "taskkit_core::memo", "invoking memoized factory");
                (self.factory)().shared()
            })
            .clone()
    }

    /// Returns `true` once the factory has been invoked.
    pub fn is_started(&self) -> bool {
        self.slot.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::time::sleep;

    fn counting(
        calls: &Arc<AtomicUsize>,
        outcome: Result<&'static str, &'static str>,
    ) -> impl Fn() -> futures::future::BoxFuture<'static, Result<&'static str, &'static str>> + use<>
    {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                sleep(Duration::from_millis(20)).await;
                outcome
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_calls_invoke_factory_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let user = memoize(counting(&calls, Ok("ada")));

        let (a, b) = tokio::join!(user.call(), user.call());

        assert_eq!(a, Ok("ada"));
        assert_eq!(b, Ok("ada"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn later_calls_reuse_resolved_future() {
        let calls = Arc::new(AtomicUsize::new(0));
        let user = memoize(counting(&calls, Ok("ada")));

        assert!(!user.is_started());
        user.call().await.unwrap();
        assert!(user.is_started());

        let started = tokio::time::Instant::now();
        assert_eq!(user.call().await, Ok("ada"));
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_memoized_as_well() {
        let calls = Arc::new(AtomicUsize::new(0));
        let broken = memoize(counting(&calls, Err("offline")));

        assert_eq!(broken.call().await, Err("offline"));
        assert_eq!(broken.call().await, Err("offline"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handles_point_at_the_same_future() {
        let memo = memoize(|| async { 1u8 }.boxed());

        assert!(memo.call().ptr_eq(&memo.call()));
    }

    #[test]
    fn factory_is_lazy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let _user = memoize(counting(&calls, Ok("ada")));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
