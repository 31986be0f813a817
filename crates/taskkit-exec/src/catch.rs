use std::future::Future;

use taskkit_model::Outcome;

/// Await `fut` and convert its result into an [`Outcome`].
///
/// Never fails itself; a task error ends up in [`Outcome::error`].
pub async fn try_catch<Fut, T, E>(fut: Fut) -> Outcome<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    fut.await.into()
}

/// Invoke `call` exactly once and convert its result into an [`Outcome`].
///
/// Arguments are passed by capturing them in the closure.
pub async fn try_catch_with<F, Fut, T, E>(call: F) -> Outcome<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    try_catch(call()).await
}
