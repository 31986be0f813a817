use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

/// Resolve with `value` once `duration` has elapsed.
pub async fn delay<T>(duration: Duration, value: T) -> T {
    sleep(duration).await;
    value
}

/// Invoke `thunk` now and resolve with its return value once `duration` has elapsed.
///
/// The thunk runs at schedule time, not at resolution time.
pub fn delay_with<T, F>(duration: Duration, thunk: F) -> impl Future<Output = T>
where
    F: FnOnce() -> T,
{
    let value = thunk();
    delay(duration, value)
}
