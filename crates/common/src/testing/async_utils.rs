//! Async test helpers
//!
//! Fire-and-forget tasks (profile loading, background refresh) finish at
//! some point after the call that spawned them; these helpers wait for the
//! effect instead of sleeping a fixed amount.

use std::future::Future;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Poll `condition` until it holds or `timeout` elapses. Returns whether it
/// held.
pub async fn eventually<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Await `fut`, giving up after `duration`.
///
/// # Errors
/// Returns the elapsed error when the future did not finish in time.
pub async fn within<F, T>(duration: Duration, fut: F) -> Result<T, tokio::time::error::Elapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, fut).await
}
