//! Deadline race for blocking work
//!
//! [`race_deadline`] runs a closure on the blocking pool and waits for
//! whichever comes first: its result or the deadline. The result travels
//! through a `oneshot` channel, whose single slot makes the send
//! non-blocking, so a task that loses the race finishes on its own and its
//! late result is dropped with the receiver.

use crate::ExtractError;
use tokio::sync::oneshot;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

/// Runs `work` on a detached blocking task, giving up at `deadline`
///
/// # Returns
///
/// * `Ok(T)` - `work` finished before the deadline
/// * `Err(ExtractError::DeadlineExceeded)` - the deadline passed first
/// * `Err(ExtractError::TaskAborted)` - `work` panicked or was never run
pub async fn race_deadline<T, F>(deadline: Instant, work: F) -> Result<T, ExtractError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    // the handle is dropped: the task is never awaited or cancelled
    tokio::task::spawn_blocking(move || {
        let result = work();
        if tx.send(result).is_err() {
            debug!("extraction finished after its deadline, result dropped");
        }
    });

    match timeout_at(deadline, rx).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => Err(ExtractError::TaskAborted),
        Err(_) => Err(ExtractError::DeadlineExceeded),
    }
}
