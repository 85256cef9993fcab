//! Task handles and detached spawning.
//!
//! Currently wraps `tokio::task::JoinHandle` and `tokio::spawn`. Deadline
//! timers are the main user: they are fire-and-forget tasks that must not be
//! tied to any particular pool.

/// A handle to a spawned task that can be awaited for its result.
///
/// Dropping the handle detaches the task; it keeps running to completion.
#[cfg(feature = "tokio")]
pub type JoinHandle<T> = tokio::task::JoinHandle<T>;

/// Spawns a detached task on the current runtime.
///
/// # Panics
///
/// Panics if called from outside a running Tokio runtime.
///
/// # Example
///
/// ```no_run
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let handle = strand_async::spawn(async { 6 * 7 });
/// assert_eq!(handle.await.unwrap(), 42);
/// # });
/// ```
#[cfg(feature = "tokio")]
pub fn spawn<F>(task: F) -> JoinHandle<F::Output>
where
    F: core::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawn_returns_output() {
        let handle = spawn(async { "done" });
        assert_eq!(handle.await.unwrap(), "done");
    }

    #[tokio::test]
    async fn dropped_handle_detaches() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        drop(spawn(async move {
            tokio::task::yield_now().await;
            _ = tx.send(1u8);
        }));
        assert_eq!(rx.await.unwrap(), 1);
    }
}
