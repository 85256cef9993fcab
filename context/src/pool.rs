//! A group of tasks sharing one cancellable context.
//!
//! [`TaskPool`] derives its own scope from a parent [`Context`], hands that
//! context to the tasks it spawns, and shuts down in three phases:
//! 1. **Signal**: cancel the pool's context
//! 2. **Close**: refuse further tracking of new tasks
//! 3. **Wait**: block until every spawned task has returned
//!
//! Cancelling the parent context signals the pool's tasks too, but only
//! [`shutdown()`](TaskPool::shutdown) waits for them.
//!
//! # Example
//!
//! ```no_run
//! use strand_context::{Context, TaskPool, Worker};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let pool = TaskPool::new(&Context::background());
//! let ctx = pool.context().clone();
//! let report = pool.spawn(async move { Worker::new(|_| {}).run(&ctx).await });
//!
//! pool.shutdown().await;
//! println!("{}", report.await.unwrap());
//! # });
//! ```

use super::*;

/// Spawns a task on a [`TaskPool`] with optional tracing instrumentation.
///
/// When the calling crate enables its `instrument` feature, the task runs in
/// a `trace_span` that follows from the current span.
///
/// # Syntax
///
/// ```text
/// // Simple case (no fields):
/// strand_context::spawn!(pool, "task_name", async { ... })
///
/// // Complex case (with span fields - use parentheses):
/// strand_context::spawn!(pool, "task_name", (?field1, field2 = value), async { ... })
/// ```
#[macro_export]
macro_rules! spawn {
    ($pool:expr, $name:literal, async $($rest:tt)*) => {{
        #[cfg(feature = "instrument")]
        {
            let task = async $($rest)*;
            let span = tracing::trace_span!(parent: None, $name);
            span.follows_from(tracing::Span::current());
            $pool.spawn(tracing::Instrument::instrument(task, span))
        }
        #[cfg(not(feature = "instrument"))]
        {
            $pool.spawn(async $($rest)*)
        }
    }};

    ($pool:expr, $name:literal, ($($field:tt)*), async $($rest:tt)*) => {{
        #[cfg(feature = "instrument")]
        {
            let task = async $($rest)*;
            let span = tracing::trace_span!(parent: None, $name, $($field)*);
            span.follows_from(tracing::Span::current());
            $pool.spawn(tracing::Instrument::instrument(task, span))
        }
        #[cfg(not(feature = "instrument"))]
        {
            $pool.spawn(async $($rest)*)
        }
    }};
}

/// Manages a group of tasks observing one context, with graceful shutdown.
pub struct TaskPool {
    context: Context,
    canceller: Canceller,
    task_tracker: tokio_util::task::TaskTracker,
}

impl TaskPool {
    /// Creates a pool whose context is a cancellable child of `parent`.
    pub fn new(parent: &Context) -> Self {
        let (context, canceller) = parent.with_cancel();
        Self {
            context,
            canceller,
            task_tracker: tokio_util::task::TaskTracker::new(),
        }
    }

    /// The context every task in this pool should observe.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Derives a child context that can be cancelled without stopping the
    /// rest of the pool, but still fires when the pool shuts down.
    pub fn child(&self) -> (Context, Canceller) {
        self.context.with_cancel()
    }

    /// Spawns a task tracked by this pool.
    ///
    /// Tasks spawned after [`shutdown()`](TaskPool::shutdown) still run, but
    /// are not waited for; they observe an already-fired context.
    pub fn spawn<F>(&self, task: F) -> strand_async::JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.task_tracker.spawn(task)
    }

    /// Cancels the pool's context and waits for all tracked tasks to finish.
    pub async fn shutdown(&self) {
        self.canceller.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;
    }

    /// Returns `true` once the pool's context has fired, whether through
    /// [`shutdown()`](TaskPool::shutdown) or through its parent.
    pub fn is_cancelled(&self) -> bool {
        self.context.is_done()
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::new(&Context::background())
    }
}
