//! A cooperative loop that repeats one unit of work until its context fires.
//!
//! The worker never interrupts a step in progress: it checks the context
//! before each step and reports why it stopped, leaving the caller to decide
//! what to do with the reason.
//!
//! ```no_run
//! use strand_context::{Context, Error, Worker};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let (ctx, cancel) = Context::background().with_cancel();
//! let handle = tokio::spawn(async move {
//!     Worker::new(|step| println!("downloading... ({step})"))
//!         .with_interval(time::Duration::milliseconds(100))
//!         .run(&ctx)
//!         .await
//! });
//!
//! tokio::time::sleep(std::time::Duration::from_millis(350)).await;
//! cancel.cancel();
//!
//! let report = handle.await.unwrap();
//! assert_eq!(report.reason, Error::Cancelled);
//! # });
//! ```

use super::*;
use tracing::{debug, trace};

/// How a [`Worker`] run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// Number of steps performed before the context was seen to fire.
    pub steps: u64,
    /// Why the context fired.
    pub reason: Error,
}

impl core::fmt::Display for Report {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "stopped after {} steps: {}", self.steps, self.reason)
    }
}

pub struct Worker<S> {
    step: S,
    interval: time::Duration,
}

impl<S: FnMut(u64)> Worker<S> {
    pub const DEFAULT_INTERVAL: time::Duration = time::Duration::SECOND;

    /// Creates a worker that calls `step` with the zero-based step index.
    pub fn new(step: S) -> Self {
        Self {
            step,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    /// Sets the pause between steps.
    ///
    /// A zero or negative interval still yields to the runtime between steps.
    pub fn with_interval(mut self, interval: time::Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs steps until `ctx` fires, then reports the reason.
    ///
    /// The pause after each step ends early when the context fires, but a
    /// step that has started always runs to completion.
    pub async fn run(mut self, ctx: &Context) -> Report {
        let mut steps = 0;
        loop {
            if let Some(reason) = ctx.err() {
                debug!(steps, %reason, "Worker stopped");
                return Report { steps, reason };
            }

            trace!(step = steps, "Worker step");
            (self.step)(steps);
            steps += 1;

            if self.interval.is_positive() {
                tokio::select! {
                    _ = ctx.done() => {}
                    _ = strand_async::time::sleep(self.interval) => {}
                }
            } else {
                strand_async::time::yield_now().await;
            }
        }
    }
}

impl<S> core::fmt::Debug for Worker<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Worker")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
