use super::*;
use crate::scope::Scope;
use crate::value::Binding;
use std::sync::Arc;
use tracing::{debug, trace};

/// A handle to a cancellation scope and a chain of request-scoped values.
///
/// Contexts are cheap to clone and are passed by reference (or clone) to
/// whatever work should observe them. They are never destroyed explicitly:
/// a context lives until the last clone of it, or of anything derived from
/// it, is dropped.
///
/// # Example
///
/// ```no_run
/// use strand_context::{Context, Error};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let (ctx, cancel) = Context::background().with_timeout(time::Duration::seconds(10));
/// let _guard = cancel.drop_guard();
///
/// tokio::spawn({
///     let ctx = ctx.clone();
///     async move {
///         while !ctx.is_done() {
///             // Do work
///             tokio::task::yield_now().await;
///         }
///     }
/// });
///
/// assert_eq!(ctx.cancelled().await, Error::DeadlineExceeded);
/// # });
/// ```
#[derive(Clone, Default)]
pub struct Context {
    scope: Option<Arc<Scope>>,
    values: Option<Arc<Binding>>,
}

impl Context {
    /// The root context: never fires, has no deadline and carries no values.
    pub fn background() -> Self {
        Self::default()
    }

    fn derive(&self, deadline: Option<time::OffsetDateTime>) -> (Self, Arc<Scope>) {
        let scope = Scope::derive(self.scope.as_ref(), deadline);
        (
            Self {
                scope: Some(scope.clone()),
                values: self.values.clone(),
            },
            scope,
        )
    }

    /// Derives a child that fires when the returned [`Canceller`] is invoked
    /// or when `self` fires, whichever happens first.
    pub fn with_cancel(&self) -> (Self, Canceller) {
        let (ctx, scope) = self.derive(None);
        (ctx, Canceller { scope })
    }

    /// Derives a child that additionally fires with
    /// [`Error::DeadlineExceeded`] once the wall clock reaches `deadline`.
    ///
    /// The returned [`Canceller`] must be invoked on every exit path, even
    /// after the deadline has passed: until the context fires, a timer task
    /// holds it alive. [`Canceller::drop_guard`] is the easy way to do that.
    ///
    /// If an ancestor already has an earlier deadline no timer is started;
    /// the child will fire through that ancestor instead.
    ///
    /// # Panics
    ///
    /// Panics if a timer is needed and there is no running Tokio runtime.
    pub fn with_deadline(&self, deadline: time::OffsetDateTime) -> (Self, Canceller) {
        if self.deadline().is_some_and(|current| current <= deadline) {
            return self.with_cancel();
        }

        let (ctx, scope) = self.derive(Some(deadline));
        if scope.reason().is_none() {
            let remaining = strand_async::time::until(deadline);
            if remaining.is_positive() {
                spawn_timer(scope.clone(), remaining);
            } else {
                scope.cancel(Error::DeadlineExceeded);
            }
        }
        (ctx, Canceller { scope })
    }

    /// Shorthand for [`with_deadline`](Context::with_deadline) at `now + timeout`.
    ///
    /// A timeout too large to represent as a date can never expire, so the
    /// child is then only cancellable.
    pub fn with_timeout(&self, timeout: time::Duration) -> (Self, Canceller) {
        match time::OffsetDateTime::now_utc().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => {
                debug!(%timeout, "Timeout beyond representable time, no deadline set");
                self.with_cancel()
            }
        }
    }

    /// Derives a child carrying `value` under the key `K`.
    ///
    /// The child shares `self`'s cancellation; only the value chain grows.
    /// Binding a key that an ancestor already binds shadows it for the child
    /// and its descendants without touching the ancestor.
    pub fn with_value<K: Key>(&self, value: K::Value) -> Self {
        trace!(key = K::NAME, "Binding context value");
        Self {
            scope: self.scope.clone(),
            values: Some(Binding::new::<K>(value, self.values.clone())),
        }
    }

    /// Completes once this context has fired.
    ///
    /// The future owns what it needs, so it can be moved into other tasks.
    /// Any number of waiters may wait concurrently; waiting after the context
    /// fired completes immediately, and dropping the future is always safe.
    /// For [`background`](Context::background) it never completes.
    pub fn done(&self) -> impl Future<Output = ()> + Send + use<> {
        let signal = self.scope.as_ref().map(|s| s.signal().clone());
        async move {
            match signal {
                Some(signal) => signal.cancelled_owned().await,
                None => core::future::pending().await,
            }
        }
    }

    /// Waits until this context fires and returns the reason.
    pub async fn cancelled(&self) -> Error {
        self.done().await;
        // The reason is recorded before the done-signal is raised.
        let reason = self.err();
        debug_assert!(reason.is_some(), "done-signal raised without a reason");
        reason.unwrap_or(Error::Cancelled)
    }

    /// `None` while pending, the firing reason afterwards.
    pub fn err(&self) -> Option<Error> {
        self.scope.as_ref().and_then(|s| s.reason())
    }

    /// Returns `true` once this context has fired.
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// The earliest deadline of this context or any ancestor.
    pub fn deadline(&self) -> Option<time::OffsetDateTime> {
        self.scope.as_ref().and_then(|s| s.deadline())
    }

    /// Looks up the value bound under `K` here or in the nearest ancestor.
    pub fn value<K: Key>(&self) -> Option<&K::Value> {
        Binding::lookup::<K>(self.values.as_deref())
    }

    /// Runs `fut` to completion unless this context fires first.
    pub async fn run_until_done<F>(&self, fut: F) -> Result<F::Output, Error>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            reason = self.cancelled() => Err(reason),
            output = fut => Ok(output),
        }
    }
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("scope", &self.scope.as_ref().map(|s| s.id()))
            .field("err", &self.err())
            .field("deadline", &self.deadline())
            .field("values", &Binding::names(self.values.as_deref()))
            .finish()
    }
}

fn spawn_timer(scope: Arc<Scope>, remaining: time::Duration) {
    // Detached: the handle is not needed, the task ends when the scope fires.
    drop(strand_async::spawn(async move {
        tokio::select! {
            _ = strand_async::time::sleep(remaining) => {
                if scope.cancel(Error::DeadlineExceeded) {
                    debug!(scope = scope.id(), "Context deadline exceeded");
                }
            }
            _ = scope.signal().cancelled() => {
                trace!(scope = scope.id(), "Deadline timer released");
            }
        }
    }));
}

/// Fires the context it was returned with.
///
/// Cancelling is idempotent and may be done concurrently from any number of
/// clones; only the first call records [`Error::Cancelled`], and only if the
/// context had not already fired for another reason.
#[derive(Clone)]
pub struct Canceller {
    scope: Arc<Scope>,
}

impl Canceller {
    pub fn cancel(&self) {
        self.scope.cancel(Error::Cancelled);
    }

    /// Returns `true` once the paired context has fired, for any reason.
    pub fn is_cancelled(&self) -> bool {
        self.scope.reason().is_some()
    }

    /// Wraps this canceller in a guard that cancels when dropped.
    pub fn drop_guard(self) -> CancelGuard {
        CancelGuard {
            canceller: self,
            armed: true,
        }
    }
}

impl core::fmt::Debug for Canceller {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Canceller")
            .field("scope", &self.scope.id())
            .finish()
    }
}

/// Cancels its context when dropped, unless [`disarm`](CancelGuard::disarm)ed.
#[derive(Debug)]
pub struct CancelGuard {
    canceller: Canceller,
    armed: bool,
}

impl CancelGuard {
    /// Gives the canceller back without cancelling.
    pub fn disarm(mut self) -> Canceller {
        self.armed = false;
        self.canceller.clone()
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.armed {
            self.canceller.cancel();
        }
    }
}
