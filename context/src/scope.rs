//! The cancellation tree behind [`Context`](crate::Context).
//!
//! Each cancellable context owns one [`Scope`]. A scope holds a strong
//! reference to its parent scope and is listed in the parent's registry by
//! `Weak` reference only, so firing flows downward without any edge keeping
//! a child alive.
//!
//! Firing is a two-step affair: the reason is recorded and the registry taken
//! under the spinlock, then the done-signal is raised and the children are
//! fired with the same reason after the lock is released.

use super::*;
use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use strand_async::sync::spin::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Default)]
struct State {
    reason: Option<Error>,
    children: HashMap<u64, Weak<Scope>>,
}

pub(crate) struct Scope {
    id: u64,
    parent: Option<Arc<Scope>>,
    deadline: Option<time::OffsetDateTime>,

    // Raised once, after `state.reason` has been recorded. Never linked to
    // other tokens: propagation goes through `State::children` instead.
    signal: CancellationToken,
    state: Mutex<State>,
}

impl Scope {
    /// Creates a scope below `parent`, inheriting its reason if the parent has
    /// already fired.
    pub(crate) fn derive(
        parent: Option<&Arc<Scope>>,
        deadline: Option<time::OffsetDateTime>,
    ) -> Arc<Self> {
        let scope = Arc::new(Self {
            id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
            parent: parent.cloned(),
            deadline,
            signal: CancellationToken::new(),
            state: Mutex::new(State::default()),
        });

        if let Some(parent) = parent {
            let inherited = {
                let mut state = parent.state.lock();
                if state.reason.is_none() {
                    state.children.insert(scope.id, Arc::downgrade(&scope));
                }
                state.reason
            };

            match inherited {
                Some(reason) => {
                    scope.fire(reason);
                }
                None => trace!(scope = scope.id, parent = parent.id, "Registered child scope"),
            }
        }
        scope
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn reason(&self) -> Option<Error> {
        self.state.lock().reason
    }

    pub(crate) fn signal(&self) -> &CancellationToken {
        &self.signal
    }

    /// The earliest deadline on the path from this scope to the root.
    ///
    /// A scope only carries its own deadline when it is earlier than every
    /// ancestor's, so the nearest one found is the earliest.
    pub(crate) fn deadline(&self) -> Option<time::OffsetDateTime> {
        let mut scope = Some(self);
        while let Some(s) = scope {
            if s.deadline.is_some() {
                return s.deadline;
            }
            scope = s.parent.as_deref();
        }
        None
    }

    /// Fires this scope and every live descendant with `reason`.
    ///
    /// Returns `false` if the scope had already fired, in which case nothing
    /// changes.
    pub(crate) fn fire(&self, reason: Error) -> bool {
        let Some(mut pending) = self.fire_one(reason) else {
            return false;
        };

        // Worklist rather than recursion: trees may be arbitrarily deep
        while let Some(scope) = pending.pop() {
            if let Some(children) = scope.fire_one(reason) {
                pending.extend(children);
            }
        }
        true
    }

    /// Fires this scope alone, returning its live children.
    fn fire_one(&self, reason: Error) -> Option<Vec<Arc<Scope>>> {
        let children = {
            let mut state = self.state.lock();
            if state.reason.is_some() {
                return None;
            }
            state.reason = Some(reason);
            core::mem::take(&mut state.children)
        };

        debug!(scope = self.id, %reason, children = children.len(), "Context fired");
        self.signal.cancel();

        Some(children.into_values().filter_map(|c| c.upgrade()).collect())
    }

    /// Fires this scope as its owner, then leaves the parent's registry.
    pub(crate) fn cancel(&self, reason: Error) -> bool {
        let fired = self.fire(reason);
        self.detach();
        fired
    }

    fn detach(&self) {
        if let Some(parent) = &self.parent {
            parent.state.lock().children.remove(&self.id);
        }
    }

    #[cfg(test)]
    fn child_count(&self) -> usize {
        self.state.lock().children.len()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.detach();

        // Release the ancestors this scope was the last holder of in a loop,
        // so dropping a deep chain cannot exhaust the stack.
        let mut parent = self.parent.take();
        while let Some(scope) = parent {
            match Arc::into_inner(scope) {
                Some(mut scope) => {
                    scope.detach();
                    parent = scope.parent.take();
                }
                None => break,
            }
        }
    }
}
