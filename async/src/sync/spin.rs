//! Spinlock-based synchronization for O(1) critical sections.
//!
//! The cancellation scopes in `strand-context` guard their fired state with
//! these locks. Every critical section there is a constant amount of work:
//! record a reason, insert or remove one registry entry, or take the whole
//! registry by `mem::take`. Waking waiters and walking children always happen
//! after the guard is dropped.
//!
//! # When NOT to use these primitives
//!
//! - O(n) iteration while holding lock (use `std::sync::Mutex` instead)
//! - Waking tasks, I/O, or any syscalls while holding lock
//! - Holding lock across await points
//! - Nested acquisition of the same lock
//!
//! # Example
//!
//! ```
//! use strand_async::sync::spin::Mutex;
//!
//! let fired: Mutex<Option<&'static str>> = Mutex::new(None);
//! fired.lock().get_or_insert("cancelled");
//! assert_eq!(*fired.lock(), Some("cancelled"));
//! ```

pub use spin::MutexGuard;

/// A spinlock-based mutex for O(1) operations.
///
/// A thin wrapper around `spin::Mutex`, kept so that callers depend on this
/// crate's API rather than on the spinlock implementation.
#[derive(Debug, Default)]
pub struct Mutex<T>(spin::Mutex<T>);

impl<T> Mutex<T> {
    /// Creates a new Mutex containing the given value.
    #[inline]
    pub const fn new(value: T) -> Self {
        Self(spin::Mutex::new(value))
    }

    /// Acquires the lock, spinning until it becomes available.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock()
    }

    /// Attempts to acquire the lock without spinning.
    #[inline]
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        self.0.try_lock()
    }

    /// Consumes the mutex and returns the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0.into_inner()
    }
}
