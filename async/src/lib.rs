//! Runtime-agnostic async primitives for the Strand context crates.
//!
//! Everything here wraps a runtime-specific primitive behind a small, stable
//! surface, so that `strand-context` never names Tokio directly outside of
//! its tests. Tokio is the only runtime currently supported.
//!
//! # Features
//!
//! - **sync::spin::Mutex**: spinlock for the O(1) critical sections on the
//!   cancellation hot path
//! - **time**: wall-clock deadline helpers and a sleep that tolerates
//!   negative durations
//! - **spawn**: detached task spawning, returning a [`JoinHandle`]
//!
//! # Example
//!
//! ```no_run
//! use strand_async::time::{sleep_until, until};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let deadline = time::OffsetDateTime::now_utc() + time::Duration::milliseconds(50);
//! let handle = strand_async::spawn(async move {
//!     sleep_until(deadline).await;
//!     until(deadline)
//! });
//! assert!(!handle.await.unwrap().is_positive());
//! # });
//! ```

pub mod join_handle;
pub mod sync;
pub mod time;

#[cfg(feature = "tokio")]
pub use join_handle::{JoinHandle, spawn};
