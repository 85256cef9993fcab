//! Hierarchical cancellation contexts with deadlines and typed values.
//!
//! A [`Context`] is a handle that work can observe to learn when it should
//! stop, and why. Contexts form a tree: deriving a child with
//! [`with_cancel`](Context::with_cancel), [`with_deadline`](Context::with_deadline)
//! or [`with_timeout`](Context::with_timeout) yields a context that fires
//! when its own [`Canceller`] is invoked, when its deadline passes, or when
//! any ancestor fires. Firing is permanent and records one [`Error`].
//!
//! Request-scoped values ride along the same tree via
//! [`with_value`](Context::with_value), keyed by [`Key`] types so lookups are
//! type-checked.
//!
//! # Features
//!
//! - **Context**: the cancellation and value handle
//! - **Worker**: a cooperative loop that stops when its context fires
//! - **TaskPool**: tasks sharing one context, with graceful shutdown
//!
//! # Example
//!
//! ```no_run
//! use strand_context::{Context, Error};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let (ctx, cancel) = Context::background().with_cancel();
//!
//! let waiter = tokio::spawn({
//!     let ctx = ctx.clone();
//!     async move { ctx.cancelled().await }
//! });
//!
//! cancel.cancel();
//! assert_eq!(waiter.await.unwrap(), Error::Cancelled);
//! # });
//! ```

mod context;
mod error;
mod scope;
mod value;

pub mod pool;
pub mod worker;

pub use context::{CancelGuard, Canceller, Context};
pub use error::Error;
pub use pool::TaskPool;
pub use strand_async::JoinHandle;
pub use value::Key;
pub use worker::{Report, Worker};
