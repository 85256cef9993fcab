//! `expect` and error reporting that go through `tracing` first.
//!
//! A panic message written to stderr is easy to lose when a subscriber is
//! shipping logs elsewhere, so every failure here is also emitted as an
//! `error!` event with the caller's location.

use core::fmt::{Debug, Display};

pub trait TraceErrResult<T, E: Debug + Display> {
    /// Like `Result::expect`, logging the message and error through `error!` first.
    #[track_caller]
    fn trace_expect(self, msg: &str) -> T;

    /// Logs the error, if any, through `error!` and hands the result back.
    #[track_caller]
    fn trace_err(self, msg: &str) -> Self;
}

impl<T, E: Debug + Display> TraceErrResult<T, E> for Result<T, E> {
    fn trace_expect(self, msg: &str) -> T {
        match self {
            Ok(v) => v,
            Err(ref e) => {
                tracing::error!(target: "expect", "{}: {msg}: {e}", core::panic::Location::caller());
                self.expect(msg)
            }
        }
    }

    fn trace_err(self, msg: &str) -> Self {
        if let Err(e) = &self {
            tracing::error!(target: "error", "{}: {msg}: {e}", core::panic::Location::caller());
        }
        self
    }
}

pub trait TraceErrOption<T> {
    /// Like `Option::expect`, logging the message through `error!` first.
    #[track_caller]
    fn trace_expect(self, msg: &str) -> T;
}

impl<T> TraceErrOption<T> for Option<T> {
    fn trace_expect(self, msg: &str) -> T {
        match self {
            Some(v) => v,
            None => {
                tracing::error!(target: "expect", "{}: {msg}", core::panic::Location::caller());
                self.expect(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_subscriber<R>(f: impl FnOnce() -> R) -> R {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    #[test]
    fn ok_and_some_pass_through() {
        with_subscriber(|| {
            assert_eq!(Ok::<_, std::fmt::Error>(3).trace_expect("unused"), 3);
            assert_eq!(Some("x").trace_expect("unused"), "x");
        });
    }

    #[test]
    fn trace_err_keeps_result() {
        with_subscriber(|| {
            let r: Result<u8, std::fmt::Error> = Err(std::fmt::Error);
            assert!(r.trace_err("formatting").is_err());
        });
    }

    #[test]
    #[should_panic(expected = "missing user")]
    fn none_panics_with_message() {
        with_subscriber(|| {
            let missing: Option<u64> = None;
            missing.trace_expect("missing user");
        });
    }

    #[test]
    #[should_panic(expected = "bad config")]
    fn err_panics_with_message() {
        with_subscriber(|| {
            let r: Result<(), std::fmt::Error> = Err(std::fmt::Error);
            r.trace_expect("bad config");
        });
    }
}
