use thiserror::Error;

/// The reason a [`Context`](crate::Context) fired.
///
/// Recorded exactly once per cancellation scope and never changed afterwards.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    /// Returns `true` if the context fired because its deadline passed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::DeadlineExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_reason() {
        assert_eq!(Error::Cancelled.to_string(), "context canceled");
        assert_eq!(
            Error::DeadlineExceeded.to_string(),
            "context deadline exceeded"
        );
    }

    #[test]
    fn only_deadline_is_timeout() {
        assert!(Error::DeadlineExceeded.is_timeout());
        assert!(!Error::Cancelled.is_timeout());
    }
}
