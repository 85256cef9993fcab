//! Time utilities for runtime-agnostic async operations.
//!
//! Deadlines are wall-clock `time::OffsetDateTime` values, as everywhere else
//! in Strand; the runtime timer only ever sees the remaining relative
//! duration, computed at the moment the sleep starts.
//!
//! # Example
//!
//! ```no_run
//! use strand_async::time::sleep;
//! use time::Duration;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! // Sleep for 5 seconds
//! sleep(Duration::seconds(5)).await;
//!
//! // Negative durations return immediately
//! sleep(Duration::seconds(-1)).await;  // No-op
//! # });
//! ```

/// Sleeps for the specified duration.
///
/// # Behavior
///
/// - Positive durations: sleeps for the specified time
/// - Zero or negative durations: returns immediately without sleeping
/// - Durations exceeding `std::time::Duration::MAX`: sleeps for `MAX`
#[cfg(feature = "tokio")]
pub async fn sleep(duration: time::Duration) {
    if !duration.is_positive() {
        return;
    }

    let std_duration: std::time::Duration = duration.try_into().unwrap_or(std::time::Duration::MAX);

    tokio::time::sleep(std_duration).await;
}

/// Returns the time remaining until `deadline`.
///
/// The result is negative once the deadline has passed.
#[cfg(feature = "std")]
pub fn until(deadline: time::OffsetDateTime) -> time::Duration {
    deadline - time::OffsetDateTime::now_utc()
}

/// Sleeps until the wall clock reaches `deadline`.
///
/// Returns immediately if the deadline has already passed.
#[cfg(feature = "tokio")]
pub async fn sleep_until(deadline: time::OffsetDateTime) {
    sleep(until(deadline)).await
}

/// Yields execution back to the runtime scheduler once.
#[cfg(feature = "tokio")]
pub async fn yield_now() {
    tokio::task::yield_now().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn negative_sleep_is_immediate() {
        let started = std::time::Instant::now();
        sleep(time::Duration::seconds(-5)).await;
        sleep(time::Duration::ZERO).await;
        assert!(started.elapsed() < std::time::Duration::from_millis(50));
    }

    #[tokio::test]
    async fn sleep_until_reaches_deadline() {
        let deadline = time::OffsetDateTime::now_utc() + time::Duration::milliseconds(30);
        sleep_until(deadline).await;
        assert!(!until(deadline).is_positive());
    }

    #[test]
    fn until_past_deadline_is_negative() {
        let deadline = time::OffsetDateTime::now_utc() - time::Duration::seconds(1);
        assert!(until(deadline).is_negative());
    }
}
