//! Error-latching retry timer.
//!
//! # Responsibilities
//! - Track whether a failure streak is in progress and when it started
//! - Keep the most recent error of the streak for diagnostics
//! - Signal once the streak has lasted for the configured timeout
//!
//! # State Transitions
//! ```text
//! Inactive --record(Some(e))--> Active { since: now, error: e }
//! Active   --record(Some(e))--> Active { since: unchanged, error: e }
//! Active   --record(None)-----> Inactive
//! Inactive --record(None)-----> Inactive
//! ```
//!
//! # Design Decisions
//! - Expiry is an explicit deadline (`since + timeout`), not an OS timer object
//! - Repeated failures never move the deadline; one success clears it
//! - The streak start and its error live in one `Option`, so "active" and
//!   "has an error" cannot disagree

use std::time::Duration;
use tokio::time::{self, Instant};

#[derive(Debug)]
struct Streak<E> {
    since: Instant,
    error: E,
}

/// Latches the first failure of a streak and expires `timeout` after it.
#[derive(Debug)]
pub struct RetryTimer<E> {
    timeout: Duration,
    streak: Option<Streak<E>>,
}

impl<E> RetryTimer<E> {
    /// Create an inactive timer.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            streak: None,
        }
    }

    /// Record the outcome of one attempt.
    ///
    /// `Some(err)` starts the countdown if it is not already running and
    /// replaces the stored error. `None` stops the countdown and drops the
    /// stored error.
    pub fn record(&mut self, err: Option<E>) {
        match (err, self.streak.as_mut()) {
            (Some(error), Some(streak)) => streak.error = error,
            (Some(error), None) => {
                self.streak = Some(Streak {
                    since: Instant::now(),
                    error,
                });
            }
            (None, _) => self.streak = None,
        }
    }

    /// Shorthand for `record(Some(err))`.
    pub fn fail(&mut self, err: E) {
        self.record(Some(err));
    }

    /// Shorthand for `record(None)`.
    pub fn clear(&mut self) {
        self.record(None);
    }

    /// Whether a failure streak is currently running.
    pub fn is_active(&self) -> bool {
        self.streak.is_some()
    }

    /// Instant at which the current streak exhausts the grace period.
    ///
    /// `None` while inactive, or if the deadline is not representable.
    pub fn deadline(&self) -> Option<Instant> {
        self.streak
            .as_ref()
            .and_then(|streak| streak.since.checked_add(self.timeout))
    }

    /// How long the current streak has been running.
    pub fn streak_age(&self) -> Option<Duration> {
        self.streak.as_ref().map(|streak| streak.since.elapsed())
    }

    /// Whether the deadline has already been reached.
    pub fn is_expired(&self) -> bool {
        self.deadline()
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Most recently recorded error of the current streak.
    pub fn last_error(&self) -> Option<&E> {
        self.streak.as_ref().map(|streak| &streak.error)
    }

    /// Resolve once the current streak reaches its deadline.
    ///
    /// Pends forever while inactive, so it can sit in a `select!` next to
    /// other wake-ups. On expiry the streak is consumed: the timer goes back
    /// to inactive and the last recorded error is handed to the caller.
    /// Dropping the future before it resolves leaves the timer untouched.
    pub async fn expired(&mut self) -> E {
        let Some(deadline) = self.deadline() else {
            return std::future::pending().await;
        };
        time::sleep_until(deadline).await;
        match self.streak.take() {
            Some(streak) => streak.error,
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timer_is_inactive() {
        let timer = RetryTimer::<&str>::new(Duration::from_secs(1));
        assert!(!timer.is_active());
        assert!(timer.deadline().is_none());
        assert!(timer.last_error().is_none());
        assert!(!timer.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_failures_keep_first_deadline() {
        let start = Instant::now();
        let mut timer = RetryTimer::new(Duration::from_secs(1));

        timer.fail("first");
        time::advance(Duration::from_millis(600)).await;
        timer.fail("second");

        assert_eq!(timer.deadline(), Some(start + Duration::from_secs(1)));
        assert_eq!(timer.last_error(), Some(&"second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_clears_streak() {
        let mut timer = RetryTimer::new(Duration::from_secs(1));

        timer.fail("boom");
        assert!(timer.is_active());
        timer.clear();
        assert!(!timer.is_active());
        assert!(timer.last_error().is_none());

        // Clearing an inactive timer is a no-op.
        timer.record(None);
        assert!(!timer.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_streak_after_success_restarts_countdown() {
        let start = Instant::now();
        let mut timer = RetryTimer::new(Duration::from_secs(1));

        timer.fail("a");
        time::advance(Duration::from_millis(900)).await;
        timer.clear();
        time::advance(Duration::from_millis(100)).await;
        timer.fail("b");

        assert_eq!(timer.deadline(), Some(start + Duration::from_secs(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_fires_at_first_failure_plus_timeout() {
        let start = Instant::now();
        let mut timer = RetryTimer::new(Duration::from_secs(1));

        timer.fail("a");
        time::advance(Duration::from_millis(500)).await;
        timer.fail("b");

        let err = timer.expired().await;
        assert_eq!(err, "b");
        assert_eq!(Instant::now() - start, Duration::from_secs(1));
        assert!(!timer.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_inactive_timer_never_expires() {
        let mut timer = RetryTimer::<&str>::new(Duration::from_millis(10));
        let res = time::timeout(Duration::from_secs(60), timer.expired()).await;
        assert!(res.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_expiry_wait_keeps_streak() {
        let mut timer = RetryTimer::new(Duration::from_secs(10));
        timer.fail("pending");

        let res = time::timeout(Duration::from_secs(1), timer.expired()).await;
        assert!(res.is_err());
        assert!(timer.is_active());
        assert_eq!(timer.last_error(), Some(&"pending"));
    }
}
