//! Bounded-retry polling.
//!
//! # Responsibilities
//! - Invoke a caller-supplied probe on a fixed cadence
//! - Absorb transient probe failures for up to a grace period
//! - Stop on the first terminal outcome: ready, failed, timed out, cancelled
//!
//! # State Machine
//! ```text
//! Polling --probe Ready-------------------------> Succeeded
//! Polling --probe Failed(reason)----------------> TerminalFailure
//! Polling --errors persist for grace_timeout----> TimedOut
//! Polling --cancel token fires------------------> Canceled
//! Polling --probe Pending-----------------------> Polling (latch cleared)
//! Polling --probe Err (transient)---------------> Polling (latch set)
//! ```
//!
//! # Design Decisions
//! - The first probe runs immediately; later ones on `interval` ticks
//! - Probes never overlap: probe N+1 is only issued after probe N returned
//! - Each probe gets a child of the caller's token and is raced against
//!   cancellation and grace expiry, so a hung probe cannot outlive the poll
//! - Any successful probe clears the error latch, including `Pending`
//! - Transient errors never escape; only the terminal outcomes do

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::resilience::timer::RetryTimer;

/// Smallest tick period accepted by the poller.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Per-call polling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// How long transient probe failures may persist before giving up.
    pub grace_timeout: Duration,

    /// Period between probe attempts.
    pub interval: Duration,
}

impl PollConfig {
    pub fn new(grace_timeout: Duration, interval: Duration) -> Self {
        Self {
            grace_timeout,
            interval,
        }
    }

    fn tick_period(&self) -> Duration {
        self.interval.max(MIN_INTERVAL)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            grace_timeout: Duration::from_secs(240),
            interval: Duration::from_secs(10),
        }
    }
}

/// Successful answer from a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus<T> {
    /// The awaited condition holds.
    Ready(T),
    /// Not there yet; keep polling.
    Pending,
    /// The target authoritatively reported failure. Never retried.
    Failed(String),
}

/// Status reported by a probe of a long-running operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalStatus {
    InProgress,
    Success,
    Failure(String),
}

impl From<TerminalStatus> for ProbeStatus<()> {
    fn from(status: TerminalStatus) -> Self {
        match status {
            TerminalStatus::InProgress => ProbeStatus::Pending,
            TerminalStatus::Success => ProbeStatus::Ready(()),
            TerminalStatus::Failure(reason) => ProbeStatus::Failed(reason),
        }
    }
}

/// Terminal outcome of a poll that did not succeed.
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// Probe errors persisted for the whole grace period.
    #[error("timed out after {grace:?} of continuous failures ({attempts} attempts): {source}")]
    Timeout {
        grace: Duration,
        attempts: u32,
        #[source]
        source: E,
    },

    /// The target reported failure.
    #[error("{reason}")]
    Failed { reason: String, attempts: u32 },

    /// The caller's cancel token fired.
    #[error("polling cancelled")]
    Canceled,
}

impl<E> PollError<E> {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            PollError::Timeout { .. } => "poll_timeout",
            PollError::Failed { .. } => "poll_failed",
            PollError::Canceled => "poll_canceled",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PollError::Timeout { .. })
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, PollError::Canceled)
    }

    /// Number of probes issued before the outcome, if known.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            PollError::Timeout { attempts, .. } | PollError::Failed { attempts, .. } => {
                Some(*attempts)
            }
            PollError::Canceled => None,
        }
    }
}

/// Poll `probe` until it reports [`ProbeStatus::Ready`].
///
/// Returns the ready value, [`PollError::Failed`] as soon as the probe
/// reports failure, [`PollError::Timeout`] once probe errors have persisted
/// for `config.grace_timeout`, or [`PollError::Canceled`] when `cancel`
/// fires. Cancellation wins over every other outcome that becomes ready at
/// the same time.
pub async fn poll<T, E, F, Fut>(
    config: &PollConfig,
    cancel: &CancellationToken,
    mut probe: F,
) -> Result<T, PollError<E>>
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<ProbeStatus<T>, E>>,
    E: fmt::Display,
{
    let mut timer = RetryTimer::new(config.grace_timeout);
    let mut ticker = time::interval(config.tick_period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Canceled),
            source = timer.expired() => return Err(timed_out(config, attempt, source)),
            _ = ticker.tick() => {}
        }

        attempt = attempt.saturating_add(1);
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Canceled),
            source = timer.expired() => return Err(timed_out(config, attempt, source)),
            res = probe(cancel.child_token()) => res,
        };

        match outcome {
            Ok(ProbeStatus::Ready(value)) => {
                tracing::debug!(attempt, "Probe reported ready");
                return Ok(value);
            }
            Ok(ProbeStatus::Failed(reason)) => {
                tracing::warn!(attempt, reason = %reason, "Probe reported terminal failure");
                return Err(PollError::Failed {
                    reason,
                    attempts: attempt,
                });
            }
            Ok(ProbeStatus::Pending) => {
                if let Some(age) = timer.streak_age() {
                    tracing::info!(attempt, after = ?age, "Probe recovered");
                }
                timer.clear();
            }
            Err(e) => {
                tracing::debug!(
                    attempt,
                    error = %e,
                    streak = ?timer.streak_age().unwrap_or_default(),
                    "Probe failed, will retry"
                );
                timer.fail(e);
            }
        }
    }
}

fn timed_out<E: fmt::Display>(config: &PollConfig, attempts: u32, source: E) -> PollError<E> {
    tracing::warn!(
        attempts,
        grace = ?config.grace_timeout,
        error = %source,
        "Giving up after continuous probe failures"
    );
    PollError::Timeout {
        grace: config.grace_timeout,
        attempts,
        source,
    }
}

/// Poll until a readiness probe answers `true`.
///
/// `Ok(false)` keeps polling and counts as a healthy answer. On success the
/// returned flag is always `true`.
pub async fn wait_until_ready<E, F, Fut>(
    config: &PollConfig,
    cancel: &CancellationToken,
    mut probe: F,
) -> Result<bool, PollError<E>>
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: fmt::Display,
{
    poll(config, cancel, |token| {
        let fut = probe(token);
        async move {
            fut.await.map(|ready| {
                if ready {
                    ProbeStatus::Ready(true)
                } else {
                    ProbeStatus::Pending
                }
            })
        }
    })
    .await
}

/// Poll until a status probe reports a terminal state.
///
/// [`TerminalStatus::Failure`] ends the wait immediately with
/// [`PollError::Failed`] carrying the reported reason verbatim.
/// An `InProgress` answer counts as a healthy probe and resets the grace
/// budget left over from earlier errors.
pub async fn wait_until_terminal<E, F, Fut>(
    config: &PollConfig,
    cancel: &CancellationToken,
    mut probe: F,
) -> Result<(), PollError<E>>
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<TerminalStatus, E>>,
    E: fmt::Display,
{
    poll(config, cancel, |token| {
        let fut = probe(token);
        async move { fut.await.map(ProbeStatus::from) }
    })
    .await
}
