//! Waiting for eventually consistent cloud resources.
//!
//! Provisioning calls return before the provider has finished acting on
//! them, so callers poll until the resource reaches the state they need.
//! A [`Waiter`] repeatedly fetches the target through a [`StateSource`] and
//! applies a predicate to the fresh [`Observation`], stopping when the
//! predicate holds, the deadline passes, the source cannot observe the
//! resource, or the caller cancels.

mod config;
mod outcome;
mod source;
#[cfg(test)]
mod tests;

use std::convert::Infallible;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use config::{
    DEFAULT_MAX_FETCH_RETRIES, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, WaitConfig,
    WaitConfigError, WaitSettings,
};
pub use outcome::{WaitError, WaitOutcome, WaitReport};
pub use source::{FetchError, FetchFuture, Observation, StateSource};

/// Single-use poller bound to one [`WaitConfig`].
#[derive(Clone, Debug, Default)]
pub struct Waiter {
    config: WaitConfig,
    cancel: CancellationToken,
}

impl Waiter {
    /// Creates a waiter that can only be stopped by its deadline.
    #[must_use]
    pub fn new(config: WaitConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Attaches a cancellation token. Cancelling it stops the wait before
    /// the next fetch and interrupts an in-progress sleep.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Polls `target` until `predicate` returns `Ok(true)`.
    ///
    /// Transient fetch failures count as "not yet satisfied" until more than
    /// [`WaitConfig::max_fetch_retries`] of them occur in a row. A permanent
    /// failure ends the wait immediately with [`WaitOutcome::FetchFailed`].
    ///
    /// # Errors
    ///
    /// Returns the predicate's error unchanged the first time it fails; the
    /// waiter never retries or masks predicate errors.
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "tokio::select! expands to a modulo for branch fairness"
    )]
    pub async fn wait<S, P, E>(
        self,
        source: &S,
        target: &S::Target,
        predicate: P,
    ) -> Result<WaitOutcome<S::Error>, E>
    where
        S: StateSource + ?Sized,
        P: Fn(&Observation<S::State>) -> Result<bool, E>,
    {
        let started = Instant::now();
        let deadline = started.checked_add(self.config.timeout());
        let report = |attempts: u32| WaitReport {
            attempts,
            elapsed: started.elapsed(),
        };
        let mut attempts: u32 = 0;
        let mut consecutive_failures: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                debug!(resource = ?target, attempts, "wait cancelled");
                return Ok(WaitOutcome::Cancelled(report(attempts)));
            }

            attempts = attempts.saturating_add(1);
            match source.fetch(target).await {
                Ok(observation) => {
                    consecutive_failures = 0;
                    let satisfied = predicate(&observation)?;
                    debug!(
                        resource = ?target,
                        attempt = attempts,
                        absent = observation.is_absent(),
                        satisfied,
                        "polled resource state"
                    );
                    if satisfied {
                        return Ok(WaitOutcome::Satisfied(report(attempts)));
                    }
                }
                Err(FetchError::Transient(error)) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    if consecutive_failures > self.config.max_fetch_retries() {
                        warn!(
                            resource = ?target,
                            attempt = attempts,
                            %error,
                            "giving up after repeated transient fetch failures"
                        );
                        return Ok(WaitOutcome::FetchFailed {
                            error,
                            report: report(attempts),
                        });
                    }
                    warn!(
                        resource = ?target,
                        attempt = attempts,
                        %error,
                        "transient fetch failure"
                    );
                }
                Err(FetchError::Permanent(error)) => {
                    warn!(
                        resource = ?target,
                        attempt = attempts,
                        %error,
                        "permanent fetch failure"
                    );
                    return Ok(WaitOutcome::FetchFailed {
                        error,
                        report: report(attempts),
                    });
                }
            }

            let Some(pause) = self.next_pause(deadline) else {
                warn!(resource = ?target, attempts, "deadline reached");
                return Ok(WaitOutcome::TimedOut(report(attempts)));
            };

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    debug!(resource = ?target, attempts, "wait cancelled while sleeping");
                    return Ok(WaitOutcome::Cancelled(report(attempts)));
                }
                () = sleep(pause) => {}
            }

            if deadline.is_some_and(|at| Instant::now() >= at) {
                warn!(resource = ?target, attempts, "deadline reached");
                return Ok(WaitOutcome::TimedOut(report(attempts)));
            }
        }
    }

    /// Polls `target` until the infallible `predicate` holds.
    pub async fn wait_until<S, P>(
        self,
        source: &S,
        target: &S::Target,
        predicate: P,
    ) -> WaitOutcome<S::Error>
    where
        S: StateSource + ?Sized,
        P: Fn(&Observation<S::State>) -> bool,
    {
        let result = self
            .wait(source, target, |observation| {
                Ok::<bool, Infallible>(predicate(observation))
            })
            .await;
        match result {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        }
    }

    /// Sleep before the next attempt, clamped to the time left. `None` once
    /// the deadline has passed.
    fn next_pause(&self, deadline: Option<Instant>) -> Option<Duration> {
        let Some(at) = deadline else {
            return Some(self.config.poll_interval());
        };
        let remaining = at.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return None;
        }
        Some(self.config.poll_interval().min(remaining))
    }
}
