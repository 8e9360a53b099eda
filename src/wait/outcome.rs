//! Terminal outcomes of a wait and their conversion into errors.

use std::fmt::Display;
use std::time::Duration;

use thiserror::Error;

/// Bookkeeping captured when a wait reaches a terminal state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WaitReport {
    /// Number of fetches issued against the source.
    pub attempts: u32,
    /// Time spent between starting the wait and reaching the outcome.
    pub elapsed: Duration,
}

/// Terminal state of a wait.
///
/// Every variant is final; a [`crate::wait::Waiter`] is consumed by the wait
/// that produced it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WaitOutcome<E> {
    /// The predicate held on some attempt.
    Satisfied(WaitReport),
    /// The deadline passed without the predicate ever holding.
    TimedOut(WaitReport),
    /// The source could not observe the resource: a permanent error, or too
    /// many consecutive transient errors.
    FetchFailed {
        /// Error returned by the last fetch.
        error: E,
        /// Attempts and elapsed time up to the failure.
        report: WaitReport,
    },
    /// The caller's cancellation token fired.
    Cancelled(WaitReport),
}

impl<E> WaitOutcome<E> {
    /// Returns `true` when the predicate was satisfied.
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied(_))
    }

    /// Attempts and elapsed time recorded for this outcome.
    #[must_use]
    pub const fn report(&self) -> &WaitReport {
        match self {
            Self::Satisfied(report)
            | Self::TimedOut(report)
            | Self::Cancelled(report)
            | Self::FetchFailed { report, .. } => report,
        }
    }
}

impl<E: Display> WaitOutcome<E> {
    /// Converts the outcome into a `Result`, naming the awaited `action` and
    /// its `target` in the error.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Timeout`], [`WaitError::FetchFailed`] or
    /// [`WaitError::Cancelled`] for every outcome other than
    /// [`WaitOutcome::Satisfied`].
    pub fn into_result(
        self,
        action: &str,
        target: impl Display,
    ) -> Result<WaitReport, WaitError> {
        match self {
            Self::Satisfied(report) => Ok(report),
            Self::TimedOut(report) => Err(WaitError::Timeout {
                action: action.to_owned(),
                target: target.to_string(),
                attempts: report.attempts,
            }),
            Self::FetchFailed { error, .. } => Err(WaitError::FetchFailed {
                action: action.to_owned(),
                target: target.to_string(),
                message: error.to_string(),
            }),
            Self::Cancelled(_) => Err(WaitError::Cancelled {
                action: action.to_owned(),
                target: target.to_string(),
            }),
        }
    }
}

/// Errors produced from an unsuccessful [`WaitOutcome`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum WaitError {
    /// Raised when the condition never became true before the deadline.
    #[error("timeout waiting for {action} on {target} after {attempts} attempts")]
    Timeout {
        /// Condition being waited on.
        action: String,
        /// Resource being polled.
        target: String,
        /// Number of fetches issued.
        attempts: u32,
    },
    /// Raised when the resource could not be observed at all.
    #[error("could not observe {target} while waiting for {action}: {message}")]
    FetchFailed {
        /// Condition being waited on.
        action: String,
        /// Resource being polled.
        target: String,
        /// Error reported by the source.
        message: String,
    },
    /// Raised when the caller cancelled the wait.
    #[error("wait for {action} on {target} was cancelled")]
    Cancelled {
        /// Condition being waited on.
        action: String,
        /// Resource being polled.
        target: String,
    },
}
