//! Collaborator contract used by the waiter to observe resource state.

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Future returned by [`StateSource::fetch`].
pub type FetchFuture<'a, T, E> =
    Pin<Box<dyn Future<Output = Result<T, FetchError<E>>> + Send + 'a>>;

/// Snapshot of a polled resource.
///
/// A lookup that reports "not found" is an [`Observation::Absent`], not a
/// failure, so deletion can be confirmed with an ordinary predicate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Observation<S> {
    /// The resource exists and its current state was read.
    Present(S),
    /// The provider reports that the resource does not exist.
    Absent,
}

impl<S> Observation<S> {
    /// Returns `true` when the provider reported the resource as missing.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Borrows the observed state when the resource exists.
    #[must_use]
    pub const fn present(&self) -> Option<&S> {
        match self {
            Self::Present(state) => Some(state),
            Self::Absent => None,
        }
    }
}

impl<S> From<Option<S>> for Observation<S> {
    fn from(value: Option<S>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

/// Classified failure raised while fetching resource state.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FetchError<E> {
    /// Network hiccup or provider-side throttling; the waiter may retry.
    #[error("transient fetch failure: {0}")]
    Transient(E),
    /// The request can never succeed (bad request, unknown resource type).
    #[error("permanent fetch failure: {0}")]
    Permanent(E),
}

impl<E> FetchError<E> {
    /// Returns `true` for failures the waiter is allowed to retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Unwraps the underlying provider error.
    #[must_use]
    pub fn into_inner(self) -> E {
        match self {
            Self::Transient(error) | Self::Permanent(error) => error,
        }
    }
}

/// Read-only view of provider state consumed by [`crate::wait::Waiter`].
///
/// Implementations must be idempotent and free of side effects; the waiter
/// calls [`StateSource::fetch`] repeatedly and possibly from several
/// concurrent waits.
pub trait StateSource: Sync {
    /// Opaque key identifying the polled resource.
    type Target: Debug + Send + Sync;
    /// State value handed to predicates.
    type State: Send;
    /// Provider error carried by [`FetchError`].
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the current state of `target`.
    fn fetch<'a>(
        &'a self,
        target: &'a Self::Target,
    ) -> FetchFuture<'a, Observation<Self::State>, Self::Error>;
}
