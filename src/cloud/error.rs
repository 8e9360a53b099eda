//! Error taxonomy for cloud API calls.

use thiserror::Error;

use crate::domain::DomainError;
use crate::wait::FetchError;

/// Errors raised by [`crate::cloud::CloudApi`] implementations.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CloudError {
    /// Raised when the addressed resource does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Resource kind, for example `volume`.
        kind: String,
        /// Identifier that was looked up.
        id: String,
    },
    /// Raised for failures that may succeed on retry (network errors,
    /// throttling, provider timeouts).
    #[error("transient provider error: {message}")]
    Transient {
        /// Message reported by the transport or provider.
        message: String,
    },
    /// Raised when the provider rejects the request outright.
    #[error("request rejected: {message}")]
    Rejected {
        /// Message reported by the provider.
        message: String,
    },
    /// Raised when the provider does not know the requested resource type.
    #[error("resource type '{kind}' is unknown to the provider")]
    UnknownResourceType {
        /// Resource type that was requested.
        kind: String,
    },
    /// Raised when the provider accepted a request but could not apply it.
    #[error("provider request {id} failed: {message}")]
    RequestFailed {
        /// Request that failed.
        id: String,
        /// Message reported by the provider.
        message: String,
    },
    /// Raised when a request fails local validation.
    #[error("invalid request: {0}")]
    Validation(String),
}

impl CloudError {
    /// Builds a [`CloudError::NotFound`] for `kind` and `id`.
    #[must_use]
    pub fn not_found(kind: &str, id: &impl ToString) -> Self {
        Self::NotFound {
            kind: kind.to_owned(),
            id: id.to_string(),
        }
    }

    /// Returns `true` for failures worth retrying.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

impl From<DomainError> for CloudError {
    fn from(value: DomainError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<CloudError> for FetchError<CloudError> {
    fn from(value: CloudError) -> Self {
        if value.is_transient() {
            Self::Transient(value)
        } else {
            Self::Permanent(value)
        }
    }
}
