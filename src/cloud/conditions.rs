//! Ready-made predicates over observed resources.

use crate::domain::{
    DataCenter, ProvisioningState, RequestState, RequestStatus, Snapshot, State, Volume,
};
use crate::wait::Observation;

use super::CloudError;

/// Resources that report whether the provider considers them usable.
pub trait ReportsAvailability {
    /// Returns `true` once the provider reports the resource as available.
    /// Resources without metadata are never available.
    fn is_available(&self) -> bool;
}

impl ReportsAvailability for DataCenter {
    fn is_available(&self) -> bool {
        self.state() == Some(State::Available)
    }
}

impl ReportsAvailability for Volume {
    fn is_available(&self) -> bool {
        self.state() == Some(State::Available)
    }
}

impl ReportsAvailability for Snapshot {
    fn is_available(&self) -> bool {
        self.state() == Some(ProvisioningState::Available)
    }
}

/// Holds when the resource exists and is available.
#[must_use]
pub fn available<S: ReportsAvailability>(observation: &Observation<S>) -> bool {
    observation.present().is_some_and(ReportsAvailability::is_available)
}

/// Holds when the provider no longer knows the resource.
#[must_use]
pub const fn absent<S>(observation: &Observation<S>) -> bool {
    observation.is_absent()
}

/// Builds a predicate that holds while a volume reports `expected`.
#[must_use]
pub fn volume_in_state(expected: State) -> impl Fn(&Observation<Volume>) -> bool {
    move |observation| observation.present().and_then(Volume::state) == Some(expected)
}

/// Holds once the provider has applied the request.
///
/// # Errors
///
/// Returns [`CloudError::RequestFailed`] when the provider reports the
/// request as failed, so the wait stops instead of timing out.
pub fn request_completed(observation: &Observation<RequestState>) -> Result<bool, CloudError> {
    let Some(request) = observation.present() else {
        return Ok(false);
    };
    match request.status {
        RequestStatus::Done => Ok(true),
        RequestStatus::Failed => Err(CloudError::RequestFailed {
            id: request.id.to_string(),
            message: request.message.clone().unwrap_or_default(),
        }),
        RequestStatus::Queued | RequestStatus::Running | RequestStatus::Unrecognized => Ok(false),
    }
}
