//! Synchronisation helpers for eventually consistent cloud provisioning.
//!
//! Cloud providers accept create and delete requests long before the
//! resource reaches its final state. The crate exposes a provider-agnostic
//! [`Waiter`] that polls a [`StateSource`] until a predicate holds, the
//! value types live tests observe, a [`CloudApi`] contract with probes that
//! adapt it to the waiter, and a [`LiveHarness`] bundling the common
//! "wait until available" and "wait until removed" assertions.

pub mod cloud;
pub mod domain;
pub mod harness;
pub mod test_support;
pub mod wait;

pub use cloud::{
    CloudApi, CloudError, DataCenterProbe, RequestProbe, SnapshotProbe, VolumeProbe,
};
pub use domain::{
    DataCenter, DataCenterId, DataCenterRequest, DomainError, ProvisioningState, RequestId,
    RequestState, RequestStatus, ResourceProviderMetaData, Snapshot, SnapshotId, SnapshotRequest,
    SnapshotUpdate, State, Volume, VolumeRef, VolumeRequest,
};
pub use harness::{HarnessError, LiveHarness};
pub use wait::{
    FetchError, Observation, StateSource, WaitConfig, WaitConfigError, WaitError, WaitOutcome,
    WaitReport, WaitSettings, Waiter,
};
