//! Value objects for the cloud resources that live tests provision and
//! observe.
//!
//! Records are plain immutable structs with serde field-name mappings;
//! requests validate on construction.

mod ids;
mod provider;
mod request;
mod resource;

use thiserror::Error;

pub use ids::{DataCenterId, RequestId, SnapshotId, VolumeId};
pub use provider::{ResourceProviderMetaData, ResourceProviderMetaDataBuilder};
pub use request::{
    DataCenterRequest, SnapshotRequest, SnapshotRequestBuilder, SnapshotUpdate, VolumeRequest,
};
pub use resource::{
    DataCenter, DataCenterProperties, Metadata, ProvisioningState, RequestState, RequestStatus,
    Snapshot, SnapshotProperties, State, Volume, VolumeProperties, VolumeRef,
};

/// Errors raised when constructing domain values.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DomainError {
    /// Raised when a required field is missing or blank.
    #[error("missing or empty field: {0}")]
    Validation(String),
    /// Raised when an update would not change anything.
    #[error("update for {0} changes no fields")]
    EmptyUpdate(String),
}
