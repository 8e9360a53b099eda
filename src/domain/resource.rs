//! Immutable resource records observed by live tests.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DomainError;
use super::ids::{DataCenterId, RequestId, SnapshotId, VolumeId};

/// Lifecycle state reported for volumes and data centers.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    /// Ready for use.
    Available,
    /// An operation is in progress.
    Busy,
    /// Provisioned but switched off.
    Inactive,
    /// Any value this crate does not know about.
    #[serde(other)]
    Unrecognized,
}

/// Provisioning state reported for snapshots and images.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisioningState {
    /// Ready for use.
    Available,
    /// An operation is in progress.
    Busy,
    /// Provisioned but switched off.
    Inactive,
    /// Queued by the provider.
    Inprocess,
    /// Deleted but still listed.
    Deleted,
    /// Deletion in progress.
    Destroying,
    /// The provider no longer knows the resource.
    DoesNotExist,
    /// Any value this crate does not know about.
    #[serde(other)]
    Unrecognized,
}

/// Progress of an asynchronous provider request.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Accepted but not started.
    Queued,
    /// Being applied.
    Running,
    /// Applied successfully.
    Done,
    /// The provider gave up on the request.
    Failed,
    /// Any value this crate does not know about.
    #[serde(other)]
    Unrecognized,
}

impl RequestStatus {
    /// Returns `true` once the provider will not change the status again.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Status record for a [`RequestId`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestState {
    /// Request being tracked.
    pub id: RequestId,
    /// Current progress.
    pub status: RequestStatus,
    /// Provider message, usually set when the request failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Provider bookkeeping attached to a resource.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata<S> {
    /// Creation timestamp as reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    /// Entity tag of the current revision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Current lifecycle state.
    pub state: S,
}

impl<S> Metadata<S> {
    /// Creates metadata carrying only a state.
    #[must_use]
    pub const fn with_state(state: S) -> Self {
        Self {
            created_date: None,
            etag: None,
            state,
        }
    }
}

/// Composite key addressing a volume: volumes live inside a data center.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRef {
    /// Owning data center.
    pub data_center_id: DataCenterId,
    /// Volume within the data center.
    pub volume_id: VolumeId,
}

impl VolumeRef {
    /// Builds a reference, rejecting blank identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when either identifier is empty
    /// after trimming.
    pub fn new(
        data_center_id: impl Into<DataCenterId>,
        volume_id: impl Into<VolumeId>,
    ) -> Result<Self, DomainError> {
        let reference = Self {
            data_center_id: data_center_id.into(),
            volume_id: volume_id.into(),
        };
        if reference.data_center_id.is_empty() {
            return Err(DomainError::Validation(String::from("data_center_id")));
        }
        if reference.volume_id.is_empty() {
            return Err(DomainError::Validation(String::from("volume_id")));
        }
        Ok(reference)
    }
}

impl fmt::Display for VolumeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "volume {} in data center {}", self.volume_id, self.data_center_id)
    }
}

/// User-controlled data center attributes.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCenterProperties {
    /// Display name.
    pub name: String,
    /// Provider location the data center runs in.
    pub location: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Virtual data center grouping volumes and servers.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCenter {
    /// Provider identifier.
    pub id: DataCenterId,
    /// User-controlled attributes.
    pub properties: DataCenterProperties,
    /// Provider bookkeeping; missing while the provider is still accepting
    /// the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata<State>>,
}

impl DataCenter {
    /// Current state, if the provider reported metadata.
    #[must_use]
    pub fn state(&self) -> Option<State> {
        self.metadata.as_ref().map(|metadata| metadata.state)
    }
}

/// User-controlled volume attributes.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeProperties {
    /// Display name.
    pub name: String,
    /// Size in gigabytes.
    pub size: u32,
    /// Licence type of the installed operating system, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licence_type: Option<String>,
}

/// Block storage volume.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Provider identifier.
    pub id: VolumeId,
    /// Data center that owns the volume.
    pub data_center_id: DataCenterId,
    /// User-controlled attributes.
    pub properties: VolumeProperties,
    /// Provider bookkeeping; missing while the provider is still accepting
    /// the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata<State>>,
}

impl Volume {
    /// Composite key used to fetch this volume again.
    #[must_use]
    pub fn reference(&self) -> VolumeRef {
        VolumeRef {
            data_center_id: self.data_center_id.clone(),
            volume_id: self.id.clone(),
        }
    }

    /// Current state, if the provider reported metadata.
    #[must_use]
    pub fn state(&self) -> Option<State> {
        self.metadata.as_ref().map(|metadata| metadata.state)
    }
}

/// User-controlled snapshot attributes.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotProperties {
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Location the snapshot is stored in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Point-in-time copy of a volume.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Provider identifier.
    pub id: SnapshotId,
    /// User-controlled attributes.
    pub properties: SnapshotProperties,
    /// Provider bookkeeping; missing while the provider is still accepting
    /// the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata<ProvisioningState>>,
}

impl Snapshot {
    /// Current provisioning state, if the provider reported metadata.
    #[must_use]
    pub fn state(&self) -> Option<ProvisioningState> {
        self.metadata.as_ref().map(|metadata| metadata.state)
    }
}
