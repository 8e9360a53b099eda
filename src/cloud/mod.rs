//! Contract for the cloud API client that live tests drive.
//!
//! The crate does not ship an HTTP transport. Clients implement
//! [`CloudApi`]; the probes in this module turn its lookups into
//! [`crate::wait::StateSource`]s so provisioning can be awaited.

pub mod conditions;
mod error;
mod probe;

use std::future::Future;
use std::pin::Pin;

use crate::domain::{
    DataCenter, DataCenterId, DataCenterRequest, RequestId, RequestState, Snapshot, SnapshotId,
    SnapshotRequest, SnapshotUpdate, Volume, VolumeRef, VolumeRequest,
};

pub use error::CloudError;
pub use probe::{DataCenterProbe, RequestProbe, SnapshotProbe, VolumeProbe};

/// Future returned by cloud API operations.
pub type CloudFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CloudError>> + Send + 'a>>;

/// Create, read, update, and delete operations for data centers, volumes,
/// and snapshots.
///
/// Lookups return `Ok(None)` when the resource does not exist. Mutating
/// calls return as soon as the provider accepts them; the resource then
/// moves through its lifecycle asynchronously. Deletions hand back the
/// [`RequestId`] the provider tracks them under.
pub trait CloudApi: Send + Sync {
    /// Requests a new data center.
    fn create_data_center<'a>(
        &'a self,
        request: &'a DataCenterRequest,
    ) -> CloudFuture<'a, DataCenter>;

    /// Fetches a data center by id.
    fn get_data_center<'a>(&'a self, id: &'a DataCenterId) -> CloudFuture<'a, Option<DataCenter>>;

    /// Requests deletion of a data center together with everything in it.
    fn delete_data_center<'a>(&'a self, id: &'a DataCenterId) -> CloudFuture<'a, RequestId>;


    /// Requests a new volume.
    fn create_volume<'a>(&'a self, request: &'a VolumeRequest) -> CloudFuture<'a, Volume>;

    /// Fetches a volume by its composite key.
    fn get_volume<'a>(&'a self, reference: &'a VolumeRef) -> CloudFuture<'a, Option<Volume>>;

    /// Requests deletion of a volume.
    fn delete_volume<'a>(&'a self, reference: &'a VolumeRef) -> CloudFuture<'a, RequestId>;

    /// Requests a snapshot of an existing volume.
    fn create_snapshot<'a>(&'a self, request: &'a SnapshotRequest) -> CloudFuture<'a, Snapshot>;

    /// Fetches a snapshot by id.
    fn get_snapshot<'a>(&'a self, id: &'a SnapshotId) -> CloudFuture<'a, Option<Snapshot>>;

    /// Lists every snapshot visible to the caller.
    fn list_snapshots(&self) -> CloudFuture<'_, Vec<Snapshot>>;

    /// Applies a partial update to a snapshot.
    fn update_snapshot<'a>(&'a self, update: &'a SnapshotUpdate) -> CloudFuture<'a, Snapshot>;

    /// Requests deletion of a snapshot.
    fn delete_snapshot<'a>(&'a self, id: &'a SnapshotId) -> CloudFuture<'a, RequestId>;

    /// Fetches the status of an asynchronous request.
    fn get_request<'a>(&'a self, id: &'a RequestId) -> CloudFuture<'a, Option<RequestState>>;
}
