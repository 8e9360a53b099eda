//! Adapters exposing [`CloudApi`] lookups as [`StateSource`]s.

use crate::domain::{
    DataCenter, DataCenterId, RequestId, RequestState, Snapshot, SnapshotId, Volume, VolumeRef,
};
use crate::wait::{FetchError, FetchFuture, Observation, StateSource};

use super::{CloudApi, CloudError};

/// Maps a lookup result onto an observation: missing resources are
/// [`Observation::Absent`], provider failures are classified by
/// transience.
fn observe<T>(
    result: Result<Option<T>, CloudError>,
) -> Result<Observation<T>, FetchError<CloudError>> {
    match result {
        Ok(found) => Ok(Observation::from(found)),
        Err(CloudError::NotFound { .. }) => Ok(Observation::Absent),
        Err(other) => Err(FetchError::from(other)),
    }
}

/// Observes data centers by [`DataCenterId`].
#[derive(Clone, Copy, Debug)]
pub struct DataCenterProbe<'c, C> {
    api: &'c C,
}

impl<'c, C: CloudApi> DataCenterProbe<'c, C> {
    /// Wraps a client.
    #[must_use]
    pub const fn new(api: &'c C) -> Self {
        Self { api }
    }
}

impl<C: CloudApi> StateSource for DataCenterProbe<'_, C> {
    type Target = DataCenterId;
    type State = DataCenter;
    type Error = CloudError;

    fn fetch<'a>(
        &'a self,
        target: &'a DataCenterId,
    ) -> FetchFuture<'a, Observation<DataCenter>, CloudError> {
        Box::pin(async move { observe(self.api.get_data_center(target).await) })
    }
}

/// Observes volumes by [`VolumeRef`].
#[derive(Clone, Copy, Debug)]
pub struct VolumeProbe<'c, C> {
    api: &'c C,
}

impl<'c, C: CloudApi> VolumeProbe<'c, C> {
    /// Wraps a client.
    #[must_use]
    pub const fn new(api: &'c C) -> Self {
        Self { api }
    }
}

impl<C: CloudApi> StateSource for VolumeProbe<'_, C> {
    type Target = VolumeRef;
    type State = Volume;
    type Error = CloudError;

    fn fetch<'a>(
        &'a self,
        target: &'a VolumeRef,
    ) -> FetchFuture<'a, Observation<Volume>, CloudError> {
        Box::pin(async move { observe(self.api.get_volume(target).await) })
    }
}

/// Observes snapshots by [`SnapshotId`].
#[derive(Clone, Copy, Debug)]
pub struct SnapshotProbe<'c, C> {
    api: &'c C,
}

impl<'c, C: CloudApi> SnapshotProbe<'c, C> {
    /// Wraps a client.
    #[must_use]
    pub const fn new(api: &'c C) -> Self {
        Self { api }
    }
}

impl<C: CloudApi> StateSource for SnapshotProbe<'_, C> {
    type Target = SnapshotId;
    type State = Snapshot;
    type Error = CloudError;

    fn fetch<'a>(
        &'a self,
        target: &'a SnapshotId,
    ) -> FetchFuture<'a, Observation<Snapshot>, CloudError> {
        Box::pin(async move { observe(self.api.get_snapshot(target).await) })
    }
}

/// Observes asynchronous provider requests by [`RequestId`].
#[derive(Clone, Copy, Debug)]
pub struct RequestProbe<'c, C> {
    api: &'c C,
}

impl<'c, C: CloudApi> RequestProbe<'c, C> {
    /// Wraps a client.
    #[must_use]
    pub const fn new(api: &'c C) -> Self {
        Self { api }
    }
}

impl<C: CloudApi> StateSource for RequestProbe<'_, C> {
    type Target = RequestId;
    type State = RequestState;
    type Error = CloudError;

    fn fetch<'a>(
        &'a self,
        target: &'a RequestId,
    ) -> FetchFuture<'a, Observation<RequestState>, CloudError> {
        Box::pin(async move { observe(self.api.get_request(target).await) })
    }
}
