//! Assertion helpers for live tests against a real or simulated cloud.
//!
//! Each helper awaits one eventually consistent condition (volume available,
//! snapshot removed, ...) with the harness' shared [`WaitConfig`] and
//! cancellation token, turning unsuccessful outcomes into
//! [`HarnessError`]s so test bodies can use `?`. Requests returned by
//! deletions are awaited with [`LiveHarness::assert_request_completed`].

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::cloud::conditions::{absent, available, request_completed};
use crate::cloud::{
    CloudApi, CloudError, DataCenterProbe, RequestProbe, SnapshotProbe, VolumeProbe,
};
use crate::domain::{DataCenter, RequestId, Snapshot, Volume};
use crate::wait::{WaitConfig, WaitConfigError, WaitError, WaitReport, WaitSettings, Waiter};

/// Errors raised by [`LiveHarness`] assertions.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum HarnessError {
    /// Raised when an awaited condition did not hold.
    #[error(transparent)]
    Wait(#[from] WaitError),
    /// Raised when a direct API call fails or the provider reports a
    /// tracked request as failed.
    #[error("cloud API call failed: {0}")]
    Cloud(#[from] CloudError),
    /// Raised when the harness configuration is invalid.
    #[error(transparent)]
    Config(#[from] WaitConfigError),
}

/// Live-test fixture bundling a client with wait settings.
#[derive(Clone, Debug)]
pub struct LiveHarness<C> {
    api: C,
    config: WaitConfig,
    cancel: CancellationToken,
}

impl<C: CloudApi> LiveHarness<C> {
    /// Creates a harness with the given wait configuration.
    #[must_use]
    pub fn new(api: C, config: WaitConfig) -> Self {
        Self {
            api,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a harness from loaded [`WaitSettings`].
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] when the settings fail validation.
    pub fn from_settings(api: C, settings: &WaitSettings) -> Result<Self, HarnessError> {
        Ok(Self::new(api, settings.to_wait_config()?))
    }

    /// Client used for direct calls in test bodies.
    #[must_use]
    pub const fn api(&self) -> &C {
        &self.api
    }

    /// Token that aborts every in-flight and future assertion when
    /// cancelled, for example from a teardown path.
    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    fn waiter(&self) -> Waiter {
        Waiter::new(self.config).with_cancellation(self.cancel.clone())
    }

    /// Waits until `data_center` reports [`crate::domain::State::Available`].
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Wait`] on timeout, fetch failure, or
    /// cancellation.
    pub async fn assert_data_center_available(
        &self,
        data_center: &DataCenter,
    ) -> Result<WaitReport, HarnessError> {
        let outcome = self
            .waiter()
            .wait_until(&DataCenterProbe::new(&self.api), &data_center.id, available)
            .await;
        outcome
            .into_result(
                "data center available",
                format_args!("data center {}", data_center.id),
            )
            .map_err(HarnessError::from)
    }

    /// Waits until the provider no longer reports `data_center`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Wait`] on timeout, fetch failure, or
    /// cancellation.
    pub async fn assert_data_center_removed(
        &self,
        data_center: &DataCenter,
    ) -> Result<WaitReport, HarnessError> {
        let outcome = self
            .waiter()
            .wait_until(&DataCenterProbe::new(&self.api), &data_center.id, absent)
            .await;
        outcome
            .into_result(
                "data center removed",
                format_args!("data center {}", data_center.id),
            )
            .map_err(HarnessError::from)
    }

    /// Waits until the provider reports `request` as done.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Cloud`] with [`CloudError::RequestFailed`]
    /// as soon as the provider reports the request as failed, and
    /// [`HarnessError::Wait`] on timeout, fetch failure, or cancellation.
    pub async fn assert_request_completed(
        &self,
        request: &RequestId,
    ) -> Result<WaitReport, HarnessError> {
        let outcome = self
            .waiter()
            .wait(&RequestProbe::new(&self.api), request, request_completed)
            .await?;
        outcome
            .into_result("request completed", format_args!("request {request}"))
            .map_err(HarnessError::from)
    }

    /// Waits until `volume` reports [`crate::domain::State::Available`].
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Wait`] on timeout, fetch failure, or
    /// cancellation.
    pub async fn assert_volume_available(
        &self,
        volume: &Volume,
    ) -> Result<WaitReport, HarnessError> {
        let reference = volume.reference();
        let outcome = self
            .waiter()
            .wait_until(&VolumeProbe::new(&self.api), &reference, available)
            .await;
        outcome
            .into_result("volume available", &reference)
            .map_err(HarnessError::from)
    }

    /// Waits until the provider no longer reports `volume`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Wait`] on timeout, fetch failure, or
    /// cancellation.
    pub async fn assert_volume_removed(&self, volume: &Volume) -> Result<WaitReport, HarnessError> {
        let reference = volume.reference();
        let outcome = self
            .waiter()
            .wait_until(&VolumeProbe::new(&self.api), &reference, absent)
            .await;
        outcome
            .into_result("volume removed", &reference)
            .map_err(HarnessError::from)
    }

    /// Waits until `snapshot` reports
    /// [`crate::domain::ProvisioningState::Available`].
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Wait`] on timeout, fetch failure, or
    /// cancellation.
    pub async fn assert_snapshot_available(
        &self,
        snapshot: &Snapshot,
    ) -> Result<WaitReport, HarnessError> {
        let outcome = self
            .waiter()
            .wait_until(&SnapshotProbe::new(&self.api), &snapshot.id, available)
            .await;
        outcome
            .into_result(
                "snapshot available",
                format_args!("snapshot {}", snapshot.id),
            )
            .map_err(HarnessError::from)
    }

    /// Waits until the provider no longer reports `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Wait`] on timeout, fetch failure, or
    /// cancellation.
    pub async fn assert_snapshot_removed(
        &self,
        snapshot: &Snapshot,
    ) -> Result<WaitReport, HarnessError> {
        let outcome = self
            .waiter()
            .wait_until(&SnapshotProbe::new(&self.api), &snapshot.id, absent)
            .await;
        outcome
            .into_result(
                "snapshot removed",
                format_args!("snapshot {}", snapshot.id),
            )
            .map_err(HarnessError::from)
    }
}
