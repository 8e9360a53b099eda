//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::cloud::{CloudApi, CloudError, CloudFuture};
use crate::domain::{
    DataCenter, DataCenterId, DataCenterProperties, DataCenterRequest, Metadata,
    ProvisioningState, RequestId, RequestState, RequestStatus, Snapshot, SnapshotId,
    SnapshotProperties, SnapshotRequest, SnapshotUpdate, State, Volume, VolumeId,
    VolumeProperties, VolumeRef, VolumeRequest,
};
use crate::wait::{FetchError, FetchFuture, Observation, StateSource};

/// Failure returned by [`ScriptedSource`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("scripted failure: {0}")]
pub struct ScriptedError(pub String);

/// One scripted fetch result.
pub type ScriptedFetch<T> = Result<Observation<T>, FetchError<ScriptedError>>;

/// State source that replays pre-seeded fetch results in FIFO order.
///
/// The last result repeats once the script is exhausted; an empty script
/// always reports [`Observation::Absent`].
#[derive(Debug)]
pub struct ScriptedSource<T> {
    script: Mutex<VecDeque<ScriptedFetch<T>>>,
    fetches: AtomicU32,
}

impl<T> ScriptedSource<T> {
    /// Creates a source replaying `script`.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = ScriptedFetch<T>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fetches: AtomicU32::new(0),
        }
    }

    /// Number of fetches served so far.
    #[must_use]
    pub fn fetches(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl<T: Clone + Send + Sync> StateSource for ScriptedSource<T> {
    type Target = String;
    type State = T;
    type Error = ScriptedError;

    fn fetch<'a>(
        &'a self,
        _target: &'a String,
    ) -> FetchFuture<'a, Observation<T>, ScriptedError> {
        Box::pin(async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().await;
            let next = if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            };
            next.unwrap_or(Ok(Observation::Absent))
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Provisioning,
    Ready,
    Deleting,
}

/// Records whose reported state follows the simulated lifecycle.
trait Lifecycle: Clone {
    fn show(&mut self, phase: Phase);
}

impl Lifecycle for DataCenter {
    fn show(&mut self, phase: Phase) {
        let state = match phase {
            Phase::Provisioning | Phase::Deleting => State::Busy,
            Phase::Ready => State::Available,
        };
        self.metadata = Some(Metadata::with_state(state));
    }
}

impl Lifecycle for Volume {
    fn show(&mut self, phase: Phase) {
        let state = match phase {
            Phase::Provisioning | Phase::Deleting => State::Busy,
            Phase::Ready => State::Available,
        };
        self.metadata = Some(Metadata::with_state(state));
    }
}

impl Lifecycle for Snapshot {
    fn show(&mut self, phase: Phase) {
        let state = match phase {
            Phase::Provisioning => ProvisioningState::Busy,
            Phase::Ready => ProvisioningState::Available,
            Phase::Deleting => ProvisioningState::Destroying,
        };
        self.metadata = Some(Metadata::with_state(state));
    }
}

#[derive(Debug)]
struct Tracked<T> {
    record: T,
    phase: Phase,
    reads_left: u32,
}

impl<T: Lifecycle> Tracked<T> {
    fn new(mut record: T, settle_reads: u32) -> Self {
        let phase = if settle_reads == 0 {
            Phase::Ready
        } else {
            Phase::Provisioning
        };
        record.show(phase);
        Self {
            record,
            phase,
            reads_left: settle_reads,
        }
    }

    fn begin_deletion(&mut self, teardown_reads: u32) {
        self.phase = Phase::Deleting;
        self.reads_left = teardown_reads;
        self.record.show(Phase::Deleting);
    }

    /// Advances the lifecycle by one lookup. `None` once deletion finished.
    fn observe(&mut self) -> Option<T> {
        match self.phase {
            Phase::Ready => {}
            Phase::Provisioning if self.reads_left == 0 => {
                self.phase = Phase::Ready;
                self.record.show(Phase::Ready);
            }
            Phase::Deleting if self.reads_left == 0 => return None,
            Phase::Provisioning | Phase::Deleting => {
                self.reads_left = self.reads_left.saturating_sub(1);
            }
        }
        Some(self.record.clone())
    }
}

/// Request reported as running for `reads_left` lookups, then `outcome`.
#[derive(Debug)]
struct PendingRequest {
    reads_left: u32,
    outcome: RequestStatus,
}

#[derive(Debug, Default)]
struct CloudState {
    data_centers: HashMap<DataCenterId, Tracked<DataCenter>>,
    volumes: HashMap<VolumeRef, Tracked<Volume>>,
    snapshots: HashMap<SnapshotId, Tracked<Snapshot>>,
    requests: HashMap<RequestId, PendingRequest>,
    faults: VecDeque<CloudError>,
    failing_requests: u32,
    lookups: u32,
}

impl CloudState {
    /// Consumes the next injected fault, counting the lookup either way.
    fn begin_lookup(&mut self) -> Result<(), CloudError> {
        self.lookups = self.lookups.saturating_add(1);
        self.faults.pop_front().map_or(Ok(()), Err)
    }

    fn track_request(&mut self, reads: u32) -> RequestId {
        let outcome = if self.failing_requests > 0 {
            self.failing_requests -= 1;
            RequestStatus::Failed
        } else {
            RequestStatus::Done
        };
        let id = RequestId::new(SimulatedCloud::new_id());
        self.requests.insert(
            id.clone(),
            PendingRequest {
                reads_left: reads,
                outcome,
            },
        );
        id
    }
}

/// In-memory, eventually consistent [`CloudApi`].
///
/// New resources report a busy state for `settle_reads` lookups before
/// becoming available; deleted resources stay visible in a destroying state
/// for `teardown_reads` lookups before disappearing. Deletion requests
/// report [`RequestStatus::Running`] for `settle_reads` status lookups.
/// Faults queued with [`SimulatedCloud::inject_fault`] are returned by the
/// next lookups.
#[derive(Clone, Debug, Default)]
pub struct SimulatedCloud {
    state: Arc<Mutex<CloudState>>,
    settle_reads: u32,
    teardown_reads: u32,
}

impl SimulatedCloud {
    /// Creates a cloud where every transition is immediately visible.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many lookups a new resource stays busy for.
    #[must_use]
    pub const fn with_settle_reads(mut self, reads: u32) -> Self {
        self.settle_reads = reads;
        self
    }

    /// Sets how many lookups a deleted resource remains visible for.
    #[must_use]
    pub const fn with_teardown_reads(mut self, reads: u32) -> Self {
        self.teardown_reads = reads;
        self
    }

    /// Queues an error to be returned by the next lookup.
    pub async fn inject_fault(&self, error: CloudError) {
        self.state.lock().await.faults.push_back(error);
    }

    /// Makes the next accepted deletion end in [`RequestStatus::Failed`].
    pub async fn fail_next_request(&self) {
        let mut state = self.state.lock().await;
        state.failing_requests = state.failing_requests.saturating_add(1);
    }

    /// Number of `get_*` lookups served, including failed ones.
    pub async fn lookups(&self) -> u32 {
        self.state.lock().await.lookups
    }

    /// Number of data centers still tracked, including those being deleted.
    pub async fn data_center_count(&self) -> usize {
        self.state.lock().await.data_centers.len()
    }

    /// Number of volumes still tracked, including those being deleted.
    pub async fn volume_count(&self) -> usize {
        self.state.lock().await.volumes.len()
    }

    fn new_id() -> String {
        Uuid::new_v4().simple().to_string()
    }
}

impl CloudApi for SimulatedCloud {
    fn create_data_center<'a>(
        &'a self,
        request: &'a DataCenterRequest,
    ) -> CloudFuture<'a, DataCenter> {
        Box::pin(async move {
            let data_center = DataCenter {
                id: DataCenterId::new(Self::new_id()),
                properties: DataCenterProperties {
                    name: request.name.clone(),
                    location: request.location.clone(),
                    description: request.description.clone(),
                },
                metadata: None,
            };
            let tracked = Tracked::new(data_center, self.settle_reads);
            let created = tracked.record.clone();
            self.state
                .lock()
                .await
                .data_centers
                .insert(created.id.clone(), tracked);
            Ok(created)
        })
    }

    fn get_data_center<'a>(&'a self, id: &'a DataCenterId) -> CloudFuture<'a, Option<DataCenter>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            state.begin_lookup()?;
            let Some(tracked) = state.data_centers.get_mut(id) else {
                return Ok(None);
            };
            let seen = tracked.observe();
            if seen.is_none() {
                state.data_centers.remove(id);
            }
            Ok::<_, CloudError>(seen)
        })
    }

    fn delete_data_center<'a>(&'a self, id: &'a DataCenterId) -> CloudFuture<'a, RequestId> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let tracked = state
                .data_centers
                .get_mut(id)
                .ok_or_else(|| CloudError::not_found("data center", id))?;
            tracked.begin_deletion(self.teardown_reads);
            for volume in state
                .volumes
                .values_mut()
                .filter(|candidate| candidate.record.data_center_id == *id)
            {
                volume.begin_deletion(self.teardown_reads);
            }
            if self.teardown_reads == 0 {
                state.data_centers.remove(id);
                state
                    .volumes
                    .retain(|reference, _| reference.data_center_id != *id);
            }
            Ok::<_, CloudError>(state.track_request(self.settle_reads))
        })
    }

    fn create_volume<'a>(&'a self, request: &'a VolumeRequest) -> CloudFuture<'a, Volume> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            match state.data_centers.get(&request.data_center_id) {
                None => {
                    return Err(CloudError::not_found(
                        "data center",
                        &request.data_center_id,
                    ));
                }
                Some(owner) if owner.phase == Phase::Deleting => {
                    return Err(CloudError::Rejected {
                        message: format!(
                            "data center {} is being deleted",
                            request.data_center_id
                        ),
                    });
                }
                Some(_) => {}
            }
            let volume = Volume {
                id: VolumeId::new(Self::new_id()),
                data_center_id: request.data_center_id.clone(),
                properties: VolumeProperties {
                    name: request.name.clone(),
                    size: request.size_gb,
                    licence_type: None,
                },
                metadata: None,
            };
            let tracked = Tracked::new(volume, self.settle_reads);
            let created = tracked.record.clone();
            state.volumes.insert(created.reference(), tracked);
            Ok(created)
        })
    }

    fn get_volume<'a>(&'a self, reference: &'a VolumeRef) -> CloudFuture<'a, Option<Volume>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            state.begin_lookup()?;
            let Some(tracked) = state.volumes.get_mut(reference) else {
                return Ok(None);
            };
            let seen = tracked.observe();
            if seen.is_none() {
                state.volumes.remove(reference);
            }
            Ok::<_, CloudError>(seen)
        })
    }

    fn delete_volume<'a>(&'a self, reference: &'a VolumeRef) -> CloudFuture<'a, RequestId> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let tracked = state
                .volumes
                .get_mut(reference)
                .ok_or_else(|| CloudError::not_found("volume", reference))?;
            tracked.begin_deletion(self.teardown_reads);
            if self.teardown_reads == 0 {
                state.volumes.remove(reference);
            }
            Ok::<_, CloudError>(state.track_request(self.settle_reads))
        })
    }

    fn create_snapshot<'a>(&'a self, request: &'a SnapshotRequest) -> CloudFuture<'a, Snapshot> {
        Box::pin(async move {
            let source = VolumeRef {
                data_center_id: request.data_center_id.clone(),
                volume_id: request.volume_id.clone(),
            };
            let mut state = self.state.lock().await;
            if !state.volumes.contains_key(&source) {
                return Err(CloudError::not_found("volume", &source));
            }
            let snapshot = Snapshot {
                id: SnapshotId::new(Self::new_id()),
                properties: SnapshotProperties {
                    name: request.name.clone(),
                    description: request.description.clone(),
                    location: None,
                },
                metadata: None,
            };
            let tracked = Tracked::new(snapshot, self.settle_reads);
            let created = tracked.record.clone();
            state.snapshots.insert(created.id.clone(), tracked);
            Ok(created)
        })
    }

    fn get_snapshot<'a>(&'a self, id: &'a SnapshotId) -> CloudFuture<'a, Option<Snapshot>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            state.begin_lookup()?;
            let Some(tracked) = state.snapshots.get_mut(id) else {
                return Ok(None);
            };
            let seen = tracked.observe();
            if seen.is_none() {
                state.snapshots.remove(id);
            }
            Ok::<_, CloudError>(seen)
        })
    }

    fn list_snapshots(&self) -> CloudFuture<'_, Vec<Snapshot>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            Ok(state
                .snapshots
                .values()
                .map(|tracked| tracked.record.clone())
                .collect())
        })
    }

    fn update_snapshot<'a>(&'a self, update: &'a SnapshotUpdate) -> CloudFuture<'a, Snapshot> {
        Box::pin(async move {
            update.validate()?;
            let mut state = self.state.lock().await;
            let tracked = state
                .snapshots
                .get_mut(&update.id)
                .ok_or_else(|| CloudError::not_found("snapshot", &update.id))?;
            if tracked.phase == Phase::Deleting {
                return Err(CloudError::Rejected {
                    message: format!("snapshot {} is being deleted", update.id),
                });
            }
            if let Some(name) = &update.name {
                tracked.record.properties.name.clone_from(name);
            }
            if let Some(description) = &update.description {
                tracked.record.properties.description = Some(description.clone());
            }
            Ok::<_, CloudError>(tracked.record.clone())
        })
    }

    fn delete_snapshot<'a>(&'a self, id: &'a SnapshotId) -> CloudFuture<'a, RequestId> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let tracked = state
                .snapshots
                .get_mut(id)
                .ok_or_else(|| CloudError::not_found("snapshot", id))?;
            tracked.begin_deletion(self.teardown_reads);
            if self.teardown_reads == 0 {
                state.snapshots.remove(id);
            }
            Ok::<_, CloudError>(state.track_request(self.settle_reads))
        })
    }

    fn get_request<'a>(&'a self, id: &'a RequestId) -> CloudFuture<'a, Option<RequestState>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            state.begin_lookup()?;
            let Some(pending) = state.requests.get_mut(id) else {
                return Ok(None);
            };
            let status = if pending.reads_left == 0 {
                pending.outcome
            } else {
                pending.reads_left -= 1;
                RequestStatus::Running
            };
            Ok::<_, CloudError>(Some(RequestState {
                id: id.clone(),
                status,
                message: (status == RequestStatus::Failed)
                    .then(|| String::from("simulated provider failure")),
            }))
        })
    }
}

/// Builds a volume record in the given state, for predicate tests.
#[must_use]
pub fn volume_in(state: Option<State>) -> Volume {
    Volume {
        id: VolumeId::new("vol-1"),
        data_center_id: DataCenterId::new("dc-1"),
        properties: VolumeProperties {
            name: String::from("test-volume"),
            size: 3,
            licence_type: None,
        },
        metadata: state.map(Metadata::with_state),
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: Mutex<()> = Mutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
