//! Request payloads for the create and update calls used by live tests.

use super::DomainError;
use super::ids::{DataCenterId, SnapshotId, VolumeId};

/// Parameters required to create a data center.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DataCenterRequest {
    /// Display name.
    pub name: String,
    /// Provider location, for example `de/fkb`.
    pub location: String,
    /// Optional description.
    pub description: Option<String>,
}

impl DataCenterRequest {
    /// Creates a data center request, trimming string fields.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when the name or location is
    /// blank.
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Result<Self, DomainError> {
        let request = Self {
            name: name.into().trim().to_owned(),
            location: location.into().trim().to_owned(),
            description: None,
        };
        if request.name.is_empty() {
            return Err(DomainError::Validation(String::from("name")));
        }
        if request.location.is_empty() {
            return Err(DomainError::Validation(String::from("location")));
        }
        Ok(request)
    }

    /// Attaches a description; blank descriptions are dropped.
    #[must_use]
    pub fn description(mut self, value: impl Into<String>) -> Self {
        let description = value.into().trim().to_owned();
        self.description = (!description.is_empty()).then_some(description);
        self
    }
}

/// Parameters required to create a volume.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VolumeRequest {
    /// Data center that will own the volume.
    pub data_center_id: DataCenterId,
    /// Display name.
    pub name: String,
    /// Size in gigabytes.
    pub size_gb: u32,
}

impl VolumeRequest {
    /// Creates a volume request, trimming string fields.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when the data center or name is
    /// blank, or the size is zero.
    pub fn new(
        data_center_id: impl Into<DataCenterId>,
        name: impl Into<String>,
        size_gb: u32,
    ) -> Result<Self, DomainError> {
        let request = Self {
            data_center_id: data_center_id.into(),
            name: name.into().trim().to_owned(),
            size_gb,
        };
        if request.data_center_id.is_empty() {
            return Err(DomainError::Validation(String::from("data_center_id")));
        }
        if request.name.is_empty() {
            return Err(DomainError::Validation(String::from("name")));
        }
        if request.size_gb == 0 {
            return Err(DomainError::Validation(String::from("size_gb")));
        }
        Ok(request)
    }
}

/// Parameters required to snapshot a volume.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SnapshotRequest {
    /// Data center owning the source volume.
    pub data_center_id: DataCenterId,
    /// Volume to snapshot.
    pub volume_id: VolumeId,
    /// Display name of the snapshot.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

impl SnapshotRequest {
    /// Starts a builder for a [`SnapshotRequest`].
    #[must_use]
    pub fn builder() -> SnapshotRequestBuilder {
        SnapshotRequestBuilder::default()
    }
}

/// Builder for [`SnapshotRequest`] that trims and validates on `build`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SnapshotRequestBuilder {
    data_center_id: String,
    volume_id: String,
    name: String,
    description: Option<String>,
}

impl SnapshotRequestBuilder {
    /// Sets the data center owning the source volume.
    #[must_use]
    pub fn data_center_id(mut self, value: impl Into<String>) -> Self {
        self.data_center_id = value.into();
        self
    }

    /// Sets the source volume.
    #[must_use]
    pub fn volume_id(mut self, value: impl Into<String>) -> Self {
        self.volume_id = value.into();
        self
    }

    /// Sets the snapshot name.
    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = value.into();
        self
    }

    /// Sets the snapshot description.
    #[must_use]
    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    /// Builds and validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] naming the first blank field.
    pub fn build(self) -> Result<SnapshotRequest, DomainError> {
        let request = SnapshotRequest {
            data_center_id: DataCenterId::new(self.data_center_id),
            volume_id: VolumeId::new(self.volume_id),
            name: self.name.trim().to_owned(),
            description: self
                .description
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
        };
        if request.data_center_id.is_empty() {
            return Err(DomainError::Validation(String::from("data_center_id")));
        }
        if request.volume_id.is_empty() {
            return Err(DomainError::Validation(String::from("volume_id")));
        }
        if request.name.is_empty() {
            return Err(DomainError::Validation(String::from("name")));
        }
        Ok(request)
    }
}

/// Partial update of a snapshot's user-controlled attributes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SnapshotUpdate {
    /// Snapshot to update.
    pub id: SnapshotId,
    /// New name, when changing it.
    pub name: Option<String>,
    /// New description, when changing it.
    pub description: Option<String>,
}

impl SnapshotUpdate {
    /// Starts an update for the given snapshot.
    #[must_use]
    pub fn new(id: impl Into<SnapshotId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
        }
    }

    /// Renames the snapshot.
    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = Some(value.into().trim().to_owned());
        self
    }

    /// Replaces the snapshot description.
    #[must_use]
    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into().trim().to_owned());
        self
    }

    /// Checks that the update targets a snapshot and changes something.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when the id is blank, a new name
    /// is blank, or nothing would change.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.is_empty() {
            return Err(DomainError::Validation(String::from("id")));
        }
        if self.name.as_deref().is_some_and(str::is_empty) {
            return Err(DomainError::Validation(String::from("name")));
        }
        if self.name.is_none() && self.description.is_none() {
            return Err(DomainError::EmptyUpdate(self.id.to_string()));
        }
        Ok(())
    }
}
