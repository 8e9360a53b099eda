//! Resource-provider registration metadata.
//!
//! Providers publish, per resource type, where it can be deployed and which
//! API versions serve it. Either list may be `null` or missing on the wire;
//! both normalise to empty lists.

use serde::{Deserialize, Deserializer, Serialize};

use super::DomainError;

/// Registration metadata for one resource type.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", try_from = "WireProviderMetaData")]
pub struct ResourceProviderMetaData {
    resource_type: String,
    locations: Vec<String>,
    api_versions: Vec<String>,
}

impl ResourceProviderMetaData {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> ResourceProviderMetaDataBuilder {
        ResourceProviderMetaDataBuilder::default()
    }

    /// Returns a builder pre-populated with this record's values.
    #[must_use]
    pub fn to_builder(&self) -> ResourceProviderMetaDataBuilder {
        ResourceProviderMetaDataBuilder {
            resource_type: Some(self.resource_type.clone()),
            locations: Some(self.locations.clone()),
            api_versions: Some(self.api_versions.clone()),
        }
    }

    /// Resource type name, for example `virtualMachines`.
    #[must_use]
    pub const fn resource_type(&self) -> &str {
        self.resource_type.as_str()
    }

    /// Locations where the resource type is offered.
    #[must_use]
    pub const fn locations(&self) -> &[String] {
        self.locations.as_slice()
    }

    /// API versions serving the resource type.
    #[must_use]
    pub const fn api_versions(&self) -> &[String] {
        self.api_versions.as_slice()
    }

    /// Returns `true` when the resource type is offered in `location`,
    /// ignoring case and spaces the way provider location names vary.
    #[must_use]
    pub fn is_offered_in(&self, location: &str) -> bool {
        let wanted = normalise_location(location);
        self.locations
            .iter()
            .any(|candidate| normalise_location(candidate) == wanted)
    }
}

fn normalise_location(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Builder for [`ResourceProviderMetaData`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResourceProviderMetaDataBuilder {
    resource_type: Option<String>,
    locations: Option<Vec<String>>,
    api_versions: Option<Vec<String>>,
}

impl ResourceProviderMetaDataBuilder {
    /// Sets the resource type name.
    #[must_use]
    pub fn resource_type(mut self, value: impl Into<String>) -> Self {
        self.resource_type = Some(value.into());
        self
    }

    /// Sets the offered locations; `None` means "no locations".
    #[must_use]
    pub fn locations(mut self, value: Option<Vec<String>>) -> Self {
        self.locations = value;
        self
    }

    /// Sets the supported API versions; `None` means "no versions".
    #[must_use]
    pub fn api_versions(mut self, value: Option<Vec<String>>) -> Self {
        self.api_versions = value;
        self
    }

    /// Builds the record, defaulting missing lists to empty. An empty
    /// resource type is kept as reported.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when the resource type was never
    /// set.
    pub fn build(self) -> Result<ResourceProviderMetaData, DomainError> {
        let resource_type = self
            .resource_type
            .ok_or_else(|| DomainError::Validation(String::from("resource_type")))?;
        Ok(ResourceProviderMetaData {
            resource_type,
            locations: self.locations.unwrap_or_default(),
            api_versions: self.api_versions.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProviderMetaData {
    #[serde(default)]
    resource_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    locations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    api_versions: Vec<String>,
}

impl TryFrom<WireProviderMetaData> for ResourceProviderMetaData {
    type Error = DomainError;

    fn try_from(value: WireProviderMetaData) -> Result<Self, Self::Error> {
        ResourceProviderMetaDataBuilder {
            resource_type: value.resource_type,
            locations: Some(value.locations),
            api_versions: Some(value.api_versions),
        }
        .build()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
