//! Zarr metadata.
//!
//! This module holds the serde representations of Zarr V3 ([`v3`]) and Zarr V2 ([`v2`]) array and group metadata documents,
//! and the conversion of Zarr V2 array metadata to the Zarr V3 model ([`array_metadata_v2_to_v3`]).
//!
//! The [`Metadata`] structure represents most extension point fields of array metadata, which are structured as JSON with a name and optional configuration, or just a string representing the name.
//! It provides convenience functions for converting metadata to and from a configuration specific to each:
//!  - [data type](`crate::array::DataType`),
//!  - [chunk grid][`crate::array::chunk_grid`]
//!  - [chunk key encoding](`crate::array::chunk_key_encoding`), and
//!  - [codec](`crate::array::codec`).

pub mod v2;
mod v2_to_v3;
pub mod v3;

use derive_more::{Display, From};
use serde::{de::DeserializeOwned, ser::SerializeMap, Deserialize, Serialize};
use thiserror::Error;

pub use v2::{ArrayMetadataV2, GroupMetadataV2};
pub use v2_to_v3::{
    array_metadata_v2_to_v3, codec_metadata_v2_to_v3, ArrayMetadataV2ToV3ConversionError,
};
pub use v3::{fill_value::FillValueMetadata, ArrayMetadataV3, GroupMetadataV3};

/// Metadata with a name and optional configuration.
///
/// Can be deserialised from a JSON string or name/configuration map.
/// For example:
/// ```json
/// "bytes"
/// ```
/// or
/// ```json
/// {
///     "name": "bytes",
/// }
/// ```
/// or
/// ```json
/// {
///     "name": "bytes",
///     "configuration": {
///       "endian": "little"
///     }
/// }
/// ```
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Metadata {
    name: String,
    configuration: Option<MetadataConfiguration>,
}

/// Configuration metadata.
pub type MetadataConfiguration = serde_json::Map<String, serde_json::Value>;

impl TryFrom<&str> for Metadata {
    type Error = serde_json::Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        serde_json::from_str(s)
    }
}

impl core::fmt::Display for Metadata {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(configuration) = &self.configuration {
            write!(
                f,
                "{} {}",
                self.name,
                serde_json::to_string(configuration).unwrap_or_default()
            )
        } else {
            write!(f, "{}", self.name)
        }
    }
}

impl Serialize for Metadata {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if let Some(configuration) = &self.configuration {
            let mut s = s.serialize_map(Some(2))?;
            s.serialize_entry("name", &self.name)?;
            s.serialize_entry("configuration", configuration)?;
            s.end()
        } else {
            s.serialize_str(self.name.as_str())
        }
    }
}

impl<'de> Deserialize<'de> for Metadata {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct MetadataNameConfiguration {
            name: String,
            #[serde(default)]
            configuration: Option<MetadataConfiguration>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum MetadataIntermediate {
            Name(String),
            NameConfiguration(MetadataNameConfiguration),
        }

        let metadata = MetadataIntermediate::deserialize(d).map_err(|_| {
            serde::de::Error::custom(r#"Expected metadata "<name>" or {"name":"<name>"} or {"name":"<name>","configuration":{}}"#)
        })?;
        match metadata {
            MetadataIntermediate::Name(name) => Ok(Self {
                name,
                configuration: None,
            }),
            MetadataIntermediate::NameConfiguration(metadata) => Ok(Self {
                name: metadata.name,
                configuration: metadata.configuration,
            }),
        }
    }
}

impl Metadata {
    /// Create metadata from `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            configuration: None,
        }
    }

    /// Create metadata from `name` and `configuration`.
    #[must_use]
    pub fn new_with_configuration(name: &str, configuration: MetadataConfiguration) -> Self {
        Self {
            name: name.into(),
            configuration: Some(configuration),
        }
    }

    /// Convert a serializable configuration to [`Metadata`].
    ///
    /// # Errors
    /// Returns [`serde_json::Error`] if `configuration` cannot be converted to [`Metadata`].
    pub fn new_with_serializable_configuration<TConfiguration: Serialize>(
        name: &str,
        configuration: &TConfiguration,
    ) -> Result<Self, serde_json::Error> {
        let configuration = serde_json::to_value(configuration)?;
        if let serde_json::Value::Object(configuration) = configuration {
            Ok(Self::new_with_configuration(name, configuration))
        } else {
            Err(serde::ser::Error::custom(
                "the configuration cannot be serialized to a JSON struct",
            ))
        }
    }

    /// Try and convert [`Metadata`] to a serializable configuration.
    ///
    /// A missing configuration is treated as an empty configuration.
    ///
    /// # Errors
    /// Returns a [`ConfigurationInvalidError`] if the metadata cannot be converted.
    pub fn to_configuration<TConfiguration: DeserializeOwned>(
        &self,
    ) -> Result<TConfiguration, ConfigurationInvalidError> {
        let configuration = self.configuration.clone().unwrap_or_default();
        serde_json::from_value(serde_json::Value::Object(configuration))
            .map_err(|_| ConfigurationInvalidError::new(&self.name, self.configuration.clone()))
    }

    /// Returns the metadata name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the metadata configuration.
    #[must_use]
    pub const fn configuration(&self) -> Option<&MetadataConfiguration> {
        self.configuration.as_ref()
    }

    /// Returns true if the configuration is none or an empty map.
    #[must_use]
    pub fn configuration_is_none_or_empty(&self) -> bool {
        self.configuration
            .as_ref()
            .map_or(true, serde_json::Map::is_empty)
    }
}

/// An invalid configuration error.
#[derive(Debug, Error, From)]
#[error("{name} is unsupported, configuration: {configuration:?}")]
pub struct ConfigurationInvalidError {
    name: String,
    configuration: Option<MetadataConfiguration>,
}

impl ConfigurationInvalidError {
    /// Create a new invalid configuration error.
    #[must_use]
    pub fn new(name: &str, configuration: Option<MetadataConfiguration>) -> Self {
        Self {
            name: name.to_string(),
            configuration,
        }
    }

    /// Return the name of the invalid configuration.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Zarr array metadata (V2 or V3).
#[derive(Deserialize, Serialize, Clone, PartialEq, Debug, Display, From)]
#[serde(untagged)]
pub enum ArrayMetadata {
    /// Zarr Version 3.
    V3(ArrayMetadataV3),
    /// Zarr Version 2.
    V2(ArrayMetadataV2),
}

impl ArrayMetadata {
    /// Returns the array shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        match self {
            Self::V3(metadata) => &metadata.shape,
            Self::V2(metadata) => &metadata.shape,
        }
    }

    /// Returns the user attributes.
    #[must_use]
    pub fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        match self {
            Self::V3(metadata) => &metadata.attributes,
            Self::V2(metadata) => &metadata.attributes,
        }
    }

    /// Returns the Zarr format version (2 or 3).
    #[must_use]
    pub const fn zarr_format(&self) -> u64 {
        match self {
            Self::V3(_) => 3,
            Self::V2(_) => 2,
        }
    }
}

/// Zarr group metadata (V2 or V3).
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq, Debug, Display, From)]
#[serde(untagged)]
pub enum GroupMetadata {
    /// Zarr Version 3.
    V3(GroupMetadataV3),
    /// Zarr Version 2.
    V2(GroupMetadataV2),
}

impl Default for GroupMetadata {
    fn default() -> Self {
        Self::V3(GroupMetadataV3::default())
    }
}

impl GroupMetadata {
    /// Returns the user attributes.
    #[must_use]
    pub fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        match self {
            Self::V3(metadata) => &metadata.attributes,
            Self::V2(metadata) => &metadata.attributes,
        }
    }

    /// Returns the Zarr format version (2 or 3).
    #[must_use]
    pub const fn zarr_format(&self) -> u64 {
        match self {
            Self::V3(_) => 3,
            Self::V2(_) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_name_only() {
        let metadata = Metadata::try_from(r#""bytes""#).unwrap();
        assert_eq!(metadata.name(), "bytes");
        assert!(metadata.configuration_is_none_or_empty());
        assert_eq!(serde_json::to_string(&metadata).unwrap(), r#""bytes""#);
        assert_eq!(metadata.to_string(), "bytes");
    }

    #[test]
    fn metadata_name_configuration() {
        let json = r#"{"name":"bytes","configuration":{"endian":"little"}}"#;
        let metadata = Metadata::try_from(json).unwrap();
        assert_eq!(metadata.name(), "bytes");
        assert_eq!(serde_json::to_string(&metadata).unwrap(), json);
        assert_eq!(metadata.to_string(), r#"bytes {"endian":"little"}"#);
    }

    #[test]
    fn metadata_invalid() {
        assert!(Metadata::try_from(r#"{"name":"bytes","unknown":{}}"#).is_err());
        assert!(Metadata::try_from("1").is_err());
    }

    #[test]
    fn metadata_to_configuration() {
        #[derive(Deserialize, Serialize, Debug)]
        #[serde(deny_unknown_fields)]
        struct Configuration {
            level: u32,
        }
        let metadata =
            Metadata::new_with_serializable_configuration("gzip", &Configuration { level: 5 })
                .unwrap();
        assert_eq!(metadata.to_configuration::<Configuration>().unwrap().level, 5);
        let err = Metadata::new("gzip")
            .to_configuration::<Configuration>()
            .unwrap_err();
        assert_eq!(err.name(), "gzip");
    }
}
