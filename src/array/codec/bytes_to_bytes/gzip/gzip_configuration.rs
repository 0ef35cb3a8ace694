use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A wrapper to handle various versions of `gzip` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display, From)]
#[serde(untagged)]
pub enum GzipCodecConfiguration {
    /// Version 1.0.
    V1(GzipCodecConfigurationV1),
}

/// Configuration parameters for the `gzip` codec (version 1.0).
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct GzipCodecConfigurationV1 {
    /// The compression level.
    pub level: GzipCompressionLevel,
}

impl GzipCodecConfigurationV1 {
    /// Create a new `gzip` codec configuration given a [`GzipCompressionLevel`].
    #[must_use]
    pub const fn new(level: GzipCompressionLevel) -> Self {
        Self { level }
    }
}

/// A `gzip` compression level. An integer from 0 to 9.
#[derive(Serialize, Copy, Clone, Eq, PartialEq, Debug)]
pub struct GzipCompressionLevel(u32);

/// An invalid `gzip` compression level.
#[derive(Debug, Error)]
#[error("invalid gzip compression level {_0}, must be 0-9")]
pub struct GzipCompressionLevelError(u32);

impl TryFrom<u32> for GzipCompressionLevel {
    type Error = GzipCompressionLevelError;

    fn try_from(level: u32) -> Result<Self, Self::Error> {
        if level <= 9 {
            Ok(Self(level))
        } else {
            Err(GzipCompressionLevelError(level))
        }
    }
}

impl<'de> serde::Deserialize<'de> for GzipCompressionLevel {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let level = u32::deserialize(d)?;
        Self::try_from(level).map_err(serde::de::Error::custom)
    }
}

impl GzipCompressionLevel {
    /// Return the compression level as a [`u32`].
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_gzip_configuration_valid() {
        const JSON_VALID: &str = r#"{
            "level": 1
        }"#;
        let configuration = serde_json::from_str::<GzipCodecConfiguration>(JSON_VALID).unwrap();
        assert_eq!(configuration.to_string(), r#"{"level":1}"#);
    }

    #[test]
    fn codec_gzip_configuration_invalid1() {
        const JSON_INVALID1: &str = r#"{
            "level": -1
        }"#;
        assert!(serde_json::from_str::<GzipCodecConfiguration>(JSON_INVALID1).is_err());
    }

    #[test]
    fn codec_gzip_configuration_invalid2() {
        const JSON_INVALID2: &str = r#"{
            "level": 10
        }"#;
        assert!(serde_json::from_str::<GzipCodecConfiguration>(JSON_INVALID2).is_err());
    }

    #[test]
    fn codec_gzip_configuration_invalid3() {
        const JSON_INVALID3: &str = r#"{
            "level": 1,
            "unknown": true
        }"#;
        assert!(serde_json::from_str::<GzipCodecConfiguration>(JSON_INVALID3).is_err());
    }
}
