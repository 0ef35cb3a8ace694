use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::array::{chunk_key_encoding::ChunkKeySeparator, ArrayShape, ChunkShape, Endianness};

/// Zarr array metadata (storage specification v2).
///
/// An example `JSON` document for a Zarr V2 array:
/// ```json
/// {
///     "chunks": [
///         1000,
///         1000
///     ],
///     "compressor": {
///         "id": "blosc",
///         "cname": "lz4",
///         "clevel": 5,
///         "shuffle": 1
///     },
///     "dtype": "<f8",
///     "fill_value": "NaN",
///     "filters": null,
///     "order": "C",
///     "shape": [
///         10000,
///         10000
///     ],
///     "zarr_format": 2
/// }
/// ```
///
/// The attributes are not part of the `.zarray` document, they are stored in `.zattrs`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ArrayMetadataV2 {
    /// An integer defining the version of the storage specification to which the array adheres. Must be `2`.
    pub zarr_format: monostate::MustBe!(2u64),
    /// An array of integers providing the length of each dimension of the Zarr array.
    pub shape: ArrayShape,
    /// A list of integers defining the length of each dimension of a chunk of the array.
    pub chunks: ChunkShape,
    /// The data type of the Zarr array, e.g. `"<f8"`.
    pub dtype: String,
    /// A JSON object identifying the primary compression codec and providing configuration parameters, or null if no compressor is to be used.
    pub compressor: Option<MetadataV2>,
    /// A scalar value providing the default value to use for uninitialized portions of the array, or null if no fill value is to be used.
    pub fill_value: FillValueMetadataV2,
    /// Either “C” or “F”, defining the layout of bytes within each chunk of the array.
    pub order: ArrayMetadataV2Order,
    /// A list of JSON objects providing codec configurations, or null if no filters are to be applied.
    #[serde(default)]
    pub filters: Option<Vec<MetadataV2>>,
    /// If present, either the string "." or "/" defining the separator placed between the dimensions of a chunk.
    #[serde(default = "chunk_key_separator_default_zarr_v2")]
    pub dimension_separator: ChunkKeySeparator,
    /// Optional user defined attributes, stored in `.zattrs`.
    #[serde(skip)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

const fn chunk_key_separator_default_zarr_v2() -> ChunkKeySeparator {
    ChunkKeySeparator::Dot
}

/// Zarr V2 codec metadata, an `id` and configuration fields.
///
/// For example:
/// ```json
/// {
///     "id": "blosc",
///     "cname": "lz4",
///     "clevel": 5,
///     "shuffle": 1
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct MetadataV2 {
    id: String,
    #[serde(flatten)]
    configuration: serde_json::Map<String, serde_json::Value>,
}

impl MetadataV2 {
    /// Create Zarr V2 codec metadata from an `id` and `configuration`.
    #[must_use]
    pub fn new(id: &str, configuration: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            id: id.to_string(),
            configuration,
        }
    }

    /// Return the "id" key.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the configuration, which includes all fields excluding the "id".
    #[must_use]
    pub const fn configuration(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.configuration
    }
}

/// A Zarr V2 invalid data type endianness error.
#[derive(Debug, Error)]
#[error("invalid V2 data type {_0:?}, must begin with |, < or >")]
pub struct DataTypeMetadataV2InvalidEndiannessError(String);

/// Get the endianness of a Zarr V2 data type.
///
/// Returns [`None`] for single byte data types (`|` prefix).
///
/// # Errors
/// Returns a [`DataTypeMetadataV2InvalidEndiannessError`] if the endianness prefix is invalid.
pub fn data_type_metadata_v2_to_endianness(
    data_type: &str,
) -> Result<Option<Endianness>, DataTypeMetadataV2InvalidEndiannessError> {
    let invalid = || DataTypeMetadataV2InvalidEndiannessError(data_type.to_string());
    match data_type.chars().next().ok_or_else(invalid)? {
        '|' => Ok(None),
        prefix => Endianness::from_v2_prefix(prefix).map(Some).ok_or_else(invalid),
    }
}

/// A scalar value providing the default value to use for uninitialized portions of the array, or null if no fill value is to be used.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FillValueMetadataV2 {
    /// No fill value.
    Null,
    /// NaN (not-a-number).
    NaN,
    /// Positive infinity.
    Infinity,
    /// Negative infinity.
    NegInfinity,
    /// A number.
    Number(serde_json::Number),
    /// A boolean.
    Bool(bool),
}

impl<'de> Deserialize<'de> for FillValueMetadataV2 {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum FillValueMetadataV2Type {
            String(String),
            Number(serde_json::Number),
            Bool(bool),
            Null,
        }
        let fill_value = FillValueMetadataV2Type::deserialize(d)?;
        match fill_value {
            FillValueMetadataV2Type::String(string) => match string.as_str() {
                "NaN" => Ok(Self::NaN),
                "Infinity" => Ok(Self::Infinity),
                "-Infinity" => Ok(Self::NegInfinity),
                _ => Err(serde::de::Error::custom("unsupported fill value")),
            },
            FillValueMetadataV2Type::Number(number) => Ok(Self::Number(number)),
            FillValueMetadataV2Type::Bool(bool) => Ok(Self::Bool(bool)),
            FillValueMetadataV2Type::Null => Ok(Self::Null),
        }
    }
}

impl Serialize for FillValueMetadataV2 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::NaN => serializer.serialize_str("NaN"),
            Self::Infinity => serializer.serialize_str("Infinity"),
            Self::NegInfinity => serializer.serialize_str("-Infinity"),
            Self::Number(number) => number.serialize(serializer),
            Self::Bool(bool) => serializer.serialize_bool(*bool),
        }
    }
}

/// The layout of bytes within each chunk of the array.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArrayMetadataV2Order {
    /// Row-major order. The last dimension varies fastest.
    C,
    /// Column-major order. The first dimension varies fastest.
    F,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_metadata_v2() {
        let json = r#"{
            "chunks": [1000, 1000],
            "compressor": {"id": "blosc", "cname": "lz4", "clevel": 5, "shuffle": 1},
            "dtype": "<f8",
            "fill_value": "NaN",
            "filters": null,
            "order": "C",
            "shape": [10000, 10000],
            "zarr_format": 2
        }"#;
        let metadata: ArrayMetadataV2 = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.chunks, ChunkShape::try_from(vec![1000, 1000]).unwrap());
        assert_eq!(metadata.dimension_separator, ChunkKeySeparator::Dot);
        assert_eq!(metadata.fill_value, FillValueMetadataV2::NaN);
        assert_eq!(metadata.compressor.as_ref().unwrap().id(), "blosc");
        assert_eq!(
            metadata.compressor.as_ref().unwrap().configuration()["clevel"],
            5
        );
        assert_eq!(
            data_type_metadata_v2_to_endianness(&metadata.dtype).unwrap(),
            Some(Endianness::Little)
        );
        assert!(data_type_metadata_v2_to_endianness("f8").is_err());
        assert!(serde_json::from_str::<ArrayMetadataV2>(&json.replace("2\n", "3\n")).is_err());
    }

    #[test]
    fn fill_value_metadata_v2() {
        let parse = |json: &str| serde_json::from_str::<FillValueMetadataV2>(json).unwrap();
        assert_eq!(parse("null"), FillValueMetadataV2::Null);
        assert_eq!(parse(r#""-Infinity""#), FillValueMetadataV2::NegInfinity);
        assert_eq!(parse("true"), FillValueMetadataV2::Bool(true));
        assert_eq!(parse("0"), FillValueMetadataV2::Number(0.into()));
        assert!(serde_json::from_str::<FillValueMetadataV2>(r#""abc""#).is_err());
        assert_eq!(
            serde_json::to_string(&FillValueMetadataV2::Null).unwrap(),
            "null"
        );
    }
}
