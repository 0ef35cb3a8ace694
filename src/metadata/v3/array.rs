use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{
    array::{ArrayShape, DimensionName},
    metadata::{FillValueMetadata, Metadata},
};

/// Zarr array metadata (storage specification v3).
///
/// An example `JSON` document for a Zarr V3 array:
/// ```json
/// {
///     "zarr_format": 3,
///     "node_type": "array",
///     "shape": [10000, 1000],
///     "dimension_names": ["rows", "columns"],
///     "data_type": "float64",
///     "chunk_grid": {
///         "name": "regular",
///         "configuration": {
///             "chunk_shape": [1000, 100]
///         }
///     },
///     "chunk_key_encoding": {
///         "name": "default",
///         "configuration": {
///             "separator": "/"
///         }
///     },
///     "codecs": [{
///         "name": "bytes",
///         "configuration": {
///             "endian": "little"
///         }
///     }, {
///         "name": "gzip",
///         "configuration": {
///             "level": 1
///         }
///     }],
///     "fill_value": "NaN",
///     "attributes": {
///         "foo": 42,
///         "bar": "apples",
///         "baz": [1, 2, 3, 4]
///     }
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ArrayMetadataV3 {
    /// An integer defining the version of the storage specification to which the array adheres. Must be `3`.
    pub zarr_format: monostate::MustBe!(3u64),
    /// A string defining the type of hierarchy node element, must be `array` here.
    pub node_type: monostate::MustBe!("array"),
    /// An array of integers providing the length of each dimension of the Zarr array.
    pub shape: ArrayShape,
    /// The data type of the Zarr array.
    pub data_type: Metadata,
    /// The chunk grid of the Zarr array.
    pub chunk_grid: Metadata,
    /// The mapping from chunk grid cell coordinates to keys in the underlying store.
    pub chunk_key_encoding: Metadata,
    /// Provides an element value to use for uninitialised portions of the Zarr array.
    ///
    /// Suitable values are dependent on the data type, see [`FillValueMetadata`].
    pub fill_value: FillValueMetadata,
    /// Specifies a list of codecs to be used for encoding and decoding chunks.
    pub codecs: Vec<Metadata>,
    /// Optional user defined attributes.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    /// An optional list of dimension names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_names: Option<Vec<DimensionName>>,
}

impl ArrayMetadataV3 {
    /// Create new array metadata.
    #[must_use]
    pub fn new(
        shape: ArrayShape,
        data_type: Metadata,
        chunk_grid: Metadata,
        chunk_key_encoding: Metadata,
        fill_value: FillValueMetadata,
        codecs: Vec<Metadata>,
    ) -> Self {
        Self {
            zarr_format: monostate::MustBe!(3u64),
            node_type: monostate::MustBe!("array"),
            shape,
            data_type,
            chunk_grid,
            chunk_key_encoding,
            fill_value,
            codecs,
            attributes: serde_json::Map::default(),
            dimension_names: None,
        }
    }

    /// Set the user attributes.
    #[must_use]
    pub fn with_attributes(
        mut self,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the dimension names.
    #[must_use]
    pub fn with_dimension_names(mut self, dimension_names: Option<Vec<DimensionName>>) -> Self {
        self.dimension_names = dimension_names;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_ARRAY: &str = r#"{
        "zarr_format": 3,
        "node_type": "array",
        "shape": [10000, 1000],
        "dimension_names": ["rows", null],
        "data_type": "float64",
        "chunk_grid": {
            "name": "regular",
            "configuration": {
                "chunk_shape": [1000, 100]
            }
        },
        "chunk_key_encoding": {
            "name": "default",
            "configuration": {
                "separator": "/"
            }
        },
        "codecs": [{
            "name": "bytes",
            "configuration": {
                "endian": "little"
            }
        }],
        "fill_value": "NaN",
        "attributes": {
            "foo": 42
        }
    }"#;

    #[test]
    fn array_metadata_v3() {
        let metadata: ArrayMetadataV3 = serde_json::from_str(JSON_ARRAY).unwrap();
        assert_eq!(metadata.shape, vec![10000, 1000]);
        assert_eq!(metadata.data_type.name(), "float64");
        assert_eq!(metadata.codecs.len(), 1);
        assert_eq!(
            metadata.dimension_names,
            Some(vec![DimensionName::new("rows"), DimensionName::default()])
        );
        let reparsed: ArrayMetadataV3 =
            serde_json::from_str(&serde_json::to_string(&metadata).unwrap()).unwrap();
        assert_eq!(metadata, reparsed);
    }

    #[test]
    fn array_metadata_v3_wrong_format() {
        let json = JSON_ARRAY.replace(r#""zarr_format": 3"#, r#""zarr_format": 4"#);
        assert!(serde_json::from_str::<ArrayMetadataV3>(&json).is_err());
        let json = JSON_ARRAY.replace(r#""node_type": "array""#, r#""node_type": "group""#);
        assert!(serde_json::from_str::<ArrayMetadataV3>(&json).is_err());
    }
}
