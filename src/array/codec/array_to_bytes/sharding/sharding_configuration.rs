use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use crate::{array::ChunkShape, metadata::Metadata};

/// A wrapper to handle various versions of `sharding_indexed` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display, From)]
#[serde(untagged)]
pub enum ShardingCodecConfiguration {
    /// Version 1.0.
    V1(ShardingCodecConfigurationV1),
}

/// `sharding_indexed` codec configuration parameters (version 1.0).
///
/// See <https://zarr-specs.readthedocs.io/en/latest/v3/codecs/sharding-indexed/v1.0.html#configuration-parameters>.
///
/// ### Example: inner chunks compressed with gzip and a checksummed index at the end
/// ```json
/// {
///     "chunk_shape": [32, 32],
///     "codecs": [
///         { "name": "bytes", "configuration": { "endian": "little" } },
///         { "name": "gzip", "configuration": { "level": 1 } }
///     ],
///     "index_codecs": [
///         { "name": "bytes", "configuration": { "endian": "little" } },
///         { "name": "crc32c" }
///     ],
///     "index_location": "end"
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ShardingCodecConfigurationV1 {
    /// The shape of the inner chunks in a shard along each dimension of the outer array.
    pub chunk_shape: ChunkShape,
    /// The codecs used to encode and decode inner chunks.
    pub codecs: Vec<Metadata>,
    /// The codecs used to encode and decode the shard index.
    pub index_codecs: Vec<Metadata>,
    /// Specifies whether the shard index is located at the beginning or end of the shard.
    #[serde(default)]
    pub index_location: ShardingIndexLocation,
}

/// The location of the shard index within a shard.
#[derive(Serialize, Deserialize, Copy, Clone, Eq, PartialEq, Debug, Default, Display)]
#[serde(rename_all = "lowercase")]
pub enum ShardingIndexLocation {
    /// The index is at the start of the shard, before the inner chunks.
    #[display("start")]
    Start,
    /// The index is at the end of the shard, after the inner chunks.
    #[default]
    #[display("end")]
    End,
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "chunk_shape": [2, 2],
        "codecs": [
            {
                "name": "bytes",
                "configuration": {
                    "endian": "little"
                }
            }
        ],
        "index_codecs": [
            {
                "name": "bytes",
                "configuration": {
                    "endian": "little"
                }
            }
        ]
    }"#;

    #[test]
    fn codec_sharding_configuration() {
        let configuration = serde_json::from_str::<ShardingCodecConfiguration>(JSON).unwrap();
        let ShardingCodecConfiguration::V1(configuration) = configuration;
        assert_eq!(configuration.index_location, ShardingIndexLocation::End);
        assert_eq!(configuration.chunk_shape.to_array_shape(), vec![2, 2]);
    }

    #[test]
    fn codec_sharding_configuration_index_location() {
        let json = JSON.replace(r#""chunk_shape""#, r#""index_location": "start", "chunk_shape""#);
        let ShardingCodecConfiguration::V1(configuration) =
            serde_json::from_str::<ShardingCodecConfiguration>(&json).unwrap();
        assert_eq!(configuration.index_location, ShardingIndexLocation::Start);

        let json = JSON.replace(r#""chunk_shape""#, r#""index_location": "middle", "chunk_shape""#);
        assert!(serde_json::from_str::<ShardingCodecConfiguration>(&json).is_err());
    }

    #[test]
    fn codec_sharding_configuration_zero_chunk_shape() {
        let json = JSON.replace("[2, 2]", "[0, 2]");
        assert!(serde_json::from_str::<ShardingCodecConfiguration>(&json).is_err());
    }
}
