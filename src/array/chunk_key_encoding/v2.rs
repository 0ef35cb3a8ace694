//! The `v2` chunk key encoding.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{
    array::chunk_key_encoding::ChunkKeyEncodingPlugin,
    metadata::Metadata,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
    storage::StoreKey,
};

use super::{ChunkKeyEncoding, ChunkKeyEncodingTraits, ChunkKeySeparator};

/// The identifier for the `v2` chunk key encoding.
pub const IDENTIFIER: &str = "v2";

// Register the chunk key encoding.
inventory::submit! {
    ChunkKeyEncodingPlugin::new(IDENTIFIER, is_name_v2, create_chunk_key_encoding_v2)
}

fn is_name_v2(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

fn create_chunk_key_encoding_v2(
    metadata: &Metadata,
) -> Result<ChunkKeyEncoding, PluginCreateError> {
    let configuration: V2ChunkKeyEncodingConfiguration =
        metadata.to_configuration().map_err(|_| {
            PluginMetadataInvalidError::new(IDENTIFIER, "chunk key encoding", metadata.clone())
        })?;
    Ok(V2ChunkKeyEncoding::new(configuration.separator).into())
}

/// Configuration parameters for a `v2` chunk key encoding.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct V2ChunkKeyEncodingConfiguration {
    /// The chunk key separator.
    #[serde(default = "v2_separator")]
    pub separator: ChunkKeySeparator,
}

const fn v2_separator() -> ChunkKeySeparator {
    ChunkKeySeparator::Dot
}

/// A `v2` chunk key encoding.
///
/// The key for a chunk with grid index (k, j, i, …) is formed by joining the ASCII decimal string representation of each index with the separator.
/// The key of the chunk of a zero-dimensional array is `0`.
#[derive(Debug, Clone)]
pub struct V2ChunkKeyEncoding {
    separator: ChunkKeySeparator,
}

impl V2ChunkKeyEncoding {
    /// Create a new `v2` chunk key encoding with separator `separator`.
    #[must_use]
    pub const fn new(separator: ChunkKeySeparator) -> Self {
        Self { separator }
    }

    /// Create a new `v2` chunk key encoding with separator `.`.
    #[must_use]
    pub const fn new_dot() -> Self {
        Self::new(ChunkKeySeparator::Dot)
    }

    /// Create a new `v2` chunk key encoding with separator `/`.
    #[must_use]
    pub const fn new_slash() -> Self {
        Self::new(ChunkKeySeparator::Slash)
    }
}

impl Default for V2ChunkKeyEncoding {
    /// Create a `v2` chunk key encoding with default separator: `.`.
    fn default() -> Self {
        Self::new(v2_separator())
    }
}

impl ChunkKeyEncodingTraits for V2ChunkKeyEncoding {
    fn create_metadata(&self) -> Metadata {
        let configuration = V2ChunkKeyEncodingConfiguration {
            separator: self.separator,
        };
        Metadata::new_with_serializable_configuration(IDENTIFIER, &configuration).unwrap()
    }

    fn encode(&self, chunk_grid_indices: &[u64]) -> StoreKey {
        if chunk_grid_indices.is_empty() {
            StoreKey::new_unchecked("0")
        } else {
            StoreKey::new_unchecked(self.separator.join(chunk_grid_indices))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{node::NodePath, storage::data_key};

    use super::*;

    #[test]
    fn slash_nd() {
        let key = data_key(
            &NodePath::root(),
            &[1, 23, 45],
            &V2ChunkKeyEncoding::new_slash().into(),
        );
        assert_eq!(key, StoreKey::new("1/23/45").unwrap());
    }

    #[test]
    fn dot_nd() {
        let key = data_key(
            &NodePath::new("/group/array").unwrap(),
            &[1, 23, 45],
            &V2ChunkKeyEncoding::new_dot().into(),
        );
        assert_eq!(key, StoreKey::new("group/array/1.23.45").unwrap());
    }

    #[test]
    fn scalar() {
        let key = data_key(&NodePath::root(), &[], &V2ChunkKeyEncoding::default().into());
        assert_eq!(key, StoreKey::new("0").unwrap());
    }
}
