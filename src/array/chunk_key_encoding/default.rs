//! The `default` chunk key encoding.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{
    array::chunk_key_encoding::ChunkKeyEncodingPlugin,
    metadata::Metadata,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
    storage::StoreKey,
};

use super::{ChunkKeyEncoding, ChunkKeyEncodingTraits, ChunkKeySeparator};

/// The identifier for the `default` chunk key encoding.
pub const IDENTIFIER: &str = "default";

// Register the chunk key encoding.
inventory::submit! {
    ChunkKeyEncodingPlugin::new(IDENTIFIER, is_name_default, create_chunk_key_encoding_default)
}

fn is_name_default(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

fn create_chunk_key_encoding_default(
    metadata: &Metadata,
) -> Result<ChunkKeyEncoding, PluginCreateError> {
    let configuration: DefaultChunkKeyEncodingConfiguration =
        metadata.to_configuration().map_err(|_| {
            PluginMetadataInvalidError::new(IDENTIFIER, "chunk key encoding", metadata.clone())
        })?;
    Ok(DefaultChunkKeyEncoding::new(configuration.separator).into())
}

/// Configuration parameters for a `default` chunk key encoding.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct DefaultChunkKeyEncodingConfiguration {
    /// The chunk key separator.
    #[serde(default = "default_separator")]
    pub separator: ChunkKeySeparator,
}

const fn default_separator() -> ChunkKeySeparator {
    ChunkKeySeparator::Slash
}

/// A `default` chunk key encoding.
///
/// The key for a chunk with grid index (k, j, i, …) is formed by taking the initial prefix c, and appending for each dimension:
/// - the separator character, followed by,
/// - the ASCII decimal string representation of the chunk index within that dimension.
///
/// The key of the chunk of a zero-dimensional array is `c`.
#[derive(Debug, Clone)]
pub struct DefaultChunkKeyEncoding {
    separator: ChunkKeySeparator,
}

impl DefaultChunkKeyEncoding {
    /// Create a new `default` chunk key encoding with separator `separator`.
    #[must_use]
    pub const fn new(separator: ChunkKeySeparator) -> Self {
        Self { separator }
    }

    /// Create a new `default` chunk key encoding with separator `.`.
    #[must_use]
    pub const fn new_dot() -> Self {
        Self::new(ChunkKeySeparator::Dot)
    }

    /// Create a new `default` chunk key encoding with separator `/`.
    #[must_use]
    pub const fn new_slash() -> Self {
        Self::new(ChunkKeySeparator::Slash)
    }
}

impl Default for DefaultChunkKeyEncoding {
    /// Create a `default` chunk key encoding with default separator: `/`.
    fn default() -> Self {
        Self::new(default_separator())
    }
}

impl ChunkKeyEncodingTraits for DefaultChunkKeyEncoding {
    fn create_metadata(&self) -> Metadata {
        let configuration = DefaultChunkKeyEncodingConfiguration {
            separator: self.separator,
        };
        Metadata::new_with_serializable_configuration(IDENTIFIER, &configuration).unwrap()
    }

    fn encode(&self, chunk_grid_indices: &[u64]) -> StoreKey {
        if chunk_grid_indices.is_empty() {
            StoreKey::new_unchecked("c")
        } else {
            StoreKey::new_unchecked(format!(
                "c{}{}",
                self.separator,
                self.separator.join(chunk_grid_indices)
            ))
        }
    }
}
