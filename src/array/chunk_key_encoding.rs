//! Zarr chunk key encodings. Includes a [default](default::DefaultChunkKeyEncoding) and [v2](v2::V2ChunkKeyEncoding) implementation.
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/core/v3.0.html#chunk-key-encoding>.

pub mod default;
pub mod v2;

pub use default::{DefaultChunkKeyEncoding, DefaultChunkKeyEncodingConfiguration};
pub use v2::{V2ChunkKeyEncoding, V2ChunkKeyEncodingConfiguration};

use crate::{
    metadata::Metadata,
    plugin::{create_from_registry, Plugin, PluginCreateError},
    storage::StoreKey,
};

use derive_more::{Deref, Display};
use itertools::Itertools;

/// A chunk key encoding.
#[derive(Debug, Clone, Deref)]
pub struct ChunkKeyEncoding(Box<dyn ChunkKeyEncodingTraits>);

/// A chunk key encoding plugin.
pub type ChunkKeyEncodingPlugin = Plugin<ChunkKeyEncoding>;
inventory::collect!(ChunkKeyEncodingPlugin);

impl ChunkKeyEncoding {
    /// Create a chunk key encoding.
    pub fn new<T: ChunkKeyEncodingTraits + 'static>(chunk_key_encoding: T) -> Self {
        Self(Box::new(chunk_key_encoding))
    }

    /// Create a chunk key encoding from metadata.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if the metadata is invalid or not associated with a registered chunk key encoding plugin.
    pub fn from_metadata(metadata: &Metadata) -> Result<Self, PluginCreateError> {
        create_from_registry(metadata, "chunk key encoding")
    }
}

impl<T: ChunkKeyEncodingTraits + 'static> From<T> for ChunkKeyEncoding {
    fn from(chunk_key_encoding: T) -> Self {
        Self::new(chunk_key_encoding)
    }
}

/// Chunk key encoding traits.
pub trait ChunkKeyEncodingTraits: dyn_clone::DynClone + core::fmt::Debug + Send + Sync {
    /// Create the metadata of this chunk key encoding.
    fn create_metadata(&self) -> Metadata;

    /// Encode chunk grid indices (grid cell coordinates) into a store key.
    fn encode(&self, chunk_grid_indices: &[u64]) -> StoreKey;
}

dyn_clone::clone_trait_object!(ChunkKeyEncodingTraits);

/// A chunk key separator.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ChunkKeySeparator {
    /// The slash '/' character.
    #[display("/")]
    Slash,
    /// The dot '.' character.
    #[display(".")]
    Dot,
}

impl ChunkKeySeparator {
    /// Join chunk grid indices with the separator.
    fn join(self, chunk_grid_indices: &[u64]) -> String {
        chunk_grid_indices.iter().join(&self.to_string())
    }
}

impl TryFrom<char> for ChunkKeySeparator {
    type Error = char;

    fn try_from(separator: char) -> Result<Self, Self::Error> {
        match separator {
            '/' => Ok(Self::Slash),
            '.' => Ok(Self::Dot),
            _ => Err(separator),
        }
    }
}

impl serde::Serialize for ChunkKeySeparator {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Slash => s.serialize_str("/"),
            Self::Dot => s.serialize_str("."),
        }
    }
}

impl<'de> serde::Deserialize<'de> for ChunkKeySeparator {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(d)?;
        if let serde_json::Value::String(separator) = value {
            if separator == "/" {
                return Ok(Self::Slash);
            } else if separator == "." {
                return Ok(Self::Dot);
            }
        }
        Err(serde::de::Error::custom(
            "chunk key separator must be a `.` or `/`.",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_key_separator() {
        assert_eq!(ChunkKeySeparator::try_from('/'), Ok(ChunkKeySeparator::Slash));
        assert_eq!(ChunkKeySeparator::try_from('.'), Ok(ChunkKeySeparator::Dot));
        assert_eq!(ChunkKeySeparator::try_from('-'), Err('-'));
        assert_eq!(
            serde_json::to_string(&ChunkKeySeparator::Dot).unwrap(),
            r#"".""#
        );
        assert!(serde_json::from_str::<ChunkKeySeparator>(r#""-""#).is_err());
    }

    #[test]
    fn chunk_key_encoding_from_metadata() {
        let metadata =
            Metadata::try_from(r#"{"name":"default","configuration":{"separator":"."}}"#).unwrap();
        let chunk_key_encoding = ChunkKeyEncoding::from_metadata(&metadata).unwrap();
        assert_eq!(chunk_key_encoding.encode(&[1, 2]).as_str(), "c.1.2");
        assert_eq!(chunk_key_encoding.create_metadata(), metadata);

        let metadata = Metadata::try_from(r#""v2""#).unwrap();
        let chunk_key_encoding = ChunkKeyEncoding::from_metadata(&metadata).unwrap();
        assert_eq!(chunk_key_encoding.encode(&[1, 2]).as_str(), "1.2");

        let metadata = Metadata::try_from(r#""hashed""#).unwrap();
        assert!(matches!(
            ChunkKeyEncoding::from_metadata(&metadata),
            Err(PluginCreateError::Unsupported { .. })
        ));
    }
}
