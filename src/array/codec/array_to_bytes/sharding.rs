//! The `sharding_indexed` array to bytes codec.
//!
//! Sharding logically splits chunks (shards) into sub-chunks (inner chunks) that can be individually compressed and accessed.
//! This allows to colocate multiple chunks within one storage object, bundling them in shards.
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/codecs/sharding-indexed/v1.0.html>.
//!
//! This codec requires the `sharding` feature, which is enabled by default.
//!
//! See [`ShardingCodecConfigurationV1`] for example `JSON` metadata.
//! The [`ShardingCodecBuilder`] can help with creating a [`ShardingCodec`].

mod sharding_codec;
mod sharding_codec_builder;
mod sharding_configuration;
mod sharding_partial_decoder;

use std::num::NonZeroU64;

pub use sharding_codec::{ShardingCodec, IDENTIFIER};
pub use sharding_codec_builder::ShardingCodecBuilder;
pub use sharding_configuration::{
    ShardingCodecConfiguration, ShardingCodecConfigurationV1, ShardingIndexLocation,
};
pub use sharding_partial_decoder::ShardingPartialDecoder;

use crate::{
    array::{
        codec::{ArrayCodecTraits, ArrayToBytesCodecTraits, CodecError},
        BytesRepresentation, ChunkRepresentation, ChunkShape, DataType, FillValue,
    },
    array_subset::ArraySubset,
};

/// The sentinel of an inner chunk that is absent from a shard.
const ABSENT_CHUNK: u64 = u64::MAX;

fn calculate_chunks_per_shard(
    shard_shape: &[NonZeroU64],
    chunk_shape: &[NonZeroU64],
) -> Result<ChunkShape, CodecError> {
    if shard_shape.len() != chunk_shape.len() {
        return Err(CodecError::Other(format!(
            "inner chunk shape {chunk_shape:?} has a different dimensionality to the shard shape {shard_shape:?}"
        )));
    }
    std::iter::zip(shard_shape, chunk_shape)
        .map(|(s, c)| {
            let (s, c) = (s.get(), c.get());
            if s % c == 0 {
                NonZeroU64::new(s / c).ok_or_else(|| CodecError::from("empty shard"))
            } else {
                Err(CodecError::Other(format!(
                    "invalid inner chunk shape {chunk_shape:?}, it must evenly divide {shard_shape:?}"
                )))
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(ChunkShape::from)
}

fn sharding_index_decoded_representation(
    chunks_per_shard: &[NonZeroU64],
) -> Result<ChunkRepresentation, CodecError> {
    let mut index_shape = Vec::with_capacity(chunks_per_shard.len() + 1);
    index_shape.extend(chunks_per_shard);
    index_shape.push(NonZeroU64::MIN.saturating_add(1));
    ChunkRepresentation::new(index_shape, DataType::UInt64, FillValue::from(ABSENT_CHUNK))
        .map_err(|err| CodecError::Other(err.to_string()))
}

fn compute_index_encoded_size(
    index_codecs: &dyn ArrayToBytesCodecTraits,
    index_array_representation: &ChunkRepresentation,
) -> Result<u64, CodecError> {
    let bytes_representation = index_codecs.compute_encoded_size(index_array_representation)?;
    match bytes_representation {
        BytesRepresentation::FixedSize(size) => Ok(size),
        _ => Err(CodecError::Other(
            "the shard index cannot include a variable size output codec".to_string(),
        )),
    }
}

/// Decode a shard index and validate it against the size of the encoded inner chunk region.
///
/// Each inner chunk has an `(offset, nbytes)` entry, both [`u64::MAX`] if the chunk is absent.
/// `chunk_bytes_range` is the range of the encoded shard that may hold inner chunks.
fn decode_shard_index(
    encoded_shard_index: Vec<u8>,
    index_array_representation: &ChunkRepresentation,
    index_codecs: &dyn ArrayToBytesCodecTraits,
    chunk_bytes_range: std::ops::Range<u64>,
    parallel: bool,
) -> Result<Vec<u64>, CodecError> {
    let decoded_shard_index =
        index_codecs.decode_opt(encoded_shard_index, index_array_representation, parallel)?;
    let shard_index: Vec<u64> = bytemuck::pod_collect_to_vec(&decoded_shard_index);
    for entry in shard_index.chunks_exact(2) {
        let (offset, nbytes) = (entry[0], entry[1]);
        if offset == ABSENT_CHUNK && nbytes == ABSENT_CHUNK {
            continue;
        }
        let in_bounds = offset >= chunk_bytes_range.start
            && offset
                .checked_add(nbytes)
                .is_some_and(|end| end <= chunk_bytes_range.end);
        if !in_bounds {
            return Err(CodecError::InvalidShardIndex(format!(
                "inner chunk at offset {offset} with size {nbytes} is outside of the shard bytes {chunk_bytes_range:?}"
            )));
        }
    }
    Ok(shard_index)
}

/// The subset of the inner chunk with linear index `chunk_index` within a shard.
fn chunk_index_to_subset(
    chunk_index: u64,
    chunk_shape: &[NonZeroU64],
    chunks_per_shard: &[NonZeroU64],
) -> ArraySubset {
    let chunks_per_shard = crate::array::chunk_shape_to_array_shape(chunks_per_shard);
    let chunk_indices = crate::array::unravel_index(chunk_index, &chunks_per_shard);
    let ranges: Vec<_> = std::iter::zip(&chunk_indices, chunk_shape)
        .map(|(i, c)| i * c.get()..(i + 1) * c.get())
        .collect();
    ArraySubset::new_with_ranges(&ranges)
}
