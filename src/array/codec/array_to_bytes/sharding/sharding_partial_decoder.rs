use rayon::prelude::*;

use crate::{
    array::{
        codec::{
            ArrayPartialDecoderTraits, ArrayToBytesCodecTraits, ByteIntervalPartialDecoder,
            BytesPartialDecoderTraits, CodecChain, CodecError,
        },
        ravel_indices, ChunkRepresentation, ChunkShape,
    },
    array_subset::{ArraySubset, InvalidArraySubsetError},
    byte_range::ByteRange,
};

use super::{
    calculate_chunks_per_shard, compute_index_encoded_size, decode_shard_index,
    sharding_index_decoded_representation, ShardingIndexLocation, ABSENT_CHUNK,
};

/// Partial decoder for the sharding codec.
///
/// The shard index is read on creation, then only the inner chunks intersecting a requested subset are retrieved.
pub struct ShardingPartialDecoder<'a> {
    input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
    decoded_representation: ChunkRepresentation,
    chunk_shape: ChunkShape,
    inner_codecs: &'a CodecChain,
    shard_index: Option<Vec<u64>>,
}

impl<'a> ShardingPartialDecoder<'a> {
    /// Create a new partial decoder for the sharding codec.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if the shard index cannot be retrieved or is invalid.
    pub fn new(
        input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        decoded_representation: ChunkRepresentation,
        chunk_shape: ChunkShape,
        inner_codecs: &'a CodecChain,
        index_codecs: &'a CodecChain,
        index_location: ShardingIndexLocation,
        parallel: bool,
    ) -> Result<Self, CodecError> {
        let chunks_per_shard =
            calculate_chunks_per_shard(decoded_representation.shape(), &chunk_shape)?;
        let index_array_representation = sharding_index_decoded_representation(&chunks_per_shard)?;
        let index_encoded_size =
            compute_index_encoded_size(index_codecs, &index_array_representation)?;

        let (index_byte_range, chunk_bytes_range) = match index_location {
            ShardingIndexLocation::Start => (
                ByteRange::FromStart(0, Some(index_encoded_size)),
                index_encoded_size..u64::MAX,
            ),
            ShardingIndexLocation::End => {
                (ByteRange::FromEnd(0, Some(index_encoded_size)), 0..u64::MAX)
            }
        };

        log::trace!("retrieving shard index {index_byte_range}");
        // A missing shard has no index
        let encoded_shard_index = input_handle
            .partial_decode_opt(&[index_byte_range], parallel)?
            .and_then(|mut encoded| encoded.pop());
        let shard_index = encoded_shard_index
            .map(|encoded_shard_index| {
                decode_shard_index(
                    encoded_shard_index,
                    &index_array_representation,
                    index_codecs,
                    chunk_bytes_range,
                    parallel,
                )
            })
            .transpose()?;

        Ok(Self {
            input_handle,
            decoded_representation,
            chunk_shape,
            inner_codecs,
            shard_index,
        })
    }

    /// Decode the part of the inner chunk at `chunk_indices` that overlaps `array_subset`.
    ///
    /// Returns [`None`] if the inner chunk is absent.
    fn decode_inner_chunk_overlap(
        &self,
        shard_index: &[u64],
        chunks_per_shard: &[u64],
        chunk_representation: &ChunkRepresentation,
        array_subset: &ArraySubset,
        chunk_indices: &[u64],
        chunk_subset: &ArraySubset,
    ) -> Result<Option<(ArraySubset, Vec<u8>)>, CodecError> {
        let chunk_index = usize::try_from(ravel_indices(chunk_indices, chunks_per_shard))
            .map_err(|_| CodecError::from("inner chunk index exceeds usize"))?;
        let offset = shard_index[chunk_index * 2];
        let size = shard_index[chunk_index * 2 + 1];
        if offset == ABSENT_CHUNK && size == ABSENT_CHUNK {
            return Ok(None);
        }

        let overlap = array_subset
            .overlap(chunk_subset)
            .map_err(|err| CodecError::Other(err.to_string()))?;
        let overlap_in_chunk = overlap
            .relative_to(chunk_subset.start())
            .map_err(|err| CodecError::Other(err.to_string()))?;
        let overlap_in_subset = overlap
            .relative_to(array_subset.start())
            .map_err(|err| CodecError::Other(err.to_string()))?;

        let input_handle = Box::new(ByteIntervalPartialDecoder::new(
            &*self.input_handle,
            offset,
            size,
        ));
        let decoded = self
            .inner_codecs
            .partial_decoder(input_handle, chunk_representation)?
            .partial_decode(&[overlap_in_chunk])?
            .pop()
            .ok_or_else(|| CodecError::from("the inner chunk partial decoder returned no data"))?;
        Ok(Some((overlap_in_subset, decoded)))
    }
}

impl ArrayPartialDecoderTraits for ShardingPartialDecoder<'_> {
    fn partial_decode_opt(
        &self,
        array_subsets: &[ArraySubset],
        parallel: bool,
    ) -> Result<Vec<Vec<u8>>, CodecError> {
        let shard_shape = self.decoded_representation.shape_u64();
        for array_subset in array_subsets {
            if !array_subset.inbounds(&shard_shape) {
                return Err(InvalidArraySubsetError.into());
            }
        }

        let fill_value = self.decoded_representation.fill_value();
        let Some(shard_index) = &self.shard_index else {
            return Ok(array_subsets
                .iter()
                .map(|array_subset| fill_value.repeat(array_subset.num_elements_usize()))
                .collect());
        };

        let chunks_per_shard =
            calculate_chunks_per_shard(self.decoded_representation.shape(), &self.chunk_shape)?
                .to_array_shape();
        let chunk_representation = self
            .decoded_representation
            .with_shape(self.chunk_shape.to_vec());
        let chunk_shape = self.chunk_shape.to_array_shape();
        let element_size = self.decoded_representation.element_size();

        let mut out = Vec::with_capacity(array_subsets.len());
        for array_subset in array_subsets {
            let mut bytes = fill_value.repeat(array_subset.num_elements_usize());
            let chunks: Vec<_> = array_subset
                .iter_chunks(&chunk_shape)
                .map_err(|err| CodecError::Other(err.to_string()))?
                .collect();

            let decode_chunk = |(chunk_indices, chunk_subset): &(Vec<u64>, ArraySubset)| {
                self.decode_inner_chunk_overlap(
                    shard_index,
                    &chunks_per_shard,
                    &chunk_representation,
                    array_subset,
                    chunk_indices,
                    chunk_subset,
                )
            };
            let decoded_chunks: Vec<_> = if parallel {
                chunks
                    .par_iter()
                    .map(decode_chunk)
                    .collect::<Result<_, CodecError>>()?
            } else {
                chunks
                    .iter()
                    .map(decode_chunk)
                    .collect::<Result<_, CodecError>>()?
            };

            for (overlap_in_subset, decoded) in decoded_chunks.into_iter().flatten() {
                overlap_in_subset
                    .store_bytes(&decoded, &mut bytes, array_subset.shape(), element_size)
                    .map_err(|err| CodecError::Other(err.to_string()))?;
            }
            out.push(bytes);
        }
        Ok(out)
    }
}
