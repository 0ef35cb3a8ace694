use std::num::NonZeroU64;

use rayon::prelude::*;
use unsafe_cell_slice::UnsafeCellSlice;

use crate::{
    array::{
        codec::{
            ArrayCodecTraits, ArrayPartialDecoderTraits, ArrayToBytesCodecTraits,
            BytesPartialDecoderTraits, Codec, CodecChain, CodecError, CodecPlugin, CodecTraits,
        },
        concurrency::concurrent_limit,
        BytesRepresentation, ChunkRepresentation, ChunkShape,
    },
    metadata::Metadata,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

use super::{
    calculate_chunks_per_shard, chunk_index_to_subset, compute_index_encoded_size,
    decode_shard_index, sharding_index_decoded_representation,
    sharding_partial_decoder::ShardingPartialDecoder, ShardingCodecConfiguration,
    ShardingCodecConfigurationV1, ShardingIndexLocation, ABSENT_CHUNK,
};

/// The identifier for the `sharding_indexed` codec.
pub const IDENTIFIER: &str = "sharding_indexed";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, is_name_sharding, create_codec_sharding)
}

fn is_name_sharding(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

fn create_codec_sharding(metadata: &Metadata) -> Result<Codec, PluginCreateError> {
    let configuration: ShardingCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "codec", metadata.clone()))?;
    let codec = ShardingCodec::new_with_configuration(&configuration)?;
    Ok(Codec::ArrayToBytes(Box::new(codec)))
}

/// A `sharding_indexed` codec implementation.
#[derive(Clone, Debug)]
pub struct ShardingCodec {
    /// The shape of the inner chunks in a shard along each dimension of the outer array.
    chunk_shape: ChunkShape,
    /// The codecs used to encode and decode inner chunks.
    inner_codecs: CodecChain,
    /// The codecs used to encode and decode the shard index.
    index_codecs: CodecChain,
    /// Specifies whether the shard index is located at the beginning or end of the shard.
    index_location: ShardingIndexLocation,
}

impl ShardingCodec {
    /// Create a new `sharding_indexed` codec.
    #[must_use]
    pub fn new(
        chunk_shape: ChunkShape,
        inner_codecs: CodecChain,
        index_codecs: CodecChain,
        index_location: ShardingIndexLocation,
    ) -> Self {
        Self {
            chunk_shape,
            inner_codecs,
            index_codecs,
            index_location,
        }
    }

    /// Create a new `sharding_indexed` codec from configuration.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if the inner or index codecs are invalid.
    pub fn new_with_configuration(
        configuration: &ShardingCodecConfiguration,
    ) -> Result<Self, PluginCreateError> {
        let ShardingCodecConfiguration::V1(configuration) = configuration;
        let inner_codecs = CodecChain::from_metadata(&configuration.codecs)?;
        let index_codecs = CodecChain::from_metadata(&configuration.index_codecs)?;
        Ok(Self::new(
            configuration.chunk_shape.clone(),
            inner_codecs,
            index_codecs,
            configuration.index_location,
        ))
    }

    /// Return the inner chunk shape.
    #[must_use]
    pub const fn chunk_shape(&self) -> &ChunkShape {
        &self.chunk_shape
    }

    /// Return the inner codecs.
    #[must_use]
    pub const fn inner_codecs(&self) -> &CodecChain {
        &self.inner_codecs
    }

    fn inner_chunk_representation(
        &self,
        shard_representation: &ChunkRepresentation,
    ) -> ChunkRepresentation {
        shard_representation.with_shape(self.chunk_shape.to_vec())
    }

    /// Decode the shard index of an encoded shard.
    fn decode_index(
        &self,
        encoded_shard: &[u8],
        chunks_per_shard: &[NonZeroU64],
        parallel: bool,
    ) -> Result<Vec<u64>, CodecError> {
        let index_array_representation = sharding_index_decoded_representation(chunks_per_shard)?;
        let index_encoded_size =
            compute_index_encoded_size(&self.index_codecs, &index_array_representation)?;
        let shard_size = encoded_shard.len() as u64;
        if shard_size < index_encoded_size {
            return Err(CodecError::InvalidShardIndex(format!(
                "the encoded shard ({shard_size} bytes) is smaller than the expected size of its index ({index_encoded_size} bytes)"
            )));
        }
        let index_encoded_size = usize::try_from(index_encoded_size)
            .map_err(|_| CodecError::from("shard index exceeds usize"))?;

        let (encoded_shard_index, chunk_bytes_range) = match self.index_location {
            ShardingIndexLocation::Start => (
                &encoded_shard[..index_encoded_size],
                index_encoded_size as u64..shard_size,
            ),
            ShardingIndexLocation::End => {
                let index_offset = encoded_shard.len() - index_encoded_size;
                (&encoded_shard[index_offset..], 0..index_offset as u64)
            }
        };

        decode_shard_index(
            encoded_shard_index.to_vec(),
            &index_array_representation,
            &self.index_codecs,
            chunk_bytes_range,
            parallel,
        )
    }
}

impl CodecTraits for ShardingCodec {
    fn create_metadata(&self) -> Option<Metadata> {
        let configuration = ShardingCodecConfigurationV1 {
            chunk_shape: self.chunk_shape.clone(),
            codecs: self.inner_codecs.create_metadatas(),
            index_codecs: self.index_codecs.create_metadatas(),
            index_location: self.index_location,
        };
        Some(Metadata::new_with_serializable_configuration(IDENTIFIER, &configuration).unwrap())
    }
}

impl ArrayCodecTraits for ShardingCodec {
    fn encode_opt(
        &self,
        decoded_value: Vec<u8>,
        shard_representation: &ChunkRepresentation,
        parallel: bool,
    ) -> Result<Vec<u8>, CodecError> {
        if decoded_value.len() as u64 != shard_representation.size() {
            return Err(CodecError::UnexpectedChunkDecodedSize(
                decoded_value.len(),
                shard_representation.size(),
            ));
        }

        let chunks_per_shard =
            calculate_chunks_per_shard(shard_representation.shape(), &self.chunk_shape)?;
        let chunk_representation = self.inner_chunk_representation(shard_representation);
        let index_array_representation = sharding_index_decoded_representation(&chunks_per_shard)?;
        let index_encoded_size =
            compute_index_encoded_size(&self.index_codecs, &index_array_representation)?;
        let index_encoded_size = usize::try_from(index_encoded_size)
            .map_err(|_| CodecError::from("shard index exceeds usize"))?;

        // Encode the inner chunks that are not entirely the fill value
        let shard_shape = shard_representation.shape_u64();
        let element_size = shard_representation.element_size();
        let num_chunks = chunks_per_shard.num_elements_usize();
        let encoded_chunks: Vec<Option<Vec<u8>>> =
            rayon_iter_concurrent_limit::iter_concurrent_limit!(
                concurrent_limit(parallel),
                (0..num_chunks).into_par_iter(),
                map,
                |chunk_index: usize| {
                    let chunk_subset = chunk_index_to_subset(
                        chunk_index as u64,
                        &self.chunk_shape,
                        &chunks_per_shard,
                    );
                    let bytes = chunk_subset
                        .extract_bytes(&decoded_value, &shard_shape, element_size)
                        .map_err(|err| CodecError::Other(err.to_string()))?;
                    if chunk_representation.fill_value().equals_all(&bytes) {
                        Ok(None)
                    } else {
                        self.inner_codecs
                            .encode(bytes, &chunk_representation)
                            .map(Some)
                    }
                }
            )
            .collect::<Result<Vec<_>, CodecError>>()?;

        // Concatenate the inner chunks and fill the shard index
        let encoded_chunks_length = encoded_chunks.iter().flatten().map(Vec::len).sum::<usize>();
        let mut shard = Vec::with_capacity(encoded_chunks_length + index_encoded_size);
        if self.index_location == ShardingIndexLocation::Start {
            shard.resize(index_encoded_size, 0);
        }
        let mut shard_index = vec![ABSENT_CHUNK; index_array_representation.num_elements_usize()];
        for (chunk_index, encoded_chunk) in encoded_chunks.into_iter().enumerate() {
            if let Some(encoded_chunk) = encoded_chunk {
                shard_index[chunk_index * 2] = shard.len() as u64;
                shard_index[chunk_index * 2 + 1] = encoded_chunk.len() as u64;
                shard.extend_from_slice(&encoded_chunk);
            }
        }

        // Encode and write the shard index
        let encoded_shard_index = self.index_codecs.encode_opt(
            bytemuck::cast_slice(&shard_index).to_vec(),
            &index_array_representation,
            parallel,
        )?;
        if encoded_shard_index.len() != index_encoded_size {
            return Err(CodecError::UnexpectedChunkDecodedSize(
                encoded_shard_index.len(),
                index_encoded_size as u64,
            ));
        }
        match self.index_location {
            ShardingIndexLocation::Start => {
                shard[..index_encoded_size].copy_from_slice(&encoded_shard_index);
            }
            ShardingIndexLocation::End => shard.extend_from_slice(&encoded_shard_index),
        }
        Ok(shard)
    }

    fn decode_opt(
        &self,
        encoded_value: Vec<u8>,
        shard_representation: &ChunkRepresentation,
        parallel: bool,
    ) -> Result<Vec<u8>, CodecError> {
        let chunks_per_shard =
            calculate_chunks_per_shard(shard_representation.shape(), &self.chunk_shape)?;
        let shard_index = self.decode_index(&encoded_value, &chunks_per_shard, parallel)?;
        let chunk_representation = self.inner_chunk_representation(shard_representation);

        // Absent inner chunks are the fill value
        let mut decoded_shard = shard_representation
            .fill_value()
            .repeat(shard_representation.num_elements_usize());

        let shard_shape = shard_representation.shape_u64();
        let element_size = shard_representation.element_size();
        let num_chunks = chunks_per_shard.num_elements_usize();
        {
            let shard_slice = UnsafeCellSlice::new(decoded_shard.as_mut_slice());
            rayon_iter_concurrent_limit::iter_concurrent_limit!(
                concurrent_limit(parallel),
                (0..num_chunks),
                try_for_each,
                |chunk_index: usize| {
                    let offset = shard_index[chunk_index * 2];
                    let size = shard_index[chunk_index * 2 + 1];
                    if offset == ABSENT_CHUNK && size == ABSENT_CHUNK {
                        return Ok(());
                    }
                    let offset = usize::try_from(offset)
                        .map_err(|_| CodecError::from("inner chunk offset exceeds usize"))?;
                    let size = usize::try_from(size)
                        .map_err(|_| CodecError::from("inner chunk size exceeds usize"))?;
                    let decoded_chunk = self.inner_codecs.decode(
                        encoded_value[offset..offset + size].to_vec(),
                        &chunk_representation,
                    )?;

                    let chunk_subset = chunk_index_to_subset(
                        chunk_index as u64,
                        &self.chunk_shape,
                        &chunks_per_shard,
                    );
                    // Inner chunks are disjoint, so each element of the shard is written at most once
                    let shard_bytes = unsafe { shard_slice.as_mut_slice() };
                    let mut decoded_offset = 0;
                    for (array_index, contiguous_elements) in
                        chunk_subset.iter_contiguous_linearised_indices(&shard_shape)?
                    {
                        let shard_offset = usize::try_from(array_index).unwrap_or(usize::MAX)
                            * element_size;
                        let length = usize::try_from(contiguous_elements).unwrap_or(usize::MAX)
                            * element_size;
                        shard_bytes[shard_offset..shard_offset + length].copy_from_slice(
                            &decoded_chunk[decoded_offset..decoded_offset + length],
                        );
                        decoded_offset += length;
                    }
                    Ok::<_, CodecError>(())
                }
            )?;
        }
        Ok(decoded_shard)
    }
}

impl ArrayToBytesCodecTraits for ShardingCodec {
    fn partial_decoder_opt<'a>(
        &'a self,
        input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        decoded_representation: &ChunkRepresentation,
        parallel: bool,
    ) -> Result<Box<dyn ArrayPartialDecoderTraits + 'a>, CodecError> {
        Ok(Box::new(ShardingPartialDecoder::new(
            input_handle,
            decoded_representation.clone(),
            self.chunk_shape.clone(),
            &self.inner_codecs,
            &self.index_codecs,
            self.index_location,
            parallel,
        )?))
    }

    fn compute_encoded_size(
        &self,
        decoded_representation: &ChunkRepresentation,
    ) -> Result<BytesRepresentation, CodecError> {
        let chunks_per_shard =
            calculate_chunks_per_shard(decoded_representation.shape(), &self.chunk_shape)?;
        let chunk_representation = self.inner_chunk_representation(decoded_representation);
        let index_array_representation = sharding_index_decoded_representation(&chunks_per_shard)?;
        let index_encoded_size =
            compute_index_encoded_size(&self.index_codecs, &index_array_representation)?;
        match self
            .inner_codecs
            .compute_encoded_size(&chunk_representation)?
        {
            BytesRepresentation::BoundedSize(size) | BytesRepresentation::FixedSize(size) => {
                Ok(BytesRepresentation::BoundedSize(
                    chunks_per_shard.num_elements() * size + index_encoded_size,
                ))
            }
            BytesRepresentation::UnboundedSize => Ok(BytesRepresentation::UnboundedSize),
        }
    }
}
