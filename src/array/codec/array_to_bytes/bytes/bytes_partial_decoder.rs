use crate::{
    array::{
        codec::{ArrayPartialDecoderTraits, BytesPartialDecoderTraits, CodecError},
        ChunkRepresentation, Endianness,
    },
    array_subset::ArraySubset,
};

/// Partial decoder for the `bytes` codec.
///
/// An array subset maps to one byte range per contiguous run of elements in the encoded chunk.
/// Only those ranges are requested from the input.
pub struct BytesPartialDecoder<'a> {
    input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
    decoded_representation: ChunkRepresentation,
    endian: Option<Endianness>,
}

impl<'a> BytesPartialDecoder<'a> {
    /// Create a new partial decoder for the `bytes` codec.
    pub fn new(
        input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        decoded_representation: ChunkRepresentation,
        endian: Option<Endianness>,
    ) -> Self {
        Self {
            input_handle,
            decoded_representation,
            endian,
        }
    }

    fn decode_subset(
        &self,
        chunk_shape: &[u64],
        array_subset: &ArraySubset,
        parallel: bool,
    ) -> Result<Vec<u8>, CodecError> {
        let element_size = self.decoded_representation.element_size();
        let byte_ranges = array_subset.byte_ranges(chunk_shape, element_size)?;
        match self.input_handle.partial_decode_opt(&byte_ranges, parallel)? {
            Some(runs) => {
                let mut bytes = runs.concat();
                if let Some(endian) = self.endian {
                    endian.swap_if_foreign(&mut bytes, element_size);
                }
                Ok(bytes)
            }
            None => Ok(self
                .decoded_representation
                .fill_value()
                .repeat(array_subset.num_elements_usize())),
        }
    }
}

impl ArrayPartialDecoderTraits for BytesPartialDecoder<'_> {
    fn partial_decode_opt(
        &self,
        decoded_regions: &[ArraySubset],
        parallel: bool,
    ) -> Result<Vec<Vec<u8>>, CodecError> {
        let chunk_shape = self.decoded_representation.shape_u64();
        decoded_regions
            .iter()
            .map(|array_subset| self.decode_subset(&chunk_shape, array_subset, parallel))
            .collect()
    }
}
