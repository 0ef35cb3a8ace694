use crate::{
    array::{
        codec::{ArrayPartialDecoderTraits, CodecError},
        ChunkRepresentation,
    },
    array_subset::{ArraySubset, InvalidArraySubsetError},
};

use super::{calculate_order_decode, permute, transpose_array, TransposeOrder};

/// Partial decoder for the `transpose` codec.
pub struct TransposePartialDecoder<'a> {
    input_handle: Box<dyn ArrayPartialDecoderTraits + 'a>,
    decoded_representation: ChunkRepresentation,
    order: TransposeOrder,
}

impl<'a> TransposePartialDecoder<'a> {
    /// Create a new partial decoder for the `transpose` codec.
    pub fn new(
        input_handle: Box<dyn ArrayPartialDecoderTraits + 'a>,
        decoded_representation: ChunkRepresentation,
        order: TransposeOrder,
    ) -> Self {
        Self {
            input_handle,
            decoded_representation,
            order,
        }
    }
}

impl ArrayPartialDecoderTraits for TransposePartialDecoder<'_> {
    fn partial_decode_opt(
        &self,
        decoded_regions: &[ArraySubset],
        parallel: bool,
    ) -> Result<Vec<Vec<u8>>, CodecError> {
        // Request the transposed regions from the encoded chunk
        let mut decoded_regions_transposed = Vec::with_capacity(decoded_regions.len());
        for decoded_region in decoded_regions {
            if decoded_region.dimensionality() != self.order.len() {
                return Err(InvalidArraySubsetError.into());
            }
            decoded_regions_transposed.push(ArraySubset::new_with_ranges(&permute(
                &decoded_region.to_ranges(),
                &self.order,
            )));
        }
        let encoded_regions = self
            .input_handle
            .partial_decode_opt(&decoded_regions_transposed, parallel)?;

        // Reverse the transpose on each region
        let order_decode = calculate_order_decode(&self.order);
        let element_size = self.decoded_representation.element_size();
        std::iter::zip(&decoded_regions_transposed, encoded_regions)
            .map(|(region_transposed, bytes)| {
                transpose_array(&order_decode, region_transposed.shape(), element_size, &bytes)
            })
            .collect()
    }
}
