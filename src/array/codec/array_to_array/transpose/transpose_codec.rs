use std::num::NonZeroU64;

use crate::{
    array::{
        codec::{
            ArrayCodecTraits, ArrayPartialDecoderTraits, ArrayToArrayCodecTraits, Codec,
            CodecError, CodecPlugin, CodecTraits,
        },
        ChunkRepresentation,
    },
    metadata::Metadata,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

use super::{
    calculate_order_decode, calculate_order_encode, permute, transpose_array,
    transpose_partial_decoder::TransposePartialDecoder, TransposeCodecConfiguration,
    TransposeCodecConfigurationV1, TransposeOrder,
};

/// The identifier for the `transpose` codec.
pub const IDENTIFIER: &str = "transpose";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, is_name_transpose, create_codec_transpose)
}

fn is_name_transpose(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

fn create_codec_transpose(metadata: &Metadata) -> Result<Codec, PluginCreateError> {
    let configuration: TransposeCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "codec", metadata.clone()))?;
    let codec = Box::new(TransposeCodec::new_with_configuration(&configuration));
    Ok(Codec::ArrayToArray(codec))
}

/// A `transpose` codec implementation.
#[derive(Clone, Debug)]
pub struct TransposeCodec {
    order: TransposeOrder,
}

impl TransposeCodec {
    /// Create a new `transpose` codec.
    #[must_use]
    pub const fn new(order: TransposeOrder) -> Self {
        Self { order }
    }

    /// Create a new `transpose` codec from configuration.
    #[must_use]
    pub fn new_with_configuration(configuration: &TransposeCodecConfiguration) -> Self {
        let TransposeCodecConfiguration::V1(configuration) = configuration;
        Self::new(configuration.order.clone())
    }

    fn validate(&self, decoded_representation: &ChunkRepresentation) -> Result<(), CodecError> {
        if self.order.len() == decoded_representation.dimensionality() {
            Ok(())
        } else {
            Err(CodecError::Other(format!(
                "transpose order {:?} is incompatible with a chunk of dimensionality {}",
                self.order.as_slice(),
                decoded_representation.dimensionality()
            )))
        }
    }
}

impl CodecTraits for TransposeCodec {
    fn create_metadata(&self) -> Option<Metadata> {
        let configuration = TransposeCodecConfigurationV1::new(self.order.clone());
        Some(Metadata::new_with_serializable_configuration(IDENTIFIER, &configuration).unwrap())
    }
}

impl ArrayCodecTraits for TransposeCodec {
    fn encode_opt(
        &self,
        decoded_value: Vec<u8>,
        decoded_representation: &ChunkRepresentation,
        _parallel: bool,
    ) -> Result<Vec<u8>, CodecError> {
        self.validate(decoded_representation)?;
        transpose_array(
            &calculate_order_encode(&self.order),
            &decoded_representation.shape_u64(),
            decoded_representation.element_size(),
            &decoded_value,
        )
    }

    fn decode_opt(
        &self,
        encoded_value: Vec<u8>,
        decoded_representation: &ChunkRepresentation,
        _parallel: bool,
    ) -> Result<Vec<u8>, CodecError> {
        self.validate(decoded_representation)?;
        let transposed_shape = permute(&decoded_representation.shape_u64(), &self.order);
        transpose_array(
            &calculate_order_decode(&self.order),
            &transposed_shape,
            decoded_representation.element_size(),
            &encoded_value,
        )
    }
}

impl ArrayToArrayCodecTraits for TransposeCodec {
    fn partial_decoder_opt<'a>(
        &'a self,
        input_handle: Box<dyn ArrayPartialDecoderTraits + 'a>,
        decoded_representation: &ChunkRepresentation,
        _parallel: bool,
    ) -> Result<Box<dyn ArrayPartialDecoderTraits + 'a>, CodecError> {
        self.validate(decoded_representation)?;
        Ok(Box::new(TransposePartialDecoder::new(
            input_handle,
            decoded_representation.clone(),
            self.order.clone(),
        )))
    }

    fn compute_encoded_size(
        &self,
        decoded_representation: &ChunkRepresentation,
    ) -> Result<ChunkRepresentation, CodecError> {
        self.validate(decoded_representation)?;
        let transposed_shape: Vec<NonZeroU64> =
            permute(decoded_representation.shape(), &self.order);
        Ok(decoded_representation.with_shape(transposed_shape))
    }
}
