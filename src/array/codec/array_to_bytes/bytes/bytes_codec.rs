use crate::{
    array::{
        codec::{
            ArrayCodecTraits, ArrayPartialDecoderTraits, ArrayToBytesCodecTraits,
            BytesPartialDecoderTraits, Codec, CodecError, CodecPlugin, CodecTraits,
        },
        BytesRepresentation, ChunkRepresentation, Endianness, NATIVE_ENDIAN,
    },
    metadata::Metadata,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

use super::{
    bytes_partial_decoder::BytesPartialDecoder, BytesCodecConfiguration,
    BytesCodecConfigurationV1,
};

/// The identifier for the `bytes` codec.
pub const IDENTIFIER: &str = "bytes";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, is_name_bytes, create_codec_bytes)
}

fn is_name_bytes(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

fn create_codec_bytes(metadata: &Metadata) -> Result<Codec, PluginCreateError> {
    let configuration: BytesCodecConfiguration = if metadata.configuration_is_none_or_empty() {
        BytesCodecConfigurationV1::new(None).into()
    } else {
        metadata
            .to_configuration()
            .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "codec", metadata.clone()))?
    };
    let codec = Box::new(BytesCodec::new_with_configuration(&configuration));
    Ok(Codec::ArrayToBytes(codec))
}

/// A `bytes` codec implementation.
#[derive(Debug, Clone)]
pub struct BytesCodec {
    endian: Option<Endianness>,
}

impl Default for BytesCodec {
    fn default() -> Self {
        Self::new(Some(NATIVE_ENDIAN))
    }
}

impl BytesCodec {
    /// Create a new `bytes` codec.
    ///
    /// `endian` is optional because an 8-bit type has no endianness.
    #[must_use]
    pub const fn new(endian: Option<Endianness>) -> Self {
        Self { endian }
    }

    /// Create a new `bytes` codec for little endian data.
    #[must_use]
    pub const fn little() -> Self {
        Self::new(Some(Endianness::Little))
    }

    /// Create a new `bytes` codec for big endian data.
    #[must_use]
    pub const fn big() -> Self {
        Self::new(Some(Endianness::Big))
    }

    /// Create a new `bytes` codec from configuration.
    #[must_use]
    pub const fn new_with_configuration(configuration: &BytesCodecConfiguration) -> Self {
        let BytesCodecConfiguration::V1(configuration) = configuration;
        Self::new(configuration.endian)
    }

    fn validate(&self, decoded_representation: &ChunkRepresentation) -> Result<(), CodecError> {
        if decoded_representation.element_size() > 1 && self.endian.is_none() {
            Err(CodecError::Other(format!(
                "the bytes codec requires an endianness for data type {}",
                decoded_representation.data_type()
            )))
        } else {
            Ok(())
        }
    }

    fn do_encode_or_decode(
        &self,
        mut value: Vec<u8>,
        decoded_representation: &ChunkRepresentation,
    ) -> Result<Vec<u8>, CodecError> {
        self.validate(decoded_representation)?;
        let array_size = decoded_representation.size();
        if value.len() as u64 != array_size {
            return Err(CodecError::UnexpectedChunkDecodedSize(
                value.len(),
                array_size,
            ));
        }

        if let Some(endian) = self.endian {
            endian.swap_if_foreign(&mut value, decoded_representation.element_size());
        }
        Ok(value)
    }
}

impl CodecTraits for BytesCodec {
    fn create_metadata(&self) -> Option<Metadata> {
        if self.endian.is_none() {
            return Some(Metadata::new(IDENTIFIER));
        }
        let configuration = BytesCodecConfigurationV1 {
            endian: self.endian,
        };
        Some(Metadata::new_with_serializable_configuration(IDENTIFIER, &configuration).unwrap())
    }
}

impl ArrayCodecTraits for BytesCodec {
    fn encode_opt(
        &self,
        decoded_value: Vec<u8>,
        decoded_representation: &ChunkRepresentation,
        _parallel: bool,
    ) -> Result<Vec<u8>, CodecError> {
        self.do_encode_or_decode(decoded_value, decoded_representation)
    }

    fn decode_opt(
        &self,
        encoded_value: Vec<u8>,
        decoded_representation: &ChunkRepresentation,
        _parallel: bool,
    ) -> Result<Vec<u8>, CodecError> {
        self.do_encode_or_decode(encoded_value, decoded_representation)
    }
}

impl ArrayToBytesCodecTraits for BytesCodec {
    fn partial_decoder_opt<'a>(
        &'a self,
        input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        decoded_representation: &ChunkRepresentation,
        _parallel: bool,
    ) -> Result<Box<dyn ArrayPartialDecoderTraits + 'a>, CodecError> {
        self.validate(decoded_representation)?;
        Ok(Box::new(BytesPartialDecoder::new(
            input_handle,
            decoded_representation.clone(),
            self.endian,
        )))
    }

    fn compute_encoded_size(
        &self,
        decoded_representation: &ChunkRepresentation,
    ) -> Result<BytesRepresentation, CodecError> {
        self.validate(decoded_representation)?;
        Ok(BytesRepresentation::FixedSize(decoded_representation.size()))
    }
}
