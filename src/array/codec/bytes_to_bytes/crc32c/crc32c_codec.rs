use crate::{
    array::{
        codec::{
            BytesPartialDecoderTraits, BytesToBytesCodecTraits, Codec, CodecError, CodecPlugin,
            CodecTraits,
        },
        BytesRepresentation,
    },
    config::global_config,
    metadata::Metadata,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

use super::{
    crc32c_partial_decoder::Crc32cPartialDecoder, Crc32cCodecConfiguration,
    Crc32cCodecConfigurationV1, CHECKSUM_SIZE,
};

/// The identifier for the `crc32c` codec.
pub const IDENTIFIER: &str = "crc32c";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, is_name_crc32c, create_codec_crc32c)
}

fn is_name_crc32c(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

fn create_codec_crc32c(metadata: &Metadata) -> Result<Codec, PluginCreateError> {
    let configuration: Crc32cCodecConfiguration = if metadata.configuration_is_none_or_empty() {
        Crc32cCodecConfigurationV1::default().into()
    } else {
        metadata
            .to_configuration()
            .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "codec", metadata.clone()))?
    };
    let codec = Box::new(Crc32cCodec::new_with_configuration(&configuration));
    Ok(Codec::BytesToBytes(codec))
}

/// A `crc32c` checksum codec implementation.
#[derive(Clone, Debug, Default)]
pub struct Crc32cCodec;

impl Crc32cCodec {
    /// Create a new `crc32c` checksum codec.
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Create a new `crc32c` checksum codec from configuration.
    #[must_use]
    pub const fn new_with_configuration(_configuration: &Crc32cCodecConfiguration) -> Self {
        Self {}
    }
}

impl CodecTraits for Crc32cCodec {
    fn create_metadata(&self) -> Option<Metadata> {
        Some(Metadata::new(IDENTIFIER))
    }
}

impl BytesToBytesCodecTraits for Crc32cCodec {
    fn encode_opt(
        &self,
        mut decoded_value: Vec<u8>,
        _parallel: bool,
    ) -> Result<Vec<u8>, CodecError> {
        let checksum = crc32c::crc32c(&decoded_value).to_le_bytes();
        decoded_value.reserve_exact(checksum.len());
        decoded_value.extend(&checksum);
        Ok(decoded_value)
    }

    fn decode_opt(
        &self,
        mut encoded_value: Vec<u8>,
        _decoded_representation: &BytesRepresentation,
        _parallel: bool,
    ) -> Result<Vec<u8>, CodecError> {
        let Some(decoded_len) = encoded_value.len().checked_sub(CHECKSUM_SIZE) else {
            return Err(CodecError::Other(
                "crc32c checksum decoder expects at least 4 bytes".to_string(),
            ));
        };
        if global_config().validate_checksums() {
            let checksum = crc32c::crc32c(&encoded_value[..decoded_len]).to_le_bytes();
            if checksum != encoded_value[decoded_len..] {
                return Err(CodecError::InvalidChecksum);
            }
        } else {
            log::trace!("skipping crc32c checksum validation");
        }
        encoded_value.truncate(decoded_len);
        Ok(encoded_value)
    }

    fn partial_decoder_opt<'a>(
        &'a self,
        input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        _decoded_representation: &BytesRepresentation,
        _parallel: bool,
    ) -> Result<Box<dyn BytesPartialDecoderTraits + 'a>, CodecError> {
        Ok(Box::new(Crc32cPartialDecoder::new(input_handle)))
    }

    fn compute_encoded_size(
        &self,
        decoded_representation: &BytesRepresentation,
    ) -> BytesRepresentation {
        const CHECKSUM_SIZE_U64: u64 = CHECKSUM_SIZE as u64;
        match decoded_representation {
            BytesRepresentation::FixedSize(size) => {
                BytesRepresentation::FixedSize(size + CHECKSUM_SIZE_U64)
            }
            BytesRepresentation::BoundedSize(size) => {
                BytesRepresentation::BoundedSize(size + CHECKSUM_SIZE_U64)
            }
            BytesRepresentation::UnboundedSize => BytesRepresentation::UnboundedSize,
        }
    }
}
