use std::io::{Read, Write};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};

use crate::{
    array::{
        codec::{
            bytes_to_bytes::DecompressPartialDecoder, BytesPartialDecoderTraits,
            BytesToBytesCodecTraits, Codec, CodecError, CodecPlugin, CodecTraits,
        },
        BytesRepresentation,
    },
    metadata::Metadata,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

use super::{
    GzipCodecConfiguration, GzipCodecConfigurationV1, GzipCompressionLevel,
    GzipCompressionLevelError,
};

/// The identifier for the `gzip` codec.
pub const IDENTIFIER: &str = "gzip";

inventory::submit! {
    CodecPlugin::new(IDENTIFIER, is_name_gzip, create_codec_gzip)
}

fn is_name_gzip(name: &str) -> bool {
    name == IDENTIFIER
}

fn create_codec_gzip(metadata: &Metadata) -> Result<Codec, PluginCreateError> {
    let GzipCodecConfiguration::V1(configuration) = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "codec", metadata.clone()))?;
    Ok(Codec::BytesToBytes(Box::new(GzipCodec {
        level: configuration.level,
    })))
}

fn gzip_decompress(encoded_value: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut decoded_value = Vec::new();
    GzDecoder::new(encoded_value).read_to_end(&mut decoded_value)?;
    Ok(decoded_value)
}

/// A `gzip` codec implementation.
#[derive(Clone, Debug)]
pub struct GzipCodec {
    level: GzipCompressionLevel,
}

impl GzipCodec {
    /// Create a new `gzip` codec with a compression level from 0 (none) to 9 (best).
    ///
    /// # Errors
    /// Returns [`GzipCompressionLevelError`] if `compression_level` is greater than 9.
    pub fn new(compression_level: u32) -> Result<Self, GzipCompressionLevelError> {
        Ok(Self {
            level: compression_level.try_into()?,
        })
    }

    /// Create a new `gzip` codec from configuration.
    #[must_use]
    pub const fn new_with_configuration(configuration: &GzipCodecConfiguration) -> Self {
        let GzipCodecConfiguration::V1(GzipCodecConfigurationV1 { level }) = configuration;
        Self { level: *level }
    }
}

impl CodecTraits for GzipCodec {
    fn create_metadata(&self) -> Option<Metadata> {
        Metadata::new_with_serializable_configuration(
            IDENTIFIER,
            &GzipCodecConfigurationV1::new(self.level),
        )
        .ok()
    }
}

impl BytesToBytesCodecTraits for GzipCodec {
    fn encode_opt(&self, decoded_value: Vec<u8>, _parallel: bool) -> Result<Vec<u8>, CodecError> {
        let mut encoder = GzEncoder::new(
            Vec::with_capacity(decoded_value.len() / 2),
            Compression::new(self.level.as_u32()),
        );
        encoder.write_all(&decoded_value)?;
        Ok(encoder.finish()?)
    }

    fn decode_opt(
        &self,
        encoded_value: Vec<u8>,
        _decoded_representation: &BytesRepresentation,
        _parallel: bool,
    ) -> Result<Vec<u8>, CodecError> {
        gzip_decompress(&encoded_value)
    }

    fn partial_decoder_opt<'a>(
        &'a self,
        input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        _decoded_representation: &BytesRepresentation,
        _parallel: bool,
    ) -> Result<Box<dyn BytesPartialDecoderTraits + 'a>, CodecError> {
        Ok(Box::new(DecompressPartialDecoder::new(
            input_handle,
            gzip_decompress,
        )))
    }

    fn compute_encoded_size(
        &self,
        decoded_representation: &BytesRepresentation,
    ) -> BytesRepresentation {
        // A 10 byte header, an 8 byte trailer, and 5 bytes per stored deflate block of up to 32 KiB
        match decoded_representation.size() {
            Some(size) => BytesRepresentation::BoundedSize(size + 18 + 5 * size.div_ceil(32768)),
            None => BytesRepresentation::UnboundedSize,
        }
    }
}
