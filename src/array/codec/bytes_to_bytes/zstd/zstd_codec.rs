use std::io::Write;

use crate::{
    array::{
        codec::{
            bytes_to_bytes::DecompressPartialDecoder, BytesPartialDecoderTraits,
            BytesToBytesCodecTraits, Codec, CodecError, CodecPlugin, CodecTraits,
        },
        BytesRepresentation,
    },
    config::global_config,
    metadata::Metadata,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

use super::{ZstdCodecConfiguration, ZstdCodecConfigurationV1};

/// The identifier for the `zstd` codec.
pub const IDENTIFIER: &str = "zstd";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, is_name_zstd, create_codec_zstd)
}

fn is_name_zstd(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

fn create_codec_zstd(metadata: &Metadata) -> Result<Codec, PluginCreateError> {
    let configuration: ZstdCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "codec", metadata.clone()))?;
    let codec = Box::new(ZstdCodec::new_with_configuration(&configuration));
    Ok(Codec::BytesToBytes(codec))
}

/// A `zstd` codec implementation.
#[derive(Clone, Debug)]
pub struct ZstdCodec {
    compression: i32,
    checksum: bool,
}

impl ZstdCodec {
    /// Create a new `zstd` codec.
    #[must_use]
    pub const fn new(compression: i32, checksum: bool) -> Self {
        Self {
            compression,
            checksum,
        }
    }

    /// Create a new `zstd` codec from configuration.
    #[must_use]
    pub const fn new_with_configuration(configuration: &ZstdCodecConfiguration) -> Self {
        let ZstdCodecConfiguration::V1(configuration) = configuration;
        Self {
            compression: configuration.level.as_i32(),
            checksum: configuration.checksum,
        }
    }
}

impl CodecTraits for ZstdCodec {
    fn create_metadata(&self) -> Option<Metadata> {
        let configuration = ZstdCodecConfigurationV1 {
            level: self.compression.into(),
            checksum: self.checksum,
        };
        Some(Metadata::new_with_serializable_configuration(IDENTIFIER, &configuration).unwrap())
    }
}

impl BytesToBytesCodecTraits for ZstdCodec {
    fn encode_opt(&self, decoded_value: Vec<u8>, parallel: bool) -> Result<Vec<u8>, CodecError> {
        let mut encoder = zstd::Encoder::new(Vec::new(), self.compression)?;
        encoder.include_checksum(self.checksum)?;
        if parallel {
            let n_threads = u32::try_from(global_config().codec_concurrent_limit()).unwrap_or(1);
            encoder.multithread(n_threads)?;
        }
        encoder.write_all(&decoded_value)?;
        Ok(encoder.finish()?)
    }

    fn decode_opt(
        &self,
        encoded_value: Vec<u8>,
        _decoded_representation: &BytesRepresentation,
        _parallel: bool,
    ) -> Result<Vec<u8>, CodecError> {
        Ok(zstd::decode_all(encoded_value.as_slice())?)
    }

    fn partial_decoder_opt<'a>(
        &'a self,
        input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        _decoded_representation: &BytesRepresentation,
        _parallel: bool,
    ) -> Result<Box<dyn BytesPartialDecoderTraits + 'a>, CodecError> {
        Ok(Box::new(DecompressPartialDecoder::new(
            input_handle,
            |encoded_value| Ok(zstd::decode_all(encoded_value)?),
        )))
    }

    fn compute_encoded_size(
        &self,
        decoded_representation: &BytesRepresentation,
    ) -> BytesRepresentation {
        decoded_representation
            .size()
            .map_or(BytesRepresentation::UnboundedSize, |size| {
                // https://github.com/facebook/zstd/blob/dev/doc/zstd_compression_format.md
                const HEADER_TRAILER_OVERHEAD: u64 = 4 + 14 + 4;
                const MIN_WINDOW_SIZE: u64 = 1000; // 1KB
                const BLOCK_OVERHEAD: u64 = 3;
                let blocks_overhead = BLOCK_OVERHEAD * size.div_ceil(MIN_WINDOW_SIZE);
                BytesRepresentation::BoundedSize(size + HEADER_TRAILER_OVERHEAD + blocks_overhead)
            })
    }
}
