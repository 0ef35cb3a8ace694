use std::ffi::c_char;

use blosc_sys::{blosc_get_complib_info, BLOSC_MAX_OVERHEAD};

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

use super::{
    blosc_compress_bytes, blosc_decompress_bytes, BloscCodecConfiguration,
    BloscCodecConfigurationV1, BloscCompressionLevel, BloscCompressor, BloscShuffleMode,
};

/// The identifier for the `blosc` codec.
pub const IDENTIFIER: &str = "blosc";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, is_name_blosc, create_codec_blosc)
}

fn is_name_blosc(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

fn create_codec_blosc(metadata: &Metadata) -> Result<Codec, PluginCreateError> {
    let configuration: BloscCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "codec", metadata.clone()))?;
    let codec = Box::new(BloscCodec::new_with_configuration(&configuration)?);
    Ok(Codec::BytesToBytes(codec))
}

/// A `blosc` codec implementation.
#[derive(Clone, Debug)]
pub struct BloscCodec {
    configuration: BloscCodecConfigurationV1,
}

impl BloscCodec {
    /// Create a new `blosc` codec.
    ///
    /// The block size is chosen automatically if `blocksize` is zero.
    /// `typesize` must be a positive integer if shuffling is enabled.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if
    ///  - the compressor is not supported, or
    ///  - the typesize has not been specified and shuffling is enabled.
    pub fn new(
        cname: BloscCompressor,
        clevel: BloscCompressionLevel,
        blocksize: usize,
        shuffle_mode: BloscShuffleMode,
        typesize: usize,
    ) -> Result<Self, PluginCreateError> {
        if shuffle_mode != BloscShuffleMode::NoShuffle && typesize == 0 {
            return Err(PluginCreateError::Other(
                "blosc typesize must be a positive integer if the shuffle mode is not noshuffle"
                    .to_string(),
            ));
        }

        let support = unsafe {
            blosc_get_complib_info(
                cname.as_cstr().as_ptr().cast::<c_char>(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        if support < 0 {
            return Err(PluginCreateError::Other(format!(
                "blosc compressor {cname} is not supported"
            )));
        }

        let configuration = BloscCodecConfigurationV1 {
            cname,
            clevel,
            shuffle: shuffle_mode,
            typesize,
            blocksize,
        };
        Ok(Self { configuration })
    }

    /// Create a new `blosc` codec from configuration.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if the configuration is not supported.
    pub fn new_with_configuration(
        configuration: &BloscCodecConfiguration,
    ) -> Result<Self, PluginCreateError> {
        let BloscCodecConfiguration::V1(configuration) = configuration;
        Self::new(
            configuration.cname,
            configuration.clevel,
            configuration.blocksize,
            configuration.shuffle,
            configuration.typesize,
        )
    }

    fn num_threads(parallel: bool) -> usize {
        if parallel {
            global_config().codec_concurrent_limit()
        } else {
            1
        }
    }
}

impl CodecTraits for BloscCodec {
    fn create_metadata(&self) -> Option<Metadata> {
        Some(
            Metadata::new_with_serializable_configuration(IDENTIFIER, &self.configuration).unwrap(),
        )
    }
}

impl BytesToBytesCodecTraits for BloscCodec {
    fn encode_opt(&self, decoded_value: Vec<u8>, parallel: bool) -> Result<Vec<u8>, CodecError> {
        blosc_compress_bytes(
            &decoded_value,
            self.configuration.clevel,
            self.configuration.shuffle,
            self.configuration.typesize,
            self.configuration.cname,
            self.configuration.blocksize,
            Self::num_threads(parallel),
        )
        .map_err(|err| CodecError::Other(err.to_string()))
    }

    fn decode_opt(
        &self,
        encoded_value: Vec<u8>,
        _decoded_representation: &BytesRepresentation,
        parallel: bool,
    ) -> Result<Vec<u8>, CodecError> {
        blosc_decompress_bytes(&encoded_value, Self::num_threads(parallel))
            .map_err(|err| CodecError::Other(err.to_string()))
    }

    fn partial_decoder_opt<'a>(
        &'a self,
        input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        _decoded_representation: &BytesRepresentation,
        _parallel: bool,
    ) -> Result<Box<dyn BytesPartialDecoderTraits + 'a>, CodecError> {
        Ok(Box::new(DecompressPartialDecoder::new(
            input_handle,
            |encoded_value| {
                blosc_decompress_bytes(encoded_value, 1)
                    .map_err(|err| CodecError::Other(err.to_string()))
            },
        )))
    }

    fn compute_encoded_size(
        &self,
        decoded_representation: &BytesRepresentation,
    ) -> BytesRepresentation {
        decoded_representation
            .size()
            .map_or(BytesRepresentation::UnboundedSize, |size| {
                BytesRepresentation::BoundedSize(size + u64::from(BLOSC_MAX_OVERHEAD))
            })
    }
}
