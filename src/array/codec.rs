//! Codecs and the codec pipeline.
//!
//! A chunk is encoded by passing it through a [`CodecChain`]:
//!  - zero or more array to array codecs ([`ArrayToArrayCodecTraits`]) rearrange the elements,
//!  - exactly one array to bytes codec ([`ArrayToBytesCodecTraits`]) serialises them,
//!  - zero or more bytes to bytes codecs ([`BytesToBytesCodecTraits`]) compress or checksum the result.
//!
//! Decoding runs the chain in reverse.
//! Codecs can also build partial decoders, which read only the byte ranges needed for a region of a chunk.
//! The `sharding_indexed` codec uses this to read individual inner chunks out of a shard.
//!
//! Codecs are created from array metadata through the [`CodecPlugin`]s registered with [`inventory`].

pub mod array_to_array;
pub mod array_to_bytes;
pub mod bytes_to_bytes;

mod byte_interval_partial_decoder;
pub use byte_interval_partial_decoder::ByteIntervalPartialDecoder;

// Array to array
#[cfg(feature = "transpose")]
pub use array_to_array::transpose::{
    TransposeCodec, TransposeCodecConfiguration, TransposeCodecConfigurationV1, TransposeOrder,
};

// Array to bytes
#[cfg(feature = "sharding")]
pub use array_to_bytes::sharding::{
    ShardingCodec, ShardingCodecBuilder, ShardingCodecConfiguration,
    ShardingCodecConfigurationV1, ShardingIndexLocation,
};
pub use array_to_bytes::{
    bytes::{BytesCodec, BytesCodecConfiguration, BytesCodecConfigurationV1},
    codec_chain::{CodecChain, CodecChainCreateError},
};

// Bytes to bytes
#[cfg(feature = "blosc")]
pub use bytes_to_bytes::blosc::{
    BloscCodec, BloscCodecConfiguration, BloscCodecConfigurationV1, BloscCompressionLevel,
    BloscCompressor, BloscShuffleMode,
};
#[cfg(feature = "crc32c")]
pub use bytes_to_bytes::crc32c::{
    Crc32cCodec, Crc32cCodecConfiguration, Crc32cCodecConfigurationV1,
};
#[cfg(feature = "gzip")]
pub use bytes_to_bytes::gzip::{
    GzipCodec, GzipCodecConfiguration, GzipCodecConfigurationV1, GzipCompressionLevel,
    GzipCompressionLevelError,
};
#[cfg(feature = "zstd")]
pub use bytes_to_bytes::zstd::{
    ZstdCodec, ZstdCodecConfiguration, ZstdCodecConfigurationV1, ZstdCompressionLevel,
};

use thiserror::Error;

use crate::{
    array_subset::{ArraySubset, IncompatibleArrayShapeError, InvalidArraySubsetError},
    byte_range::{extract_byte_ranges, ByteRange, InvalidByteRangeError},
    metadata::Metadata,
    plugin::{create_from_registry, Plugin, PluginCreateError},
    storage::{ReadableStorage, StorageError, StoreKey},
};

use super::{BytesRepresentation, ChunkRepresentation, DataType};

/// A codec plugin.
pub type CodecPlugin = Plugin<Codec>;
inventory::collect!(CodecPlugin);

/// A generic array to array, array to bytes, or bytes to bytes codec.
#[derive(Debug)]
pub enum Codec {
    /// An array to array codec.
    ArrayToArray(Box<dyn ArrayToArrayCodecTraits>),
    /// An array to bytes codec.
    ArrayToBytes(Box<dyn ArrayToBytesCodecTraits>),
    /// A bytes to bytes codec.
    BytesToBytes(Box<dyn BytesToBytesCodecTraits>),
}

impl Codec {
    /// Create a codec from metadata.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if the metadata is invalid or not associated with a registered codec plugin.
    pub fn from_metadata(metadata: &Metadata) -> Result<Self, PluginCreateError> {
        create_from_registry(metadata, "codec")
    }

    /// Returns the kind of the codec, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ArrayToArray(_) => "array to array",
            Self::ArrayToBytes(_) => "array to bytes",
            Self::BytesToBytes(_) => "bytes to bytes",
        }
    }
}

/// Traits common to every codec.
pub trait CodecTraits: Send + Sync {
    /// The metadata of the codec, as written to the `codecs` list of an array.
    ///
    /// Returns [`None`] for codecs that do not appear in array metadata.
    fn create_metadata(&self) -> Option<Metadata>;
}

/// Whole chunk encoding and decoding for codecs with an array input (array to array and array to bytes).
///
/// The `_opt` methods take a `parallel` flag which permits the codec to use the rayon thread pool internally.
/// The remaining methods are shorthands for serial and parallel operation.
pub trait ArrayCodecTraits: CodecTraits {
    /// Encode the bytes of a chunk with the shape, data type and fill value of `decoded_representation`.
    ///
    /// # Errors
    /// Returns [`CodecError`] if encoding fails or the length of `decoded_value` does not match `decoded_representation`.
    fn encode_opt(
        &self,
        decoded_value: Vec<u8>,
        decoded_representation: &ChunkRepresentation,
        parallel: bool,
    ) -> Result<Vec<u8>, CodecError>;

    /// Decode an encoded chunk to the bytes of `decoded_representation`.
    ///
    /// # Errors
    /// Returns [`CodecError`] if decoding fails or the decoded length does not match `decoded_representation`.
    fn decode_opt(
        &self,
        encoded_value: Vec<u8>,
        decoded_representation: &ChunkRepresentation,
        parallel: bool,
    ) -> Result<Vec<u8>, CodecError>;

    /// Serial [`encode_opt`](ArrayCodecTraits::encode_opt).
    #[allow(clippy::missing_errors_doc)]
    fn encode(
        &self,
        decoded_value: Vec<u8>,
        decoded_representation: &ChunkRepresentation,
    ) -> Result<Vec<u8>, CodecError> {
        self.encode_opt(decoded_value, decoded_representation, false)
    }

    /// Parallel [`encode_opt`](ArrayCodecTraits::encode_opt).
    #[allow(clippy::missing_errors_doc)]
    fn par_encode(
        &self,
        decoded_value: Vec<u8>,
        decoded_representation: &ChunkRepresentation,
    ) -> Result<Vec<u8>, CodecError> {
        self.encode_opt(decoded_value, decoded_representation, true)
    }

    /// Serial [`decode_opt`](ArrayCodecTraits::decode_opt).
    #[allow(clippy::missing_errors_doc)]
    fn decode(
        &self,
        encoded_value: Vec<u8>,
        decoded_representation: &ChunkRepresentation,
    ) -> Result<Vec<u8>, CodecError> {
        self.decode_opt(encoded_value, decoded_representation, false)
    }

    /// Parallel [`decode_opt`](ArrayCodecTraits::decode_opt).
    #[allow(clippy::missing_errors_doc)]
    fn par_decode(
        &self,
        encoded_value: Vec<u8>,
        decoded_representation: &ChunkRepresentation,
    ) -> Result<Vec<u8>, CodecError> {
        self.decode_opt(encoded_value, decoded_representation, true)
    }
}

/// A source of byte ranges of an encoded value.
///
/// Partial decoders are stacked from the store upwards: the innermost reads byte ranges of a stored value, and each bytes to bytes codec wraps the one below it.
pub trait BytesPartialDecoderTraits: Send + Sync {
    /// Return the bytes of each of `decoded_regions`, in order.
    ///
    /// Returns [`None`] if the underlying value does not exist.
    ///
    /// # Errors
    /// Returns [`CodecError`] if decoding fails or a byte range lies outside of the value.
    fn partial_decode_opt(
        &self,
        decoded_regions: &[ByteRange],
        parallel: bool,
    ) -> Result<Option<Vec<Vec<u8>>>, CodecError>;

    /// Return the entire decoded value, or [`None`] if it does not exist.
    ///
    /// # Errors
    /// Returns [`CodecError`] if decoding fails.
    fn decode_opt(&self, parallel: bool) -> Result<Option<Vec<u8>>, CodecError> {
        let mut decoded = self.partial_decode_opt(&[ByteRange::FromStart(0, None)], parallel)?;
        Ok(decoded.as_mut().and_then(Vec::pop))
    }

    /// Serial [`partial_decode_opt`](BytesPartialDecoderTraits::partial_decode_opt).
    #[allow(clippy::missing_errors_doc)]
    fn partial_decode(
        &self,
        decoded_regions: &[ByteRange],
    ) -> Result<Option<Vec<Vec<u8>>>, CodecError> {
        self.partial_decode_opt(decoded_regions, false)
    }

    /// Serial [`decode_opt`](BytesPartialDecoderTraits::decode_opt).
    #[allow(clippy::missing_errors_doc)]
    fn decode(&self) -> Result<Option<Vec<u8>>, CodecError> {
        self.decode_opt(false)
    }
}

/// A source of array subsets of a decoded chunk.
pub trait ArrayPartialDecoderTraits: Send + Sync {
    /// Return the bytes of each of `array_subsets` of the chunk, in order.
    ///
    /// The elements of a chunk that does not exist are the fill value.
    ///
    /// # Errors
    /// Returns [`CodecError`] if decoding fails or an array subset is out of the bounds of the chunk.
    fn partial_decode_opt(
        &self,
        array_subsets: &[ArraySubset],
        parallel: bool,
    ) -> Result<Vec<Vec<u8>>, CodecError>;

    /// Serial [`partial_decode_opt`](ArrayPartialDecoderTraits::partial_decode_opt).
    #[allow(clippy::missing_errors_doc)]
    fn partial_decode(&self, array_subsets: &[ArraySubset]) -> Result<Vec<Vec<u8>>, CodecError> {
        self.partial_decode_opt(array_subsets, false)
    }

    /// Parallel [`partial_decode_opt`](ArrayPartialDecoderTraits::partial_decode_opt).
    #[allow(clippy::missing_errors_doc)]
    fn par_partial_decode(
        &self,
        array_subsets: &[ArraySubset],
    ) -> Result<Vec<Vec<u8>>, CodecError> {
        self.partial_decode_opt(array_subsets, true)
    }
}

/// Reads byte ranges of the value at a key of a [`ReadableStorage`].
///
/// Every request is forwarded to the store as a single [`get_partial_values_key`](crate::storage::ReadableStorageTraits::get_partial_values_key) call.
pub struct StoragePartialDecoder {
    storage: ReadableStorage,
    key: StoreKey,
}

impl StoragePartialDecoder {
    /// Create a partial decoder for the value at `key` in `storage`.
    pub fn new(storage: ReadableStorage, key: StoreKey) -> Self {
        Self { storage, key }
    }
}

impl BytesPartialDecoderTraits for StoragePartialDecoder {
    fn partial_decode_opt(
        &self,
        decoded_regions: &[ByteRange],
        _parallel: bool,
    ) -> Result<Option<Vec<Vec<u8>>>, CodecError> {
        let values = self
            .storage
            .get_partial_values_key(&self.key, decoded_regions)?;
        Ok(values.map(|values| values.iter().map(|value| value.to_vec()).collect()))
    }
}

impl<T: AsRef<[u8]> + Send + Sync> BytesPartialDecoderTraits for std::io::Cursor<T> {
    fn partial_decode_opt(
        &self,
        decoded_regions: &[ByteRange],
        _parallel: bool,
    ) -> Result<Option<Vec<Vec<u8>>>, CodecError> {
        let bytes = self.get_ref().as_ref();
        Ok(Some(extract_byte_ranges(bytes, decoded_regions)?))
    }
}

/// An array to array codec, such as `transpose`.
pub trait ArrayToArrayCodecTraits:
    ArrayCodecTraits + dyn_clone::DynClone + core::fmt::Debug
{
    /// Wrap `input_handle`, a partial decoder of the encoded array, in a partial decoder of the decoded array.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if the partial decoder cannot be created.
    fn partial_decoder_opt<'a>(
        &'a self,
        input_handle: Box<dyn ArrayPartialDecoderTraits + 'a>,
        decoded_representation: &ChunkRepresentation,
        parallel: bool,
    ) -> Result<Box<dyn ArrayPartialDecoderTraits + 'a>, CodecError>;

    /// The representation of the encoded array for a decoded array with `decoded_representation`.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if the codec does not support `decoded_representation`.
    fn compute_encoded_size(
        &self,
        decoded_representation: &ChunkRepresentation,
    ) -> Result<ChunkRepresentation, CodecError>;

    /// Serial [`partial_decoder_opt`](ArrayToArrayCodecTraits::partial_decoder_opt).
    #[allow(clippy::missing_errors_doc)]
    fn partial_decoder<'a>(
        &'a self,
        input_handle: Box<dyn ArrayPartialDecoderTraits + 'a>,
        decoded_representation: &ChunkRepresentation,
    ) -> Result<Box<dyn ArrayPartialDecoderTraits + 'a>, CodecError> {
        self.partial_decoder_opt(input_handle, decoded_representation, false)
    }
}

dyn_clone::clone_trait_object!(ArrayToArrayCodecTraits);

/// An array to bytes codec, such as `bytes` or `sharding_indexed`.
pub trait ArrayToBytesCodecTraits:
    ArrayCodecTraits + dyn_clone::DynClone + core::fmt::Debug
{
    /// Wrap `input_handle`, a partial decoder of the encoded bytes, in a partial decoder of the decoded array.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if the partial decoder cannot be created.
    fn partial_decoder_opt<'a>(
        &'a self,
        input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        decoded_representation: &ChunkRepresentation,
        parallel: bool,
    ) -> Result<Box<dyn ArrayPartialDecoderTraits + 'a>, CodecError>;

    /// The encoded size for a decoded array with `decoded_representation`.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if the codec does not support `decoded_representation`.
    fn compute_encoded_size(
        &self,
        decoded_representation: &ChunkRepresentation,
    ) -> Result<BytesRepresentation, CodecError>;

    /// Serial [`partial_decoder_opt`](ArrayToBytesCodecTraits::partial_decoder_opt).
    #[allow(clippy::missing_errors_doc)]
    fn partial_decoder<'a>(
        &'a self,
        input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        decoded_representation: &ChunkRepresentation,
    ) -> Result<Box<dyn ArrayPartialDecoderTraits + 'a>, CodecError> {
        self.partial_decoder_opt(input_handle, decoded_representation, false)
    }

    /// Parallel [`partial_decoder_opt`](ArrayToBytesCodecTraits::partial_decoder_opt).
    #[allow(clippy::missing_errors_doc)]
    fn par_partial_decoder<'a>(
        &'a self,
        input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        decoded_representation: &ChunkRepresentation,
    ) -> Result<Box<dyn ArrayPartialDecoderTraits + 'a>, CodecError> {
        self.partial_decoder_opt(input_handle, decoded_representation, true)
    }
}

dyn_clone::clone_trait_object!(ArrayToBytesCodecTraits);

/// A bytes to bytes codec, such as a compressor or checksum.
pub trait BytesToBytesCodecTraits: CodecTraits + dyn_clone::DynClone + core::fmt::Debug {
    /// Encode `decoded_value`.
    ///
    /// # Errors
    /// Returns [`CodecError`] if encoding fails.
    fn encode_opt(&self, decoded_value: Vec<u8>, parallel: bool) -> Result<Vec<u8>, CodecError>;

    /// Decode `encoded_value`. `decoded_representation` is the expected size of the output.
    ///
    /// # Errors
    /// Returns [`CodecError`] if decoding fails or the encoded value is corrupt.
    fn decode_opt(
        &self,
        encoded_value: Vec<u8>,
        decoded_representation: &BytesRepresentation,
        parallel: bool,
    ) -> Result<Vec<u8>, CodecError>;

    /// Wrap `input_handle`, a partial decoder of the encoded bytes, in a partial decoder of the decoded bytes.
    ///
    /// Codecs without random access decode the whole value on the first request.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if the partial decoder cannot be created.
    fn partial_decoder_opt<'a>(
        &'a self,
        input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        decoded_representation: &BytesRepresentation,
        parallel: bool,
    ) -> Result<Box<dyn BytesPartialDecoderTraits + 'a>, CodecError>;

    /// The encoded size for a decoded value of `decoded_representation`.
    fn compute_encoded_size(
        &self,
        decoded_representation: &BytesRepresentation,
    ) -> BytesRepresentation;

    /// Serial [`encode_opt`](BytesToBytesCodecTraits::encode_opt).
    #[allow(clippy::missing_errors_doc)]
    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        self.encode_opt(decoded_value, false)
    }

    /// Serial [`decode_opt`](BytesToBytesCodecTraits::decode_opt).
    #[allow(clippy::missing_errors_doc)]
    fn decode(
        &self,
        encoded_value: Vec<u8>,
        decoded_representation: &BytesRepresentation,
    ) -> Result<Vec<u8>, CodecError> {
        self.decode_opt(encoded_value, decoded_representation, false)
    }

    /// Serial [`partial_decoder_opt`](BytesToBytesCodecTraits::partial_decoder_opt).
    #[allow(clippy::missing_errors_doc)]
    fn partial_decoder<'a>(
        &'a self,
        input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        decoded_representation: &BytesRepresentation,
    ) -> Result<Box<dyn BytesPartialDecoderTraits + 'a>, CodecError> {
        self.partial_decoder_opt(input_handle, decoded_representation, false)
    }
}

dyn_clone::clone_trait_object!(BytesToBytesCodecTraits);

/// A codec error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// An invalid byte range was requested.
    #[error(transparent)]
    InvalidByteRangeError(#[from] InvalidByteRangeError),
    /// An invalid array subset was requested.
    #[error(transparent)]
    InvalidArraySubsetError(#[from] InvalidArraySubsetError),
    /// An array subset is incompatible with the chunk shape.
    #[error(transparent)]
    IncompatibleArrayShapeError(#[from] IncompatibleArrayShapeError),
    /// The decoded size of a chunk did not match what was expected.
    #[error("the size of a decoded chunk is {_0}, expected {_1}")]
    UnexpectedChunkDecodedSize(usize, u64),
    /// An embedded checksum does not match the decoded value.
    #[error("the checksum is invalid")]
    InvalidChecksum,
    /// A shard index is malformed.
    #[error("the shard index is invalid: {_0}")]
    InvalidShardIndex(String),
    /// A store error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// Unsupported data type
    #[error("unsupported data type {_0} for codec {_1}")]
    UnsupportedDataType(DataType, String),
    /// Other
    #[error("{_0}")]
    Other(String),
}

impl From<&str> for CodecError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for CodecError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}
