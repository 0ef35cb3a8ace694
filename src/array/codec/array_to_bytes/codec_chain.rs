//! An array to bytes codec formed by joining an array to array sequence, an array to bytes, and a bytes to bytes sequence of codecs.

use crate::{
    array::{
        codec::{
            ArrayCodecTraits, ArrayPartialDecoderTraits, ArrayToArrayCodecTraits,
            ArrayToBytesCodecTraits, BytesPartialDecoderTraits, BytesToBytesCodecTraits, Codec,
            CodecError, CodecTraits,
        },
        BytesRepresentation, ChunkRepresentation,
    },
    metadata::Metadata,
    plugin::PluginCreateError,
};

use thiserror::Error;

/// A codec chain creation error.
#[derive(Debug, Error)]
pub enum CodecChainCreateError {
    /// A codec could not be created from its metadata.
    #[error(transparent)]
    PluginCreateError(#[from] PluginCreateError),
    /// The codecs are not one array to bytes codec between array to array and bytes to bytes codecs.
    #[error("invalid codec order: {_0}")]
    InvalidOrder(String),
}

impl From<CodecChainCreateError> for PluginCreateError {
    fn from(err: CodecChainCreateError) -> Self {
        match err {
            CodecChainCreateError::PluginCreateError(err) => err,
            CodecChainCreateError::InvalidOrder(message) => Self::Other(message),
        }
    }
}

/// A codec chain is a sequence of array to array, a single array to bytes, and a sequence of bytes to bytes codecs.
///
/// Encoding applies the codecs in order, decoding applies them in reverse.
#[derive(Debug, Clone)]
pub struct CodecChain {
    array_to_array: Vec<Box<dyn ArrayToArrayCodecTraits>>,
    array_to_bytes: Box<dyn ArrayToBytesCodecTraits>,
    bytes_to_bytes: Vec<Box<dyn BytesToBytesCodecTraits>>,
}

impl CodecChain {
    /// Create a new codec chain.
    #[must_use]
    pub fn new(
        array_to_array: Vec<Box<dyn ArrayToArrayCodecTraits>>,
        array_to_bytes: Box<dyn ArrayToBytesCodecTraits>,
        bytes_to_bytes: Vec<Box<dyn BytesToBytesCodecTraits>>,
    ) -> Self {
        Self {
            array_to_array,
            array_to_bytes,
            bytes_to_bytes,
        }
    }

    /// Create a new codec chain from a list of metadata.
    ///
    /// # Errors
    /// Returns [`CodecChainCreateError::PluginCreateError`] if a codec could not be created.
    /// Returns [`CodecChainCreateError::InvalidOrder`] if there is not exactly one array to bytes codec
    /// or the codecs are out of order (array to array, array to bytes, then bytes to bytes).
    pub fn from_metadata(metadatas: &[Metadata]) -> Result<Self, CodecChainCreateError> {
        let mut array_to_array: Vec<Box<dyn ArrayToArrayCodecTraits>> = vec![];
        let mut array_to_bytes: Option<Box<dyn ArrayToBytesCodecTraits>> = None;
        let mut bytes_to_bytes: Vec<Box<dyn BytesToBytesCodecTraits>> = vec![];
        for metadata in metadatas {
            let codec = Codec::from_metadata(metadata)?;
            match codec {
                Codec::ArrayToArray(codec) => {
                    if array_to_bytes.is_some() {
                        return Err(CodecChainCreateError::InvalidOrder(format!(
                            "array to array codec {} follows the array to bytes codec",
                            metadata.name()
                        )));
                    }
                    array_to_array.push(codec);
                }
                Codec::ArrayToBytes(codec) => {
                    if array_to_bytes.is_some() {
                        return Err(CodecChainCreateError::InvalidOrder(
                            "multiple array to bytes codecs".to_string(),
                        ));
                    }
                    array_to_bytes = Some(codec);
                }
                Codec::BytesToBytes(codec) => {
                    if array_to_bytes.is_none() {
                        return Err(CodecChainCreateError::InvalidOrder(format!(
                            "bytes to bytes codec {} precedes the array to bytes codec",
                            metadata.name()
                        )));
                    }
                    bytes_to_bytes.push(codec);
                }
            }
        }

        array_to_bytes.map_or_else(
            || {
                Err(CodecChainCreateError::InvalidOrder(
                    "missing array to bytes codec".to_string(),
                ))
            },
            |array_to_bytes| Ok(Self::new(array_to_array, array_to_bytes, bytes_to_bytes)),
        )
    }

    /// Create codec chain metadata.
    #[must_use]
    pub fn create_metadatas(&self) -> Vec<Metadata> {
        let mut metadatas =
            Vec::with_capacity(self.array_to_array.len() + 1 + self.bytes_to_bytes.len());
        for codec in &self.array_to_array {
            if let Some(metadata) = codec.create_metadata() {
                metadatas.push(metadata);
            }
        }
        if let Some(metadata) = self.array_to_bytes.create_metadata() {
            metadatas.push(metadata);
        }
        for codec in &self.bytes_to_bytes {
            if let Some(metadata) = codec.create_metadata() {
                metadatas.push(metadata);
            }
        }
        metadatas
    }

    /// Get the array to array codecs.
    #[must_use]
    pub fn array_to_array_codecs(&self) -> &[Box<dyn ArrayToArrayCodecTraits>] {
        &self.array_to_array
    }

    /// Get the array to bytes codec.
    #[allow(clippy::borrowed_box)]
    #[must_use]
    pub fn array_to_bytes_codec(&self) -> &Box<dyn ArrayToBytesCodecTraits> {
        &self.array_to_bytes
    }

    /// Get the bytes to bytes codecs.
    #[must_use]
    pub fn bytes_to_bytes_codecs(&self) -> &[Box<dyn BytesToBytesCodecTraits>] {
        &self.bytes_to_bytes
    }

    /// The decoded representations of each array to array codec, followed by the input representation of the array to bytes codec.
    fn get_array_representations(
        &self,
        decoded_representation: ChunkRepresentation,
    ) -> Result<Vec<ChunkRepresentation>, CodecError> {
        let mut array_representations = Vec::with_capacity(self.array_to_array.len() + 1);
        let mut representation = decoded_representation;
        for codec in &self.array_to_array {
            let encoded_representation = codec.compute_encoded_size(&representation)?;
            array_representations.push(representation);
            representation = encoded_representation;
        }
        array_representations.push(representation);
        Ok(array_representations)
    }

    /// The decoded representations of each bytes to bytes codec.
    fn get_bytes_representations(
        &self,
        array_representation_last: &ChunkRepresentation,
    ) -> Result<Vec<BytesRepresentation>, CodecError> {
        let mut bytes_representations = Vec::with_capacity(self.bytes_to_bytes.len());
        let mut representation = self
            .array_to_bytes
            .compute_encoded_size(array_representation_last)?;
        for codec in &self.bytes_to_bytes {
            let encoded_representation = codec.compute_encoded_size(&representation);
            bytes_representations.push(representation);
            representation = encoded_representation;
        }
        Ok(bytes_representations)
    }
}

impl CodecTraits for CodecChain {
    fn create_metadata(&self) -> Option<Metadata> {
        // A codec chain is serialised as a list of codecs through create_metadatas
        None
    }
}

impl ArrayCodecTraits for CodecChain {
    /// Encode a chunk with a sequence of codecs.
    ///
    /// See <https://zarr-specs.readthedocs.io/en/latest/v3/core/v3.0.html#encoding-procedure>.
    fn encode_opt(
        &self,
        decoded_value: Vec<u8>,
        decoded_representation: &ChunkRepresentation,
        parallel: bool,
    ) -> Result<Vec<u8>, CodecError> {
        if decoded_value.len() as u64 != decoded_representation.size() {
            return Err(CodecError::UnexpectedChunkDecodedSize(
                decoded_value.len(),
                decoded_representation.size(),
            ));
        }

        let mut value = decoded_value;
        let mut representation = decoded_representation.clone();

        // array->array
        for codec in &self.array_to_array {
            value = codec.encode_opt(value, &representation, parallel)?;
            representation = codec.compute_encoded_size(&representation)?;
        }

        // array->bytes
        value = self
            .array_to_bytes
            .encode_opt(value, &representation, parallel)?;

        // bytes->bytes
        for codec in &self.bytes_to_bytes {
            value = codec.encode_opt(value, parallel)?;
        }

        Ok(value)
    }

    /// Decode a chunk with a sequence of codecs.
    fn decode_opt(
        &self,
        encoded_value: Vec<u8>,
        decoded_representation: &ChunkRepresentation,
        parallel: bool,
    ) -> Result<Vec<u8>, CodecError> {
        let array_representations =
            self.get_array_representations(decoded_representation.clone())?;
        let array_representation_last = array_representations
            .last()
            .ok_or_else(|| CodecError::from("codec chain has no array representation"))?;
        let bytes_representations = self.get_bytes_representations(array_representation_last)?;

        let mut value = encoded_value;

        // bytes->bytes
        for (codec, bytes_representation) in std::iter::zip(
            self.bytes_to_bytes.iter().rev(),
            bytes_representations.iter().rev(),
        ) {
            value = codec.decode_opt(value, bytes_representation, parallel)?;
        }

        // bytes->array
        value = self
            .array_to_bytes
            .decode_opt(value, array_representation_last, parallel)?;

        // array->array
        for (codec, array_representation) in std::iter::zip(
            self.array_to_array.iter().rev(),
            array_representations.iter().rev().skip(1),
        ) {
            value = codec.decode_opt(value, array_representation, parallel)?;
        }

        if value.len() as u64 != decoded_representation.size() {
            return Err(CodecError::UnexpectedChunkDecodedSize(
                value.len(),
                decoded_representation.size(),
            ));
        }
        Ok(value)
    }
}

impl ArrayToBytesCodecTraits for CodecChain {
    fn partial_decoder_opt<'a>(
        &'a self,
        mut input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        decoded_representation: &ChunkRepresentation,
        parallel: bool,
    ) -> Result<Box<dyn ArrayPartialDecoderTraits + 'a>, CodecError> {
        let array_representations =
            self.get_array_representations(decoded_representation.clone())?;
        let array_representation_last = array_representations
            .last()
            .ok_or_else(|| CodecError::from("codec chain has no array representation"))?;
        let bytes_representations = self.get_bytes_representations(array_representation_last)?;

        for (codec, bytes_representation) in std::iter::zip(
            self.bytes_to_bytes.iter().rev(),
            bytes_representations.iter().rev(),
        ) {
            input_handle = codec.partial_decoder_opt(input_handle, bytes_representation, parallel)?;
        }

        let mut input_handle = self.array_to_bytes.partial_decoder_opt(
            input_handle,
            array_representation_last,
            parallel,
        )?;

        for (codec, array_representation) in std::iter::zip(
            self.array_to_array.iter().rev(),
            array_representations.iter().rev().skip(1),
        ) {
            input_handle = codec.partial_decoder_opt(input_handle, array_representation, parallel)?;
        }

        Ok(input_handle)
    }

    fn compute_encoded_size(
        &self,
        decoded_representation: &ChunkRepresentation,
    ) -> Result<BytesRepresentation, CodecError> {
        let mut decoded_representation = decoded_representation.clone();
        for codec in &self.array_to_array {
            decoded_representation = codec.compute_encoded_size(&decoded_representation)?;
        }

        let mut bytes_representation = self
            .array_to_bytes
            .compute_encoded_size(&decoded_representation)?;

        for codec in &self.bytes_to_bytes {
            bytes_representation = codec.compute_encoded_size(&bytes_representation);
        }

        Ok(bytes_representation)
    }
}
