use thiserror::Error;

use crate::{
    array_subset::{
        ArrayExtractBytesError, ArrayStoreBytesError, ArraySubset, ArraySubsetError,
        IncompatibleDimensionalityError,
    },
    metadata::ArrayMetadataV2ToV3ConversionError,
    node::{NodeCreateError, NodePathError},
    plugin::PluginCreateError,
    storage::{StorageError, StoreKey},
};

use super::{
    chunk_grid::{InvalidArrayIndicesError, InvalidChunkGridIndicesError},
    codec::{CodecChainCreateError, CodecError},
    data_type::{
        IncompatibleFillValueError, IncompatibleFillValueMetadataError, UnsupportedDataTypeError,
    },
    ArrayShape,
};

/// An array creation error.
#[derive(Debug, Error)]
pub enum ArrayCreateError {
    /// An invalid node path
    #[error(transparent)]
    NodePathError(#[from] NodePathError),
    /// There is no array metadata at the node path.
    #[error("array metadata is missing at {_0}")]
    MissingMetadata(String),
    /// The array metadata document could not be deserialized.
    #[error("invalid array metadata at {_0}: {_1}")]
    MetadataDeserializationError(StoreKey, String),
    /// The Zarr V2 array metadata cannot be represented in the Zarr V3 array model.
    #[error("unsupported Zarr V2 array: {_0}")]
    UnsupportedZarrFormat(ArrayMetadataV2ToV3ConversionError),
    /// Unsupported data type.
    #[error(transparent)]
    DataTypeCreateError(UnsupportedDataTypeError),
    /// The fill value metadata is incompatible with the data type.
    #[error(transparent)]
    InvalidFillValueMetadata(IncompatibleFillValueMetadataError),
    /// The fill value is incompatible with the data type.
    #[error(transparent)]
    InvalidFillValue(#[from] IncompatibleFillValueError),
    /// Error creating codecs.
    #[error(transparent)]
    CodecsCreateError(PluginCreateError),
    /// The codec chain does not support the chunk representation of the array.
    #[error("invalid codec chain: {_0}")]
    InvalidCodecChain(CodecError),
    /// Chunk grid create error.
    #[error(transparent)]
    ChunkGridCreateError(PluginCreateError),
    /// Chunk key encoding create error.
    #[error(transparent)]
    ChunkKeyEncodingCreateError(PluginCreateError),
    /// The dimensionality of the chunk grid does not match the array shape.
    #[error("chunk grid dimensionality {_0} does not match array dimensionality {_1}")]
    InvalidChunkGridDimensionality(usize, usize),
    /// The number of dimension names does not match the array dimensionality.
    #[error("the number of dimension names {_0} does not match array dimensionality {_1}")]
    InvalidDimensionNames(usize, usize),
    /// Storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
}

impl From<ArrayMetadataV2ToV3ConversionError> for ArrayCreateError {
    fn from(err: ArrayMetadataV2ToV3ConversionError) -> Self {
        match err {
            ArrayMetadataV2ToV3ConversionError::UnsupportedCodec(name, _) => {
                Self::CodecsCreateError(PluginCreateError::Unsupported {
                    name,
                    plugin_type: "codec".to_string(),
                })
            }
            err => Self::UnsupportedZarrFormat(err),
        }
    }
}

impl From<CodecChainCreateError> for ArrayCreateError {
    fn from(err: CodecChainCreateError) -> Self {
        match err {
            CodecChainCreateError::PluginCreateError(err) => Self::CodecsCreateError(err),
            CodecChainCreateError::InvalidOrder(message) => {
                Self::InvalidCodecChain(CodecError::Other(message))
            }
        }
    }
}

impl From<NodeCreateError> for ArrayCreateError {
    fn from(err: NodeCreateError) -> Self {
        match err {
            NodeCreateError::NodePathError(err) => Self::NodePathError(err),
            NodeCreateError::StorageError(err) => Self::StorageError(err),
            NodeCreateError::MissingMetadata(path) => Self::MissingMetadata(path.to_string()),
            NodeCreateError::MetadataDeserializationError(key, err) => {
                Self::MetadataDeserializationError(key, err)
            }
        }
    }
}

/// Array errors.
#[derive(Debug, Error)]
pub enum ArrayError {
    /// A store error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// A codec error.
    #[error(transparent)]
    CodecError(#[from] CodecError),
    /// Invalid array indices.
    #[error(transparent)]
    InvalidArrayIndicesError(#[from] InvalidArrayIndicesError),
    /// Invalid chunk grid indices.
    #[error(transparent)]
    InvalidChunkGridIndices(#[from] InvalidChunkGridIndicesError),
    /// Incompatible dimensionality.
    #[error(transparent)]
    IncompatibleDimensionalityError(#[from] IncompatibleDimensionalityError),
    /// An invalid array subset.
    #[error(transparent)]
    ArraySubsetError(#[from] ArraySubsetError),
    /// Bytes could not be extracted from an array subset.
    #[error(transparent)]
    ArrayExtractBytesError(#[from] ArrayExtractBytesError),
    /// Bytes could not be stored into an array subset.
    #[error(transparent)]
    ArrayStoreBytesError(#[from] ArrayStoreBytesError),
    /// The array subset is out of bounds of the array shape.
    #[error("array subset {_0} is out of bounds of array shape {_1:?}")]
    OutOfBounds(ArraySubset, ArrayShape),
    /// The chunk subset is out of bounds of the chunk shape.
    #[error("chunk subset {_0} is out of bounds of chunk {_1:?} with shape {_2:?}")]
    InvalidChunkSubset(ArraySubset, Vec<u64>, ArrayShape),
    /// Unexpected chunk decoded size.
    #[error("got chunk decoded size {_0:?}, expected {_1:?}")]
    UnexpectedChunkDecodedSize(usize, u64),
    /// Incompatible bytes input size.
    #[error("got bytes with size {_0:?}, expected {_1:?}")]
    InvalidBytesInputSize(usize, u64),
    /// Incompatible element size.
    #[error("the data type size {_0} is not equal to the element size {_1}")]
    IncompatibleElementSize(usize, usize),
    /// An invalid read or write offset/shape.
    #[error("offset {_0:?} and shape {_1:?} are incompatible with array dimensionality {_2}")]
    InvalidOffsetShape(Vec<u64>, Vec<u64>, usize),
}
