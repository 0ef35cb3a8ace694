use std::sync::Arc;

use super::{
    chunk_key_encoding::{ChunkKeyEncoding, DefaultChunkKeyEncoding},
    codec::{
        ArrayToArrayCodecTraits, ArrayToBytesCodecTraits, BytesCodec, BytesToBytesCodecTraits,
    },
    Array, ArrayCreateError, ArrayMetadataV3, ArrayShape, ChunkGrid, ChunkKeySeparator,
    CodecChain, DataType, DimensionName, FillValue,
};

/// Configures and creates a Zarr V3 [`Array`].
///
/// A builder starts from the four properties every array needs: its shape, data type, chunk grid, and fill value.
/// Everything else has a default:
///  - chunks are serialised by the `bytes` codec in native byte order without compression,
///  - chunk keys use the `default` encoding (`c/1/2`),
///  - there are no attributes or dimension names.
///
/// [`build`](ArrayBuilder::build) only validates the configuration, [`Array::store_metadata`] writes it.
///
/// ```rust
/// # use std::sync::Arc;
/// use zarrs_engine::array::{ArrayBuilder, DataType, FillValue};
/// # let store = Arc::new(zarrs_engine::storage::store::MemoryStore::new());
/// let mut builder = ArrayBuilder::new(
///     vec![1024, 1024],
///     DataType::UInt16,
///     vec![256, 256].try_into()?,
///     FillValue::from(0u16),
/// );
/// #[cfg(feature = "sharding")]
/// builder.array_to_bytes_codec(Box::new(
///     zarrs_engine::array::codec::ShardingCodecBuilder::new(vec![32, 32].try_into()?).build(),
/// ));
/// let array = builder
///     .dimension_names(["y", "x"].into())
///     .build(store, "/image")?;
/// array.store_metadata()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct ArrayBuilder {
    shape: ArrayShape,
    data_type: DataType,
    chunk_grid: ChunkGrid,
    chunk_key_encoding: ChunkKeyEncoding,
    fill_value: FillValue,
    codecs: CodecChain,
    attributes: serde_json::Map<String, serde_json::Value>,
    dimension_names: Option<Vec<DimensionName>>,
}

impl ArrayBuilder {
    /// Create a new array builder.
    ///
    /// Consistency between `shape`, `chunk_grid` and `fill_value` is checked when the array is built.
    #[must_use]
    pub fn new(
        shape: ArrayShape,
        data_type: DataType,
        chunk_grid: ChunkGrid,
        fill_value: FillValue,
    ) -> Self {
        Self {
            shape,
            data_type,
            chunk_grid,
            chunk_key_encoding: DefaultChunkKeyEncoding::default().into(),
            fill_value,
            codecs: CodecChain::new(vec![], Box::<BytesCodec>::default(), vec![]),
            attributes: serde_json::Map::new(),
            dimension_names: None,
        }
    }

    /// Create a builder with the configuration of `array`.
    #[must_use]
    pub fn from_array<TStorage: ?Sized>(array: &Array<TStorage>) -> Self {
        Self {
            shape: array.shape().to_vec(),
            data_type: *array.data_type(),
            chunk_grid: array.chunk_grid().clone(),
            chunk_key_encoding: array.chunk_key_encoding().clone(),
            fill_value: array.fill_value().clone(),
            codecs: array.codecs().clone(),
            attributes: array.attributes().clone(),
            dimension_names: array.dimension_names().clone(),
        }
    }

    /// Set the array shape.
    pub fn shape(&mut self, shape: ArrayShape) -> &mut Self {
        self.shape = shape;
        self
    }

    /// Set the data type.
    ///
    /// The fill value must be updated as well if its size changes.
    pub fn data_type(&mut self, data_type: DataType) -> &mut Self {
        self.data_type = data_type;
        self
    }

    /// Set the chunk grid.
    pub fn chunk_grid(&mut self, chunk_grid: ChunkGrid) -> &mut Self {
        self.chunk_grid = chunk_grid;
        self
    }

    /// Set the fill value.
    pub fn fill_value(&mut self, fill_value: FillValue) -> &mut Self {
        self.fill_value = fill_value;
        self
    }

    /// Set the chunk key encoding.
    pub fn chunk_key_encoding(&mut self, chunk_key_encoding: ChunkKeyEncoding) -> &mut Self {
        self.chunk_key_encoding = chunk_key_encoding;
        self
    }

    /// Use the `default` chunk key encoding with `separator` between chunk indices.
    pub fn chunk_key_encoding_default_separator(
        &mut self,
        separator: ChunkKeySeparator,
    ) -> &mut Self {
        self.chunk_key_encoding(DefaultChunkKeyEncoding::new(separator).into())
    }

    /// Replace the array to array codecs (e.g. `transpose`).
    pub fn array_to_array_codecs(
        &mut self,
        array_to_array_codecs: Vec<Box<dyn ArrayToArrayCodecTraits>>,
    ) -> &mut Self {
        self.codecs = CodecChain::new(
            array_to_array_codecs,
            self.codecs.array_to_bytes_codec().clone(),
            self.codecs.bytes_to_bytes_codecs().to_vec(),
        );
        self
    }

    /// Replace the array to bytes codec (e.g. `bytes` or `sharding_indexed`).
    pub fn array_to_bytes_codec(
        &mut self,
        array_to_bytes_codec: Box<dyn ArrayToBytesCodecTraits>,
    ) -> &mut Self {
        self.codecs = CodecChain::new(
            self.codecs.array_to_array_codecs().to_vec(),
            array_to_bytes_codec,
            self.codecs.bytes_to_bytes_codecs().to_vec(),
        );
        self
    }

    /// Replace the bytes to bytes codecs (e.g. compressors and checksums).
    pub fn bytes_to_bytes_codecs(
        &mut self,
        bytes_to_bytes_codecs: Vec<Box<dyn BytesToBytesCodecTraits>>,
    ) -> &mut Self {
        self.codecs = CodecChain::new(
            self.codecs.array_to_array_codecs().to_vec(),
            self.codecs.array_to_bytes_codec().clone(),
            bytes_to_bytes_codecs,
        );
        self
    }

    /// Set the user attributes.
    pub fn attributes(
        &mut self,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// Set or clear the dimension names.
    pub fn dimension_names<I, D>(&mut self, dimension_names: Option<I>) -> &mut Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DimensionName>,
    {
        self.dimension_names =
            dimension_names.map(|names| names.into_iter().map(Into::into).collect());
        self
    }

    /// Create the Zarr V3 array metadata for the current configuration.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError::InvalidFillValue`] if the fill value does not have the size of the data type.
    pub fn build_metadata(&self) -> Result<ArrayMetadataV3, ArrayCreateError> {
        let fill_value = self.data_type.metadata_fill_value(&self.fill_value)?;
        let metadata = ArrayMetadataV3::new(
            self.shape.clone(),
            self.data_type.metadata(),
            self.chunk_grid.create_metadata(),
            self.chunk_key_encoding.create_metadata(),
            fill_value,
            self.codecs.create_metadatas(),
        );
        Ok(metadata
            .with_attributes(self.attributes.clone())
            .with_dimension_names(self.dimension_names.clone()))
    }

    /// Create an [`Array`] at `path` in `storage`. The store is not modified.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if `path` is not a valid node path or the configuration is inconsistent.
    pub fn build<TStorage: ?Sized>(
        &self,
        storage: Arc<TStorage>,
        path: &str,
    ) -> Result<Array<TStorage>, ArrayCreateError> {
        let metadata = self.build_metadata()?;
        Array::new_with_metadata(storage, path, metadata.into())
    }

    /// As [`build`](ArrayBuilder::build), wrapping the array in an [`Arc`].
    ///
    /// # Errors
    /// See [`build`](ArrayBuilder::build).
    pub fn build_arc<TStorage: ?Sized>(
        &self,
        storage: Arc<TStorage>,
        path: &str,
    ) -> Result<Arc<Array<TStorage>>, ArrayCreateError> {
        self.build(storage, path).map(Arc::new)
    }
}
