//! Zarr arrays.
//!
//! An array is a node in a Zarr hierarchy used to hold multidimensional array data and associated metadata.
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/core/v3.0.html#array>.
//!
//! Use [`ArrayBuilder`] to setup a new array, or use [`Array::new`] for an existing Zarr V3 or Zarr V2 array.
//! The documentation for [`Array`] details how to interact with arrays.

mod array_builder;
mod array_errors;
mod array_sync_readable;
mod array_sync_readable_writable;
mod array_sync_writable;
mod bytes_representation;
pub mod chunk_grid;
pub mod chunk_key_encoding;
mod chunk_representation;
mod chunk_shape;
mod concurrency;
pub mod codec;
pub mod data_type;
mod dimension_name;
mod endianness;
mod fill_value;
mod nan_representations;

use std::sync::Arc;

pub use self::{
    array_builder::ArrayBuilder,
    array_errors::{ArrayCreateError, ArrayError},
    bytes_representation::BytesRepresentation,
    chunk_grid::ChunkGrid,
    chunk_key_encoding::{ChunkKeyEncoding, ChunkKeySeparator},
    chunk_representation::ChunkRepresentation,
    chunk_shape::{chunk_shape_to_array_shape, ChunkShape, NonZeroError},
    codec::CodecChain,
    data_type::DataType,
    dimension_name::DimensionName,
    endianness::{Endianness, NATIVE_ENDIAN},
    fill_value::FillValue,
    nan_representations::{ZARR_NAN_F32, ZARR_NAN_F64},
};
pub use crate::metadata::{ArrayMetadata, ArrayMetadataV2, ArrayMetadataV3, FillValueMetadata};

use crate::{
    array_subset::{ArraySubset, IncompatibleDimensionalityError},
    metadata::array_metadata_v2_to_v3,
    node::NodePath,
    storage::{data_key, StoreKey},
};

use self::codec::{ArrayToBytesCodecTraits, CodecError};

/// An ND index to an element in an array.
pub type ArrayIndices = Vec<u64>;

/// The shape of an array.
pub type ArrayShape = Vec<u64>;

/// A Zarr array.
///
/// See <https://zarr-specs.readthedocs.io/en/latest/v3/core/v3.0.html#array-metadata>.
///
/// ### Metadata
///
/// An array is defined by the following parameters (which are encoded in its JSON metadata):
///  - **shape**: defines the length of the array dimensions,
///  - **data type**: defines the numerical representation array elements,
///  - **chunk grid**: defines how the array is subdivided into chunks,
///  - **chunk key encoding**: defines how chunk grid cell coordinates are mapped to keys in a store,
///  - **fill value**: an element value to use for uninitialised portions of the array.
///  - **codecs**: used to encode and decode chunks,
///
/// and optional parameters:
///  - **attributes**: user-defined attributes, and
///  - **dimension names**: defines the names of the array dimensions.
///
/// A Zarr V2 array (`.zarray`) is opened by converting its metadata to the equivalent Zarr V3 model.
/// Its chunks are read and written with the `v2` chunk key encoding, and its metadata is stored in the Zarr V2 format.
///
/// ### Initialisation
///
/// A *new* array can be initialised with an [`ArrayBuilder`] or [`Array::new_with_metadata`].
///
/// An *existing* array can be initialised with [`Array::new`], its metadata is read from the store.
///
/// Array metadata is immutable after construction.
/// It must be written explicitly to the store with [`store_metadata`](Array<WritableStorageTraits>::store_metadata) if an array is newly created.
///
/// ### Methods
///
/// Array operations are divided into several categories based on the traits implemented for the backing [storage](crate::storage):
///  - [`ReadableStorageTraits`](crate::storage::ReadableStorageTraits): read array data and metadata
///    - [`read`](Array::read) / [`read_elements`](Array::read_elements) / [`read_ndarray`](Array::read_ndarray)
///    - [`retrieve_chunk`](Array::retrieve_chunk) / [`retrieve_chunk_if_exists`](Array::retrieve_chunk_if_exists)
///    - [`retrieve_chunk_subset`](Array::retrieve_chunk_subset)
///    - [`retrieve_array_subset`](Array::retrieve_array_subset) / [`par_retrieve_array_subset`](Array::par_retrieve_array_subset)
///    - [`partial_decoder`](Array::partial_decoder)
///  - [`WritableStorageTraits`](crate::storage::WritableStorageTraits): write array data and metadata
///    - [`store_metadata`](Array::store_metadata)
///    - [`store_chunk`](Array::store_chunk)
///    - [`erase_chunk`](Array::erase_chunk)
///  - [`ReadableWritableStorageTraits`](crate::storage::ReadableWritableStorageTraits): perform operations requiring both reading and writing
///    - [`write`](Array::write) / [`write_elements`](Array::write_elements) / [`write_ndarray`](Array::write_ndarray)
///    - [`store_chunk_subset`](Array::store_chunk_subset)
///    - [`store_array_subset`](Array::store_array_subset) / [`par_store_array_subset`](Array::par_store_array_subset)
///
/// The `retrieve` and `store` methods operate on bytes.
/// Variants with an `_opt` suffix take an explicit `parallel` argument which enables multithreading across chunks and within codecs.
/// The `_elements` and `_ndarray` (with the `ndarray` feature) variants of [`read`](Array::read) and [`write`](Array::write) work with typed elements.
///
/// ### Parallel Writing
///
/// Chunks are not locked.
/// [`store_chunk_subset`](Array::store_chunk_subset) and [`store_array_subset`](Array::store_array_subset) retrieve a chunk, update it, then store it.
/// If a chunk is written by more than one thread at once, element updates may be lost.
/// Callers must ensure that concurrent writes do not touch the same chunk.
#[derive(Debug)]
pub struct Array<TStorage: ?Sized> {
    /// The storage.
    storage: Arc<TStorage>,
    /// The path of the array in a store.
    path: NodePath,
    /// An array of integers providing the length of each dimension of the Zarr array.
    shape: ArrayShape,
    /// The data type of the Zarr array.
    data_type: DataType,
    /// The chunk grid of the Zarr array.
    chunk_grid: ChunkGrid,
    /// The number of chunks along each dimension.
    chunk_grid_shape: ArrayShape,
    /// The mapping from chunk grid cell coordinates to keys in the underlying store.
    chunk_key_encoding: ChunkKeyEncoding,
    /// Provides an element value to use for uninitialised portions of the Zarr array.
    fill_value: FillValue,
    /// Specifies a list of codecs to be used for encoding and decoding chunks.
    codecs: CodecChain,
    /// An optional list of dimension names.
    dimension_names: Option<Vec<DimensionName>>,
    /// The array metadata, in the Zarr format it was created or opened with.
    metadata: ArrayMetadata,
}

impl<TStorage: ?Sized> Array<TStorage> {
    /// Create an array in `storage` at `path` with `metadata`.
    /// This does **not** write to the store, use [`store_metadata`](Array<WritableStorageTraits>::store_metadata) to write `metadata` to `storage`.
    ///
    /// Zarr V2 metadata is converted to the Zarr V3 array model.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if:
    ///  - any metadata is invalid,
    ///  - a plugin (e.g. data type/chunk grid/chunk key encoding/codec) is invalid or unsupported, or
    ///  - the codec chain does not support the chunk representation of the array.
    pub fn new_with_metadata(
        storage: Arc<TStorage>,
        path: &str,
        metadata: ArrayMetadata,
    ) -> Result<Self, ArrayCreateError> {
        let path = NodePath::new(path)?;

        let metadata_v3 = match &metadata {
            ArrayMetadata::V3(metadata) => metadata.clone(),
            ArrayMetadata::V2(metadata) => array_metadata_v2_to_v3(metadata)?,
        };

        let data_type = DataType::from_metadata(&metadata_v3.data_type)
            .map_err(ArrayCreateError::DataTypeCreateError)?;
        let chunk_grid = ChunkGrid::from_metadata(&metadata_v3.chunk_grid)
            .map_err(ArrayCreateError::ChunkGridCreateError)?;
        if chunk_grid.dimensionality() != metadata_v3.shape.len() {
            return Err(ArrayCreateError::InvalidChunkGridDimensionality(
                chunk_grid.dimensionality(),
                metadata_v3.shape.len(),
            ));
        }
        let chunk_grid_shape = chunk_grid.grid_shape(&metadata_v3.shape).map_err(|_| {
            ArrayCreateError::InvalidChunkGridDimensionality(
                chunk_grid.dimensionality(),
                metadata_v3.shape.len(),
            )
        })?;
        let fill_value = data_type
            .fill_value_from_metadata(&metadata_v3.fill_value)
            .map_err(ArrayCreateError::InvalidFillValueMetadata)?;
        let codecs = CodecChain::from_metadata(&metadata_v3.codecs)?;
        let chunk_key_encoding = ChunkKeyEncoding::from_metadata(&metadata_v3.chunk_key_encoding)
            .map_err(ArrayCreateError::ChunkKeyEncodingCreateError)?;
        if let Some(dimension_names) = &metadata_v3.dimension_names {
            if dimension_names.len() != metadata_v3.shape.len() {
                return Err(ArrayCreateError::InvalidDimensionNames(
                    dimension_names.len(),
                    metadata_v3.shape.len(),
                ));
            }
        }

        // Check the codec chain front to back against the representation of a chunk
        let chunk_shape = chunk_grid.chunk_shape_unchecked(&vec![0; chunk_grid.dimensionality()]);
        let chunk_representation =
            ChunkRepresentation::new(chunk_shape.to_vec(), data_type, fill_value.clone())?;
        codecs
            .compute_encoded_size(&chunk_representation)
            .map_err(ArrayCreateError::InvalidCodecChain)?;

        log::debug!(
            "array {path}: zarr_format {}, shape {:?}, data type {}",
            metadata.zarr_format(),
            metadata_v3.shape,
            data_type.name()
        );

        Ok(Self {
            storage,
            path,
            shape: metadata_v3.shape,
            data_type,
            chunk_grid,
            chunk_grid_shape,
            chunk_key_encoding,
            fill_value,
            codecs,
            dimension_names: metadata_v3.dimension_names,
            metadata,
        })
    }

    /// Get the underlying storage backing the array.
    #[must_use]
    pub fn storage(&self) -> Arc<TStorage> {
        self.storage.clone()
    }

    /// Get the node path.
    #[must_use]
    pub const fn path(&self) -> &NodePath {
        &self.path
    }

    /// Get the data type.
    #[must_use]
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Get the fill value.
    #[must_use]
    pub const fn fill_value(&self) -> &FillValue {
        &self.fill_value
    }

    /// Get the array shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Get the array dimensionality.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.shape.len()
    }

    /// Get the codecs.
    #[must_use]
    pub const fn codecs(&self) -> &CodecChain {
        &self.codecs
    }

    /// Get the chunk grid.
    #[must_use]
    pub const fn chunk_grid(&self) -> &ChunkGrid {
        &self.chunk_grid
    }

    /// Get the chunk key encoding.
    #[must_use]
    pub const fn chunk_key_encoding(&self) -> &ChunkKeyEncoding {
        &self.chunk_key_encoding
    }

    /// Get the dimension names.
    #[must_use]
    pub const fn dimension_names(&self) -> &Option<Vec<DimensionName>> {
        &self.dimension_names
    }

    /// Get the attributes.
    #[must_use]
    pub fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        self.metadata.attributes()
    }

    /// Get the array metadata.
    ///
    /// This is the Zarr V3 or Zarr V2 metadata the array was created with.
    #[must_use]
    pub const fn metadata(&self) -> &ArrayMetadata {
        &self.metadata
    }

    /// Create an array builder matching the parameters of this array.
    #[must_use]
    pub fn builder(&self) -> ArrayBuilder {
        ArrayBuilder::from_array(self)
    }

    /// The store key of the chunk at `chunk_indices`: the array path joined with the encoded chunk key.
    #[must_use]
    pub fn chunk_key(&self, chunk_indices: &[u64]) -> StoreKey {
        data_key(self.path(), chunk_indices, self.chunk_key_encoding())
    }

    /// Return the shape of the chunk grid (i.e., the number of chunks along each dimension).
    #[must_use]
    pub fn chunk_grid_shape(&self) -> &[u64] {
        &self.chunk_grid_shape
    }

    /// Return the shape of the chunk at `chunk_indices`.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidChunkGridIndices`] if the `chunk_indices` are incompatible with the chunk grid.
    pub fn chunk_shape(&self, chunk_indices: &[u64]) -> Result<ChunkShape, ArrayError> {
        Ok(self.chunk_grid.chunk_shape(chunk_indices, &self.shape)?)
    }

    /// Return the array subset of the chunk at `chunk_indices`.
    ///
    /// This is the subset of the full (physical) chunk, which may extend beyond the bounds of the array.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidChunkGridIndices`] if the `chunk_indices` are incompatible with the chunk grid.
    pub fn chunk_subset(&self, chunk_indices: &[u64]) -> Result<ArraySubset, ArrayError> {
        let chunk_origin = self.chunk_grid.chunk_origin(chunk_indices, &self.shape)?;
        let chunk_shape = self.chunk_grid.chunk_shape_unchecked(chunk_indices);
        Ok(ArraySubset::new_with_start_shape(
            chunk_origin,
            chunk_shape.to_array_shape(),
        )?)
    }

    /// Return the array subset of the chunk at `chunk_indices` bounded by the array shape.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidChunkGridIndices`] if the `chunk_indices` are incompatible with the chunk grid.
    pub fn chunk_subset_bounded(&self, chunk_indices: &[u64]) -> Result<ArraySubset, ArrayError> {
        Ok(self.chunk_grid.subset(chunk_indices, &self.shape)?)
    }

    /// Get the decoded representation of the chunk at `chunk_indices`.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidChunkGridIndices`] if the `chunk_indices` are incompatible with the chunk grid.
    pub fn chunk_representation(
        &self,
        chunk_indices: &[u64],
    ) -> Result<ChunkRepresentation, ArrayError> {
        let chunk_shape = self.chunk_shape(chunk_indices)?;
        ChunkRepresentation::new(
            chunk_shape.to_vec(),
            self.data_type,
            self.fill_value.clone(),
        )
        .map_err(|err| CodecError::Other(err.to_string()).into())
    }

    /// Return an array subset indicating the chunks intersecting `array_subset`.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if the array subset has an incorrect dimensionality.
    pub fn chunks_in_array_subset(
        &self,
        array_subset: &ArraySubset,
    ) -> Result<ArraySubset, IncompatibleDimensionalityError> {
        self.chunk_grid.chunks_in_array_subset(array_subset)
    }

    /// Check that `array_subset` is within the bounds of the array.
    fn validate_array_subset(&self, array_subset: &ArraySubset) -> Result<(), ArrayError> {
        if array_subset.dimensionality() == self.dimensionality()
            && array_subset.inbounds(&self.shape)
        {
            Ok(())
        } else {
            Err(ArrayError::OutOfBounds(
                array_subset.clone(),
                self.shape.clone(),
            ))
        }
    }

    /// Resolve an optional `offset` and `shape` to an array subset.
    ///
    /// The offset defaults to the origin, and the shape defaults to the remainder of the array from the offset.
    fn offset_shape_to_subset(
        &self,
        offset: Option<&[u64]>,
        shape: Option<&[u64]>,
    ) -> Result<ArraySubset, ArrayError> {
        let dimensionality = self.dimensionality();
        let offset = offset.map_or_else(|| vec![0; dimensionality], <[u64]>::to_vec);
        let invalid = || {
            ArrayError::InvalidOffsetShape(
                offset.clone(),
                shape.map(<[u64]>::to_vec).unwrap_or_default(),
                dimensionality,
            )
        };
        if offset.len() != dimensionality {
            return Err(invalid());
        }
        let shape = if let Some(shape) = shape {
            if shape.len() != dimensionality {
                return Err(invalid());
            }
            shape.to_vec()
        } else {
            std::iter::zip(&offset, &self.shape)
                .map(|(&offset, &shape)| shape.saturating_sub(offset))
                .collect()
        };
        let array_subset = ArraySubset::new_with_start_shape(offset.clone(), shape)?;
        self.validate_array_subset(&array_subset)?;
        Ok(array_subset)
    }
}

fn validate_element_size<T>(data_type: &DataType) -> Result<(), ArrayError> {
    if data_type.size() == std::mem::size_of::<T>() {
        Ok(())
    } else {
        Err(ArrayError::IncompatibleElementSize(
            data_type.size(),
            std::mem::size_of::<T>(),
        ))
    }
}

/// Convert a vector of elements to bytes, avoiding a copy where possible.
#[must_use]
pub fn transmute_to_bytes_vec<T: bytemuck::NoUninit>(from: Vec<T>) -> Vec<u8> {
    bytemuck::allocation::try_cast_vec(from)
        .unwrap_or_else(|(_err, from)| bytemuck::allocation::pod_collect_to_vec(&from))
}

/// Convert bytes to a vector of elements, avoiding a copy where possible.
#[must_use]
pub fn transmute_from_bytes_vec<T: bytemuck::Pod>(from: Vec<u8>) -> Vec<T> {
    bytemuck::allocation::try_cast_vec(from)
        .unwrap_or_else(|(_err, from)| bytemuck::allocation::pod_collect_to_vec(&from))
}

/// Unravel a linearised index to ND indices.
#[must_use]
pub fn unravel_index(mut index: u64, shape: &[u64]) -> ArrayIndices {
    let mut indices = vec![0; shape.len()];
    for (indices_i, &dim) in std::iter::zip(indices.iter_mut().rev(), shape.iter().rev()) {
        *indices_i = index % dim;
        index /= dim;
    }
    indices
}

/// Ravel ND indices to a linearised index.
#[must_use]
pub fn ravel_indices(indices: &[u64], shape: &[u64]) -> u64 {
    let mut index: u64 = 0;
    let mut count = 1;
    for (i, s) in std::iter::zip(indices, shape).rev() {
        index += i * count;
        count *= s;
    }
    index
}

#[cfg(feature = "ndarray")]
fn iter_u64_to_usize<'a, I: Iterator<Item = &'a u64>>(iter: I) -> Vec<usize> {
    iter.map(|v| usize::try_from(*v).unwrap())
        .collect::<Vec<_>>()
}

#[cfg(feature = "ndarray")]
fn elements_to_ndarray<T>(
    shape: &[u64],
    elements: Vec<T>,
) -> Result<ndarray::ArrayD<T>, ArrayError> {
    let length = elements.len();
    ndarray::ArrayD::<T>::from_shape_vec(iter_u64_to_usize(shape.iter()), elements).map_err(|_| {
        ArrayError::CodecError(CodecError::UnexpectedChunkDecodedSize(
            length * std::mem::size_of::<T>(),
            shape.iter().product::<u64>() * std::mem::size_of::<T>() as u64,
        ))
    })
}
