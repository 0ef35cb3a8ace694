//! Zarr chunk grids.
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/core/v3.0.html#chunk-grids>.
//!
//! A [`ChunkGrid`] is a [`Box`] wrapped chunk grid which implements [`ChunkGridTraits`].
//! Chunk grids are zarr extension points and they can be registered through [`inventory`] as a [`ChunkGridPlugin`].
//!
//! This crate includes a [`RegularChunkGrid`] implementation.
//! A regular chunk grid can be created [from a `ChunkShape`](./struct.ChunkGrid.html#impl-From%3CChunkShape%3E-for-ChunkGrid).

pub mod regular;

pub use regular::{RegularChunkGrid, RegularChunkGridConfiguration};

use derive_more::{Deref, From};
use thiserror::Error;

use crate::{
    array_subset::{ArraySubset, IncompatibleDimensionalityError},
    metadata::Metadata,
    plugin::{create_from_registry, Plugin, PluginCreateError},
};

use super::{chunk_shape::NonZeroError, ArrayIndices, ArrayShape, ChunkShape};

/// A chunk grid.
#[derive(Debug, Clone, Deref, From)]
pub struct ChunkGrid(Box<dyn ChunkGridTraits>);

/// A chunk grid plugin.
pub type ChunkGridPlugin = Plugin<ChunkGrid>;
inventory::collect!(ChunkGridPlugin);

impl ChunkGrid {
    /// Create a chunk grid.
    pub fn new<T: ChunkGridTraits + 'static>(chunk_grid: T) -> Self {
        let chunk_grid: Box<dyn ChunkGridTraits> = Box::new(chunk_grid);
        chunk_grid.into()
    }

    /// Create a chunk grid from metadata.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if the metadata is invalid or not associated with a registered chunk grid plugin.
    pub fn from_metadata(metadata: &Metadata) -> Result<Self, PluginCreateError> {
        create_from_registry(metadata, "chunk grid")
    }
}

impl From<ChunkShape> for ChunkGrid {
    /// Create a regular chunk grid from a chunk shape.
    fn from(regular_chunk_shape: ChunkShape) -> Self {
        Self::new(RegularChunkGrid::new(regular_chunk_shape))
    }
}

impl TryFrom<ArrayShape> for ChunkGrid {
    type Error = NonZeroError;

    /// Create a regular chunk grid from a chunk shape with non-zero components.
    fn try_from(regular_chunk_shape: ArrayShape) -> Result<Self, Self::Error> {
        Ok(ChunkShape::try_from(regular_chunk_shape)?.into())
    }
}

/// Chunk grid traits.
///
/// Methods suffixed with `_unchecked` do not validate their inputs against the grid dimensionality or the array shape.
/// They are used by the validating provided methods.
pub trait ChunkGridTraits: dyn_clone::DynClone + core::fmt::Debug + Send + Sync {
    /// Create metadata.
    fn create_metadata(&self) -> Metadata;

    /// The dimensionality of the grid.
    fn dimensionality(&self) -> usize;

    /// The grid shape (i.e. number of chunks per dimension) of an array with shape `array_shape`.
    ///
    /// # Errors
    /// Returns a [`ChunkGridShapeError`] if the array shape is incompatible with the grid.
    fn grid_shape(&self, array_shape: &[u64]) -> Result<ArrayShape, ChunkGridShapeError>;

    /// The shape of the chunk at `chunk_indices`, without validation.
    fn chunk_shape_unchecked(&self, chunk_indices: &[u64]) -> ChunkShape;

    /// The origin of the chunk at `chunk_indices`, without validation.
    fn chunk_origin_unchecked(&self, chunk_indices: &[u64]) -> ArrayIndices;

    /// The indices of the chunk holding the element at `array_indices`, without validation.
    fn chunk_indices_unchecked(&self, array_indices: &[u64]) -> ArrayIndices;

    /// The indices within its chunk of the element at `array_indices`, without validation.
    fn chunk_element_indices_unchecked(&self, array_indices: &[u64]) -> ArrayIndices;

    /// The chunk indices of the chunks intersecting `array_subset`.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if the dimensionality of `array_subset` does not match the grid.
    fn chunks_in_array_subset(
        &self,
        array_subset: &ArraySubset,
    ) -> Result<ArraySubset, IncompatibleDimensionalityError>;

    /// The shape of the chunk at `chunk_indices`.
    ///
    /// The chunk shape is the shape of the full (physical) chunk, which may extend beyond the array bounds.
    ///
    /// # Errors
    /// Returns [`InvalidChunkGridIndicesError`] if `chunk_indices` are out of bounds of the grid of `array_shape`.
    fn chunk_shape(
        &self,
        chunk_indices: &[u64],
        array_shape: &[u64],
    ) -> Result<ChunkShape, InvalidChunkGridIndicesError> {
        if self.validate_chunk_indices(chunk_indices, array_shape) {
            Ok(self.chunk_shape_unchecked(chunk_indices))
        } else {
            Err(InvalidChunkGridIndicesError::new(
                chunk_indices.to_vec(),
                array_shape.to_vec(),
            ))
        }
    }

    /// The origin (array indices of the first element) of the chunk at `chunk_indices`.
    ///
    /// # Errors
    /// Returns [`InvalidChunkGridIndicesError`] if `chunk_indices` are out of bounds of the grid of `array_shape`.
    fn chunk_origin(
        &self,
        chunk_indices: &[u64],
        array_shape: &[u64],
    ) -> Result<ArrayIndices, InvalidChunkGridIndicesError> {
        if self.validate_chunk_indices(chunk_indices, array_shape) {
            Ok(self.chunk_origin_unchecked(chunk_indices))
        } else {
            Err(InvalidChunkGridIndicesError::new(
                chunk_indices.to_vec(),
                array_shape.to_vec(),
            ))
        }
    }

    /// The indices of the chunk holding the element at `array_indices`.
    ///
    /// # Errors
    /// Returns [`InvalidArrayIndicesError`] if `array_indices` are out of bounds of `array_shape`.
    fn chunk_indices(
        &self,
        array_indices: &[u64],
        array_shape: &[u64],
    ) -> Result<ArrayIndices, InvalidArrayIndicesError> {
        if self.validate_array_indices(array_indices, array_shape) {
            Ok(self.chunk_indices_unchecked(array_indices))
        } else {
            Err(InvalidArrayIndicesError::new(
                array_indices.to_vec(),
                array_shape.to_vec(),
            ))
        }
    }

    /// The indices within its chunk of the element at `array_indices`.
    ///
    /// # Errors
    /// Returns [`InvalidArrayIndicesError`] if `array_indices` are out of bounds of `array_shape`.
    fn chunk_element_indices(
        &self,
        array_indices: &[u64],
        array_shape: &[u64],
    ) -> Result<ArrayIndices, InvalidArrayIndicesError> {
        if self.validate_array_indices(array_indices, array_shape) {
            Ok(self.chunk_element_indices_unchecked(array_indices))
        } else {
            Err(InvalidArrayIndicesError::new(
                array_indices.to_vec(),
                array_shape.to_vec(),
            ))
        }
    }

    /// The array subset of the chunk at `chunk_indices`, truncated to the bounds of `array_shape`.
    ///
    /// # Errors
    /// Returns [`InvalidChunkGridIndicesError`] if `chunk_indices` are out of bounds of the grid of `array_shape`.
    fn subset(
        &self,
        chunk_indices: &[u64],
        array_shape: &[u64],
    ) -> Result<ArraySubset, InvalidChunkGridIndicesError> {
        if self.validate_chunk_indices(chunk_indices, array_shape) {
            let chunk_origin = self.chunk_origin_unchecked(chunk_indices);
            let chunk_shape = self.chunk_shape_unchecked(chunk_indices);
            let shape = itertools::izip!(&chunk_origin, chunk_shape.iter(), array_shape)
                .map(|(&origin, &chunk, &array)| chunk.get().min(array.saturating_sub(origin)))
                .collect();
            ArraySubset::new_with_start_shape(chunk_origin, shape).map_err(|_| {
                InvalidChunkGridIndicesError::new(chunk_indices.to_vec(), array_shape.to_vec())
            })
        } else {
            Err(InvalidChunkGridIndicesError::new(
                chunk_indices.to_vec(),
                array_shape.to_vec(),
            ))
        }
    }

    /// Check if array indices are in bounds of `array_shape` and the grid dimensionality.
    #[must_use]
    fn validate_array_indices(&self, array_indices: &[u64], array_shape: &[u64]) -> bool {
        array_indices.len() == self.dimensionality()
            && array_shape.len() == self.dimensionality()
            && std::iter::zip(array_indices, array_shape).all(|(&index, &shape)| index < shape)
    }

    /// Check if chunk indices are in bounds of the grid of `array_shape`.
    #[must_use]
    fn validate_chunk_indices(&self, chunk_indices: &[u64], array_shape: &[u64]) -> bool {
        chunk_indices.len() == self.dimensionality()
            && array_shape.len() == self.dimensionality()
            && self.grid_shape(array_shape).is_ok_and(|grid_shape| {
                std::iter::zip(chunk_indices, grid_shape).all(|(&index, shape)| index < shape)
            })
    }
}

dyn_clone::clone_trait_object!(ChunkGridTraits);

/// An invalid array indices error.
#[derive(Debug, Error)]
#[error("array indices {_0:?} are incompatible with the array shape {_1:?}")]
pub struct InvalidArrayIndicesError(ArrayIndices, ArrayShape);

impl InvalidArrayIndicesError {
    /// Create a new invalid array indices error.
    #[must_use]
    pub const fn new(array_indices: ArrayIndices, array_shape: ArrayShape) -> Self {
        Self(array_indices, array_shape)
    }
}

/// An invalid chunk grid indices error.
#[derive(Debug, Error)]
#[error("chunk grid indices {_0:?} are invalid for an array with shape {_1:?}")]
pub struct InvalidChunkGridIndicesError(ArrayIndices, ArrayShape);

impl InvalidChunkGridIndicesError {
    /// Create a new invalid chunk grid indices error.
    #[must_use]
    pub const fn new(chunk_indices: ArrayIndices, array_shape: ArrayShape) -> Self {
        Self(chunk_indices, array_shape)
    }

    /// Returns the offending chunk indices.
    #[must_use]
    pub fn chunk_indices(&self) -> &[u64] {
        &self.0
    }
}

/// A chunk grid shape error.
#[derive(Debug, Error)]
pub enum ChunkGridShapeError {
    /// The array shape dimensionality does not match the chunk grid.
    #[error(transparent)]
    IncompatibleDimensionality(#[from] IncompatibleDimensionalityError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_grid_configuration_regular() {
        let json = r#"
    {
        "name": "regular",
        "configuration": {
            "chunk_shape": [5, 20, 400]
        }
    }"#;
        let metadata = serde_json::from_str::<Metadata>(json).unwrap();
        let chunk_grid = ChunkGrid::from_metadata(&metadata).unwrap();
        assert_eq!(chunk_grid.dimensionality(), 3);
        assert_eq!(chunk_grid.create_metadata(), metadata);
    }

    #[test]
    fn chunk_grid_configuration_unsupported() {
        let metadata = Metadata::try_from(r#""rectangular""#).unwrap();
        assert!(matches!(
            ChunkGrid::from_metadata(&metadata),
            Err(PluginCreateError::Unsupported { .. })
        ));
    }
}
