//! The regular chunk grid.
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/core/v3.0.html#regular-grids>.

use crate::{
    array::{chunk_grid::ChunkGridPlugin, ArrayIndices, ArrayShape, ChunkShape},
    array_subset::{ArraySubset, IncompatibleDimensionalityError},
    metadata::Metadata,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::{ChunkGrid, ChunkGridShapeError, ChunkGridTraits};

/// The identifier for the `regular` chunk grid.
pub const IDENTIFIER: &str = "regular";

// Register the chunk grid.
inventory::submit! {
    ChunkGridPlugin::new(IDENTIFIER, is_name_regular, create_chunk_grid_regular)
}

fn is_name_regular(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

fn create_chunk_grid_regular(metadata: &Metadata) -> Result<ChunkGrid, PluginCreateError> {
    let configuration: RegularChunkGridConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "chunk grid", metadata.clone()))?;
    let chunk_grid = RegularChunkGrid::new(configuration.chunk_shape);
    Ok(ChunkGrid::new(chunk_grid))
}

/// Configuration parameters for a `regular` chunk grid.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct RegularChunkGridConfiguration {
    /// The chunk shape.
    pub chunk_shape: ChunkShape,
}

/// A `regular` chunk grid.
///
/// Every chunk has the same shape. Chunks along the upper edge of the array may extend beyond the array bounds.
#[derive(Debug, Clone)]
pub struct RegularChunkGrid {
    chunk_shape: ChunkShape,
}

impl RegularChunkGrid {
    /// Create a new `regular` chunk grid with chunk shape `chunk_shape`.
    #[must_use]
    pub fn new(chunk_shape: ChunkShape) -> Self {
        Self { chunk_shape }
    }

    /// Return the chunk shape.
    #[must_use]
    pub const fn chunk_shape(&self) -> &ChunkShape {
        &self.chunk_shape
    }
}

impl ChunkGridTraits for RegularChunkGrid {
    fn create_metadata(&self) -> Metadata {
        let configuration = RegularChunkGridConfiguration {
            chunk_shape: self.chunk_shape.clone(),
        };
        Metadata::new_with_serializable_configuration(IDENTIFIER, &configuration).unwrap()
    }

    fn dimensionality(&self) -> usize {
        self.chunk_shape.len()
    }

    fn grid_shape(&self, array_shape: &[u64]) -> Result<ArrayShape, ChunkGridShapeError> {
        if array_shape.len() == self.dimensionality() {
            Ok(std::iter::zip(array_shape, self.chunk_shape.iter())
                .map(|(a, s)| a.div_ceil(s.get()))
                .collect())
        } else {
            Err(
                IncompatibleDimensionalityError::new(array_shape.len(), self.dimensionality())
                    .into(),
            )
        }
    }

    fn chunk_shape_unchecked(&self, chunk_indices: &[u64]) -> ChunkShape {
        debug_assert_eq!(self.dimensionality(), chunk_indices.len());
        self.chunk_shape.clone()
    }

    fn chunk_origin_unchecked(&self, chunk_indices: &[u64]) -> ArrayIndices {
        debug_assert_eq!(self.dimensionality(), chunk_indices.len());
        std::iter::zip(chunk_indices, self.chunk_shape.iter())
            .map(|(i, s)| i * s.get())
            .collect()
    }

    fn chunk_indices_unchecked(&self, array_indices: &[u64]) -> ArrayIndices {
        debug_assert_eq!(self.dimensionality(), array_indices.len());
        std::iter::zip(array_indices, self.chunk_shape.iter())
            .map(|(i, s)| i / s.get())
            .collect()
    }

    fn chunk_element_indices_unchecked(&self, array_indices: &[u64]) -> ArrayIndices {
        debug_assert_eq!(self.dimensionality(), array_indices.len());
        std::iter::zip(array_indices, self.chunk_shape.iter())
            .map(|(i, s)| i % s.get())
            .collect()
    }

    fn chunks_in_array_subset(
        &self,
        array_subset: &ArraySubset,
    ) -> Result<ArraySubset, IncompatibleDimensionalityError> {
        if array_subset.dimensionality() != self.dimensionality() {
            return Err(IncompatibleDimensionalityError::new(
                array_subset.dimensionality(),
                self.dimensionality(),
            ));
        }
        if array_subset.is_empty() {
            return Ok(ArraySubset::new_empty(self.dimensionality()));
        }
        let start = self.chunk_indices_unchecked(array_subset.start());
        let end_inc: ArrayIndices = array_subset.end_exc().iter().map(|e| e - 1).collect();
        let end_exc = self
            .chunk_indices_unchecked(&end_inc)
            .into_iter()
            .map(|i| i + 1)
            .collect();
        ArraySubset::new_with_start_end_exc(start, end_exc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_grid(chunk_shape: &[u64]) -> RegularChunkGrid {
        RegularChunkGrid::new(chunk_shape.try_into().unwrap())
    }

    #[test]
    fn chunk_grid_regular() {
        let array_shape: ArrayShape = vec![5, 7, 52];
        let chunk_grid = chunk_grid(&[1, 2, 3]);

        assert_eq!(chunk_grid.dimensionality(), 3);
        assert_eq!(
            chunk_grid.chunk_origin(&[1, 1, 1], &array_shape).unwrap(),
            vec![1, 2, 3]
        );
        assert_eq!(
            chunk_grid.grid_shape(&array_shape).unwrap(),
            vec![5, 4, 18]
        );

        let array_indices: ArrayIndices = vec![3, 5, 50];
        assert_eq!(
            chunk_grid
                .chunk_indices(&array_indices, &array_shape)
                .unwrap(),
            vec![3, 2, 16]
        );
        assert_eq!(
            chunk_grid
                .chunk_element_indices(&array_indices, &array_shape)
                .unwrap(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn chunk_grid_regular_subset() {
        let array_shape: ArrayShape = vec![5, 7, 52];
        let chunk_grid = chunk_grid(&[2, 2, 3]);

        // The last chunk along each dimension is truncated
        assert_eq!(
            chunk_grid.subset(&[2, 3, 17], &array_shape).unwrap(),
            ArraySubset::new_with_ranges(&[4..5, 6..7, 51..52])
        );
        assert_eq!(
            chunk_grid.subset(&[0, 1, 2], &array_shape).unwrap(),
            ArraySubset::new_with_ranges(&[0..2, 2..4, 6..9])
        );
        assert_eq!(
            ChunkGridTraits::chunk_shape(&chunk_grid, &[2, 3, 17], &array_shape)
                .unwrap()
                .to_array_shape(),
            vec![2, 2, 3]
        );
    }

    #[test]
    fn chunk_grid_regular_out_of_bounds() {
        let array_shape: ArrayShape = vec![5, 7, 52];
        let chunk_grid = chunk_grid(&[1, 2, 3]);

        assert!(chunk_grid
            .chunk_indices(&[3, 5, 53], &array_shape)
            .is_err());
        assert!(chunk_grid.chunk_origin(&[5, 1, 1], &array_shape).is_err());
        assert!(chunk_grid.subset(&[0, 4, 0], &array_shape).is_err());
        assert!(chunk_grid.subset(&[0, 0], &array_shape).is_err());
        assert!(chunk_grid.grid_shape(&[5, 7]).is_err());
    }

    #[test]
    fn chunk_grid_regular_chunks_in_array_subset() {
        let chunk_grid = chunk_grid(&[5, 5]);
        let chunks = chunk_grid
            .chunks_in_array_subset(&ArraySubset::new_with_ranges(&[2..10, 2..10]))
            .unwrap();
        assert_eq!(chunks, ArraySubset::new_with_ranges(&[0..2, 0..2]));

        let chunks = chunk_grid
            .chunks_in_array_subset(&ArraySubset::new_with_ranges(&[5..6, 4..5]))
            .unwrap();
        assert_eq!(chunks, ArraySubset::new_with_ranges(&[1..2, 0..1]));

        let chunks = chunk_grid
            .chunks_in_array_subset(&ArraySubset::new_with_ranges(&[3..3, 0..5]))
            .unwrap();
        assert!(chunks.is_empty());

        assert!(chunk_grid
            .chunks_in_array_subset(&ArraySubset::new_with_ranges(&[0..1]))
            .is_err());
    }

    #[test]
    fn chunk_grid_regular_configuration() {
        let metadata =
            Metadata::try_from(r#"{"name":"regular","configuration":{"chunk_shape":[0,2]}}"#)
                .unwrap();
        assert!(ChunkGrid::from_metadata(&metadata).is_err());
        let metadata =
            Metadata::try_from(r#"{"name":"regular","configuration":{"chunk_shape":[1,2],"x":1}}"#)
                .unwrap();
        assert!(ChunkGrid::from_metadata(&metadata).is_err());
    }
}
