use std::num::NonZeroU64;

use derive_more::Deref;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ArrayShape;

/// The shape of a chunk. All dimensions must be non-zero.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Hash, Debug, Deref)]
pub struct ChunkShape(Vec<NonZeroU64>);

/// A zero was found in a chunk shape.
#[derive(Copy, Clone, Debug, Error)]
#[error("chunk shape components must be non-zero")]
pub struct NonZeroError;

impl ChunkShape {
    /// Return the chunk shape as an [`ArrayShape`] ([`Vec<u64>`]).
    #[must_use]
    pub fn to_array_shape(&self) -> ArrayShape {
        chunk_shape_to_array_shape(&self.0)
    }

    /// Return the number of elements.
    ///
    /// Equal to the product of the components of its shape.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.0.iter().copied().map(NonZeroU64::get).product::<u64>()
    }

    /// Return the number of elements as a usize.
    ///
    /// # Panics
    /// Panics if the number of elements exceeds [`usize::MAX`].
    #[must_use]
    pub fn num_elements_usize(&self) -> usize {
        usize::try_from(self.num_elements()).unwrap()
    }
}

impl From<Vec<NonZeroU64>> for ChunkShape {
    fn from(shape: Vec<NonZeroU64>) -> Self {
        Self(shape)
    }
}

impl TryFrom<Vec<u64>> for ChunkShape {
    type Error = NonZeroError;

    fn try_from(shape: Vec<u64>) -> Result<Self, Self::Error> {
        shape
            .into_iter()
            .map(NonZeroU64::new)
            .collect::<Option<Vec<_>>>()
            .map(Self)
            .ok_or(NonZeroError)
    }
}

impl TryFrom<&[u64]> for ChunkShape {
    type Error = NonZeroError;

    fn try_from(shape: &[u64]) -> Result<Self, Self::Error> {
        Self::try_from(shape.to_vec())
    }
}

/// Convert a [`ChunkShape`] reference to an [`ArrayShape`].
#[must_use]
pub fn chunk_shape_to_array_shape(chunk_shape: &[NonZeroU64]) -> ArrayShape {
    chunk_shape.iter().copied().map(NonZeroU64::get).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_shape() {
        let chunk_shape = ChunkShape::try_from(vec![2, 3]).unwrap();
        assert_eq!(chunk_shape.to_array_shape(), vec![2, 3]);
        assert_eq!(chunk_shape.num_elements(), 6);
        assert_eq!(chunk_shape.len(), 2);
        assert!(ChunkShape::try_from(vec![2, 0]).is_err());
        assert!(serde_json::from_str::<ChunkShape>("[1, 0]").is_err());
        assert_eq!(
            serde_json::from_str::<ChunkShape>("[4, 5]").unwrap(),
            ChunkShape::try_from(vec![4, 5]).unwrap()
        );
    }
}
