use std::num::NonZeroU64;

use derive_more::Display;

use super::{
    chunk_shape_to_array_shape, data_type::IncompatibleFillValueError, ArrayShape, ChunkShape,
    DataType, FillValue,
};

/// The shape, data type, and fill value of a chunk.
///
/// This is the decoded representation seen by array to array and array to bytes codecs.
#[derive(Clone, Eq, PartialEq, Debug, Display)]
#[display("{shape:?} {data_type} {fill_value}")]
pub struct ChunkRepresentation {
    shape: Vec<NonZeroU64>,
    data_type: DataType,
    fill_value: FillValue,
}

impl ChunkRepresentation {
    /// Create a new [`ChunkRepresentation`].
    ///
    /// # Errors
    /// Returns [`IncompatibleFillValueError`] if the `data_type` and `fill_value` are incompatible.
    pub fn new(
        shape: Vec<NonZeroU64>,
        data_type: DataType,
        fill_value: FillValue,
    ) -> Result<Self, IncompatibleFillValueError> {
        if data_type.size() == fill_value.size() {
            Ok(Self {
                shape,
                data_type,
                fill_value,
            })
        } else {
            Err(IncompatibleFillValueError::new(
                data_type.name().to_string(),
                fill_value,
            ))
        }
    }

    /// Return a representation with the same data type and fill value but a different `shape`.
    #[must_use]
    pub fn with_shape(&self, shape: Vec<NonZeroU64>) -> Self {
        Self {
            shape,
            data_type: self.data_type,
            fill_value: self.fill_value.clone(),
        }
    }

    /// Return the shape of the chunk.
    #[must_use]
    pub fn shape(&self) -> &[NonZeroU64] {
        &self.shape
    }

    /// Return the shape as a [`ChunkShape`].
    #[must_use]
    pub fn chunk_shape(&self) -> ChunkShape {
        self.shape.clone().into()
    }

    /// Return the shape as an [`ArrayShape`] ([`Vec<u64>`]).
    #[must_use]
    pub fn shape_u64(&self) -> ArrayShape {
        chunk_shape_to_array_shape(&self.shape)
    }

    /// Return the dimensionality of the chunk.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.shape.len()
    }

    /// Return the data type of the chunk.
    #[must_use]
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Return the fill value of the chunk.
    #[must_use]
    pub const fn fill_value(&self) -> &FillValue {
        &self.fill_value
    }

    /// Return the number of elements in the chunk.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.shape.iter().copied().map(NonZeroU64::get).product()
    }

    /// Return the number of elements in the chunk as a [`usize`].
    ///
    /// # Panics
    /// Panics if the number of elements exceeds [`usize::MAX`].
    #[must_use]
    pub fn num_elements_usize(&self) -> usize {
        usize::try_from(self.num_elements()).unwrap()
    }

    /// Return the element size in bytes.
    #[must_use]
    pub const fn element_size(&self) -> usize {
        self.data_type.size()
    }

    /// Return the total size of the decoded chunk in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.num_elements() * self.element_size() as u64
    }

    /// Return the total size of the decoded chunk in bytes as a [`usize`].
    ///
    /// # Panics
    /// Panics if the size exceeds [`usize::MAX`].
    #[must_use]
    pub fn size_usize(&self) -> usize {
        self.num_elements_usize() * self.element_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_representation() {
        let shape: ChunkShape = vec![10, 5].try_into().unwrap();
        let representation =
            ChunkRepresentation::new(shape.to_vec(), DataType::UInt16, FillValue::from(0u16))
                .unwrap();
        assert_eq!(representation.shape_u64(), vec![10, 5]);
        assert_eq!(representation.num_elements(), 50);
        assert_eq!(representation.size(), 100);
        assert_eq!(representation.dimensionality(), 2);
        assert_eq!(representation.to_string(), "[10, 5] uint16 [0, 0]");
        assert!(
            ChunkRepresentation::new(shape.to_vec(), DataType::UInt16, FillValue::from(0u8))
                .is_err()
        );
    }
}
