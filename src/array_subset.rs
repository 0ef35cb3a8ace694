//! Array subsets.
//!
//! An [`ArraySubset`] is a rectangular region of an array defined by a start and a shape.
//! It is used throughout this library for cutout reads and writes, and for mapping between array, chunk, and sub-chunk coordinates.
//!
//! This module provides convenience functions for:
//!  - iterating over the indices, contiguous runs, or chunks of an array subset,
//!  - computing the byte ranges of array subsets within an array, and
//!  - extracting and storing the bytes within subsets of an array.

mod iterators;

pub use iterators::{ChunksIterator, ContiguousLinearisedIndicesIterator, IndicesIterator};

use derive_more::Display;
use itertools::izip;
use thiserror::Error;

use crate::{
    array::{ArrayIndices, ArrayShape},
    byte_range::ByteRange,
};

/// An array subset.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Default)]
#[display("start {start:?} shape {shape:?}")]
pub struct ArraySubset {
    /// The start of the array subset.
    start: ArrayIndices,
    /// The shape of the array subset.
    shape: ArrayShape,
}

/// An array extract bytes error.
#[derive(Debug, Error)]
#[error("array subset {_0} is incompatible with array of shape {_1:?} and element size {_2}")]
pub struct ArrayExtractBytesError(ArraySubset, ArrayShape, usize);

/// An array store bytes error.
#[derive(Debug, Error)]
pub enum ArrayStoreBytesError {
    /// The array subset is not within the array shape.
    #[error(transparent)]
    IncompatibleArrayShape(#[from] IncompatibleArrayShapeError),
    /// The subset bytes have an unexpected length.
    #[error("expected subset bytes to have length {_1}, got {_0}")]
    InvalidSubsetBytes(usize, usize),
    /// The array bytes have an unexpected length.
    #[error("expected array bytes to have length {_1}, got {_0}")]
    InvalidArrayBytes(usize, usize),
}

impl ArraySubset {
    /// Create a new array subset with `size` starting at the origin.
    #[must_use]
    pub fn new_with_shape(shape: ArrayShape) -> Self {
        Self {
            start: vec![0; shape.len()],
            shape,
        }
    }

    /// Create a new empty array subset with `dimensionality` dimensions.
    #[must_use]
    pub fn new_empty(dimensionality: usize) -> Self {
        Self {
            start: vec![0; dimensionality],
            shape: vec![0; dimensionality],
        }
    }

    /// Create a new array subset.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if the size of `start` and `size` do not match.
    pub fn new_with_start_shape(
        start: ArrayIndices,
        shape: ArrayShape,
    ) -> Result<Self, IncompatibleDimensionalityError> {
        if start.len() == shape.len() {
            Ok(Self { start, shape })
        } else {
            Err(IncompatibleDimensionalityError::new(
                start.len(),
                shape.len(),
            ))
        }
    }

    /// Create a new array subset from a start and end (exclusive).
    ///
    /// An end less than the start produces an empty dimension.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if the length of `start` and `end` do not match.
    pub fn new_with_start_end_exc(
        start: ArrayIndices,
        end: ArrayIndices,
    ) -> Result<Self, IncompatibleDimensionalityError> {
        if start.len() == end.len() {
            let shape = std::iter::zip(&start, end)
                .map(|(&start, end)| end.saturating_sub(start))
                .collect();
            Ok(Self { start, shape })
        } else {
            Err(IncompatibleDimensionalityError::new(start.len(), end.len()))
        }
    }

    /// Create a new array subset from a list of [`Range`](std::ops::Range)s.
    #[must_use]
    pub fn new_with_ranges(ranges: &[std::ops::Range<u64>]) -> Self {
        let start = ranges.iter().map(|range| range.start).collect();
        let shape = ranges
            .iter()
            .map(|range| range.end.saturating_sub(range.start))
            .collect();
        Self { start, shape }
    }

    /// Return the start of the array subset.
    #[must_use]
    pub fn start(&self) -> &[u64] {
        &self.start
    }

    /// Return the shape of the array subset.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Return the dimensionality of the array subset.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.start.len()
    }

    /// Return the end (exclusive) of the array subset.
    #[must_use]
    pub fn end_exc(&self) -> ArrayIndices {
        std::iter::zip(&self.start, &self.shape)
            .map(|(start, size)| start + size)
            .collect()
    }

    /// Return the array subset as a vec of ranges.
    #[must_use]
    pub fn to_ranges(&self) -> Vec<std::ops::Range<u64>> {
        std::iter::zip(&self.start, &self.shape)
            .map(|(&start, &size)| start..start + size)
            .collect()
    }

    /// Return the number of elements of the array subset.
    ///
    /// Equal to the product of the components of its shape.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.shape.iter().product()
    }

    /// Return the number of elements of the array subset as a `usize`.
    ///
    /// # Panics
    /// Panics if [`num_elements()`](Self::num_elements()) is greater than [`usize::MAX`].
    #[must_use]
    pub fn num_elements_usize(&self) -> usize {
        usize::try_from(self.num_elements()).unwrap()
    }

    /// Returns true if the array subset has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shape.iter().any(|&size| size == 0)
    }

    /// Returns true if the array subset is within the bounds of `array_shape`.
    #[must_use]
    pub fn inbounds(&self, array_shape: &[u64]) -> bool {
        self.dimensionality() == array_shape.len()
            && izip!(self.start(), self.shape(), array_shape)
                .all(|(start, size, shape)| {
                    start.checked_add(*size).is_some_and(|end| end <= *shape)
                })
    }

    /// Returns true if `array_indices` is within the array subset.
    #[must_use]
    pub fn contains(&self, array_indices: &[u64]) -> bool {
        array_indices.len() == self.dimensionality()
            && izip!(array_indices, self.start(), self.shape())
                .all(|(&index, &start, &size)| index >= start && index - start < size)
    }

    /// Return the overlapping subset between this array subset and `subset_other`.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if the dimensionality of `subset_other` does not match the dimensionality of this array subset.
    pub fn overlap(&self, subset_other: &Self) -> Result<Self, IncompatibleDimensionalityError> {
        if subset_other.dimensionality() != self.dimensionality() {
            return Err(IncompatibleDimensionalityError::new(
                subset_other.dimensionality(),
                self.dimensionality(),
            ));
        }
        let mut start = Vec::with_capacity(self.dimensionality());
        let mut shape = Vec::with_capacity(self.dimensionality());
        for (start_a, size_a, start_b, size_b) in izip!(
            &self.start,
            &self.shape,
            subset_other.start(),
            subset_other.shape(),
        ) {
            let overlap_start = *std::cmp::max(start_a, start_b);
            let overlap_end = std::cmp::min(
                start_a.saturating_add(*size_a),
                start_b.saturating_add(*size_b),
            );
            start.push(overlap_start);
            shape.push(overlap_end.saturating_sub(overlap_start));
        }
        Ok(Self { start, shape })
    }

    /// Return the subset relative to `start`.
    ///
    /// Creates an array subset starting at [`ArraySubset::start()`] - `start`.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if the length of `start` does not match the dimensionality of this array subset,
    /// and [`InvalidArraySubsetError`] if `start` is beyond the start of this array subset.
    pub fn relative_to(&self, start: &[u64]) -> Result<Self, ArraySubsetError> {
        if start.len() != self.dimensionality() {
            return Err(
                IncompatibleDimensionalityError::new(start.len(), self.dimensionality()).into(),
            );
        }
        let relative_start = std::iter::zip(&self.start, start)
            .map(|(&a, &b)| a.checked_sub(b))
            .collect::<Option<Vec<_>>>()
            .ok_or(InvalidArraySubsetError)?;
        Ok(Self {
            start: relative_start,
            shape: self.shape.clone(),
        })
    }

    /// Return the byte ranges of an array subset in an array with `array_shape` and `element_size`.
    ///
    /// # Errors
    /// Returns [`IncompatibleArrayShapeError`] if the `array_shape` does not encapsulate this array subset.
    pub fn byte_ranges(
        &self,
        array_shape: &[u64],
        element_size: usize,
    ) -> Result<Vec<ByteRange>, IncompatibleArrayShapeError> {
        let element_size = element_size as u64;
        Ok(self
            .iter_contiguous_linearised_indices(array_shape)?
            .map(|(array_index, contiguous_elements)| {
                ByteRange::FromStart(
                    array_index * element_size,
                    Some(contiguous_elements * element_size),
                )
            })
            .collect())
    }

    /// Return the bytes in this array subset from an array with shape `array_shape` and `element_size`.
    ///
    /// # Errors
    /// Returns [`ArrayExtractBytesError`] if the length of `array_shape` does not match the array subset dimensionality,
    /// the array subset is outside the bounds of `array_shape`, or the length of `bytes` is not correct.
    ///
    /// # Panics
    /// Panics if attempting to access a byte index beyond [`usize::MAX`].
    pub fn extract_bytes(
        &self,
        bytes: &[u8],
        array_shape: &[u64],
        element_size: usize,
    ) -> Result<Vec<u8>, ArrayExtractBytesError> {
        let err = || ArrayExtractBytesError(self.clone(), array_shape.to_vec(), element_size);
        let expected_len = array_shape.iter().product::<u64>() * element_size as u64;
        if bytes.len() as u64 != expected_len {
            return Err(err());
        }
        let iter = self
            .iter_contiguous_linearised_indices(array_shape)
            .map_err(|_| err())?;
        let mut bytes_subset = Vec::with_capacity(self.num_elements_usize() * element_size);
        for (array_index, contiguous_elements) in iter {
            let byte_offset = usize::try_from(array_index).unwrap() * element_size;
            let byte_length = usize::try_from(contiguous_elements).unwrap() * element_size;
            bytes_subset.extend_from_slice(&bytes[byte_offset..byte_offset + byte_length]);
        }
        Ok(bytes_subset)
    }

    /// Store `bytes_subset` corresponding to this array subset into the bytes of an array (`bytes_array`) with shape `array_shape` and `element_size`.
    ///
    /// # Errors
    /// Returns [`ArrayStoreBytesError`] if the array subset is not within `array_shape` or the length of either byte slice is not correct.
    ///
    /// # Panics
    /// Panics if attempting to access a byte index beyond [`usize::MAX`].
    pub fn store_bytes(
        &self,
        bytes_subset: &[u8],
        bytes_array: &mut [u8],
        array_shape: &[u64],
        element_size: usize,
    ) -> Result<(), ArrayStoreBytesError> {
        let expected_subset_size = self.num_elements_usize() * element_size;
        let expected_array_size =
            usize::try_from(array_shape.iter().product::<u64>()).unwrap() * element_size;
        if bytes_subset.len() != expected_subset_size {
            return Err(ArrayStoreBytesError::InvalidSubsetBytes(
                bytes_subset.len(),
                expected_subset_size,
            ));
        }
        if bytes_array.len() != expected_array_size {
            return Err(ArrayStoreBytesError::InvalidArrayBytes(
                bytes_array.len(),
                expected_array_size,
            ));
        }
        let mut offset = 0;
        for (array_index, contiguous_elements) in
            self.iter_contiguous_linearised_indices(array_shape)?
        {
            let byte_index = usize::try_from(array_index).unwrap() * element_size;
            let byte_length = usize::try_from(contiguous_elements).unwrap() * element_size;
            bytes_array[byte_index..byte_index + byte_length]
                .copy_from_slice(&bytes_subset[offset..offset + byte_length]);
            offset += byte_length;
        }
        Ok(())
    }

    /// Returns an iterator over the indices of elements within the subset.
    #[must_use]
    pub fn iter_indices(&self) -> IndicesIterator {
        IndicesIterator::new(self.clone())
    }

    /// Returns an iterator over the linearised indices of contiguous elements within the subset.
    ///
    /// Each item is the linearised index of the first element of a contiguous run in an array with shape `array_shape`, and the run length.
    ///
    /// # Errors
    /// Returns [`IncompatibleArrayShapeError`] if the `array_shape` does not encapsulate this array subset.
    pub fn iter_contiguous_linearised_indices(
        &self,
        array_shape: &[u64],
    ) -> Result<ContiguousLinearisedIndicesIterator, IncompatibleArrayShapeError> {
        ContiguousLinearisedIndicesIterator::new(self, array_shape)
    }

    /// Returns an iterator over chunks with shape `chunk_shape` in the array subset.
    ///
    /// All chunks overlapping the array subset are returned, and they all have the same shape `chunk_shape`.
    /// Thus, the subsets of the chunks may extend out over the subset.
    ///
    /// # Errors
    /// Returns an error if `chunk_shape` does not match the array subset dimensionality or has a zero component.
    pub fn iter_chunks(
        &self,
        chunk_shape: &[u64],
    ) -> Result<ChunksIterator, IncompatibleDimensionalityError> {
        ChunksIterator::new(self, chunk_shape)
    }
}

/// An incompatible dimensionality error.
#[derive(Copy, Clone, Debug, Error)]
#[error("incompatible dimensionality {0}, expected {1}")]
pub struct IncompatibleDimensionalityError(usize, usize);

impl IncompatibleDimensionalityError {
    /// Create a new incompatible dimensionality error.
    #[must_use]
    pub const fn new(got: usize, expected: usize) -> Self {
        Self(got, expected)
    }
}

/// An incompatible array shape error.
#[derive(Clone, Debug, Error)]
#[error("incompatible array shape {0:?} with array subset {1}")]
pub struct IncompatibleArrayShapeError(ArrayShape, ArraySubset);

impl IncompatibleArrayShapeError {
    /// Create a new incompatible array shape error.
    #[must_use]
    pub fn new(array_shape: ArrayShape, array_subset: ArraySubset) -> Self {
        Self(array_shape, array_subset)
    }
}

/// An invalid array subset error.
#[derive(Copy, Clone, Debug, Error)]
#[error("invalid array subset")]
pub struct InvalidArraySubsetError;

/// An array subset error.
#[derive(Copy, Clone, Debug, Error)]
pub enum ArraySubsetError {
    /// Incompatible dimensionality.
    #[error(transparent)]
    IncompatibleDimensionalityError(#[from] IncompatibleDimensionalityError),
    /// Invalid array subset.
    #[error(transparent)]
    InvalidArraySubsetError(#[from] InvalidArraySubsetError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_subset() {
        assert!(ArraySubset::new_with_start_shape(vec![0, 0], vec![10, 10]).is_ok());
        assert!(ArraySubset::new_with_start_shape(vec![0, 0], vec![10]).is_err());
        assert!(ArraySubset::new_with_start_end_exc(vec![0, 0], vec![10, 10]).is_ok());
        assert!(ArraySubset::new_with_start_end_exc(vec![0, 0], vec![10]).is_err());

        let array_subset = ArraySubset::new_with_start_shape(vec![0, 0], vec![10, 10]).unwrap();
        assert!(array_subset.inbounds(&[10, 10]));
        assert!(!array_subset.inbounds(&[5, 5]));
        assert!(!array_subset.inbounds(&[10, 10, 10]));
        assert_eq!(array_subset.num_elements(), 100);
        assert_eq!(array_subset.to_string(), "start [0, 0] shape [10, 10]");

        let array_subset0 = ArraySubset::new_with_ranges(&[1..5, 2..6]);
        let array_subset1 = ArraySubset::new_with_ranges(&[3..6, 4..7]);
        assert_eq!(
            array_subset0.overlap(&array_subset1).unwrap(),
            ArraySubset::new_with_ranges(&[3..5, 4..6])
        );
        assert_eq!(
            array_subset0.relative_to(&[1, 1]).unwrap(),
            ArraySubset::new_with_ranges(&[0..4, 1..5])
        );
        assert!(array_subset0.relative_to(&[2, 2]).is_err());
        assert!(array_subset0.relative_to(&[1]).is_err());
        assert!(ArraySubset::new_with_ranges(&[1..5, 2..6])
            .overlap(&ArraySubset::new_with_ranges(&[6..7, 2..6]))
            .unwrap()
            .is_empty());
        assert!(array_subset0.contains(&[1, 5]));
        assert!(!array_subset0.contains(&[1, 6]));
        assert_eq!(array_subset0.to_ranges(), vec![1..5, 2..6]);
    }

    #[test]
    fn array_subset_near_index_limit() {
        let far = ArraySubset::new_with_start_shape(vec![u64::MAX], vec![2]).unwrap();
        assert!(!far.inbounds(&[4]));
        assert!(!far.inbounds(&[u64::MAX]));
        assert!(far.contains(&[u64::MAX]));
        assert!(!far.contains(&[0]));
        assert_eq!(
            far.overlap(&ArraySubset::new_with_start_shape(vec![u64::MAX - 1], vec![4]).unwrap())
                .unwrap(),
            ArraySubset::new_with_start_shape(vec![u64::MAX], vec![0]).unwrap()
        );
    }

    #[test]
    fn array_subset_bytes() {
        let array_subset = ArraySubset::new_with_ranges(&[1..3, 1..3]);
        let bytes_array: Vec<u8> = (0..16).collect();
        let bytes = array_subset.extract_bytes(&bytes_array, &[4, 4], 1).unwrap();
        assert_eq!(bytes, vec![5, 6, 9, 10]);
        assert!(array_subset.extract_bytes(&bytes_array, &[4, 4], 2).is_err());
        assert!(array_subset.extract_bytes(&bytes_array, &[2, 8], 1).is_err());

        let byte_ranges = array_subset.byte_ranges(&[4, 4], 1).unwrap();
        assert_eq!(
            byte_ranges,
            vec![
                ByteRange::FromStart(5, Some(2)),
                ByteRange::FromStart(9, Some(2))
            ]
        );

        let mut bytes_array = vec![0u8; 16];
        array_subset
            .store_bytes(&[1, 2, 3, 4], &mut bytes_array, &[4, 4], 1)
            .unwrap();
        assert_eq!(
            bytes_array,
            vec![0, 0, 0, 0, 0, 1, 2, 0, 0, 3, 4, 0, 0, 0, 0, 0]
        );
        assert!(array_subset
            .store_bytes(&[1, 2, 3], &mut bytes_array, &[4, 4], 1)
            .is_err());
    }

    #[test]
    fn array_subset_zero_dimensional() {
        let array_subset = ArraySubset::new_with_shape(vec![]);
        assert_eq!(array_subset.num_elements(), 1);
        assert_eq!(
            array_subset.iter_indices().collect::<Vec<_>>(),
            vec![ArrayIndices::new()]
        );
        assert_eq!(
            array_subset
                .iter_contiguous_linearised_indices(&[])
                .unwrap()
                .collect::<Vec<_>>(),
            vec![(0, 1)]
        );
        let bytes = array_subset.extract_bytes(&[1, 2], &[], 2).unwrap();
        assert_eq!(bytes, vec![1, 2]);
    }
}
