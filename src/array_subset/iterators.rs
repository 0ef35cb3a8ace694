use std::iter::FusedIterator;

use crate::array::{ravel_indices, unravel_index, ArrayIndices, ArrayShape};

use super::{ArraySubset, IncompatibleArrayShapeError, IncompatibleDimensionalityError};

/// An iterator over the indices in an array subset.
///
/// Iterates over the last dimension fastest (i.e. C-contiguous order).
/// For example, consider a 4x3 array with element indices
/// ```text
/// (0, 0)  (0, 1)  (0, 2)
/// (1, 0)  (1, 1)  (1, 2)
/// (2, 0)  (2, 1)  (2, 2)
/// (3, 0)  (3, 1)  (3, 2)
/// ```
/// An iterator with an array subset covering the entire array will produce
/// ```rust,ignore
/// [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2), ...]
/// ```
#[derive(Clone, Debug)]
pub struct IndicesIterator {
    subset: ArraySubset,
    index_front: u64,
    index_back: u64,
}

impl IndicesIterator {
    /// Create a new indices iterator.
    #[must_use]
    pub fn new(subset: ArraySubset) -> Self {
        let length = subset.num_elements();
        Self {
            subset,
            index_front: 0,
            index_back: length,
        }
    }

    fn indices(&self, index: u64) -> ArrayIndices {
        let mut indices = unravel_index(index, self.subset.shape());
        for (index, start) in std::iter::zip(&mut indices, self.subset.start()) {
            *index += start;
        }
        indices
    }
}

impl Iterator for IndicesIterator {
    type Item = ArrayIndices;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index_front < self.index_back {
            let indices = self.indices(self.index_front);
            self.index_front += 1;
            Some(indices)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let length = usize::try_from(self.index_back - self.index_front).unwrap_or(usize::MAX);
        (length, Some(length))
    }
}

impl DoubleEndedIterator for IndicesIterator {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.index_front < self.index_back {
            self.index_back -= 1;
            Some(self.indices(self.index_back))
        } else {
            None
        }
    }
}

impl ExactSizeIterator for IndicesIterator {}

impl FusedIterator for IndicesIterator {}

/// An iterator over contiguous runs of elements of an array subset within an array.
///
/// The iterator item is a tuple of the linearised index of the first element of the run in the array and the number of contiguous elements.
#[derive(Clone, Debug)]
pub struct ContiguousLinearisedIndicesIterator {
    inner: IndicesIterator,
    array_shape: ArrayShape,
    inner_start: ArrayIndices,
    contiguous_elements: u64,
}

impl ContiguousLinearisedIndicesIterator {
    /// Create a new contiguous linearised indices iterator.
    ///
    /// # Errors
    /// Returns [`IncompatibleArrayShapeError`] if `array_shape` does not encapsulate `subset`.
    pub fn new(
        subset: &ArraySubset,
        array_shape: &[u64],
    ) -> Result<Self, IncompatibleArrayShapeError> {
        if !subset.inbounds(array_shape) {
            return Err(IncompatibleArrayShapeError::new(
                array_shape.to_vec(),
                subset.clone(),
            ));
        }

        // Merge trailing dimensions which span the whole array into a single run
        let dimensionality = subset.dimensionality();
        let mut contiguous_elements = 1;
        let mut split = dimensionality;
        for dim in (0..dimensionality).rev() {
            contiguous_elements *= subset.shape()[dim];
            split = dim;
            if subset.shape()[dim] != array_shape[dim] {
                break;
            }
        }

        let outer = if subset.is_empty() {
            ArraySubset::new_empty(split)
        } else {
            ArraySubset {
                start: subset.start()[..split].to_vec(),
                shape: subset.shape()[..split].to_vec(),
            }
        };
        Ok(Self {
            inner: outer.iter_indices(),
            array_shape: array_shape.to_vec(),
            inner_start: subset.start()[split..].to_vec(),
            contiguous_elements,
        })
    }

    /// Return the number of contiguous elements (fixed for each iteration).
    #[must_use]
    pub const fn contiguous_elements(&self) -> u64 {
        self.contiguous_elements
    }
}

impl Iterator for ContiguousLinearisedIndicesIterator {
    type Item = (u64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        let mut indices = self.inner.next()?;
        indices.extend_from_slice(&self.inner_start);
        Some((
            ravel_indices(&indices, &self.array_shape),
            self.contiguous_elements,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ContiguousLinearisedIndicesIterator {}

impl FusedIterator for ContiguousLinearisedIndicesIterator {}

/// Iterates over the regular sized chunks overlapping an array subset.
///
/// All chunks have the same size, and may extend over the bounds of the array subset since the start of the first chunk is aligned to the chunk size.
///
/// The iterator item is a ([`ArrayIndices`], [`ArraySubset`]) tuple corresponding to the chunk indices and the chunk subset.
#[derive(Clone, Debug)]
pub struct ChunksIterator {
    inner: IndicesIterator,
    chunk_shape: Vec<u64>,
}

impl ChunksIterator {
    /// Create a new chunks iterator.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if `chunk_shape` does not match the dimensionality of `subset` or has a zero component.
    pub fn new(
        subset: &ArraySubset,
        chunk_shape: &[u64],
    ) -> Result<Self, IncompatibleDimensionalityError> {
        if subset.dimensionality() != chunk_shape.len() || chunk_shape.contains(&0) {
            return Err(IncompatibleDimensionalityError::new(
                chunk_shape.len(),
                subset.dimensionality(),
            ));
        }
        let chunks = if subset.is_empty() {
            ArraySubset::new_empty(subset.dimensionality())
        } else {
            let chunk_start: ArrayIndices = std::iter::zip(subset.start(), chunk_shape)
                .map(|(s, c)| s / c)
                .collect();
            let chunk_end_exc: ArrayIndices = std::iter::zip(subset.end_exc(), chunk_shape)
                .map(|(e, c)| (e - 1) / c + 1)
                .collect();
            ArraySubset::new_with_start_end_exc(chunk_start, chunk_end_exc)?
        };
        Ok(Self {
            inner: chunks.iter_indices(),
            chunk_shape: chunk_shape.to_vec(),
        })
    }
}

impl Iterator for ChunksIterator {
    type Item = (ArrayIndices, ArraySubset);

    fn next(&mut self) -> Option<Self::Item> {
        let chunk_indices = self.inner.next()?;
        let start = std::iter::zip(&chunk_indices, &self.chunk_shape)
            .map(|(i, c)| i * c)
            .collect();
        let chunk_subset = ArraySubset {
            start,
            shape: self.chunk_shape.clone(),
        };
        Some((chunk_indices, chunk_subset))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ChunksIterator {}

impl FusedIterator for ChunksIterator {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_iterator() {
        let subset = ArraySubset::new_with_ranges(&[1..3, 1..3]);
        let mut iter = subset.iter_indices();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next(), Some(vec![1, 1]));
        assert_eq!(iter.next_back(), Some(vec![2, 2]));
        assert_eq!(iter.next(), Some(vec![1, 2]));
        assert_eq!(iter.next(), Some(vec![2, 1]));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn contiguous_linearised_indices_iterator() {
        let subset = ArraySubset::new_with_start_shape(vec![0, 0], vec![2, 1]).unwrap();
        let iter = subset.iter_contiguous_linearised_indices(&[2, 2]).unwrap();
        assert_eq!(iter.collect::<Vec<_>>(), vec![(0, 1), (2, 1)]);

        let subset = ArraySubset::new_with_start_shape(vec![1, 0], vec![1, 2]).unwrap();
        let iter = subset.iter_contiguous_linearised_indices(&[2, 2]).unwrap();
        assert_eq!(iter.collect::<Vec<_>>(), vec![(2, 2)]);

        let subset = ArraySubset::new_with_start_shape(vec![0, 0], vec![2, 2]).unwrap();
        let iter = subset.iter_contiguous_linearised_indices(&[2, 2]).unwrap();
        assert_eq!(iter.collect::<Vec<_>>(), vec![(0, 4)]);

        let subset =
            ArraySubset::new_with_start_shape(vec![0, 0, 0, 0], vec![2, 1, 2, 3]).unwrap();
        let iter = subset
            .iter_contiguous_linearised_indices(&[2, 2, 2, 3])
            .unwrap();
        assert_eq!(iter.collect::<Vec<_>>(), vec![(0, 6), (12, 6)]);

        let subset = ArraySubset::new_with_start_shape(vec![0, 0, 1], vec![2, 2, 2]).unwrap();
        let iter = subset.iter_contiguous_linearised_indices(&[2, 2, 3]).unwrap();
        assert_eq!(iter.collect::<Vec<_>>(), vec![(1, 2), (4, 2), (7, 2), (10, 2)]);

        assert!(subset.iter_contiguous_linearised_indices(&[2, 2, 2]).is_err());
    }

    #[test]
    fn chunks_iterator() {
        let subset = ArraySubset::new_with_ranges(&[1..5, 1..4]);
        let chunks: Vec<_> = subset.iter_chunks(&[2, 2]).unwrap().collect();
        assert_eq!(chunks.len(), 6);
        assert_eq!(
            chunks[0],
            (vec![0, 0], ArraySubset::new_with_ranges(&[0..2, 0..2]))
        );
        assert_eq!(
            chunks[5],
            (vec![2, 1], ArraySubset::new_with_ranges(&[4..6, 2..4]))
        );
        assert!(subset.iter_chunks(&[2]).is_err());
        assert!(subset.iter_chunks(&[2, 0]).is_err());
        assert_eq!(
            ArraySubset::new_with_ranges(&[1..1, 1..4])
                .iter_chunks(&[2, 2])
                .unwrap()
                .count(),
            0
        );
    }
}
