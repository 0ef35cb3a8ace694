use rayon::prelude::*;

use crate::{array_subset::ArraySubset, storage::ReadableWritableStorageTraits};

use super::{
    concurrency::chunk_concurrent_limit, transmute_to_bytes_vec, validate_element_size, Array,
    ArrayError, ArrayIndices,
};

impl<TStorage: ?Sized + ReadableWritableStorageTraits + 'static> Array<TStorage> {
    /// Write `bytes` to the region of the array at `offset` with `shape`.
    ///
    /// The `offset` defaults to the origin of the array.
    /// Chunks intersecting the region are written in parallel if there is more than one.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `offset` or `shape` have the wrong dimensionality,
    ///  - the region is out of bounds of the array,
    ///  - the length of `bytes` does not match the region size, or
    ///  - a [`store_array_subset`](Array::store_array_subset) error condition is met.
    pub fn write(
        &self,
        offset: Option<&[u64]>,
        shape: &[u64],
        bytes: Vec<u8>,
    ) -> Result<(), ArrayError> {
        let array_subset = self.offset_shape_to_subset(offset, Some(shape))?;
        let parallel = self.chunks_in_array_subset(&array_subset)?.num_elements() > 1;
        self.store_array_subset_opt(&array_subset, bytes, parallel)
    }

    /// Write `elements` to the region of the array at `offset` with `shape`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the size of `T` does not match the data type size or a [`write`](Array::write) error condition is met.
    pub fn write_elements<T: bytemuck::Pod>(
        &self,
        offset: Option<&[u64]>,
        shape: &[u64],
        elements: Vec<T>,
    ) -> Result<(), ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        self.write(offset, shape, transmute_to_bytes_vec(elements))
    }

    #[cfg(feature = "ndarray")]
    /// Write `array` to the array at `offset`. The shape of the region is the shape of `array`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if a [`write_elements`](Array::write_elements) error condition is met.
    pub fn write_ndarray<T: bytemuck::Pod>(
        &self,
        offset: Option<&[u64]>,
        array: &ndarray::ArrayViewD<T>,
    ) -> Result<(), ArrayError> {
        let shape: Vec<u64> = array.shape().iter().map(|&s| s as u64).collect();
        let elements: Vec<T> = array.iter().copied().collect();
        self.write_elements(offset, &shape, elements)
    }

    /// Encode `chunk_subset_bytes` and store in `chunk_subset` of the chunk at `chunk_indices`.
    ///
    /// Elements of the chunk outside of `chunk_subset` are preserved.
    /// Prefer [`store_chunk`](Array::store_chunk) where possible, since this may decode the existing chunk before updating and encoding it.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `chunk_subset` is invalid or out of bounds of the chunk,
    ///  - the length of `chunk_subset_bytes` does not match the size of `chunk_subset`,
    ///  - there is a codec encoding or decoding error, or
    ///  - an underlying store error.
    pub fn store_chunk_subset(
        &self,
        chunk_indices: &[u64],
        chunk_subset: &ArraySubset,
        chunk_subset_bytes: Vec<u8>,
    ) -> Result<(), ArrayError> {
        self.store_chunk_subset_opt(chunk_indices, chunk_subset, chunk_subset_bytes, false)
    }

    /// Encode `subset_bytes` and store in `array_subset`.
    ///
    /// Prefer [`store_chunk`](Array::store_chunk) where possible, since chunks only partially covered by `array_subset` are decoded before being updated.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `array_subset` is out of bounds of the array,
    ///  - the length of `subset_bytes` does not match the size of `array_subset`,
    ///  - there is a codec encoding or decoding error, or
    ///  - an underlying store error.
    pub fn store_array_subset(
        &self,
        array_subset: &ArraySubset,
        subset_bytes: Vec<u8>,
    ) -> Result<(), ArrayError> {
        self.store_array_subset_opt(array_subset, subset_bytes, false)
    }

    /// Parallel version of [`store_array_subset`](Array::store_array_subset).
    #[allow(clippy::missing_errors_doc)]
    pub fn par_store_array_subset(
        &self,
        array_subset: &ArraySubset,
        subset_bytes: Vec<u8>,
    ) -> Result<(), ArrayError> {
        self.store_array_subset_opt(array_subset, subset_bytes, true)
    }

    /// Explicit parallelism version of [`store_chunk_subset`](Array::store_chunk_subset).
    #[allow(clippy::missing_errors_doc)]
    pub fn store_chunk_subset_opt(
        &self,
        chunk_indices: &[u64],
        chunk_subset: &ArraySubset,
        chunk_subset_bytes: Vec<u8>,
        parallel: bool,
    ) -> Result<(), ArrayError> {
        let chunk_representation = self.chunk_representation(chunk_indices)?;
        let chunk_shape = chunk_representation.shape_u64();

        // Validation
        if chunk_subset.dimensionality() != chunk_shape.len()
            || !chunk_subset.inbounds(&chunk_shape)
        {
            return Err(ArrayError::InvalidChunkSubset(
                chunk_subset.clone(),
                chunk_indices.to_vec(),
                chunk_shape,
            ));
        }
        let element_size = self.data_type().size();
        let expected_size = chunk_subset.num_elements() * element_size as u64;
        if chunk_subset_bytes.len() as u64 != expected_size {
            return Err(ArrayError::InvalidBytesInputSize(
                chunk_subset_bytes.len(),
                expected_size,
            ));
        }

        if chunk_subset.start().iter().all(|&o| o == 0) && chunk_subset.shape() == chunk_shape {
            // The subset spans the whole chunk, so the existing chunk is not decoded
            self.store_chunk_opt(chunk_indices, chunk_subset_bytes, parallel)
        } else {
            let mut chunk_bytes = self.retrieve_chunk_opt(chunk_indices, parallel)?;
            chunk_subset.store_bytes(
                &chunk_subset_bytes,
                &mut chunk_bytes,
                &chunk_shape,
                element_size,
            )?;
            self.store_chunk_opt(chunk_indices, chunk_bytes, parallel)
        }
    }

    /// Explicit parallelism version of [`store_array_subset`](Array::store_array_subset).
    #[allow(clippy::missing_errors_doc)]
    pub fn store_array_subset_opt(
        &self,
        array_subset: &ArraySubset,
        subset_bytes: Vec<u8>,
        parallel: bool,
    ) -> Result<(), ArrayError> {
        // Validation
        self.validate_array_subset(array_subset)?;
        let element_size = self.data_type().size();
        let expected_size = array_subset.num_elements() * element_size as u64;
        if subset_bytes.len() as u64 != expected_size {
            return Err(ArrayError::InvalidBytesInputSize(
                subset_bytes.len(),
                expected_size,
            ));
        }

        // Find the chunks intersecting this array subset
        let chunks = self.chunks_in_array_subset(array_subset)?;
        let num_chunks = chunks.num_elements_usize();
        log::trace!(
            "storing array subset {array_subset} of {} to {num_chunks} chunks",
            self.path()
        );

        if num_chunks == 1 {
            let chunk_indices = chunks.start();
            let chunk_subset = self.chunk_subset(chunk_indices)?;
            if &chunk_subset == array_subset {
                // Single chunk fast path if the array subset domain matches the chunk domain
                return self.store_chunk_opt(chunk_indices, subset_bytes, parallel);
            }
        }

        // Parallelise across chunks, or within codecs if chunks are processed serially
        let chunk_concurrent_limit = chunk_concurrent_limit(num_chunks, parallel);
        let codec_parallel = parallel && chunk_concurrent_limit == 1;

        let chunk_indices: Vec<ArrayIndices> = chunks.iter_indices().collect();
        rayon_iter_concurrent_limit::iter_concurrent_limit!(
            chunk_concurrent_limit,
            chunk_indices,
            try_for_each,
            |chunk_indices: ArrayIndices| {
                self.store_array_subset_chunk(
                    &chunk_indices,
                    array_subset,
                    &subset_bytes,
                    codec_parallel,
                )
            }
        )
    }

    /// Store the part of `subset_bytes` (the bytes of `array_subset`) intersecting the chunk at `chunk_indices`.
    fn store_array_subset_chunk(
        &self,
        chunk_indices: &[u64],
        array_subset: &ArraySubset,
        subset_bytes: &[u8],
        parallel: bool,
    ) -> Result<(), ArrayError> {
        let element_size = self.data_type().size();
        let chunk_subset = self.chunk_subset(chunk_indices)?;
        let chunk_subset_bounded = self.chunk_subset_bounded(chunk_indices)?;
        let overlap = chunk_subset_bounded.overlap(array_subset)?;
        let overlap_bytes = overlap.relative_to(array_subset.start())?.extract_bytes(
            subset_bytes,
            array_subset.shape(),
            element_size,
        )?;
        let overlap_in_chunk = overlap.relative_to(chunk_subset.start())?;

        if overlap == chunk_subset {
            self.store_chunk_opt(chunk_indices, overlap_bytes, parallel)
        } else if overlap == chunk_subset_bounded {
            // Every element of the chunk inside the array is written, the remainder is the fill value
            let mut chunk_bytes = self
                .fill_value()
                .repeat(chunk_subset.num_elements_usize());
            overlap_in_chunk.store_bytes(
                &overlap_bytes,
                &mut chunk_bytes,
                chunk_subset.shape(),
                element_size,
            )?;
            self.store_chunk_opt(chunk_indices, chunk_bytes, parallel)
        } else {
            self.store_chunk_subset_opt(chunk_indices, &overlap_in_chunk, overlap_bytes, parallel)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        array::{transmute_from_bytes_vec, ArrayBuilder, DataType, FillValue},
        storage::{store::MemoryStore, ReadableStorageTraits, StoreKey},
    };

    use super::*;

    fn array_4x4(store: Arc<MemoryStore>) -> Array<MemoryStore> {
        ArrayBuilder::new(
            vec![4, 4],
            DataType::UInt8,
            vec![2, 2].try_into().unwrap(),
            FillValue::from(0u8),
        )
        .build(store, "/array")
        .unwrap()
    }

    #[test]
    fn array_store_chunk_subset() {
        let store = Arc::new(MemoryStore::new());
        let array = array_4x4(store);

        array
            .store_chunk_subset(
                &[0, 0],
                &ArraySubset::new_with_ranges(&[0..1, 0..2]),
                vec![1, 2],
            )
            .unwrap();
        array
            .store_chunk_subset(&[0, 0], &ArraySubset::new_with_ranges(&[1..2, 1..2]), vec![4])
            .unwrap();
        assert_eq!(array.retrieve_chunk(&[0, 0]).unwrap(), vec![1, 2, 0, 4]);

        assert!(matches!(
            array.store_chunk_subset(
                &[0, 0],
                &ArraySubset::new_with_ranges(&[1..3, 0..1]),
                vec![0; 2]
            ),
            Err(ArrayError::InvalidChunkSubset(..))
        ));
        assert!(matches!(
            array.store_chunk_subset(
                &[0, 0],
                &ArraySubset::new_with_ranges(&[0..1, 0..1]),
                vec![0; 2]
            ),
            Err(ArrayError::InvalidBytesInputSize(2, 1))
        ));
    }

    #[test]
    fn array_store_array_subset() {
        let store = Arc::new(MemoryStore::new());
        let array = array_4x4(store.clone());
        array
            .store_array_subset(&ArraySubset::new_with_shape(vec![4, 4]), (0..16).collect())
            .unwrap();

        // A partial write spanning 4 chunks preserves untouched elements
        array
            .par_store_array_subset(
                &ArraySubset::new_with_ranges(&[1..3, 1..3]),
                vec![100, 101, 102, 103],
            )
            .unwrap();
        assert_eq!(
            array.read_elements::<u8>(None, None).unwrap(),
            vec![
                0, 1, 2, 3, //
                4, 100, 101, 7, //
                8, 102, 103, 11, //
                12, 13, 14, 15
            ]
        );

        // Chunks that become entirely fill value are erased
        array
            .store_array_subset(&ArraySubset::new_with_ranges(&[0..2, 0..4]), vec![0; 8])
            .unwrap();
        assert!(!store.exists(&StoreKey::new("array/c/0/0").unwrap()).unwrap());
        assert!(!store.exists(&StoreKey::new("array/c/0/1").unwrap()).unwrap());
        assert!(store.exists(&StoreKey::new("array/c/1/0").unwrap()).unwrap());

        assert!(matches!(
            array.store_array_subset(&ArraySubset::new_with_ranges(&[3..5, 0..1]), vec![0; 2]),
            Err(ArrayError::OutOfBounds(..))
        ));
        assert!(matches!(
            array.store_array_subset(&ArraySubset::new_with_ranges(&[0..2, 0..1]), vec![0; 3]),
            Err(ArrayError::InvalidBytesInputSize(3, 2))
        ));
    }

    #[test]
    fn array_write_edge_chunks() {
        let store = Arc::new(MemoryStore::new());
        let array = ArrayBuilder::new(
            vec![5, 3],
            DataType::Int16,
            vec![2, 2].try_into().unwrap(),
            FillValue::from(-1i16),
        )
        .build(store, "/array")
        .unwrap();

        let elements: Vec<i16> = (0..15).collect();
        array.write_elements(None, &[5, 3], elements.clone()).unwrap();
        assert_eq!(array.read_elements::<i16>(None, None).unwrap(), elements);

        // The edge chunk stores the fill value outside of the array
        assert_eq!(
            transmute_from_bytes_vec::<i16>(array.retrieve_chunk(&[2, 1]).unwrap()),
            vec![14, -1, -1, -1]
        );

        array
            .write_elements(Some(&[4, 0]), &[1, 2], vec![-5i16, -6])
            .unwrap();
        assert_eq!(
            array.read_elements::<i16>(Some(&[3, 0]), None).unwrap(),
            vec![9, 10, 11, -5, -6, 14]
        );

        assert!(matches!(
            array.write_elements(Some(&[4, 0]), &[2, 2], vec![0i16; 4]),
            Err(ArrayError::OutOfBounds(..))
        ));
        assert!(matches!(
            array.write_elements(None, &[2], vec![0i16; 2]),
            Err(ArrayError::InvalidOffsetShape(..))
        ));
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn array_write_ndarray() {
        let store = Arc::new(MemoryStore::new());
        let array = array_4x4(store);
        let data =
            ndarray::ArrayD::<u8>::from_shape_vec(vec![3, 2], vec![1, 2, 3, 4, 5, 6]).unwrap();
        array.write_ndarray(Some(&[1, 1]), &data.view()).unwrap();
        assert_eq!(
            array.read_ndarray::<u8>(Some(&[1, 1]), Some(&[3, 2])).unwrap(),
            data
        );
        assert_eq!(
            array
                .read_elements::<u8>(Some(&[0, 0]), Some(&[1, 4]))
                .unwrap(),
            vec![0; 4]
        );
    }
}
