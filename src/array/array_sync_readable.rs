use std::sync::Arc;

use rayon::prelude::*;
use unsafe_cell_slice::UnsafeCellSlice;

use crate::{
    array_subset::ArraySubset,
    node::{retrieve_node_metadata, NodeMetadata, NodePath},
    storage::{ReadableStorageTraits, StorageHandle},
};

use super::{
    codec::{
        ArrayCodecTraits, ArrayPartialDecoderTraits, ArrayToBytesCodecTraits,
        StoragePartialDecoder,
    },
    concurrency::chunk_concurrent_limit,
    transmute_from_bytes_vec, validate_element_size, Array, ArrayCreateError, ArrayError,
    ArrayIndices,
};

#[cfg(feature = "ndarray")]
use super::elements_to_ndarray;

impl<TStorage: ?Sized + ReadableStorageTraits + 'static> Array<TStorage> {
    /// Open an existing array in `storage` at `path`. The metadata is read from the store.
    ///
    /// Zarr V3 metadata (`zarr.json`) takes precedence over Zarr V2 metadata (`.zarray` and `.zattrs`).
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if there is a storage error, there is no array at `path`, or any metadata is invalid.
    pub fn new(storage: Arc<TStorage>, path: &str) -> Result<Self, ArrayCreateError> {
        let node_path = NodePath::new(path)?;
        match retrieve_node_metadata(&*storage, &node_path)? {
            NodeMetadata::Array(metadata) => Self::new_with_metadata(storage, path, metadata),
            NodeMetadata::Group(_) => Err(ArrayCreateError::MissingMetadata(path.to_string())),
        }
    }

    /// Read and decode the chunk at `chunk_indices` into its bytes if it exists.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `chunk_indices` are invalid,
    ///  - there is a codec decoding error, or
    ///  - an underlying store error.
    pub fn retrieve_chunk_if_exists(
        &self,
        chunk_indices: &[u64],
    ) -> Result<Option<Vec<u8>>, ArrayError> {
        self.retrieve_chunk_if_exists_opt(chunk_indices, false)
    }

    /// Read and decode the chunk at `chunk_indices` into its bytes or the fill value if it does not exist.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `chunk_indices` are invalid,
    ///  - there is a codec decoding error, or
    ///  - an underlying store error.
    pub fn retrieve_chunk(&self, chunk_indices: &[u64]) -> Result<Vec<u8>, ArrayError> {
        self.retrieve_chunk_opt(chunk_indices, false)
    }

    /// Read and decode the `chunk_subset` of the chunk at `chunk_indices` into its bytes.
    ///
    /// The chunk subset is relative to the origin of the chunk.
    /// If the codec chain supports partial decoding, only the parts of the encoded chunk needed for the subset are read.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if:
    ///  - the chunk indices are invalid,
    ///  - the chunk subset is invalid,
    ///  - there is a codec decoding error, or
    ///  - an underlying store error.
    pub fn retrieve_chunk_subset(
        &self,
        chunk_indices: &[u64],
        chunk_subset: &ArraySubset,
    ) -> Result<Vec<u8>, ArrayError> {
        self.retrieve_chunk_subset_opt(chunk_indices, chunk_subset, false)
    }

    /// Read and decode the `array_subset` of the array into its bytes.
    ///
    /// Out-of-bounds elements are not permitted.
    /// Elements of chunks which do not exist are the fill value.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if:
    ///  - the `array_subset` is out of bounds of the array,
    ///  - there is a codec decoding error, or
    ///  - an underlying store error.
    pub fn retrieve_array_subset(
        &self,
        array_subset: &ArraySubset,
    ) -> Result<Vec<u8>, ArrayError> {
        self.retrieve_array_subset_opt(array_subset, false)
    }

    /// Parallel version of [`Array::retrieve_array_subset`].
    #[allow(clippy::missing_errors_doc)]
    pub fn par_retrieve_array_subset(
        &self,
        array_subset: &ArraySubset,
    ) -> Result<Vec<u8>, ArrayError> {
        self.retrieve_array_subset_opt(array_subset, true)
    }

    /// Read the region of the array at `offset` with `shape` into its bytes.
    ///
    /// The `offset` defaults to the origin of the array, and the `shape` defaults to the remainder of the array from the `offset`.
    /// Chunks are retrieved in parallel if the region intersects more than one chunk.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if:
    ///  - the `offset` or `shape` do not match the dimensionality of the array,
    ///  - the region is out of bounds of the array ([`ArrayError::OutOfBounds`]),
    ///  - there is a codec decoding error, or
    ///  - an underlying store error.
    pub fn read(
        &self,
        offset: Option<&[u64]>,
        shape: Option<&[u64]>,
    ) -> Result<Vec<u8>, ArrayError> {
        let array_subset = self.offset_shape_to_subset(offset, shape)?;
        let parallel = self.chunks_in_array_subset(&array_subset)?.num_elements() > 1;
        self.retrieve_array_subset_opt(&array_subset, parallel)
    }

    /// Read the region of the array at `offset` with `shape` into a vector of its elements.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the size of `T` does not match the data type size or a [`read`](Array::read) error condition is met.
    pub fn read_elements<T: bytemuck::Pod>(
        &self,
        offset: Option<&[u64]>,
        shape: Option<&[u64]>,
    ) -> Result<Vec<T>, ArrayError> {
        validate_element_size::<T>(self.data_type())?;
        Ok(transmute_from_bytes_vec::<T>(self.read(offset, shape)?))
    }

    #[cfg(feature = "ndarray")]
    /// Read the region of the array at `offset` with `shape` into an [`ndarray::ArrayD`].
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the size of `T` does not match the data type size or a [`read`](Array::read) error condition is met.
    ///
    /// # Panics
    /// Will panic if any dimension of the region is `usize::MAX` or larger.
    pub fn read_ndarray<T: bytemuck::Pod>(
        &self,
        offset: Option<&[u64]>,
        shape: Option<&[u64]>,
    ) -> Result<ndarray::ArrayD<T>, ArrayError> {
        let array_subset = self.offset_shape_to_subset(offset, shape)?;
        let elements = self.read_elements::<T>(offset, shape)?;
        elements_to_ndarray(array_subset.shape(), elements)
    }

    /// Initialises a partial decoder for the chunk at `chunk_indices`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the chunk indices are invalid or there is an error creating the decoder.
    pub fn partial_decoder<'a>(
        &'a self,
        chunk_indices: &[u64],
    ) -> Result<Box<dyn ArrayPartialDecoderTraits + 'a>, ArrayError> {
        self.partial_decoder_opt(chunk_indices, false)
    }

    /////////////////////////////////////////////////////////////////////////////
    // Explicit parallelism variants
    /////////////////////////////////////////////////////////////////////////////

    /// Explicit parallelism version of [`retrieve_chunk_if_exists`](Array::retrieve_chunk_if_exists).
    #[allow(clippy::missing_errors_doc)]
    pub fn retrieve_chunk_if_exists_opt(
        &self,
        chunk_indices: &[u64],
        parallel: bool,
    ) -> Result<Option<Vec<u8>>, ArrayError> {
        let chunk_representation = self.chunk_representation(chunk_indices)?;
        let Some(chunk_encoded) = self.storage.get(&self.chunk_key(chunk_indices))? else {
            return Ok(None);
        };
        let chunk_decoded =
            self.codecs()
                .decode_opt(chunk_encoded.to_vec(), &chunk_representation, parallel)?;
        let chunk_decoded_size = chunk_representation.size();
        if chunk_decoded.len() as u64 == chunk_decoded_size {
            Ok(Some(chunk_decoded))
        } else {
            Err(ArrayError::UnexpectedChunkDecodedSize(
                chunk_decoded.len(),
                chunk_decoded_size,
            ))
        }
    }

    /// Explicit parallelism version of [`retrieve_chunk`](Array::retrieve_chunk).
    #[allow(clippy::missing_errors_doc)]
    pub fn retrieve_chunk_opt(
        &self,
        chunk_indices: &[u64],
        parallel: bool,
    ) -> Result<Vec<u8>, ArrayError> {
        if let Some(chunk) = self.retrieve_chunk_if_exists_opt(chunk_indices, parallel)? {
            Ok(chunk)
        } else {
            let chunk_representation = self.chunk_representation(chunk_indices)?;
            Ok(chunk_representation
                .fill_value()
                .repeat(chunk_representation.num_elements_usize()))
        }
    }

    /// Explicit parallelism version of [`retrieve_chunk_subset`](Array::retrieve_chunk_subset).
    #[allow(clippy::missing_errors_doc)]
    pub fn retrieve_chunk_subset_opt(
        &self,
        chunk_indices: &[u64],
        chunk_subset: &ArraySubset,
        parallel: bool,
    ) -> Result<Vec<u8>, ArrayError> {
        let chunk_representation = self.chunk_representation(chunk_indices)?;
        let chunk_shape = chunk_representation.shape_u64();
        if chunk_subset.dimensionality() != chunk_shape.len()
            || !chunk_subset.inbounds(&chunk_shape)
        {
            return Err(ArrayError::InvalidChunkSubset(
                chunk_subset.clone(),
                chunk_indices.to_vec(),
                chunk_shape,
            ));
        }

        let decoded_bytes = if chunk_subset.start().iter().all(|&o| o == 0)
            && chunk_subset.shape() == chunk_shape
        {
            // Fast path if `chunk_subset` encompasses the whole chunk
            self.retrieve_chunk_opt(chunk_indices, parallel)?
        } else {
            let partial_decoder = self.partial_decoder_opt(chunk_indices, parallel)?;
            partial_decoder
                .partial_decode_opt(&[chunk_subset.clone()], parallel)?
                .pop()
                .ok_or(ArrayError::UnexpectedChunkDecodedSize(
                    0,
                    chunk_subset.num_elements() * self.data_type().size() as u64,
                ))?
        };

        let expected_size = chunk_subset.num_elements() * self.data_type().size() as u64;
        if decoded_bytes.len() as u64 == expected_size {
            Ok(decoded_bytes)
        } else {
            Err(ArrayError::UnexpectedChunkDecodedSize(
                decoded_bytes.len(),
                expected_size,
            ))
        }
    }

    /// Explicit parallelism version of [`retrieve_array_subset`](Array::retrieve_array_subset).
    #[allow(clippy::missing_errors_doc)]
    pub fn retrieve_array_subset_opt(
        &self,
        array_subset: &ArraySubset,
        parallel: bool,
    ) -> Result<Vec<u8>, ArrayError> {
        self.validate_array_subset(array_subset)?;

        // Find the chunks intersecting this array subset
        let chunks = self.chunks_in_array_subset(array_subset)?;
        let num_chunks = chunks.num_elements_usize();
        log::trace!(
            "retrieving array subset {array_subset} of {} from {num_chunks} chunks",
            self.path()
        );

        match num_chunks {
            0 => Ok(self.fill_value().repeat(array_subset.num_elements_usize())),
            1 => {
                let chunk_indices = chunks.start();
                let chunk_subset = self.chunk_subset(chunk_indices)?;
                if &chunk_subset == array_subset {
                    // Single chunk fast path if the array subset domain matches the chunk domain
                    self.retrieve_chunk_opt(chunk_indices, parallel)
                } else {
                    let array_subset_in_chunk_subset =
                        array_subset.relative_to(chunk_subset.start())?;
                    self.retrieve_chunk_subset_opt(
                        chunk_indices,
                        &array_subset_in_chunk_subset,
                        parallel,
                    )
                }
            }
            _ => {
                let element_size = self.data_type().size();
                let mut output = vec![0u8; array_subset.num_elements_usize() * element_size];

                // Parallelise across chunks, or within codecs if chunks are processed serially
                let chunk_concurrent_limit = chunk_concurrent_limit(num_chunks, parallel);
                let codec_parallel = parallel && chunk_concurrent_limit == 1;

                {
                    let output_slice = UnsafeCellSlice::new(output.as_mut_slice());
                    let chunk_indices: Vec<ArrayIndices> = chunks.iter_indices().collect();
                    rayon_iter_concurrent_limit::iter_concurrent_limit!(
                        chunk_concurrent_limit,
                        chunk_indices,
                        try_for_each,
                        |chunk_indices: ArrayIndices| {
                            let chunk_subset = self.chunk_subset(&chunk_indices)?;
                            let overlap = chunk_subset.overlap(array_subset)?;
                            let chunk_subset_bytes = self.retrieve_chunk_subset_opt(
                                &chunk_indices,
                                &overlap.relative_to(chunk_subset.start())?,
                                codec_parallel,
                            )?;
                            // Chunks are disjoint, so each output element is written by exactly one chunk
                            let output = unsafe { output_slice.as_mut_slice() };
                            overlap.relative_to(array_subset.start())?.store_bytes(
                                &chunk_subset_bytes,
                                output,
                                array_subset.shape(),
                                element_size,
                            )?;
                            Ok::<_, ArrayError>(())
                        }
                    )?;
                }
                Ok(output)
            }
        }
    }

    /// Explicit parallelism version of [`partial_decoder`](Array::partial_decoder).
    #[allow(clippy::missing_errors_doc)]
    pub fn partial_decoder_opt<'a>(
        &'a self,
        chunk_indices: &[u64],
        parallel: bool,
    ) -> Result<Box<dyn ArrayPartialDecoderTraits + 'a>, ArrayError> {
        let chunk_representation = self.chunk_representation(chunk_indices)?;
        let storage_handle = Arc::new(StorageHandle::new(self.storage.clone()));
        let input_handle = Box::new(StoragePartialDecoder::new(
            storage_handle,
            self.chunk_key(chunk_indices),
        ));
        Ok(self
            .codecs()
            .partial_decoder_opt(input_handle, &chunk_representation, parallel)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        array::{ArrayBuilder, DataType, FillValue},
        storage::store::MemoryStore,
    };

    use super::*;

    fn array_u8(store: Arc<MemoryStore>) -> Array<MemoryStore> {
        ArrayBuilder::new(
            vec![4, 4],
            DataType::UInt8,
            vec![2, 2].try_into().unwrap(),
            FillValue::from(7u8),
        )
        .build(store, "/array")
        .unwrap()
    }

    #[test]
    fn array_retrieve_missing_chunks() {
        let store = Arc::new(MemoryStore::new());
        let array = array_u8(store);
        assert!(array.retrieve_chunk_if_exists(&[0, 0]).unwrap().is_none());
        assert_eq!(array.retrieve_chunk(&[1, 1]).unwrap(), vec![7u8; 4]);
        assert_eq!(array.read(None, None).unwrap(), vec![7u8; 16]);
        assert_eq!(
            array
                .retrieve_chunk_subset(&[0, 1], &ArraySubset::new_with_ranges(&[1..2, 0..2]))
                .unwrap(),
            vec![7u8; 2]
        );
        assert!(matches!(
            array.retrieve_chunk(&[2, 0]),
            Err(ArrayError::InvalidChunkGridIndices(_))
        ));
        assert!(matches!(
            array.retrieve_chunk_subset(&[0, 0], &ArraySubset::new_with_ranges(&[1..3, 0..2])),
            Err(ArrayError::InvalidChunkSubset(..))
        ));
    }

    #[test]
    fn array_retrieve_out_of_bounds() {
        let store = Arc::new(MemoryStore::new());
        let array = array_u8(store);
        assert!(matches!(
            array.read(Some(&[3, 3]), Some(&[2, 1])),
            Err(ArrayError::OutOfBounds(..))
        ));
        assert!(matches!(
            array.retrieve_array_subset(&ArraySubset::new_with_ranges(&[0..5, 0..1])),
            Err(ArrayError::OutOfBounds(..))
        ));
        assert!(matches!(
            array.retrieve_array_subset(&ArraySubset::new_with_ranges(&[0..1])),
            Err(ArrayError::OutOfBounds(..))
        ));
        assert!(matches!(
            array.read(Some(&[u64::MAX, 0]), Some(&[2, 1])),
            Err(ArrayError::OutOfBounds(..))
        ));
        assert!(matches!(
            array.write(Some(&[0, u64::MAX]), &[1, 2], vec![0, 0]),
            Err(ArrayError::OutOfBounds(..))
        ));
    }

    #[test]
    fn array_retrieve_element_size_mismatch() {
        let store = Arc::new(MemoryStore::new());
        let array = array_u8(store);
        assert!(matches!(
            array.read_elements::<u16>(None, None),
            Err(ArrayError::IncompatibleElementSize(1, 2))
        ));
    }

    #[test]
    fn array_open_missing() {
        let store = Arc::new(MemoryStore::new());
        assert!(matches!(
            Array::new(store, "/array"),
            Err(ArrayCreateError::MissingMetadata(_))
        ));
    }
}
