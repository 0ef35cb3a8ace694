use crate::storage::{StorageError, WritableStorageTraits};

use super::{codec::ArrayCodecTraits, Array, ArrayError};

impl<TStorage: ?Sized + WritableStorageTraits + 'static> Array<TStorage> {
    /// Store metadata.
    ///
    /// The metadata is written in the Zarr format the array was created or opened with.
    ///
    /// # Errors
    /// Returns [`StorageError`] if there is an underlying store error.
    pub fn store_metadata(&self) -> Result<(), StorageError> {
        crate::storage::store_array_metadata(&*self.storage, self.path(), self.metadata())
    }

    /// Encode `chunk_bytes` and store at `chunk_indices`.
    ///
    /// A chunk composed entirely of the fill value will not be written to the store, any existing chunk is erased instead.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - `chunk_indices` are invalid,
    ///  - the length of `chunk_bytes` is not equal to the expected length (the product of the number of elements in the chunk and the data type size in bytes),
    ///  - there is a codec encoding error, or
    ///  - an underlying store error.
    pub fn store_chunk(
        &self,
        chunk_indices: &[u64],
        chunk_bytes: Vec<u8>,
    ) -> Result<(), ArrayError> {
        self.store_chunk_opt(chunk_indices, chunk_bytes, false)
    }

    /// Erase the chunk at `chunk_indices`.
    ///
    /// Succeeds if the chunk does not exist.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying store error.
    pub fn erase_chunk(&self, chunk_indices: &[u64]) -> Result<(), StorageError> {
        let key = self.chunk_key(chunk_indices);
        log::trace!("erasing chunk {key}");
        self.storage.erase(&key)
    }

    /// Explicit parallelism version of [`store_chunk`](Array::store_chunk).
    #[allow(clippy::missing_errors_doc)]
    pub fn store_chunk_opt(
        &self,
        chunk_indices: &[u64],
        chunk_bytes: Vec<u8>,
        parallel: bool,
    ) -> Result<(), ArrayError> {
        // Validation
        let chunk_representation = self.chunk_representation(chunk_indices)?;
        if chunk_bytes.len() as u64 != chunk_representation.size() {
            return Err(ArrayError::InvalidBytesInputSize(
                chunk_bytes.len(),
                chunk_representation.size(),
            ));
        }

        if self.fill_value().equals_all(&chunk_bytes) {
            self.erase_chunk(chunk_indices)?;
            Ok(())
        } else {
            // The chunk is only stored if encoding succeeds
            let chunk_encoded =
                self.codecs()
                    .encode_opt(chunk_bytes, &chunk_representation, parallel)?;
            let key = self.chunk_key(chunk_indices);
            log::trace!("storing chunk {key} ({} bytes)", chunk_encoded.len());
            self.storage.set(&key, chunk_encoded.into())?;
            Ok(())
        }
    }

}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        array::{transmute_to_bytes_vec, ArrayBuilder, DataType, FillValue},
        storage::{store::MemoryStore, ReadableStorageTraits, StoreKey},
    };

    use super::*;

    #[test]
    fn array_store_chunk() {
        let store = Arc::new(MemoryStore::new());
        let array = ArrayBuilder::new(
            vec![4, 4],
            DataType::UInt16,
            vec![2, 2].try_into().unwrap(),
            FillValue::from(0u16),
        )
        .build(store.clone(), "/array")
        .unwrap();
        array.store_metadata().unwrap();
        assert!(store.exists(&StoreKey::new("array/zarr.json").unwrap()).unwrap());

        let chunk_key = StoreKey::new("array/c/1/0").unwrap();
        let chunk = transmute_to_bytes_vec(vec![1u16, 2, 3, 4]);
        array.store_chunk(&[1, 0], chunk.clone()).unwrap();
        assert!(store.exists(&chunk_key).unwrap());
        assert_eq!(array.retrieve_chunk(&[1, 0]).unwrap(), chunk);

        // A chunk of the fill value is erased
        array.store_chunk(&[1, 0], vec![0; 8]).unwrap();
        assert!(!store.exists(&chunk_key).unwrap());

        assert!(matches!(
            array.store_chunk(&[0, 0], vec![0; 3]),
            Err(ArrayError::InvalidBytesInputSize(3, 8))
        ));
        assert!(matches!(
            array.store_chunk(&[2, 0], vec![0; 8]),
            Err(ArrayError::InvalidChunkGridIndices(_))
        ));
    }

    #[test]
    fn array_erase_chunk() {
        let store = Arc::new(MemoryStore::new());
        let array = ArrayBuilder::new(
            vec![4],
            DataType::UInt8,
            vec![2].try_into().unwrap(),
            FillValue::from(9u8),
        )
        .build(store.clone(), "/array")
        .unwrap();
        array.store_chunk(&[1], vec![1, 2]).unwrap();
        assert_eq!(array.read(None, None).unwrap(), vec![9, 9, 1, 2]);
        array.erase_chunk(&[1]).unwrap();
        array.erase_chunk(&[1]).unwrap();
        assert!(!store.exists(&StoreKey::new("array/c/1").unwrap()).unwrap());
        assert_eq!(array.read(None, None).unwrap(), vec![9; 4]);
    }
}
