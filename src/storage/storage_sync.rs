use crate::byte_range::ByteRange;

use super::{
    Bytes, MaybeBytes, StorageError, StoreKey, StoreKeys, StoreKeysPrefixes, StorePrefix,
};

/// A store that values can be read from.
pub trait ReadableStorageTraits: Send + Sync {
    /// Retrieve the value at `key`, or [`None`] if it does not exist.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store fails.
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        let values = self.get_partial_values_key(key, &[ByteRange::FromStart(0, None)])?;
        Ok(values.and_then(|mut values| values.pop()))
    }

    /// Retrieve `byte_ranges` of the value at `key`, or [`None`] if it does not exist.
    ///
    /// One value is returned per byte range, in order.
    /// Stores with ranged reads (files, HTTP range requests) only transfer the requested bytes.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store fails or a byte range exceeds the value.
    fn get_partial_values_key(
        &self,
        key: &StoreKey,
        byte_ranges: &[ByteRange],
    ) -> Result<Option<Vec<Bytes>>, StorageError>;

    /// The size in bytes of the value at `key`, or [`None`] if it does not exist.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store fails.
    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError>;

    /// Returns true if there is a value at `key`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store fails.
    fn exists(&self, key: &StoreKey) -> Result<bool, StorageError> {
        self.size_key(key).map(|size| size.is_some())
    }
}

/// A store whose keys can be enumerated.
pub trait ListableStorageTraits: Send + Sync {
    /// Every key in the store.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store fails.
    fn list(&self) -> Result<StoreKeys, StorageError> {
        self.list_prefix(&StorePrefix::root())
    }

    /// Every key beneath `prefix`, at any depth.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store fails.
    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError>;

    /// The keys and prefixes one level beneath `prefix`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store fails.
    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError>;
}

/// A store that values can be written to and erased from.
pub trait WritableStorageTraits: Send + Sync {
    /// Write `value` at `key`, replacing any existing value.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store is read only or fails.
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError>;

    /// Erase the value at `key`. Erasing a key that does not exist succeeds.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store is read only or fails.
    fn erase(&self, key: &StoreKey) -> Result<(), StorageError>;

    /// Erase every value beneath `prefix`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store is read only or fails.
    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError>;
}

/// A readable and writable store.
pub trait ReadableWritableStorageTraits: ReadableStorageTraits + WritableStorageTraits {}

impl<T: ReadableStorageTraits + WritableStorageTraits> ReadableWritableStorageTraits for T {}

/// A readable and listable store.
pub trait ReadableListableStorageTraits: ReadableStorageTraits + ListableStorageTraits {}

impl<T: ReadableStorageTraits + ListableStorageTraits> ReadableListableStorageTraits for T {}

/// A readable, writable and listable store.
pub trait ReadableWritableListableStorageTraits:
    ReadableWritableStorageTraits + ListableStorageTraits
{
}

impl<T: ReadableWritableStorageTraits + ListableStorageTraits> ReadableWritableListableStorageTraits
    for T
{
}
