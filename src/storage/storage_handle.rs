use std::sync::Arc;

use crate::byte_range::ByteRange;

use super::{
    Bytes, ListableStorageTraits, MaybeBytes, ReadableStorageTraits, StorageError, StoreKey,
    StoreKeyError, StoreKeys, StoreKeysPrefixes, StorePrefix, WritableStorageTraits,
};

/// A storage handle.
///
/// A handle to (possibly unsized) storage which can be owned and cloned, optionally scoped to a key prefix.
/// A handle implements the same storage traits as the storage it references, with the prefix applied to every key.
///
/// Handles are created with [`StorageHandle::new`] and refined with [`StorageHandle::resolve`], which is pure path composition without any I/O.
#[derive(Debug)]
pub struct StorageHandle<TStorage: ?Sized> {
    storage: Arc<TStorage>,
    prefix: String,
}

impl<TStorage: ?Sized> Clone for StorageHandle<TStorage> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            prefix: self.prefix.clone(),
        }
    }
}

fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| segment.as_ref().trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

impl<TStorage: ?Sized> StorageHandle<TStorage> {
    /// Create a new storage handle at the root of `storage`.
    pub const fn new(storage: Arc<TStorage>) -> Self {
        Self {
            storage,
            prefix: String::new(),
        }
    }

    /// Create a new storage handle with the key prefix `prefix`.
    ///
    /// Leading and trailing `/` of the prefix are ignored.
    pub fn with_prefix(storage: Arc<TStorage>, prefix: &str) -> Self {
        Self {
            storage,
            prefix: join_segments(&[prefix]),
        }
    }

    /// Return a new handle with `segments` appended to the prefix of this handle.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> Self {
        Self {
            storage: self.storage.clone(),
            prefix: self.key_path(segments),
        }
    }

    /// Returns the key prefix of this handle, without a trailing `/`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the underlying storage.
    #[must_use]
    pub fn storage(&self) -> &Arc<TStorage> {
        &self.storage
    }

    /// Resolve `segments` against this handle to a key path in the underlying storage.
    ///
    /// This is `prefix + "/" + segments.join("/")` if the handle has a prefix, otherwise `segments.join("/")`.
    /// With no segments, this is the prefix itself.
    #[must_use]
    pub fn key_path<S: AsRef<str>>(&self, segments: &[S]) -> String {
        let path = join_segments(segments);
        if self.prefix.is_empty() {
            path
        } else if path.is_empty() {
            self.prefix.clone()
        } else {
            format!("{}/{path}", self.prefix)
        }
    }

    /// Resolve `segments` against this handle to a [`StoreKey`] in the underlying storage.
    ///
    /// # Errors
    /// Returns a [`StoreKeyError`] if the resolved key path is empty.
    pub fn resolve_key<S: AsRef<str>>(&self, segments: &[S]) -> Result<StoreKey, StoreKeyError> {
        StoreKey::new(self.key_path(segments))
    }

    fn storage_key(&self, key: &StoreKey) -> StoreKey {
        if self.prefix.is_empty() {
            key.clone()
        } else {
            StoreKey::new_unchecked(format!("{}/{}", self.prefix, key.as_str()))
        }
    }

    fn storage_prefix(&self, prefix: &StorePrefix) -> StorePrefix {
        if self.prefix.is_empty() {
            prefix.clone()
        } else {
            StorePrefix::new_unchecked(format!("{}/{}", self.prefix, prefix.as_str()))
        }
    }

    fn strip_len(&self) -> usize {
        if self.prefix.is_empty() {
            0
        } else {
            self.prefix.len() + 1
        }
    }

    fn handle_key(&self, key: &StoreKey) -> StoreKey {
        StoreKey::new_unchecked(&key.as_str()[self.strip_len()..])
    }

    fn handle_prefix(&self, prefix: &StorePrefix) -> StorePrefix {
        StorePrefix::new_unchecked(&prefix.as_str()[self.strip_len()..])
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits> ReadableStorageTraits for StorageHandle<TStorage> {
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        self.storage.get(&self.storage_key(key))
    }

    fn get_partial_values_key(
        &self,
        key: &StoreKey,
        byte_ranges: &[ByteRange],
    ) -> Result<Option<Vec<Bytes>>, StorageError> {
        self.storage
            .get_partial_values_key(&self.storage_key(key), byte_ranges)
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        self.storage.size_key(&self.storage_key(key))
    }
}

impl<TStorage: ?Sized + ListableStorageTraits> ListableStorageTraits for StorageHandle<TStorage> {
    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        Ok(self
            .storage
            .list_prefix(&self.storage_prefix(prefix))?
            .iter()
            .map(|key| self.handle_key(key))
            .collect())
    }

    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        let keys_prefixes = self.storage.list_dir(&self.storage_prefix(prefix))?;
        Ok(StoreKeysPrefixes::new(
            keys_prefixes
                .keys()
                .iter()
                .map(|key| self.handle_key(key))
                .collect(),
            keys_prefixes
                .prefixes()
                .iter()
                .map(|prefix| self.handle_prefix(prefix))
                .collect(),
        ))
    }
}

impl<TStorage: ?Sized + WritableStorageTraits> WritableStorageTraits for StorageHandle<TStorage> {
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        self.storage.set(&self.storage_key(key), value)
    }

    fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        self.storage.erase(&self.storage_key(key))
    }

    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        self.storage.erase_prefix(&self.storage_prefix(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::store::MemoryStore;

    #[test]
    fn storage_handle_key_path() {
        let store = Arc::new(MemoryStore::new());
        let handle = StorageHandle::new(store.clone());
        assert_eq!(handle.key_path(&["a", "b"]), "a/b");
        assert_eq!(handle.key_path::<&str>(&[]), "");
        assert!(handle.resolve_key::<&str>(&[]).is_err());

        let handle = StorageHandle::with_prefix(store.clone(), "data/");
        assert_eq!(handle.key_path(&["a", "b"]), "data/a/b");
        assert_eq!(handle.key_path::<&str>(&[]), "data");

        let handle = handle.resolve(&["l4_sample", "color", "1"]);
        assert_eq!(handle.prefix(), "data/l4_sample/color/1");
        assert_eq!(
            handle.resolve_key(&["zarr.json"]).unwrap().as_str(),
            "data/l4_sample/color/1/zarr.json"
        );
    }

    #[test]
    fn storage_handle_prefixed_operations() {
        let store = Arc::new(MemoryStore::new());
        let handle = StorageHandle::new(store.clone()).resolve(&["root"]);
        let key = StoreKey::new("a/b").unwrap();
        handle.set(&key, Bytes::from_static(&[1, 2, 3])).unwrap();
        assert_eq!(
            store.get(&StoreKey::new("root/a/b").unwrap()).unwrap(),
            Some(Bytes::from_static(&[1, 2, 3]))
        );
        assert_eq!(handle.size_key(&key).unwrap(), Some(3));
        assert_eq!(handle.list().unwrap(), vec![key.clone()]);
        let keys_prefixes = handle.list_dir(&StorePrefix::root()).unwrap();
        assert!(keys_prefixes.keys().is_empty());
        assert_eq!(
            keys_prefixes.prefixes(),
            &vec![StorePrefix::new("a/").unwrap()]
        );
        handle.erase_prefix(&StorePrefix::root()).unwrap();
        assert!(store.list().unwrap().is_empty());
    }
}
