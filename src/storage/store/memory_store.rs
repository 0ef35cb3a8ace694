//! An in-memory store.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;

use crate::{
    byte_range::{validate_byte_ranges, ByteRange},
    storage::{
        Bytes, ListableStorageTraits, MaybeBytes, ReadableStorageTraits, StorageError, StoreKey,
        StoreKeys, StoreKeysPrefixes, StorePrefix, WritableStorageTraits,
    },
};

/// An in-memory store.
///
/// Values are held in an ordered map from [`StoreKey`] to bytes, so listings are sorted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data_map: RwLock<BTreeMap<StoreKey, Bytes>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadableStorageTraits for MemoryStore {
    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        Ok(self.data_map.read().get(key).cloned())
    }

    fn get_partial_values_key(
        &self,
        key: &StoreKey,
        byte_ranges: &[ByteRange],
    ) -> Result<Option<Vec<Bytes>>, StorageError> {
        let Some(data) = self.get(key)? else {
            return Ok(None);
        };
        let size = data.len() as u64;
        validate_byte_ranges(byte_ranges, size)?;
        Ok(Some(
            byte_ranges
                .iter()
                .map(|byte_range| data.slice(byte_range.to_range_usize(size)))
                .collect(),
        ))
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        Ok(self
            .data_map
            .read()
            .get(key)
            .map(|value| value.len() as u64))
    }
}

impl WritableStorageTraits for MemoryStore {
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        self.data_map.write().insert(key.clone(), value);
        Ok(())
    }

    fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        self.data_map.write().remove(key);
        Ok(())
    }

    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        self.data_map.write().retain(|key, _| !key.has_prefix(prefix));
        Ok(())
    }
}

impl ListableStorageTraits for MemoryStore {
    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        Ok(self
            .data_map
            .read()
            .keys()
            .filter(|key| key.has_prefix(prefix))
            .cloned()
            .collect())
    }

    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        let mut keys: StoreKeys = vec![];
        let mut prefixes: BTreeSet<StorePrefix> = BTreeSet::default();
        let data_map = self.data_map.read();
        for (key, relative) in data_map
            .keys()
            .filter_map(|key| Some((key, key.relative_to(prefix)?)))
        {
            match relative.split_once('/') {
                Some((child, _)) => {
                    prefixes.insert(prefix.child(child)?);
                }
                None => keys.push(key.clone()),
            }
        }
        Ok(StoreKeysPrefixes::new(keys, prefixes.into_iter().collect()))
    }
}
