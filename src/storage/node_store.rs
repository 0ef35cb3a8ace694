//! Keys of node metadata documents and chunks.

use crate::{
    array::{ArrayMetadata, ChunkKeyEncoding},
    group::GroupMetadata,
    node::NodePath,
};

use super::{
    ListableStorageTraits, StorageError, StoreKey, StorePrefix, StorePrefixes,
    WritableStorageTraits,
};

fn node_key(path: &NodePath, file_name: &str) -> StoreKey {
    StoreKey::new_unchecked(format!("{}{file_name}", StorePrefix::from(path).as_str()))
}

/// The key of the Zarr V3 metadata document (`zarr.json`) of the node at `path`.
#[must_use]
pub fn meta_key(path: &NodePath) -> StoreKey {
    node_key(path, "zarr.json")
}

/// The key of the Zarr V2 array metadata document (`.zarray`) of the node at `path`.
#[must_use]
pub fn meta_key_v2_array(path: &NodePath) -> StoreKey {
    node_key(path, ".zarray")
}

/// The key of the Zarr V2 group metadata document (`.zgroup`) of the node at `path`.
#[must_use]
pub fn meta_key_v2_group(path: &NodePath) -> StoreKey {
    node_key(path, ".zgroup")
}

/// The key of the Zarr V2 attributes document (`.zattrs`) of the node at `path`.
#[must_use]
pub fn meta_key_v2_attributes(path: &NodePath) -> StoreKey {
    node_key(path, ".zattrs")
}

/// The key of the chunk at `chunk_grid_indices` of the array at `path`.
#[must_use]
pub fn data_key(
    path: &NodePath,
    chunk_grid_indices: &[u64],
    chunk_key_encoding: &ChunkKeyEncoding,
) -> StoreKey {
    node_key(path, chunk_key_encoding.encode(chunk_grid_indices).as_str())
}

fn store_json<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    key: &StoreKey,
    value: &impl serde::Serialize,
) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))?;
    log::debug!("storing metadata {key}");
    storage.set(key, json.into())
}

fn store_v2_attributes<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    attributes: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), StorageError> {
    let key = meta_key_v2_attributes(path);
    if attributes.is_empty() {
        storage.erase(&key)
    } else {
        store_json(storage, &key, attributes)
    }
}

/// Write the metadata of the group at `path`.
///
/// Zarr V2 attributes are written to a separate `.zattrs` document, which is erased if there are none.
///
/// # Errors
/// Returns a [`StorageError`] if the store fails.
pub fn store_group_metadata<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    metadata: &GroupMetadata,
) -> Result<(), StorageError> {
    match metadata {
        GroupMetadata::V3(metadata) => store_json(storage, &meta_key(path), metadata),
        GroupMetadata::V2(metadata) => {
            store_v2_attributes(storage, path, &metadata.attributes)?;
            store_json(storage, &meta_key_v2_group(path), metadata)
        }
    }
}

/// Write the metadata of the array at `path`.
///
/// Zarr V2 attributes are written to a separate `.zattrs` document, which is erased if there are none.
///
/// # Errors
/// Returns a [`StorageError`] if the store fails.
pub fn store_array_metadata<TStorage: ?Sized + WritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    metadata: &ArrayMetadata,
) -> Result<(), StorageError> {
    match metadata {
        ArrayMetadata::V3(metadata) => store_json(storage, &meta_key(path), metadata),
        ArrayMetadata::V2(metadata) => {
            store_v2_attributes(storage, path, &metadata.attributes)?;
            store_json(storage, &meta_key_v2_array(path), metadata)
        }
    }
}

/// The prefixes of the candidate children of the node at `path`.
///
/// Names starting with `__` are reserved and skipped.
/// A candidate is only a child node if it holds a metadata document.
///
/// # Errors
/// Returns a [`StorageError`] if the store fails.
pub fn discover_children<TStorage: ?Sized + ListableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<StorePrefixes, StorageError> {
    let mut children = storage.list_dir(&StorePrefix::from(path))?.prefixes().clone();
    children.retain(|child| !child.name().starts_with("__"));
    Ok(children)
}
