//! Zarr groups.
//!
//! A Zarr group is a node in a Zarr hierarchy.
//! It can have associated metadata and may have child nodes (groups or [`arrays`](crate::array)).
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/core/v3.0.html#group>.
//!
//! Use [`GroupBuilder`] to setup a new group, or use [`Group::new`] to open an existing Zarr V3 or Zarr V2 group.
//!
//! A Zarr V3 group stores its metadata in an accompanying `zarr.json` file. For example:
//! ```json
//! {
//!     "zarr_format": 3,
//!     "node_type": "group",
//!     "attributes": {
//!         "spam": "ham",
//!         "eggs": 42,
//!     }
//! }
//! ```
//! A Zarr V2 group stores its metadata in `.zgroup`, and its attributes in `.zattrs`.

mod group_builder;

use std::sync::Arc;

use derive_more::Display;
use thiserror::Error;

use crate::{
    array::{Array, ArrayBuilder, ArrayCreateError},
    node::{
        retrieve_child_nodes, retrieve_node_metadata, Node, NodeCreateError, NodeMetadata,
        NodePath, NodePathError,
    },
    storage::{
        ListableStorageTraits, ReadableStorageTraits, StorageError, StoreKey,
        WritableStorageTraits,
    },
};

pub use self::group_builder::GroupBuilder;
pub use crate::metadata::{GroupMetadata, GroupMetadataV2, GroupMetadataV3};

/// A group.
#[derive(Debug, Display)]
#[display("path {path} metadata {metadata}")]
pub struct Group<TStorage: ?Sized> {
    /// The storage.
    storage: Arc<TStorage>,
    /// The path of the group in the store.
    path: NodePath,
    /// The metadata, in the Zarr format the group was created or opened with.
    metadata: GroupMetadata,
}

/// A group creation error.
#[derive(Debug, Error)]
pub enum GroupCreateError {
    /// An invalid node path.
    #[error(transparent)]
    NodePathError(#[from] NodePathError),
    /// Storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// There is no group metadata at the node path.
    #[error("group metadata is missing at {_0}")]
    MissingMetadata(NodePath),
    /// The group metadata document could not be deserialized.
    #[error("invalid group metadata at {_0}: {_1}")]
    MetadataDeserializationError(StoreKey, String),
}

impl From<NodeCreateError> for GroupCreateError {
    fn from(err: NodeCreateError) -> Self {
        match err {
            NodeCreateError::NodePathError(err) => Self::NodePathError(err),
            NodeCreateError::StorageError(err) => Self::StorageError(err),
            NodeCreateError::MissingMetadata(path) => Self::MissingMetadata(path),
            NodeCreateError::MetadataDeserializationError(key, err) => {
                Self::MetadataDeserializationError(key, err)
            }
        }
    }
}

impl<TStorage: ?Sized> Group<TStorage> {
    /// Create a group in `storage` at `path` with `metadata`.
    /// This does **not** write to the store, use [`store_metadata`](Group<WritableStorageTraits>::store_metadata) to write `metadata` to `storage`.
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if `path` is not a valid node path.
    pub fn new_with_metadata(
        storage: Arc<TStorage>,
        path: &str,
        metadata: GroupMetadata,
    ) -> Result<Self, GroupCreateError> {
        let path = NodePath::new(path)?;
        Ok(Self {
            storage,
            path,
            metadata,
        })
    }

    /// Get the underlying storage backing the group.
    #[must_use]
    pub fn storage(&self) -> Arc<TStorage> {
        self.storage.clone()
    }

    /// Get path.
    #[must_use]
    pub const fn path(&self) -> &NodePath {
        &self.path
    }

    /// Get attributes.
    #[must_use]
    pub fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        self.metadata.attributes()
    }

    /// Get metadata.
    #[must_use]
    pub const fn metadata(&self) -> &GroupMetadata {
        &self.metadata
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits> Group<TStorage> {
    /// Open an existing group in `storage` at `path`. The metadata is read from the store.
    ///
    /// Zarr V3 metadata (`zarr.json`) takes precedence over Zarr V2 metadata (`.zgroup` and `.zattrs`).
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if there is a storage error, there is no group at `path`, or any metadata is invalid.
    pub fn new(storage: Arc<TStorage>, path: &str) -> Result<Self, GroupCreateError> {
        let node_path = NodePath::new(path)?;
        match retrieve_node_metadata(&*storage, &node_path)? {
            NodeMetadata::Group(metadata) => Self::new_with_metadata(storage, path, metadata),
            NodeMetadata::Array(_) => Err(GroupCreateError::MissingMetadata(node_path)),
        }
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits + ListableStorageTraits> Group<TStorage> {
    /// Return the children of the group.
    ///
    /// Child groups include their own descendants.
    ///
    /// # Errors
    /// Returns [`NodeCreateError`] if there is a failure to list child nodes or any child metadata is invalid.
    pub fn children(&self) -> Result<Vec<Node>, NodeCreateError> {
        retrieve_child_nodes(&*self.storage, &self.path)
    }
}

impl<TStorage: ?Sized + WritableStorageTraits + 'static> Group<TStorage> {
    /// Store metadata.
    ///
    /// # Errors
    /// Returns [`StorageError`] if there is an underlying store error.
    pub fn store_metadata(&self) -> Result<(), StorageError> {
        crate::storage::store_group_metadata(&*self.storage, self.path(), self.metadata())
    }

    /// Create the child group `name` with `metadata` and store its metadata.
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if `name` is not a valid node name or there is an underlying store error.
    pub fn create_group(
        &self,
        name: &str,
        metadata: GroupMetadata,
    ) -> Result<Self, GroupCreateError> {
        let path = self.path.child(name)?;
        log::debug!("creating group {path}");
        let group = Self::new_with_metadata(self.storage.clone(), path.as_str(), metadata)?;
        group.store_metadata()?;
        Ok(group)
    }

    /// Create the child array `name` from `builder` and store its metadata.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if `name` is not a valid node name, the builder parameters are invalid, or there is an underlying store error.
    pub fn create_array(
        &self,
        name: &str,
        builder: &ArrayBuilder,
    ) -> Result<Array<TStorage>, ArrayCreateError> {
        let path = self.path.child(name)?;
        log::debug!("creating array {path}");
        let array = builder.build(self.storage.clone(), path.as_str())?;
        array.store_metadata()?;
        Ok(array)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        array::{DataType, FillValue},
        storage::store::MemoryStore,
    };

    use super::*;

    const JSON_VALID: &str = r#"{
    "zarr_format": 3,
    "node_type": "group",
    "attributes": {
        "spam": "ham",
        "eggs": 42
    }
}"#;

    const JSON_INVALID_FORMAT: &str = r#"{
    "zarr_format": 4,
    "node_type": "group"
}"#;

    #[test]
    fn group_metadata() {
        let group_metadata: GroupMetadata = serde_json::from_str(JSON_VALID).unwrap();
        let store = Arc::new(MemoryStore::default());
        let group = Group::new_with_metadata(store, "/", group_metadata).unwrap();
        assert_eq!(group.attributes()["eggs"], 42);
        assert_eq!(group.metadata().zarr_format(), 3);
        assert!(serde_json::from_str::<GroupMetadata>(JSON_INVALID_FORMAT).is_err());
    }

    #[test]
    fn group_write_read() {
        let store = Arc::new(MemoryStore::new());
        let group = GroupBuilder::new().build(store.clone(), "/group").unwrap();
        group.store_metadata().unwrap();
        let opened = Group::new(store.clone(), "/group").unwrap();
        assert_eq!(opened.metadata(), group.metadata());

        assert!(matches!(
            Group::new(store.clone(), "/missing"),
            Err(GroupCreateError::MissingMetadata(_))
        ));
        assert!(matches!(
            Group::new(store, "group"),
            Err(GroupCreateError::NodePathError(_))
        ));
    }

    #[test]
    fn group_v2_write_read() {
        let store = Arc::new(MemoryStore::new());
        let mut attributes = serde_json::Map::new();
        attributes.insert("key".to_string(), "value".into());
        let group =
            Group::new_with_metadata(store.clone(), "/v2", GroupMetadataV2::new(attributes).into())
                .unwrap();
        group.store_metadata().unwrap();
        assert!(store.get(&StoreKey::new("v2/.zgroup").unwrap()).unwrap().is_some());
        assert!(store.get(&StoreKey::new("v2/.zattrs").unwrap()).unwrap().is_some());

        let opened = Group::new(store, "/v2").unwrap();
        assert_eq!(opened.metadata().zarr_format(), 2);
        assert_eq!(opened.attributes()["key"], "value");
    }

    #[test]
    fn group_create_children() {
        let store = Arc::new(MemoryStore::new());
        let root = GroupBuilder::new().build(store.clone(), "/").unwrap();
        root.store_metadata().unwrap();

        let mut attributes = serde_json::Map::new();
        attributes.insert("hello".to_string(), "world".into());
        let group = root
            .create_group("test2", GroupMetadataV3::new(attributes).into())
            .unwrap();
        assert_eq!(group.path().as_str(), "/test2");

        let array = group
            .create_array(
                "array",
                &ArrayBuilder::new(
                    vec![10, 10],
                    DataType::UInt8,
                    vec![5, 5].try_into().unwrap(),
                    FillValue::from(0u8),
                ),
            )
            .unwrap();
        assert_eq!(array.path().as_str(), "/test2/array");

        let children = root.children().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name(), "test2");
        assert_eq!(children[0].metadata().attributes()["hello"], "world");
        assert_eq!(children[0].children().len(), 1);
        assert!(matches!(
            children[0].children()[0].metadata(),
            NodeMetadata::Array(_)
        ));

        assert!(matches!(
            root.create_group("a/b", GroupMetadata::default()),
            Err(GroupCreateError::NodePathError(_))
        ));
    }
}
