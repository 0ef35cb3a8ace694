//! Zarr nodes.
//!
//! A node in a Zarr hierarchy represents either an [`Array`](crate::array::Array) or a [`Group`](crate::group::Group).
//!
//! A [`Node`] has an associated [`NodePath`], [`NodeMetadata`], and children.
//! [`Node::open`] reads a node and its descendants from a store, detecting whether it is a Zarr V3 (`zarr.json`) or Zarr V2 (`.zarray`/`.zgroup`) node.
//!
//! The [`Node::hierarchy_tree`] function can be used to create a string representation of the hierarchy below a node.

mod node_metadata;
mod node_path;

pub use node_metadata::NodeMetadata;
pub use node_path::{NodePath, NodePathError};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    metadata::{ArrayMetadata, ArrayMetadataV2, ArrayMetadataV3, GroupMetadataV2, GroupMetadataV3},
    storage::{
        discover_children, meta_key, meta_key_v2_array, meta_key_v2_attributes, meta_key_v2_group,
        ListableStorageTraits, ReadableStorageTraits, StorageError, StoreKey,
    },
};

/// A Zarr hierarchy node.
///
/// See <https://zarr-specs.readthedocs.io/en/latest/v3/core/v3.0.html#hierarchy>.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node path.
    path: NodePath,
    /// Node metadata.
    metadata: NodeMetadata,
    /// Node children.
    ///
    /// Only group nodes can have children.
    children: Vec<Node>,
}

/// A node creation error.
#[derive(Debug, Error)]
pub enum NodeCreateError {
    /// An invalid node path
    #[error(transparent)]
    NodePathError(#[from] NodePathError),
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// There is no Zarr V3 or Zarr V2 metadata document at the node path.
    #[error("no node metadata found at {_0}")]
    MissingMetadata(NodePath),
    /// A metadata document could not be deserialized.
    #[error("invalid node metadata at {_0}: {_1}")]
    MetadataDeserializationError(StoreKey, String),
}

impl Node {
    /// Create a new node at `path` with `metadata` and `children`.
    #[must_use]
    pub fn new_with_metadata(path: NodePath, metadata: NodeMetadata, children: Vec<Self>) -> Self {
        Self {
            path,
            metadata,
            children,
        }
    }

    /// Open the node at `path` and read its metadata and descendants from `storage`.
    ///
    /// # Errors
    /// Returns [`NodeCreateError`] if there is no node at `path`, any metadata is invalid, or there is a failure to list child nodes.
    pub fn open<TStorage: ?Sized + ReadableStorageTraits + ListableStorageTraits>(
        storage: &TStorage,
        path: &str,
    ) -> Result<Self, NodeCreateError> {
        let path = NodePath::new(path)?;
        let metadata = retrieve_node_metadata(storage, &path)?;
        let children = match metadata {
            NodeMetadata::Array(_) => Vec::default(),
            NodeMetadata::Group(_) => retrieve_child_nodes(storage, &path)?,
        };
        Ok(Self::new_with_metadata(path, metadata, children))
    }

    /// Returns the path of the node.
    #[must_use]
    pub const fn path(&self) -> &NodePath {
        &self.path
    }

    /// Returns the metadata of the node.
    #[must_use]
    pub const fn metadata(&self) -> &NodeMetadata {
        &self.metadata
    }

    /// Returns the children of the node.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Indicates if a node is the root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_root()
    }

    /// Returns the name of the node.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// Return a tree representation of a hierarchy as a string.
    ///
    /// Arrays are annotated with their shape and data type.
    /// For example:
    /// ```text
    /// /
    ///   a
    ///     baz [10000, 1000] float64
    ///     foo [10000, 1000] float64
    ///   b
    /// ```
    #[must_use]
    pub fn hierarchy_tree(&self) -> String {
        fn print_metadata(name: &str, string: &mut String, metadata: &NodeMetadata) {
            match metadata {
                NodeMetadata::Array(ArrayMetadata::V3(array_metadata)) => {
                    string.push_str(&format!(
                        "{} {:?} {}",
                        name,
                        array_metadata.shape,
                        array_metadata.data_type.name()
                    ));
                }
                NodeMetadata::Array(ArrayMetadata::V2(array_metadata)) => {
                    string.push_str(&format!(
                        "{} {:?} {}",
                        name, array_metadata.shape, array_metadata.dtype
                    ));
                }
                NodeMetadata::Group(_) => {
                    string.push_str(name);
                }
            };
            string.push('\n');
        }

        fn update_tree(string: &mut String, children: &[Node], depth: usize) {
            for child in children {
                string.push_str(&" ".repeat(depth * 2));
                print_metadata(child.name(), string, &child.metadata);
                update_tree(string, &child.children, depth + 1);
            }
        }

        let mut string = String::default();
        let name = if self.is_root() { "/" } else { self.name() };
        print_metadata(name, &mut string, &self.metadata);
        update_tree(&mut string, &self.children, 1);
        string
    }
}

fn parse_metadata<T: DeserializeOwned>(key: &StoreKey, bytes: &[u8]) -> Result<T, NodeCreateError> {
    serde_json::from_slice(bytes)
        .map_err(|err| NodeCreateError::MetadataDeserializationError(key.clone(), err.to_string()))
}

fn retrieve_attributes_v2<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<serde_json::Map<String, serde_json::Value>, NodeCreateError> {
    let key = meta_key_v2_attributes(path);
    match storage.get(&key)? {
        Some(attributes) => parse_metadata(&key, &attributes),
        None => Ok(serde_json::Map::default()),
    }
}

/// Retrieve the metadata of the node at `path`.
///
/// A Zarr V3 `zarr.json` document takes precedence.
/// Otherwise, a Zarr V2 `.zarray` or `.zgroup` document is read along with the attributes in `.zattrs`.
///
/// # Errors
/// Returns [`NodeCreateError::MissingMetadata`] if there is no metadata document at `path`,
/// or [`NodeCreateError::MetadataDeserializationError`] if a document is malformed or has an unknown `zarr_format` or `node_type`.
pub fn retrieve_node_metadata<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<NodeMetadata, NodeCreateError> {
    #[derive(serde::Deserialize)]
    struct NodeTypeV3 {
        zarr_format: u64,
        node_type: String,
    }

    // Zarr V3
    let key = meta_key(path);
    if let Some(metadata) = storage.get(&key)? {
        let node_type: NodeTypeV3 = parse_metadata(&key, &metadata)?;
        log::debug!(
            "opening zarr v{} {} at {path}",
            node_type.zarr_format,
            node_type.node_type
        );
        return match (node_type.zarr_format, node_type.node_type.as_str()) {
            (3, "array") => Ok(NodeMetadata::Array(
                parse_metadata::<ArrayMetadataV3>(&key, &metadata)?.into(),
            )),
            (3, "group") => Ok(NodeMetadata::Group(
                parse_metadata::<GroupMetadataV3>(&key, &metadata)?.into(),
            )),
            (zarr_format, node_type) => Err(NodeCreateError::MetadataDeserializationError(
                key,
                format!("unsupported zarr_format {zarr_format} with node_type {node_type}"),
            )),
        };
    }

    // Zarr V2
    let key = meta_key_v2_array(path);
    if let Some(metadata) = storage.get(&key)? {
        log::debug!("opening zarr v2 array at {path}");
        let mut metadata: ArrayMetadataV2 = parse_metadata(&key, &metadata)?;
        metadata.attributes = retrieve_attributes_v2(storage, path)?;
        return Ok(NodeMetadata::Array(metadata.into()));
    }
    let key = meta_key_v2_group(path);
    if let Some(metadata) = storage.get(&key)? {
        log::debug!("opening zarr v2 group at {path}");
        let mut metadata: GroupMetadataV2 = parse_metadata(&key, &metadata)?;
        metadata.attributes = retrieve_attributes_v2(storage, path)?;
        return Ok(NodeMetadata::Group(metadata.into()));
    }

    Err(NodeCreateError::MissingMetadata(path.clone()))
}

/// Retrieve the child nodes (and their descendants) of the node at `path`.
///
/// Child prefixes without a metadata document are skipped.
///
/// # Errors
/// Returns [`NodeCreateError`] if there is a failure to list child nodes or any child metadata is invalid.
pub fn retrieve_child_nodes<TStorage: ?Sized + ReadableStorageTraits + ListableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<Vec<Node>, NodeCreateError> {
    let mut nodes = Vec::new();
    for prefix in discover_children(storage, path)? {
        let child_path = NodePath::try_from(&prefix)?;
        let child_metadata = match retrieve_node_metadata(storage, &child_path) {
            Ok(metadata) => metadata,
            Err(NodeCreateError::MissingMetadata(_)) => {
                log::trace!("skipping {prefix}, it has no node metadata");
                continue;
            }
            Err(err) => return Err(err),
        };
        let children = match child_metadata {
            NodeMetadata::Array(_) => Vec::default(),
            NodeMetadata::Group(_) => retrieve_child_nodes(storage, &child_path)?,
        };
        nodes.push(Node::new_with_metadata(child_path, child_metadata, children));
    }
    Ok(nodes)
}
