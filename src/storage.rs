//! Stores and store keys.
//!
//! A store maps [`StoreKey`]s to byte values and knows nothing of Zarr.
//! Its capabilities are split across the [`ReadableStorageTraits`], [`WritableStorageTraits`] and [`ListableStorageTraits`] traits,
//! so that a read-only store such as the [`HTTPStore`](store::HTTPStore) only implements what it can support.
//!
//! Arrays and groups hold an [`Arc`] of a store.
//! A [`StorageHandle`] scopes a store to a key prefix, for example to open a hierarchy nested within a larger store.
//!
//! The mapping from node paths and chunk indices to keys lives in [`meta_key`] and [`data_key`].

mod node_store;
mod storage_handle;
mod storage_sync;
pub mod store;
mod store_key;
mod store_prefix;

use std::sync::Arc;

use thiserror::Error;

use crate::{byte_range::InvalidByteRangeError, node::NodePathError};

pub use node_store::{
    data_key, discover_children, meta_key, meta_key_v2_array, meta_key_v2_attributes,
    meta_key_v2_group, store_array_metadata, store_group_metadata,
};
pub use storage_handle::StorageHandle;
pub use storage_sync::{
    ListableStorageTraits, ReadableListableStorageTraits, ReadableStorageTraits,
    ReadableWritableListableStorageTraits, ReadableWritableStorageTraits, WritableStorageTraits,
};
pub use store_key::{StoreKey, StoreKeyError, StoreKeys};
pub use store_prefix::{StorePrefix, StorePrefixError, StorePrefixes};

/// Reference counted bytes, as stored and retrieved.
pub type Bytes = bytes::Bytes;

/// A retrieved value, [`None`] if the key does not exist.
pub type MaybeBytes = Option<Bytes>;

/// A shared readable store.
pub type ReadableStorage = Arc<dyn ReadableStorageTraits>;

/// A shared readable and writable store.
pub type ReadableWritableStorage = Arc<dyn ReadableWritableStorageTraits>;

/// A shared readable, writable and listable store.
pub type ReadableWritableListableStorage = Arc<dyn ReadableWritableListableStorageTraits>;

/// The keys and prefixes directly beneath a prefix, as returned by [`ListableStorageTraits::list_dir`].
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct StoreKeysPrefixes {
    keys: StoreKeys,
    prefixes: StorePrefixes,
}

impl StoreKeysPrefixes {
    /// Create from child `keys` and child `prefixes`.
    #[must_use]
    pub fn new(keys: StoreKeys, prefixes: StorePrefixes) -> Self {
        Self { keys, prefixes }
    }

    /// The child keys.
    #[must_use]
    pub const fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// The child prefixes.
    #[must_use]
    pub const fn prefixes(&self) -> &StorePrefixes {
        &self.prefixes
    }
}

/// A store error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store does not accept writes.
    #[error("a write operation was attempted on a read only store")]
    ReadOnly,
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// A metadata document could not be serialised or parsed.
    #[error("error parsing metadata for {0}: {1}")]
    InvalidMetadata(StoreKey, String),
    /// An invalid store prefix.
    #[error(transparent)]
    StorePrefixError(#[from] StorePrefixError),
    /// An invalid store key.
    #[error(transparent)]
    InvalidStoreKey(#[from] StoreKeyError),
    /// An invalid node path.
    #[error("invalid node path {0}")]
    NodePathError(#[from] NodePathError),
    /// A byte range is outside of a value.
    #[error(transparent)]
    InvalidByteRangeError(#[from] InvalidByteRangeError),
    /// The store does not support the operation.
    #[error("{0}")]
    Unsupported(String),
    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for StorageError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}
