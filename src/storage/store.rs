//! Zarr stores.
//!
//! Stores implement some combination of [`ReadableStorageTraits`](super::ReadableStorageTraits), [`WritableStorageTraits`](super::WritableStorageTraits), and [`ListableStorageTraits`](super::ListableStorageTraits).

mod filesystem_store;
#[cfg(feature = "http")]
mod http_store;
mod memory_store;

pub use filesystem_store::{FilesystemStore, FilesystemStoreCreateError};
#[cfg(feature = "http")]
pub use http_store::{HTTPStore, HTTPStoreCreateError};
pub use memory_store::MemoryStore;
