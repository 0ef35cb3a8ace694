//! A chunked N-dimensional array engine for the [Zarr](https://zarr.dev) V3 and V2 storage formats.
//!
//! A Zarr hierarchy is a tree of groups and arrays held in a key-value [store](storage).
//! Arrays are split into chunks by a [chunk grid](array::chunk_grid), each chunk is encoded by a [codec chain](array::CodecChain) and stored under a key derived by a [chunk key encoding](array::chunk_key_encoding).
//! This crate turns reads and writes of array regions into the minimal set of chunk (or byte range) operations against a store.
//!
//! ## Getting Started
//! - [`array::Array`] details how to read and write array data.
//! - [`array::ArrayBuilder`] creates new arrays, and [`group::Group`] creates and opens groups.
//! - [`node::Node`] opens a hierarchy and lists its children.
//! - [`storage`] documents the store interface and the memory, filesystem, and HTTP stores.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use zarrs_engine::array::{ArrayBuilder, DataType, FillValue};
//! use zarrs_engine::group::GroupBuilder;
//! use zarrs_engine::storage::store::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::new());
//! let group = GroupBuilder::new().build(store.clone(), "/")?;
//! group.store_metadata()?;
//!
//! let array = group.create_array(
//!     "array",
//!     &ArrayBuilder::new(
//!         vec![8, 8],
//!         DataType::Float32,
//!         vec![4, 4].try_into()?,
//!         FillValue::from(0.0f32),
//!     ),
//! )?;
//! array.write_elements::<f32>(Some(&[2, 2]), &[2, 2], vec![1.0, 2.0, 3.0, 4.0])?;
//! let elements = array.read_elements::<f32>(Some(&[2, 2]), Some(&[2, 2]))?;
//! assert_eq!(elements, vec![1.0, 2.0, 3.0, 4.0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Supported Extension Points
//! - Data types: `bool`, `int8`-`int64`, `uint8`-`uint64`, `float32`, `float64`.
//! - Chunk grids: `regular`.
//! - Chunk key encodings: `default`, `v2`.
//! - Codecs: `transpose`, `bytes`, `sharding_indexed`, `blosc`, `gzip`, `zstd`, `crc32c`.
//!
//! Zarr V2 arrays with no compressor or a `gzip`, `blosc`, or `zstd` compressor and no filters are opened by converting their metadata to the Zarr V3 array model.
//!
//! ## Crate Features
//! #### Default
//!  - `ndarray`: [`ndarray`] utility functions for [`Array`](crate::array::Array).
//!  - Codecs: `blosc`, `crc32c`, `gzip`, `sharding`, `transpose`, `zstd`.
//!
//! #### Non-Default
//!  - `http`: a read-only synchronous HTTP store.
//!
//! ## Logging
//! The crate logs through the [`log`] facade at metadata, chunk, and store boundaries.
//! Install a logger (e.g. `env_logger`) to see them.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod array;
pub mod array_subset;
pub mod byte_range;
pub mod config;
pub mod group;
pub mod metadata;
pub mod node;
pub mod plugin;
pub mod storage;
