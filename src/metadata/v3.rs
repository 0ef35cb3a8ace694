//! Zarr V3 metadata.

mod array;
pub mod fill_value;
mod group;

pub use array::ArrayMetadataV3;
pub use group::GroupMetadataV3;
