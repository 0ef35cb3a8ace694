//! Zarr V2 metadata.
//!
//! Zarr V2 arrays are stored as a `.zarray` document and Zarr V2 groups as a `.zgroup` document.
//! User attributes of both are stored in a separate `.zattrs` document.

mod array;
mod group;

pub use array::{
    data_type_metadata_v2_to_endianness, ArrayMetadataV2, ArrayMetadataV2Order,
    DataTypeMetadataV2InvalidEndiannessError, FillValueMetadataV2, MetadataV2,
};
pub use group::GroupMetadataV2;
