use derive_more::From;

use crate::metadata::{ArrayMetadata, GroupMetadata};

/// Node metadata ([`ArrayMetadata`] or [`GroupMetadata`]).
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, From)]
#[serde(untagged)]
pub enum NodeMetadata {
    /// Array metadata.
    Array(ArrayMetadata),

    /// Group metadata.
    Group(GroupMetadata),
}

impl NodeMetadata {
    /// Returns the user attributes of the node.
    #[must_use]
    pub fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        match self {
            Self::Array(metadata) => metadata.attributes(),
            Self::Group(metadata) => metadata.attributes(),
        }
    }

    /// Returns the Zarr format version (2 or 3) of the node.
    #[must_use]
    pub const fn zarr_format(&self) -> u64 {
        match self {
            Self::Array(metadata) => metadata.zarr_format(),
            Self::Group(metadata) => metadata.zarr_format(),
        }
    }
}
