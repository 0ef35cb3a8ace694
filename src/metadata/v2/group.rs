use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Zarr V2 group metadata.
///
/// The attributes are not part of the `.zgroup` document, they are stored in `.zattrs`.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct GroupMetadataV2 {
    /// An integer defining the version of the storage specification to which the group adheres. Must be `2`.
    pub zarr_format: monostate::MustBe!(2u64),
    /// Optional user metadata, stored in `.zattrs`.
    #[serde(skip)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Default for GroupMetadataV2 {
    fn default() -> Self {
        Self::new(serde_json::Map::new())
    }
}

impl GroupMetadataV2 {
    /// Create Zarr V2 group metadata.
    #[must_use]
    pub fn new(attributes: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            zarr_format: monostate::MustBe!(2u64),
            attributes,
        }
    }
}
