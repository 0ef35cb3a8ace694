use std::sync::Arc;

use super::{Group, GroupCreateError, GroupMetadata, GroupMetadataV2, GroupMetadataV3};

/// A [`Group`] builder.
///
/// A Zarr V3 group is built by default, use [`zarr_v2`](GroupBuilder::zarr_v2) to build a Zarr V2 group.
#[derive(Debug, Clone, Default)]
pub struct GroupBuilder {
    attributes: serde_json::Map<String, serde_json::Value>,
    zarr_v2: bool,
}

impl GroupBuilder {
    /// Create a new group builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attributes.
    #[must_use]
    pub fn attributes(mut self, attributes: serde_json::Map<String, serde_json::Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Build a Zarr V2 group (`.zgroup` and `.zattrs`) instead of a Zarr V3 group.
    #[must_use]
    pub fn zarr_v2(mut self) -> Self {
        self.zarr_v2 = true;
        self
    }

    /// Build the group metadata.
    #[must_use]
    pub fn build_metadata(&self) -> GroupMetadata {
        if self.zarr_v2 {
            GroupMetadataV2::new(self.attributes.clone()).into()
        } else {
            GroupMetadataV3::new(self.attributes.clone()).into()
        }
    }

    /// Build into a [`Group`].
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if `path` is not a valid node path.
    pub fn build<TStorage: ?Sized>(
        &self,
        storage: Arc<TStorage>,
        path: &str,
    ) -> Result<Group<TStorage>, GroupCreateError> {
        Group::new_with_metadata(storage, path, self.build_metadata())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_builder() {
        let mut attributes = serde_json::Map::new();
        attributes.insert("a".to_string(), 1.into());
        let builder = GroupBuilder::new().attributes(attributes);
        assert_eq!(builder.build_metadata().zarr_format(), 3);
        let metadata = builder.zarr_v2().build_metadata();
        assert_eq!(metadata.zarr_format(), 2);
        assert_eq!(metadata.attributes()["a"], 1);
    }
}
