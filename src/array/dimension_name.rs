use serde::{Deserialize, Serialize};

/// A dimension name, which may be absent (serialised as `null`).
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[serde(transparent)]
pub struct DimensionName(Option<String>);

impl DimensionName {
    /// Create a new dimension with `name`. Use [`default`](DimensionName::default) to create a dimension with no name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Some(name.into()))
    }

    /// Get the dimension name as a [`&str`]. Returns [`None`] is the dimension has no name.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl From<&str> for DimensionName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<Option<&str>> for DimensionName {
    fn from(name: Option<&str>) -> Self {
        Self(name.map(str::to_string))
    }
}
