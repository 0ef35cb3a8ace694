use derive_more::Display;
use thiserror::Error;

use crate::storage::StorePrefix;

/// A Zarr hierarchy node path.
///
/// A node path always starts with `/`, a non-root path does not end with `/`, and it has no empty segments.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub struct NodePath(String);

/// An invalid node path.
#[derive(Debug, Error)]
#[error("invalid node path {0}")]
pub struct NodePathError(String);

impl NodePath {
    /// Create a new Zarr node path from `path`.
    ///
    /// # Errors
    /// Returns [`NodePathError`] if `path` is not valid according to [`NodePath::validate`()].
    pub fn new(path: &str) -> Result<Self, NodePathError> {
        if Self::validate(path) {
            Ok(Self(path.to_string()))
        } else {
            Err(NodePathError(path.to_string()))
        }
    }

    /// The root node.
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Extracts a string slice containing the node path `String`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Returns the name of the node, the last path segment. The root node has an empty name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit_once('/').map_or("", |(_, name)| name)
    }

    /// Returns the path of the child `name` of this node.
    ///
    /// # Errors
    /// Returns [`NodePathError`] if `name` is empty or contains `/`.
    pub fn child(&self, name: &str) -> Result<Self, NodePathError> {
        if name.is_empty() || name.contains('/') {
            return Err(NodePathError(name.to_string()));
        }
        if self.is_root() {
            Self::new(&format!("/{name}"))
        } else {
            Self::new(&format!("{}/{name}", self.0))
        }
    }

    /// Validates a path according to the following rules:
    /// - A path always starts with `/`, and
    /// - a non-root path cannot end with `/`, because node names must be non-empty and cannot contain `/`.
    ///
    /// Additionally, it checks that there are no empty nodes (i.e. a `//` substring).
    #[must_use]
    pub fn validate(path: &str) -> bool {
        path.eq("/") || (path.starts_with('/') && !path.ends_with('/') && !path.contains("//"))
    }
}

impl TryFrom<&str> for NodePath {
    type Error = NodePathError;

    fn try_from(path: &str) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl TryFrom<&StorePrefix> for NodePath {
    type Error = NodePathError;

    fn try_from(prefix: &StorePrefix) -> Result<Self, Self::Error> {
        let prefix = prefix.as_str();
        Self::new(&format!("/{}", prefix.strip_suffix('/').unwrap_or(prefix)))
    }
}
