use std::str::FromStr;

use derive_more::Display;
use thiserror::Error;

use crate::node::NodePath;

use super::{StoreKey, StoreKeyError};

/// A directory-like prefix of store keys, such as `group/array/`.
///
/// The root prefix is the empty string.
/// Any other prefix ends with `/` and does not start with `/`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub struct StorePrefix(String);

/// A string that is not a valid [`StorePrefix`].
#[derive(Debug, Error)]
#[error("invalid store prefix {0}")]
pub struct StorePrefixError(String);

/// A list of [`StorePrefix`].
pub type StorePrefixes = Vec<StorePrefix>;

impl StorePrefix {
    /// Create a store prefix.
    ///
    /// # Errors
    /// Returns [`StorePrefixError`] if `prefix` is neither empty nor a `/` terminated relative path.
    pub fn new(prefix: impl Into<String>) -> Result<Self, StorePrefixError> {
        let prefix = prefix.into();
        if Self::validate(&prefix) {
            Ok(Self(prefix))
        } else {
            Err(StorePrefixError(prefix))
        }
    }

    /// Create a store prefix from a string known to be valid.
    pub(crate) fn new_unchecked(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        debug_assert!(Self::validate(&prefix), "{prefix}");
        Self(prefix)
    }

    /// The root prefix, which every key is beneath.
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Returns true if `prefix` is a valid store prefix.
    #[must_use]
    pub fn validate(prefix: &str) -> bool {
        prefix.is_empty() || (prefix.ends_with('/') && !prefix.starts_with('/'))
    }

    /// The prefix as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the root prefix.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The last segment of the prefix without the trailing `/`. Empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0
            .strip_suffix('/')
            .and_then(|path| path.rsplit('/').next())
            .unwrap_or_default()
    }

    /// The enclosing prefix, or [`None`] for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let path = self.0.strip_suffix('/')?;
        Some(match path.rfind('/') {
            Some(index) => Self::new_unchecked(&path[..=index]),
            None => Self::root(),
        })
    }

    /// The key of `name` directly beneath this prefix.
    ///
    /// # Errors
    /// Returns [`StoreKeyError`] if the key would be invalid.
    pub fn key(&self, name: &str) -> Result<StoreKey, StoreKeyError> {
        StoreKey::new(format!("{}{name}", self.0))
    }

    /// The prefix of the child `name` directly beneath this prefix.
    ///
    /// # Errors
    /// Returns [`StorePrefixError`] if the prefix would be invalid.
    pub fn child(&self, name: &str) -> Result<Self, StorePrefixError> {
        Self::new(format!("{}{name}/", self.0))
    }
}

impl FromStr for StorePrefix {
    type Err = StorePrefixError;

    fn from_str(prefix: &str) -> Result<Self, Self::Err> {
        Self::new(prefix)
    }
}

impl TryFrom<&str> for StorePrefix {
    type Error = StorePrefixError;

    fn try_from(prefix: &str) -> Result<Self, StorePrefixError> {
        Self::new(prefix)
    }
}

impl From<&NodePath> for StorePrefix {
    /// The prefix of the keys of a node. The root node maps to the root prefix.
    fn from(path: &NodePath) -> Self {
        match path.as_str().trim_start_matches('/') {
            "" => Self::root(),
            path => Self::new_unchecked(format!("{path}/")),
        }
    }
}
