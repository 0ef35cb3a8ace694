use std::str::FromStr;

use derive_more::Display;
use thiserror::Error;

use super::StorePrefix;

/// The key of a value in a store, such as `group/array/c/0/1`.
///
/// Keys are non-empty and have no leading or trailing `/`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub struct StoreKey(String);

/// A string that is not a valid [`StoreKey`].
#[derive(Debug, Error)]
#[error("invalid store key {0}")]
pub struct StoreKeyError(String);

/// A list of [`StoreKey`].
pub type StoreKeys = Vec<StoreKey>;

impl StoreKey {
    /// Create a store key.
    ///
    /// # Errors
    /// Returns [`StoreKeyError`] if `key` is empty or starts or ends with `/`.
    pub fn new(key: impl Into<String>) -> Result<Self, StoreKeyError> {
        let key = key.into();
        if Self::validate(&key) {
            Ok(Self(key))
        } else {
            Err(StoreKeyError(key))
        }
    }

    /// Create a store key from a string known to be valid.
    pub(crate) fn new_unchecked(key: impl Into<String>) -> Self {
        let key = key.into();
        debug_assert!(Self::validate(&key), "{key}");
        Self(key)
    }

    /// Returns true if `key` is a valid store key.
    #[must_use]
    pub fn validate(key: &str) -> bool {
        !(key.is_empty() || key.starts_with('/') || key.ends_with('/'))
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the key is beneath `prefix`.
    #[must_use]
    pub fn has_prefix(&self, prefix: &StorePrefix) -> bool {
        self.0.starts_with(prefix.as_str())
    }

    /// The remainder of the key after `prefix`, or [`None`] if the key is not beneath `prefix`.
    #[must_use]
    pub fn relative_to(&self, prefix: &StorePrefix) -> Option<&str> {
        self.0.strip_prefix(prefix.as_str())
    }

    /// The prefix holding this key.
    #[must_use]
    pub fn parent(&self) -> StorePrefix {
        match self.0.rfind('/') {
            Some(index) => StorePrefix::new_unchecked(&self.0[..=index]),
            None => StorePrefix::root(),
        }
    }

    /// The final `/` separated segment of the key.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }
}

impl FromStr for StoreKey {
    type Err = StoreKeyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::new(key)
    }
}

impl TryFrom<&str> for StoreKey {
    type Error = StoreKeyError;

    fn try_from(key: &str) -> Result<Self, Self::Error> {
        Self::new(key)
    }
}
