use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A wrapper to handle various versions of `transpose` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display, From)]
#[serde(untagged)]
pub enum TransposeCodecConfiguration {
    /// Version 1.0.
    V1(TransposeCodecConfigurationV1),
}

/// Configuration parameters for the `transpose` codec (version 1.0).
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct TransposeCodecConfigurationV1 {
    /// A permutation of the dimensions of the decoded chunk.
    pub order: TransposeOrder,
}

impl TransposeCodecConfigurationV1 {
    /// Create a new `transpose` codec configuration given a [`TransposeOrder`].
    #[must_use]
    pub const fn new(order: TransposeOrder) -> Self {
        Self { order }
    }
}

/// An invalid permutation error.
#[derive(Clone, Debug, Error)]
#[error("{0:?} is not a valid permutation")]
pub struct InvalidPermutationError(Vec<usize>);

/// The transpose order defining how to permute the array.
///
/// A permutation of `0, 1, …, n-1`, where `n` is the dimensionality of the decoded chunk.
#[derive(Serialize, Clone, Eq, PartialEq, Debug)]
pub struct TransposeOrder(Vec<usize>);

impl TransposeOrder {
    /// Create a new transpose order.
    ///
    /// # Errors
    /// Returns [`InvalidPermutationError`] if `order` is not a permutation of `0..order.len()`.
    pub fn new(order: &[usize]) -> Result<Self, InvalidPermutationError> {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        if sorted.iter().enumerate().all(|(i, &axis)| i == axis) {
            Ok(Self(order.to_vec()))
        } else {
            Err(InvalidPermutationError(order.to_vec()))
        }
    }

    /// The transpose order with the dimensions of `dimensionality` reversed.
    #[must_use]
    pub fn reversed(dimensionality: usize) -> Self {
        Self((0..dimensionality).rev().collect())
    }

    /// Return the permutation.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Return the number of dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the permutation has no dimensions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> serde::Deserialize<'de> for TransposeOrder {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let order = Vec::<usize>::deserialize(d)?;
        Self::new(&order).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_transpose_configuration() {
        let configuration: TransposeCodecConfiguration =
            serde_json::from_str(r#"{"order":[0,2,1]}"#).unwrap();
        assert_eq!(configuration.to_string(), r#"{"order":[0,2,1]}"#);
    }

    #[test]
    fn codec_transpose_configuration_invalid() {
        assert!(serde_json::from_str::<TransposeCodecConfiguration>(r#"{"order":""}"#).is_err());
        assert!(
            serde_json::from_str::<TransposeCodecConfiguration>(r#"{"order":[0,0,1]}"#).is_err()
        );
        assert!(serde_json::from_str::<TransposeCodecConfiguration>(r#"{"order":[1,2]}"#).is_err());
    }

    #[test]
    fn transpose_order() {
        assert!(TransposeOrder::new(&[2, 0, 1]).is_ok());
        assert!(TransposeOrder::new(&[3, 0, 1]).is_err());
        assert_eq!(TransposeOrder::reversed(3).as_slice(), &[2, 1, 0]);
    }
}
