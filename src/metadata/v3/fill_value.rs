//! Fill value metadata.
//!
//! Fill value metadata is serialised/deserialised into [`FillValueMetadata`].
//! It is a JSON boolean, a JSON number, one of the non-finite float tokens (`"NaN"`, `"Infinity"`, `"-Infinity"`),
//! or a raw bit pattern expressed as a hex (`"0x..."`) or binary (`"0b..."`) string.
//!
//! Hex and binary strings list the bytes of the value in little-endian order.
//! For example, `"0x00010203"` is the `uint32` value whose little-endian bytes are `00 01 02 03`.
//!
//! The interpretation of fill values is data type dependent, so this is handled in [`DataType::fill_value_from_metadata`](crate::array::DataType::fill_value_from_metadata).
//! Fill value metadata is created with [`DataType::metadata_fill_value`](crate::array::DataType::metadata_fill_value).

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Fill value metadata.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Display)]
#[serde(untagged)]
pub enum FillValueMetadata {
    /// A boolean value.
    Bool(bool),
    /// An unsigned integer.
    UInt(u64),
    /// A signed integer.
    Int(i64),
    /// A finite float.
    Float(f64),
    /// A non finite float.
    NonFinite(FillValueFloatStringNonFinite),
    /// A raw bit pattern as a hex string.
    HexString(HexString),
    /// A raw bit pattern as a binary string.
    BinaryString(BinaryString),
}

impl TryFrom<&str> for FillValueMetadata {
    type Error = serde_json::Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        serde_json::from_str(s)
    }
}

impl FillValueMetadata {
    /// Convert the fill value to a [`bool`].
    #[must_use]
    pub fn try_as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(bool) => Some(*bool),
            Self::HexString(HexString(bytes)) | Self::BinaryString(BinaryString(bytes)) => {
                match bytes.as_slice() {
                    [0] => Some(false),
                    [1] => Some(true),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Convert the fill value to an integer.
    ///
    /// Returns [`None`] if the value is not an integer or it is out of range for `T`.
    #[must_use]
    pub fn try_as_int<T: TryFrom<i64> + TryFrom<u64>>(&self) -> Option<T> {
        match self {
            Self::Int(int) => T::try_from(*int).ok(),
            Self::UInt(uint) => T::try_from(*uint).ok(),
            _ => None,
        }
    }

    /// Return the raw little-endian bit pattern of a hex or binary string fill value, zero extended to `size` bytes.
    ///
    /// Returns [`None`] if the fill value is not a hex or binary string, or it is longer than `size` bytes.
    #[must_use]
    pub fn try_as_le_bytes(&self, size: usize) -> Option<Vec<u8>> {
        match self {
            Self::HexString(HexString(bytes)) | Self::BinaryString(BinaryString(bytes))
                if bytes.len() <= size =>
            {
                let mut bytes = bytes.clone();
                bytes.resize(size, 0);
                Some(bytes)
            }
            _ => None,
        }
    }

    /// Convert the fill value to a [`f64`].
    ///
    /// Integers are converted to the nearest representable value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn try_as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(int) => Some(*int as f64),
            Self::UInt(uint) => Some(*uint as f64),
            Self::Float(float) => Some(*float),
            Self::NonFinite(non_finite) => Some(match non_finite {
                FillValueFloatStringNonFinite::PosInfinity => f64::INFINITY,
                FillValueFloatStringNonFinite::NegInfinity => f64::NEG_INFINITY,
                FillValueFloatStringNonFinite::NaN => f64::NAN,
            }),
            _ => None,
        }
    }
}

/// A string representation of a non finite value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Display)]
pub enum FillValueFloatStringNonFinite {
    /// Positive infinity.
    #[serde(rename = "Infinity")]
    #[display("Infinity")]
    PosInfinity,
    /// Negative infinity.
    #[serde(rename = "-Infinity")]
    #[display("-Infinity")]
    NegInfinity,
    /// NaN (not-a-number).
    #[serde(rename = "NaN")]
    #[display("NaN")]
    NaN,
}

/// A hex string, `"0x"` followed by two hex digits per byte.
///
/// The bytes are in little-endian order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HexString(Vec<u8>);

impl HexString {
    /// Create a new [`HexString`] from little-endian bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Return the bytes of the hex string in little-endian order.
    #[must_use]
    pub fn as_le_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Display for HexString {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

fn hex_string_to_bytes(s: &str) -> Option<Vec<u8>> {
    let digits = s.strip_prefix("0x")?;
    if digits.is_empty() || digits.len() % 2 != 0 || !digits.is_ascii() {
        return None;
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).ok())
        .collect()
}

impl Serialize for HexString {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for HexString {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Ok(Self(hex_string_to_bytes(&s).ok_or_else(|| {
            serde::de::Error::custom("not a valid hex string")
        })?))
    }
}

/// A binary string, `"0b"` followed by eight binary digits per byte (most significant bit first).
///
/// The bytes are in little-endian order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BinaryString(Vec<u8>);

impl BinaryString {
    /// Create a new [`BinaryString`] from little-endian bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Return the bytes of the binary string in little-endian order.
    #[must_use]
    pub fn as_le_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Display for BinaryString {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0b")?;
        for byte in &self.0 {
            write!(f, "{byte:08b}")?;
        }
        Ok(())
    }
}

fn binary_string_to_bytes(s: &str) -> Option<Vec<u8>> {
    let digits = s.strip_prefix("0b")?;
    if digits.is_empty() || digits.len() % 8 != 0 || !digits.is_ascii() {
        return None;
    }
    (0..digits.len())
        .step_by(8)
        .map(|i| u8::from_str_radix(&digits[i..i + 8], 2).ok())
        .collect()
}

impl Serialize for BinaryString {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BinaryString {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Ok(Self(binary_string_to_bytes(&s).ok_or_else(|| {
            serde::de::Error::custom("not a valid binary string")
        })?))
    }
}
