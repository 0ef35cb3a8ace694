//! Zarr data types.
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/core/v3.0.html#data-types>.

use derive_more::From;
use serde::de::Error;
use thiserror::Error;

use crate::metadata::{
    v3::fill_value::{FillValueFloatStringNonFinite, HexString},
    FillValueMetadata, Metadata,
};

use super::{FillValue, ZARR_NAN_F32, ZARR_NAN_F64};

/// A data type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[rustfmt::skip]
pub enum DataType {
    /// `bool` Boolean.
    Bool,
    /// `int8` Integer in `[-2^7, 2^7-1]`.
    Int8,
    /// `int16` Integer in `[-2^15, 2^15-1]`.
    Int16,
    /// `int32` Integer in `[-2^31, 2^31-1]`.
    Int32,
    /// `int64` Integer in `[-2^63, 2^63-1]`.
    Int64,
    /// `uint8` Integer in `[0, 2^8-1]`.
    UInt8,
    /// `uint16` Integer in `[0, 2^16-1]`.
    UInt16,
    /// `uint32` Integer in `[0, 2^32-1]`.
    UInt32,
    /// `uint64` Integer in `[0, 2^64-1]`.
    UInt64,
    /// `float32` IEEE 754 single-precision floating point: sign bit, 8 bits exponent, 23 bits mantissa.
    Float32,
    /// `float64` IEEE 754 double-precision floating point: sign bit, 11 bits exponent, 52 bits mantissa.
    Float64,
}

/// An unsupported data type error.
#[derive(Debug, Error, From)]
#[error("unsupported data type {_0}")]
pub struct UnsupportedDataTypeError(String);

/// A fill value metadata incompatibility error.
#[derive(Debug, Error)]
#[error("incompatible fill value {1} for data type {0}")]
pub struct IncompatibleFillValueMetadataError(String, FillValueMetadata);

/// A fill value incompatibility error.
#[derive(Debug, Error)]
#[error("incompatible fill value {1} for data type {0}")]
pub struct IncompatibleFillValueError(String, FillValue);

impl IncompatibleFillValueError {
    /// Create a new incompatible fill value error.
    #[must_use]
    pub const fn new(data_type_name: String, fill_value: FillValue) -> Self {
        Self(data_type_name, fill_value)
    }
}

impl<'de> serde::Deserialize<'de> for DataType {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let metadata = Metadata::deserialize(d)?;
        Self::from_metadata(&metadata).map_err(|err| D::Error::custom(err.to_string()))
    }
}

impl serde::Serialize for DataType {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.name())
    }
}

impl DataType {
    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Returns the metadata.
    #[must_use]
    pub fn metadata(&self) -> Metadata {
        Metadata::new(self.name())
    }

    /// Returns the size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Create a data type from metadata.
    ///
    /// # Errors
    /// Returns [`UnsupportedDataTypeError`] if the metadata is not a known data type or has a configuration.
    pub fn from_metadata(metadata: &Metadata) -> Result<Self, UnsupportedDataTypeError> {
        if !metadata.configuration_is_none_or_empty() {
            return Err(UnsupportedDataTypeError(metadata.to_string()));
        }
        match metadata.name() {
            "bool" => Ok(Self::Bool),
            "int8" => Ok(Self::Int8),
            "int16" => Ok(Self::Int16),
            "int32" => Ok(Self::Int32),
            "int64" => Ok(Self::Int64),
            "uint8" => Ok(Self::UInt8),
            "uint16" => Ok(Self::UInt16),
            "uint32" => Ok(Self::UInt32),
            "uint64" => Ok(Self::UInt64),
            "float32" => Ok(Self::Float32),
            "float64" => Ok(Self::Float64),
            name => Err(UnsupportedDataTypeError(name.to_string())),
        }
    }

    /// Create a fill value from metadata.
    ///
    /// Hex and binary string fill values are interpreted as the little-endian bit pattern of the value.
    ///
    /// # Errors
    /// Returns [`IncompatibleFillValueMetadataError`] if the fill value cannot be represented exactly by the data type.
    pub fn fill_value_from_metadata(
        &self,
        fill_value: &FillValueMetadata,
    ) -> Result<FillValue, IncompatibleFillValueMetadataError> {
        use FillValue as FV;
        let err =
            || IncompatibleFillValueMetadataError(self.name().to_string(), fill_value.clone());

        macro_rules! int_fill_value {
            ($t:ty) => {{
                if let Some(bytes) = fill_value.try_as_le_bytes(std::mem::size_of::<$t>()) {
                    let bytes = bytes.try_into().map_err(|_| err())?;
                    Ok(FV::from(<$t>::from_le_bytes(bytes)))
                } else {
                    Ok(FV::from(fill_value.try_as_int::<$t>().ok_or_else(err)?))
                }
            }};
        }

        match self {
            Self::Bool => Ok(FV::from(fill_value.try_as_bool().ok_or_else(err)?)),
            Self::Int8 => int_fill_value!(i8),
            Self::Int16 => int_fill_value!(i16),
            Self::Int32 => int_fill_value!(i32),
            Self::Int64 => int_fill_value!(i64),
            Self::UInt8 => int_fill_value!(u8),
            Self::UInt16 => int_fill_value!(u16),
            Self::UInt32 => int_fill_value!(u32),
            Self::UInt64 => int_fill_value!(u64),
            Self::Float32 => {
                if let Some(bytes) = fill_value.try_as_le_bytes(4) {
                    let bytes = bytes.try_into().map_err(|_| err())?;
                    return Ok(FV::from(f32::from_le_bytes(bytes)));
                }
                let float = fill_value.try_as_f64().ok_or_else(err)?;
                if float.is_nan() {
                    Ok(FV::from(ZARR_NAN_F32))
                } else if float.is_finite() && float.abs() > f64::from(f32::MAX) {
                    Err(err())
                } else {
                    #[allow(clippy::cast_possible_truncation)]
                    Ok(FV::from(float as f32))
                }
            }
            Self::Float64 => {
                if let Some(bytes) = fill_value.try_as_le_bytes(8) {
                    let bytes = bytes.try_into().map_err(|_| err())?;
                    return Ok(FV::from(f64::from_le_bytes(bytes)));
                }
                let float = fill_value.try_as_f64().ok_or_else(err)?;
                if float.is_nan() {
                    Ok(FV::from(ZARR_NAN_F64))
                } else {
                    Ok(FV::from(float))
                }
            }
        }
    }

    /// Create fill value metadata.
    ///
    /// # Errors
    /// Returns [`IncompatibleFillValueError`] if the size of the fill value does not match the data type.
    pub fn metadata_fill_value(
        &self,
        fill_value: &FillValue,
    ) -> Result<FillValueMetadata, IncompatibleFillValueError> {
        let err = || IncompatibleFillValueError::new(self.name().to_string(), fill_value.clone());
        let bytes = fill_value.as_ne_bytes();
        if bytes.len() != self.size() {
            return Err(err());
        }

        macro_rules! from_ne_bytes {
            ($t:ty) => {
                <$t>::from_ne_bytes(bytes.try_into().map_err(|_| err())?)
            };
        }

        Ok(match self {
            Self::Bool => FillValueMetadata::Bool(bytes[0] != 0),
            Self::Int8 => FillValueMetadata::Int(i64::from(from_ne_bytes!(i8))),
            Self::Int16 => FillValueMetadata::Int(i64::from(from_ne_bytes!(i16))),
            Self::Int32 => FillValueMetadata::Int(i64::from(from_ne_bytes!(i32))),
            Self::Int64 => FillValueMetadata::Int(from_ne_bytes!(i64)),
            Self::UInt8 => FillValueMetadata::UInt(u64::from(from_ne_bytes!(u8))),
            Self::UInt16 => FillValueMetadata::UInt(u64::from(from_ne_bytes!(u16))),
            Self::UInt32 => FillValueMetadata::UInt(u64::from(from_ne_bytes!(u32))),
            Self::UInt64 => FillValueMetadata::UInt(from_ne_bytes!(u64)),
            Self::Float32 => {
                let float = from_ne_bytes!(f32);
                if float.is_nan() && float.to_bits() != ZARR_NAN_F32.to_bits() {
                    FillValueMetadata::HexString(HexString::new(float.to_le_bytes().to_vec()))
                } else {
                    float64_to_fill_value(f64::from(float))
                }
            }
            Self::Float64 => {
                let float = from_ne_bytes!(f64);
                if float.is_nan() && float.to_bits() != ZARR_NAN_F64.to_bits() {
                    FillValueMetadata::HexString(HexString::new(float.to_le_bytes().to_vec()))
                } else {
                    float64_to_fill_value(float)
                }
            }
        })
    }
}

fn float64_to_fill_value(f: f64) -> FillValueMetadata {
    if f.is_nan() {
        FillValueMetadata::NonFinite(FillValueFloatStringNonFinite::NaN)
    } else if f.is_infinite() && f.is_sign_positive() {
        FillValueMetadata::NonFinite(FillValueFloatStringNonFinite::PosInfinity)
    } else if f.is_infinite() {
        FillValueMetadata::NonFinite(FillValueFloatStringNonFinite::NegInfinity)
    } else {
        FillValueMetadata::Float(f)
    }
}

impl TryFrom<Metadata> for DataType {
    type Error = UnsupportedDataTypeError;

    fn try_from(metadata: Metadata) -> Result<Self, Self::Error> {
        Self::from_metadata(&metadata)
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}
