use derive_more::Display;
use serde::{Deserialize, Serialize};

/// The byte order of multi-byte elements.
///
/// Serialised as `"little"` or `"big"` in Zarr V3 metadata, and as a `<` or `>` data type prefix in Zarr V2 metadata.
#[derive(Serialize, Deserialize, Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Least significant byte first.
    #[display("little")]
    Little,
    /// Most significant byte first.
    #[display("big")]
    Big,
}

/// The byte order of the host.
#[cfg(target_endian = "little")]
pub const NATIVE_ENDIAN: Endianness = Endianness::Little;

/// The byte order of the host.
#[cfg(target_endian = "big")]
pub const NATIVE_ENDIAN: Endianness = Endianness::Big;

impl Endianness {
    /// Returns true if this is the byte order of the host.
    #[must_use]
    pub fn is_native(self) -> bool {
        self == NATIVE_ENDIAN
    }

    /// Parse a Zarr V2 data type byte order prefix.
    ///
    /// Returns [`None`] for any character other than `<` or `>`.
    #[must_use]
    pub const fn from_v2_prefix(prefix: char) -> Option<Self> {
        match prefix {
            '<' => Some(Self::Little),
            '>' => Some(Self::Big),
            _ => None,
        }
    }

    /// Convert `bytes` holding elements of `element_size` bytes between this byte order and the host byte order.
    ///
    /// The conversion is its own inverse, so it applies to both encoding and decoding.
    pub fn swap_if_foreign(self, bytes: &mut [u8], element_size: usize) {
        if !self.is_native() && element_size > 1 {
            bytes
                .chunks_exact_mut(element_size)
                .for_each(<[u8]>::reverse);
        }
    }
}
