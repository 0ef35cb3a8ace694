//! Byte ranges.
//!
//! A [`ByteRange`] addresses bytes relative to the start or the end of a value.
//! It has an offset and an optional length; a missing length means "until the other end".
//!
//! The store contract maps onto byte ranges as follows:
//!  - a full read is `FromStart(0, None)`,
//!  - a read from `start` to the end of the value is `FromStart(start, None)`,
//!  - a read of `start..end` is `FromStart(start, Some(end - start))`, and
//!  - a read of the last `n` bytes is `FromEnd(0, Some(n))`.
//!
//! Partially decoding codecs request byte ranges from an input implementing [`BytesPartialDecoderTraits`](crate::array::codec::BytesPartialDecoderTraits).

use std::ops::Range;

use thiserror::Error;

/// A byte offset.
pub type ByteOffset = u64;

/// A byte length.
pub type ByteLength = u64;

/// A byte range.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ByteRange {
    /// A byte range from the start.
    ///
    /// If the byte length is [`None`], reads to the end of the value.
    FromStart(ByteOffset, Option<ByteLength>),
    /// A byte range from the end.
    ///
    /// If the byte length is [`None`], reads to the start of the value.
    FromEnd(ByteOffset, Option<ByteLength>),
}

impl From<Range<u64>> for ByteRange {
    fn from(range: Range<u64>) -> Self {
        Self::FromStart(range.start, Some(range.end.saturating_sub(range.start)))
    }
}

impl ByteRange {
    /// Return the start of a byte range. `size` is the size of the entire value.
    #[must_use]
    pub fn start(&self, size: u64) -> u64 {
        match self {
            Self::FromStart(offset, _) => *offset,
            Self::FromEnd(offset, length) => {
                length.map_or(0, |length| size.saturating_sub(offset + length))
            }
        }
    }

    /// Return the exclusive end of a byte range. `size` is the size of the entire value.
    #[must_use]
    pub fn end(&self, size: u64) -> u64 {
        match self {
            Self::FromStart(offset, length) => length.map_or(size, |length| offset + length),
            Self::FromEnd(offset, _) => size.saturating_sub(*offset),
        }
    }

    /// Return the internal offset of the byte range (which can be at its start or end).
    #[must_use]
    pub const fn offset(&self) -> u64 {
        let (Self::FromStart(offset, _) | Self::FromEnd(offset, _)) = self;
        *offset
    }

    /// Return the length of a byte range. `size` is the size of the entire value.
    #[must_use]
    pub fn length(&self, size: u64) -> u64 {
        match self {
            Self::FromStart(offset, None) | Self::FromEnd(offset, None) => {
                size.saturating_sub(*offset)
            }
            Self::FromStart(_, Some(length)) | Self::FromEnd(_, Some(length)) => *length,
        }
    }

    /// Convert the byte range to a [`Range<u64>`].
    #[must_use]
    pub fn to_range(&self, size: u64) -> Range<u64> {
        self.start(size)..self.end(size)
    }

    /// Convert the byte range to a [`Range<usize>`].
    ///
    /// # Panics
    /// Panics if the byte range exceeds [`usize::MAX`].
    #[must_use]
    pub fn to_range_usize(&self, size: u64) -> Range<usize> {
        usize::try_from(self.start(size)).unwrap()..usize::try_from(self.end(size)).unwrap()
    }

    /// Returns true if the byte range lies within a value of `size` bytes.
    #[must_use]
    pub fn is_valid(&self, size: u64) -> bool {
        let (Self::FromStart(offset, length) | Self::FromEnd(offset, length)) = self;
        offset
            .checked_add(length.unwrap_or(0))
            .is_some_and(|end| end <= size)
    }
}

impl std::fmt::Display for ByteRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FromStart(offset, length) => write!(
                f,
                "{}..{}",
                if *offset == 0 {
                    String::new()
                } else {
                    offset.to_string()
                },
                length.map_or(String::new(), |length| (offset + length).to_string())
            ),
            Self::FromEnd(offset, length) => write!(
                f,
                "{}..{}",
                length.map_or(String::new(), |length| format!("-{}", offset + length)),
                if *offset == 0 {
                    String::new()
                } else {
                    format!("-{offset}")
                }
            ),
        }
    }
}

/// An invalid byte range error.
#[derive(Copy, Clone, Debug, Error)]
#[error("invalid byte range {0} for bytes of length {1}")]
pub struct InvalidByteRangeError(ByteRange, u64);

impl InvalidByteRangeError {
    /// Create a new [`InvalidByteRangeError`].
    #[must_use]
    pub const fn new(byte_range: ByteRange, bytes_len: u64) -> Self {
        Self(byte_range, bytes_len)
    }
}

/// Check that every byte range lies within a value of `bytes_len` bytes.
///
/// # Errors
/// Returns [`InvalidByteRangeError`] for the first byte range that does not.
pub fn validate_byte_ranges(
    byte_ranges: &[ByteRange],
    bytes_len: u64,
) -> Result<(), InvalidByteRangeError> {
    byte_ranges
        .iter()
        .find(|byte_range| !byte_range.is_valid(bytes_len))
        .map_or(Ok(()), |byte_range| {
            Err(InvalidByteRangeError(*byte_range, bytes_len))
        })
}

/// Extract byte ranges from bytes.
///
/// # Errors
/// Returns [`InvalidByteRangeError`] if any bytes are requested beyond the end of `bytes`.
pub fn extract_byte_ranges(
    bytes: &[u8],
    byte_ranges: &[ByteRange],
) -> Result<Vec<Vec<u8>>, InvalidByteRangeError> {
    let size = bytes.len() as u64;
    validate_byte_ranges(byte_ranges, size)?;
    Ok(byte_ranges
        .iter()
        .map(|byte_range| bytes[byte_range.to_range_usize(size)].to_vec())
        .collect())
}

/// Extract byte ranges from bytes and concatenate them.
///
/// # Errors
/// Returns [`InvalidByteRangeError`] if any bytes are requested beyond the end of `bytes`.
pub fn extract_byte_ranges_concat(
    bytes: &[u8],
    byte_ranges: &[ByteRange],
) -> Result<Vec<u8>, InvalidByteRangeError> {
    let size = bytes.len() as u64;
    validate_byte_ranges(byte_ranges, size)?;
    let out_size = byte_ranges
        .iter()
        .map(|byte_range| byte_range.length(size))
        .sum::<u64>();
    let mut out = Vec::with_capacity(usize::try_from(out_size).unwrap_or_default());
    for byte_range in byte_ranges {
        out.extend_from_slice(&bytes[byte_range.to_range_usize(size)]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_ranges() {
        let byte_range = ByteRange::FromStart(1, None);
        assert_eq!(byte_range.to_range(10), 1..10);
        assert_eq!(byte_range.length(10), 9);
        assert_eq!(byte_range.offset(), 1);

        let byte_range = ByteRange::FromEnd(1, None);
        assert_eq!(byte_range.to_range(10), 0..9);
        assert_eq!(byte_range.length(10), 9);

        let byte_range = ByteRange::FromEnd(0, Some(4));
        assert_eq!(byte_range.to_range(10), 6..10);

        let byte_range = ByteRange::from(2..7);
        assert_eq!(byte_range, ByteRange::FromStart(2, Some(5)));
        assert_eq!(byte_range.to_range_usize(10), 2..7);

        assert!(validate_byte_ranges(&[ByteRange::FromStart(1, Some(5))], 6).is_ok());
        assert!(validate_byte_ranges(&[ByteRange::FromStart(1, Some(5))], 2).is_err());
        assert!(validate_byte_ranges(&[ByteRange::FromEnd(1, Some(5))], 6).is_ok());
        assert!(validate_byte_ranges(&[ByteRange::FromEnd(1, Some(5))], 2).is_err());
        assert!(validate_byte_ranges(&[ByteRange::FromStart(u64::MAX, Some(1))], 2).is_err());
    }

    #[test]
    fn byte_ranges_extract() {
        let bytes = [1, 2, 3, 4, 5];
        assert_eq!(
            extract_byte_ranges(
                &bytes,
                &[ByteRange::FromStart(1, Some(2)), ByteRange::FromEnd(0, Some(1))],
            )
            .unwrap(),
            vec![vec![2, 3], vec![5]]
        );
        assert_eq!(
            extract_byte_ranges_concat(
                &bytes,
                &[ByteRange::FromStart(3, None), ByteRange::FromStart(0, Some(1))],
            )
            .unwrap(),
            vec![4, 5, 1]
        );
        let err = extract_byte_ranges(&[1, 2, 3], &[ByteRange::FromStart(1, Some(4))]).unwrap_err();
        assert_eq!(err.to_string(), "invalid byte range 1..5 for bytes of length 3");
    }

    #[test]
    fn byte_range_display() {
        assert_eq!(format!("{}", ByteRange::FromStart(0, None)), "..");
        assert_eq!(format!("{}", ByteRange::FromStart(5, None)), "5..");
        assert_eq!(format!("{}", ByteRange::FromStart(5, Some(2))), "5..7");
        assert_eq!(format!("{}", ByteRange::FromEnd(5, None)), "..-5");
        assert_eq!(format!("{}", ByteRange::FromEnd(0, Some(2))), "-2..");
        assert_eq!(format!("{}", ByteRange::FromEnd(5, Some(2))), "-7..-5");
    }
}
