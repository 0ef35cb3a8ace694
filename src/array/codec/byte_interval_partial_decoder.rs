use crate::byte_range::{ByteRange, InvalidByteRangeError};

use super::{BytesPartialDecoderTraits, CodecError};

/// A byte interval partial decoder.
///
/// Maps byte range requests into the interval `[byte_offset, byte_offset + byte_length)` of an inner bytes partial decoder.
pub struct ByteIntervalPartialDecoder<'a> {
    inner: &'a dyn BytesPartialDecoderTraits,
    byte_offset: u64,
    byte_length: u64,
}

impl<'a> ByteIntervalPartialDecoder<'a> {
    /// Create a new byte interval partial decoder.
    pub fn new(
        inner: &'a dyn BytesPartialDecoderTraits,
        byte_offset: u64,
        byte_length: u64,
    ) -> Self {
        Self {
            inner,
            byte_offset,
            byte_length,
        }
    }
}

impl BytesPartialDecoderTraits for ByteIntervalPartialDecoder<'_> {
    fn partial_decode_opt(
        &self,
        decoded_regions: &[ByteRange],
        parallel: bool,
    ) -> Result<Option<Vec<Vec<u8>>>, CodecError> {
        let byte_ranges = decoded_regions
            .iter()
            .map(|byte_range| {
                if !byte_range.is_valid(self.byte_length) {
                    return Err(InvalidByteRangeError::new(*byte_range, self.byte_length));
                }
                Ok(ByteRange::FromStart(
                    self.byte_offset + byte_range.start(self.byte_length),
                    Some(byte_range.length(self.byte_length)),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.inner.partial_decode_opt(&byte_ranges, parallel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_interval_partial_decoder() {
        let bytes: Vec<u8> = (0..20).collect();
        let cursor = std::io::Cursor::new(bytes);
        let decoder = ByteIntervalPartialDecoder::new(&cursor, 5, 10);
        assert_eq!(
            decoder
                .partial_decode(&[
                    ByteRange::FromStart(0, Some(2)),
                    ByteRange::FromStart(8, None),
                    ByteRange::FromEnd(0, Some(3)),
                    ByteRange::FromEnd(9, None),
                ])
                .unwrap(),
            Some(vec![vec![5, 6], vec![13, 14], vec![12, 13, 14], vec![5]])
        );
        assert_eq!(decoder.decode().unwrap(), Some((5..15).collect()));
        assert!(decoder
            .partial_decode(&[ByteRange::FromStart(9, Some(2))])
            .is_err());
    }
}
