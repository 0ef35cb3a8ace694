use crate::{
    array::codec::{BytesPartialDecoderTraits, CodecError},
    byte_range::ByteRange,
};

use super::CHECKSUM_SIZE;

/// Partial decoder for the `crc32c` codec.
///
/// The checksum is not validated, only the requested byte ranges are read.
pub struct Crc32cPartialDecoder<'a> {
    input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
}

impl<'a> Crc32cPartialDecoder<'a> {
    /// Create a new partial decoder for the `crc32c` codec.
    pub fn new(input_handle: Box<dyn BytesPartialDecoderTraits + 'a>) -> Self {
        Self { input_handle }
    }
}

impl BytesPartialDecoderTraits for Crc32cPartialDecoder<'_> {
    fn partial_decode_opt(
        &self,
        decoded_regions: &[ByteRange],
        parallel: bool,
    ) -> Result<Option<Vec<Vec<u8>>>, CodecError> {
        // Suffix ranges are shifted past the trailing checksum
        let encoded_regions: Vec<ByteRange> = decoded_regions
            .iter()
            .map(|byte_range| match byte_range {
                ByteRange::FromStart(..) => *byte_range,
                ByteRange::FromEnd(offset, length) => {
                    ByteRange::FromEnd(offset + CHECKSUM_SIZE as u64, *length)
                }
            })
            .collect();

        let Some(mut bytes) = self
            .input_handle
            .partial_decode_opt(&encoded_regions, parallel)?
        else {
            return Ok(None);
        };

        for (bytes, byte_range) in bytes.iter_mut().zip(decoded_regions) {
            if let ByteRange::FromStart(_, None) = byte_range {
                let length = bytes.len().checked_sub(CHECKSUM_SIZE).ok_or_else(|| {
                    CodecError::Other("crc32c encoded value is too short".to_string())
                })?;
                bytes.truncate(length);
            }
        }

        Ok(Some(bytes))
    }
}
