use crate::{
    array::codec::{BytesPartialDecoderTraits, CodecError},
    byte_range::{extract_byte_ranges, ByteRange},
};

/// Decompresses a complete encoded value.
pub(crate) type DecompressFn = fn(&[u8]) -> Result<Vec<u8>, CodecError>;

/// A partial decoder for compressors without random access.
///
/// The whole encoded value is retrieved and decompressed, then the requested byte ranges are extracted.
pub(crate) struct DecompressPartialDecoder<'a> {
    input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
    decompress: DecompressFn,
}

impl<'a> DecompressPartialDecoder<'a> {
    pub(crate) fn new(
        input_handle: Box<dyn BytesPartialDecoderTraits + 'a>,
        decompress: DecompressFn,
    ) -> Self {
        Self {
            input_handle,
            decompress,
        }
    }
}

impl BytesPartialDecoderTraits for DecompressPartialDecoder<'_> {
    fn partial_decode_opt(
        &self,
        decoded_regions: &[ByteRange],
        parallel: bool,
    ) -> Result<Option<Vec<Vec<u8>>>, CodecError> {
        self.input_handle
            .decode_opt(parallel)?
            .map(|encoded_value| {
                let decoded_value = (self.decompress)(&encoded_value)?;
                Ok(extract_byte_ranges(&decoded_value, decoded_regions)?)
            })
            .transpose()
    }
}
