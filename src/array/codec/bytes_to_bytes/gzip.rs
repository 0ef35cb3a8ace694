//! The gzip `bytes->bytes` codec.
//!
//! Applies gzip compression.
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/codecs/gzip/v1.0.html>.

mod gzip_codec;
mod gzip_configuration;

pub use gzip_codec::{GzipCodec, IDENTIFIER};
pub use gzip_configuration::{
    GzipCodecConfiguration, GzipCodecConfigurationV1, GzipCompressionLevel,
    GzipCompressionLevelError,
};

#[cfg(test)]
mod tests {
    use crate::{
        array::{codec::BytesToBytesCodecTraits, BytesRepresentation},
        byte_range::ByteRange,
    };

    use super::*;

    const JSON_VALID: &str = r#"{
        "level": 1
    }"#;

    #[test]
    fn codec_gzip_round_trip() {
        let elements: Vec<u16> = (0..32).collect();
        let bytes = bytemuck::cast_slice(&elements).to_vec();
        let bytes_representation = BytesRepresentation::FixedSize(bytes.len() as u64);

        let configuration: GzipCodecConfiguration = serde_json::from_str(JSON_VALID).unwrap();
        let codec = GzipCodec::new_with_configuration(&configuration);

        let encoded = codec.encode(bytes.clone()).unwrap();
        let decoded = codec.decode(encoded, &bytes_representation).unwrap();
        assert_eq!(bytes, decoded);
    }

    #[test]
    fn codec_gzip_partial_decode() {
        let elements: Vec<u16> = (0..8).collect();
        let bytes = bytemuck::cast_slice(&elements).to_vec();
        let bytes_representation = BytesRepresentation::FixedSize(bytes.len() as u64);

        let codec = GzipCodec::new(5).unwrap();

        let encoded = codec.encode(bytes).unwrap();
        let decoded_regions = [
            ByteRange::FromStart(4, Some(4)),
            ByteRange::FromStart(10, Some(2)),
        ];

        let input_handle = Box::new(std::io::Cursor::new(encoded));
        let partial_decoder = codec
            .partial_decoder(input_handle, &bytes_representation)
            .unwrap();
        let decoded_partial_chunk = partial_decoder
            .partial_decode(&decoded_regions)
            .unwrap()
            .unwrap();

        let decoded_partial_chunk: Vec<u16> =
            bytemuck::pod_collect_to_vec(&decoded_partial_chunk.concat());
        assert_eq!(decoded_partial_chunk, vec![2, 3, 5]);
    }

    #[test]
    fn codec_gzip_missing_input() {
        struct Missing;
        impl crate::array::codec::BytesPartialDecoderTraits for Missing {
            fn partial_decode_opt(
                &self,
                _decoded_regions: &[ByteRange],
                _parallel: bool,
            ) -> Result<Option<Vec<Vec<u8>>>, crate::array::codec::CodecError> {
                Ok(None)
            }
        }
        let codec = GzipCodec::new(1).unwrap();
        let partial_decoder = codec
            .partial_decoder(Box::new(Missing), &BytesRepresentation::UnboundedSize)
            .unwrap();
        assert!(partial_decoder.decode().unwrap().is_none());
    }
}
