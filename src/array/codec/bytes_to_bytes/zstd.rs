//! The zstd `bytes->bytes` codec.
//!
//! Applies [Zstandard](https://github.com/facebook/zstd) compression, optionally with an embedded content checksum.
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/codecs/zstd/v1.0.html>.

mod zstd_codec;
mod zstd_configuration;

pub use zstd_codec::{ZstdCodec, IDENTIFIER};
pub use zstd_configuration::{
    ZstdCodecConfiguration, ZstdCodecConfigurationV1, ZstdCompressionLevel,
};

#[cfg(test)]
mod tests {
    use crate::{
        array::{codec::BytesToBytesCodecTraits, BytesRepresentation},
        byte_range::ByteRange,
    };

    use super::*;

    const JSON_VALID: &str = r#"{
        "level": 22,
        "checksum": false
    }"#;

    #[test]
    fn codec_zstd_round_trip() {
        let elements: Vec<u16> = (0..32).collect();
        let bytes = bytemuck::cast_slice(&elements).to_vec();
        let bytes_representation = BytesRepresentation::FixedSize(bytes.len() as u64);

        let configuration: ZstdCodecConfiguration = serde_json::from_str(JSON_VALID).unwrap();
        let codec = ZstdCodec::new_with_configuration(&configuration);

        let encoded = codec.encode(bytes.clone()).unwrap();
        let decoded = codec.decode(encoded, &bytes_representation).unwrap();
        assert_eq!(bytes, decoded);
    }

    #[test]
    fn codec_zstd_round_trip_checksum() {
        let elements: Vec<u32> = (0..1024).collect();
        let bytes = bytemuck::cast_slice(&elements).to_vec();
        let bytes_representation = BytesRepresentation::FixedSize(bytes.len() as u64);

        let codec = ZstdCodec::new(5, true);
        let encoded = codec.encode(bytes.clone()).unwrap();
        let encoded_no_checksum = ZstdCodec::new(5, false).encode(bytes.clone()).unwrap();
        assert_eq!(encoded.len(), encoded_no_checksum.len() + 4);
        let decoded = codec.decode(encoded, &bytes_representation).unwrap();
        assert_eq!(bytes, decoded);

        let encoded = codec.encode_opt(bytes.clone(), true).unwrap();
        let decoded = codec.decode(encoded, &bytes_representation).unwrap();
        assert_eq!(bytes, decoded);
    }

    #[test]
    fn codec_zstd_corrupt() {
        let codec = ZstdCodec::new(1, true);
        let mut encoded = codec.encode(vec![7u8; 256]).unwrap();
        let last = encoded.len() - 1;
        encoded[last] ^= 0xff;
        assert!(codec
            .decode(encoded, &BytesRepresentation::UnboundedSize)
            .is_err());
    }

    #[test]
    fn codec_zstd_partial_decode() {
        let elements: Vec<u16> = (0..8).collect();
        let bytes = bytemuck::cast_slice(&elements).to_vec();
        let bytes_representation = BytesRepresentation::FixedSize(bytes.len() as u64);

        let configuration: ZstdCodecConfiguration = serde_json::from_str(JSON_VALID).unwrap();
        let codec = ZstdCodec::new_with_configuration(&configuration);

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
}
