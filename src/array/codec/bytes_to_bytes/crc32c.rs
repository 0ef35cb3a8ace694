//! The `crc32c` (CRC32C checksum) `bytes->bytes` codec.
//!
//! Appends a CRC32C checksum of the input bytestream.
//! The checksum is validated on decode unless disabled in the [global configuration](crate::config::Config).
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/codecs/crc32c/v1.0.html>.

mod crc32c_codec;
mod crc32c_configuration;
mod crc32c_partial_decoder;

pub use crc32c_codec::{Crc32cCodec, IDENTIFIER};
pub use crc32c_configuration::{Crc32cCodecConfiguration, Crc32cCodecConfigurationV1};

const CHECKSUM_SIZE: usize = core::mem::size_of::<u32>();

#[cfg(test)]
mod tests {
    use crate::{
        array::{
            codec::{BytesToBytesCodecTraits, CodecError, CodecTraits},
            BytesRepresentation,
        },
        byte_range::ByteRange,
    };

    use super::*;

    const JSON1: &str = r#"{}"#;

    #[test]
    fn codec_crc32c_configuration() {
        let configuration: Crc32cCodecConfiguration = serde_json::from_str(JSON1).unwrap();
        let codec = Crc32cCodec::new_with_configuration(&configuration);
        let metadata = codec.create_metadata().unwrap();
        assert_eq!(metadata.name(), IDENTIFIER);
        assert!(serde_json::from_str::<Crc32cCodecConfiguration>(r#"{"a":1}"#).is_err());
    }

    #[test]
    fn codec_crc32c() {
        let bytes: Vec<u8> = (0..6).collect();
        let bytes_representation = BytesRepresentation::FixedSize(bytes.len() as u64);

        let codec = Crc32cCodec::new();

        let encoded = codec.encode(bytes.clone()).unwrap();
        let decoded = codec.decode(encoded.clone(), &bytes_representation).unwrap();
        assert_eq!(bytes, decoded);

        let checksum: &[u8; 4] = &encoded[encoded.len() - CHECKSUM_SIZE..].try_into().unwrap();
        assert_eq!(checksum, &[20, 133, 9, 65]);
        assert_eq!(
            codec.compute_encoded_size(&bytes_representation),
            BytesRepresentation::FixedSize(10)
        );
    }

    #[test]
    fn codec_crc32c_invalid_checksum() {
        let codec = Crc32cCodec::new();
        let mut encoded = codec.encode((0..6).collect()).unwrap();
        encoded[0] = 255;
        assert!(matches!(
            codec.decode(encoded, &BytesRepresentation::FixedSize(6)),
            Err(CodecError::InvalidChecksum)
        ));
        assert!(codec
            .decode(vec![0, 1], &BytesRepresentation::UnboundedSize)
            .is_err());
    }

    #[test]
    fn codec_crc32c_partial_decode() {
        let bytes: Vec<u8> = (0..32).collect();
        let bytes_representation = BytesRepresentation::FixedSize(bytes.len() as u64);

        let codec = Crc32cCodec::new();

        let encoded = codec.encode(bytes).unwrap();
        let decoded_regions = [
            ByteRange::FromStart(3, Some(2)),
            ByteRange::FromEnd(0, Some(2)),
            ByteRange::FromStart(29, None),
        ];
        let input_handle = Box::new(std::io::Cursor::new(encoded));
        let partial_decoder = codec
            .partial_decoder(input_handle, &bytes_representation)
            .unwrap();
        let decoded_partial_chunk = partial_decoder
            .partial_decode(&decoded_regions)
            .unwrap()
            .unwrap();
        assert_eq!(
            decoded_partial_chunk,
            vec![vec![3, 4], vec![30, 31], vec![29, 30, 31]]
        );
    }
}
