//! The blosc `bytes->bytes` codec.
//!
//! It uses the [blosc](https://www.blosc.org/) container format.
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/codecs/blosc/v1.0.html>.

mod blosc_codec;
mod blosc_configuration;

use std::ffi::{c_char, c_int, c_void};

use blosc_sys::{
    blosc_cbuffer_validate, blosc_compress_ctx, blosc_decompress_ctx, BLOSC_MAX_OVERHEAD,
};
use thiserror::Error;

pub use blosc_codec::{BloscCodec, IDENTIFIER};
pub use blosc_configuration::{
    BloscCodecConfiguration, BloscCodecConfigurationV1, BloscCompressionLevel, BloscCompressor,
    BloscShuffleMode,
};

/// An error from the blosc library.
#[derive(Debug, Error)]
#[error("blosc error: {_0}")]
struct BloscError(String);

#[allow(clippy::too_many_arguments)]
fn blosc_compress_bytes(
    src: &[u8],
    clevel: BloscCompressionLevel,
    shuffle_mode: BloscShuffleMode,
    typesize: usize,
    compressor: BloscCompressor,
    blocksize: usize,
    numinternalthreads: usize,
) -> Result<Vec<u8>, BloscError> {
    let destsize = src.len() + BLOSC_MAX_OVERHEAD as usize;
    let mut dest: Vec<u8> = vec![0; destsize];
    let numinternalthreads = c_int::try_from(numinternalthreads).unwrap_or(1);
    let compressed_size = unsafe {
        blosc_compress_ctx(
            c_int::from(clevel.as_u8()),
            shuffle_mode as c_int,
            typesize.max(1),
            src.len(),
            src.as_ptr().cast::<c_void>(),
            dest.as_mut_ptr().cast::<c_void>(),
            destsize,
            compressor.as_cstr().as_ptr().cast::<c_char>(),
            blocksize,
            numinternalthreads,
        )
    };
    if compressed_size > 0 {
        #[allow(clippy::cast_sign_loss)]
        dest.truncate(compressed_size as usize);
        Ok(dest)
    } else {
        Err(BloscError(format!(
            "blosc_compress_ctx(clevel: {}, doshuffle: {shuffle_mode:?}, typesize: {typesize}, nbytes: {}, destsize {destsize}, compressor {compressor:?}, blocksize: {blocksize}) -> {compressed_size} (failure)",
            clevel.as_u8(),
            src.len()
        )))
    }
}

/// Return the decompressed size of a blosc buffer, or [`None`] if the buffer is invalid.
fn blosc_validate(src: &[u8]) -> Option<usize> {
    let mut destsize: usize = 0;
    let valid = unsafe {
        blosc_cbuffer_validate(
            src.as_ptr().cast::<c_void>(),
            src.len(),
            std::ptr::addr_of_mut!(destsize),
        )
    } == 0;
    valid.then_some(destsize)
}

fn blosc_decompress_bytes(src: &[u8], numinternalthreads: usize) -> Result<Vec<u8>, BloscError> {
    let destsize = blosc_validate(src)
        .ok_or_else(|| BloscError("blosc encoded value is invalid".to_string()))?;
    let mut dest: Vec<u8> = vec![0; destsize];
    let numinternalthreads = c_int::try_from(numinternalthreads).unwrap_or(1);
    let decompressed_size = unsafe {
        blosc_decompress_ctx(
            src.as_ptr().cast::<c_void>(),
            dest.as_mut_ptr().cast::<c_void>(),
            destsize,
            numinternalthreads,
        )
    };
    if decompressed_size >= 0 && decompressed_size as usize == destsize {
        Ok(dest)
    } else {
        Err(BloscError(format!(
            "blosc_decompress_ctx(destsize: {destsize}) -> {decompressed_size} (failure)"
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        array::{
            codec::BytesToBytesCodecTraits, BytesRepresentation, ChunkRepresentation, DataType,
            FillValue,
        },
        array_subset::ArraySubset,
        byte_range::ByteRange,
    };

    use super::*;

    const JSON_VALID1: &str = r#"
{
    "cname": "lz4",
    "clevel": 5,
    "shuffle": "shuffle",
    "typesize": 2,
    "blocksize": 0
}"#;

    const JSON_VALID2: &str = r#"
{
    "cname": "lz4",
    "clevel": 4,
    "shuffle": "bitshuffle",
    "typesize": 2,
    "blocksize": 0
}"#;

    const JSON_VALID3: &str = r#"
{
    "cname": "zstd",
    "clevel": 9,
    "shuffle": "noshuffle",
    "typesize": 1,
    "blocksize": 0
}"#;

    fn round_trip(json: &str) {
        let elements: Vec<u16> = (0..32).collect();
        let bytes = bytemuck::cast_slice(&elements).to_vec();
        let bytes_representation = BytesRepresentation::FixedSize(bytes.len() as u64);

        let configuration: BloscCodecConfiguration = serde_json::from_str(json).unwrap();
        let codec = BloscCodec::new_with_configuration(&configuration).unwrap();

        let encoded = codec.encode(bytes.clone()).unwrap();
        let decoded = codec.decode(encoded, &bytes_representation).unwrap();
        assert_eq!(bytes, decoded);
    }

    #[test]
    fn codec_blosc_round_trip_shuffle() {
        round_trip(JSON_VALID1);
    }

    #[test]
    fn codec_blosc_round_trip_bitshuffle() {
        round_trip(JSON_VALID2);
    }

    #[test]
    fn codec_blosc_round_trip_zstd() {
        round_trip(JSON_VALID3);
    }

    #[test]
    fn codec_blosc_invalid_input() {
        let configuration: BloscCodecConfiguration = serde_json::from_str(JSON_VALID1).unwrap();
        let codec = BloscCodec::new_with_configuration(&configuration).unwrap();
        assert!(codec
            .decode(vec![1, 2, 3], &BytesRepresentation::UnboundedSize)
            .is_err());
    }

    #[test]
    fn codec_blosc_partial_decode() {
        let chunk_representation = ChunkRepresentation::new(
            vec![std::num::NonZeroU64::new(2).unwrap(); 3],
            DataType::UInt16,
            FillValue::from(0u16),
        )
        .unwrap();
        let bytes_representation = BytesRepresentation::FixedSize(chunk_representation.size());

        let elements: Vec<u16> = (0..8).collect();
        let bytes = bytemuck::cast_slice(&elements).to_vec();

        let configuration: BloscCodecConfiguration = serde_json::from_str(JSON_VALID2).unwrap();
        let codec = BloscCodec::new_with_configuration(&configuration).unwrap();

        let encoded = codec.encode(bytes).unwrap();
        let decoded_regions: Vec<ByteRange> =
            ArraySubset::new_with_start_shape(vec![0, 1, 0], vec![2, 1, 1])
                .unwrap()
                .byte_ranges(
                    &chunk_representation.shape_u64(),
                    chunk_representation.element_size(),
                )
                .unwrap();
        let input_handle = Box::new(std::io::Cursor::new(encoded));
        let partial_decoder = codec
            .partial_decoder(input_handle, &bytes_representation)
            .unwrap();
        let decoded = partial_decoder
            .partial_decode(&decoded_regions)
            .unwrap()
            .unwrap();

        let decoded: Vec<u16> = bytemuck::pod_collect_to_vec(&decoded.concat());
        assert_eq!(decoded, vec![2, 6]);
    }
}
