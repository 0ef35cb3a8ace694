//! Bytes to bytes codecs.

#[cfg(feature = "blosc")]
pub mod blosc;
#[cfg(feature = "crc32c")]
pub mod crc32c;
#[cfg(feature = "gzip")]
pub mod gzip;
#[cfg(feature = "zstd")]
pub mod zstd;

#[cfg(any(feature = "blosc", feature = "gzip", feature = "zstd"))]
mod decompress_partial_decoder;
#[cfg(any(feature = "blosc", feature = "gzip", feature = "zstd"))]
pub(crate) use decompress_partial_decoder::DecompressPartialDecoder;
