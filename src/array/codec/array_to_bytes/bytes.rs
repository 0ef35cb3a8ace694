//! The `bytes` array to bytes codec.
//!
//! Encodes arrays of fixed-size numeric data types as little endian or big endian in lexicographical order.
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/codecs/bytes/v1.0.html>.

mod bytes_codec;
mod bytes_configuration;
mod bytes_partial_decoder;

pub use bytes_codec::{BytesCodec, IDENTIFIER};
pub use bytes_configuration::{BytesCodecConfiguration, BytesCodecConfigurationV1};
