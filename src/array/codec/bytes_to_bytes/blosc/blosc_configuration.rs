use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// A wrapper to handle various versions of `blosc` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display, From)]
#[serde(untagged)]
pub enum BloscCodecConfiguration {
    /// Version 1.0.
    V1(BloscCodecConfigurationV1),
}

/// Configuration parameters for the `blosc` codec (version 1.0).
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct BloscCodecConfigurationV1 {
    /// The compressor.
    pub cname: BloscCompressor,
    /// The compression level.
    pub clevel: BloscCompressionLevel,
    /// The shuffle mode.
    pub shuffle: BloscShuffleMode,
    /// The type size in bytes. Required unless the shuffle mode is `noshuffle`.
    #[serde(default)]
    pub typesize: usize,
    /// The compression block size. Automatically determined if zero.
    #[serde(default)]
    pub blocksize: usize,
}

/// The `blosc` shuffle mode.
#[derive(Serialize, Deserialize, Copy, Clone, Eq, PartialEq, Debug, Display)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum BloscShuffleMode {
    /// No shuffling.
    #[display("noshuffle")]
    NoShuffle = 0,
    /// Byte-wise shuffling.
    #[display("shuffle")]
    Shuffle = 1,
    /// Bit-wise shuffling.
    #[display("bitshuffle")]
    BitShuffle = 2,
}

/// The `blosc` compressor.
///
/// See <https://www.blosc.org/pages/>.
#[derive(Serialize, Deserialize, Copy, Clone, Eq, PartialEq, Debug, Display)]
#[serde(rename_all = "lowercase")]
pub enum BloscCompressor {
    /// [BloscLZ](https://github.com/Blosc/c-blosc/blob/master/blosc/blosclz.h): blosc default compressor, heavily based on [FastLZ](http://fastlz.org/).
    #[display("blosclz")]
    BloscLZ,
    /// [LZ4](http://fastcompression.blogspot.com/p/lz4.html): a compact, very popular and fast compressor.
    #[display("lz4")]
    LZ4,
    /// [LZ4HC](http://fastcompression.blogspot.com/p/lz4.html): a tweaked version of LZ4, produces better compression ratios at the expense of speed.
    #[display("lz4hc")]
    LZ4HC,
    /// [Snappy](https://code.google.com/p/snappy): a popular compressor used in many places.
    #[display("snappy")]
    Snappy,
    /// [Zlib](http://www.zlib.net/): a classic, achieves very good compression ratios but is slower.
    #[display("zlib")]
    Zlib,
    /// [Zstd](http://www.zstd.net/): an extremely well balanced codec.
    #[display("zstd")]
    Zstd,
}

impl BloscCompressor {
    /// The nul terminated compressor name passed to blosc.
    pub(super) const fn as_cstr(self) -> &'static [u8] {
        match self {
            Self::BloscLZ => b"blosclz\0",
            Self::LZ4 => b"lz4\0",
            Self::LZ4HC => b"lz4hc\0",
            Self::Snappy => b"snappy\0",
            Self::Zlib => b"zlib\0",
            Self::Zstd => b"zstd\0",
        }
    }
}

/// A `blosc` compression level. An integer from 0 to 9.
#[derive(Serialize, Copy, Clone, Eq, PartialEq, Debug)]
pub struct BloscCompressionLevel(u8);

impl TryFrom<u8> for BloscCompressionLevel {
    type Error = u8;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        if level <= 9 {
            Ok(Self(level))
        } else {
            Err(level)
        }
    }
}

impl<'de> serde::Deserialize<'de> for BloscCompressionLevel {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let number = serde_json::Number::deserialize(d)?;
        if let Some(number) = number.as_u64() {
            if number <= 9 {
                #[allow(clippy::cast_possible_truncation)]
                return Ok(Self(number as u8));
            }
        }
        Err(serde::de::Error::custom(
            "blosc clevel must be an integer between 0 and 9",
        ))
    }
}

impl BloscCompressionLevel {
    /// Return the compression level as a [`u8`].
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}
