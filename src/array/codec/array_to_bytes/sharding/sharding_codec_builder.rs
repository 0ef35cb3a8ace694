use crate::array::{
    codec::{
        ArrayToArrayCodecTraits, ArrayToBytesCodecTraits, BytesCodec, BytesToBytesCodecTraits,
        CodecChain,
    },
    ChunkShape,
};

use super::{ShardingCodec, ShardingIndexLocation};

/// A [`ShardingCodec`] builder.
///
/// By default, the inner chunks are encoded with the `bytes` codec with native endian encoding.
/// The index is encoded with the `bytes` codec with little endian encoding, additionally with the `crc32c` checksum codec (if the `crc32c` feature is enabled).
///
/// Use the methods in the `sharding` codec builder to change the configuration away from these defaults, and then build the `sharding` codec with [`build`](ShardingCodecBuilder::build).
#[derive(Debug)]
pub struct ShardingCodecBuilder {
    inner_chunk_shape: ChunkShape,
    index_array_to_bytes_codec: Box<dyn ArrayToBytesCodecTraits>,
    index_bytes_to_bytes_codecs: Vec<Box<dyn BytesToBytesCodecTraits>>,
    array_to_array_codecs: Vec<Box<dyn ArrayToArrayCodecTraits>>,
    array_to_bytes_codec: Box<dyn ArrayToBytesCodecTraits>,
    bytes_to_bytes_codecs: Vec<Box<dyn BytesToBytesCodecTraits>>,
    index_location: ShardingIndexLocation,
}

impl ShardingCodecBuilder {
    /// Create a new `sharding` codec builder.
    #[must_use]
    pub fn new(inner_chunk_shape: ChunkShape) -> Self {
        Self {
            inner_chunk_shape,
            index_array_to_bytes_codec: Box::new(BytesCodec::little()),
            index_bytes_to_bytes_codecs: vec![
                #[cfg(feature = "crc32c")]
                Box::new(crate::array::codec::Crc32cCodec::new()),
            ],
            array_to_array_codecs: Vec::default(),
            array_to_bytes_codec: Box::<BytesCodec>::default(),
            bytes_to_bytes_codecs: Vec::default(),
            index_location: ShardingIndexLocation::default(),
        }
    }

    /// Set the index array to bytes codec.
    ///
    /// If left unmodified, the index will be encoded with the `bytes` codec with little endian encoding.
    pub fn index_array_to_bytes_codec(
        &mut self,
        index_array_to_bytes_codec: Box<dyn ArrayToBytesCodecTraits>,
    ) -> &mut Self {
        self.index_array_to_bytes_codec = index_array_to_bytes_codec;
        self
    }

    /// Set the index bytes to bytes codecs.
    ///
    /// If left unmodified, the index will be encoded with the `crc32c` checksum codec (if supported).
    pub fn index_bytes_to_bytes_codecs(
        &mut self,
        index_bytes_to_bytes_codecs: Vec<Box<dyn BytesToBytesCodecTraits>>,
    ) -> &mut Self {
        self.index_bytes_to_bytes_codecs = index_bytes_to_bytes_codecs;
        self
    }

    /// Set the inner chunk array to array codecs.
    ///
    /// If left unmodified, no array to array codecs will be applied for the inner chunks.
    pub fn array_to_array_codecs(
        &mut self,
        array_to_array_codecs: Vec<Box<dyn ArrayToArrayCodecTraits>>,
    ) -> &mut Self {
        self.array_to_array_codecs = array_to_array_codecs;
        self
    }

    /// Set the inner chunk array to bytes codec.
    ///
    /// If left unmodified, the inner chunks will be encoded with the `bytes` codec with native endian encoding.
    /// A [`ShardingCodec`] can be used here to nest shards.
    pub fn array_to_bytes_codec(
        &mut self,
        array_to_bytes_codec: Box<dyn ArrayToBytesCodecTraits>,
    ) -> &mut Self {
        self.array_to_bytes_codec = array_to_bytes_codec;
        self
    }

    /// Set the inner chunk bytes to bytes codecs.
    ///
    /// If left unmodified, no bytes to bytes codecs will be applied for the inner chunks.
    pub fn bytes_to_bytes_codecs(
        &mut self,
        bytes_to_bytes_codecs: Vec<Box<dyn BytesToBytesCodecTraits>>,
    ) -> &mut Self {
        self.bytes_to_bytes_codecs = bytes_to_bytes_codecs;
        self
    }

    /// Set the index location.
    ///
    /// If left unmodified, defaults to the end of the shard.
    pub fn index_location(&mut self, index_location: ShardingIndexLocation) -> &mut Self {
        self.index_location = index_location;
        self
    }

    /// Build into a [`ShardingCodec`].
    #[must_use]
    pub fn build(&self) -> ShardingCodec {
        let inner_codecs = CodecChain::new(
            self.array_to_array_codecs.clone(),
            self.array_to_bytes_codec.clone(),
            self.bytes_to_bytes_codecs.clone(),
        );
        let index_codecs = CodecChain::new(
            vec![],
            self.index_array_to_bytes_codec.clone(),
            self.index_bytes_to_bytes_codecs.clone(),
        );
        ShardingCodec::new(
            self.inner_chunk_shape.clone(),
            inner_codecs,
            index_codecs,
            self.index_location,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU64;

    use crate::array::codec::CodecTraits;

    use super::*;

    #[test]
    fn sharding_codec_builder_defaults() {
        let codec = ShardingCodecBuilder::new(vec![NonZeroU64::new(2).unwrap(); 2].into()).build();
        let metadata = codec.create_metadata().unwrap();
        let configuration = metadata.configuration().unwrap();
        assert_eq!(configuration["chunk_shape"], serde_json::json!([2, 2]));
        assert_eq!(configuration["index_location"], serde_json::json!("end"));
        assert_eq!(
            configuration["index_codecs"][0],
            serde_json::json!({"name": "bytes", "configuration": {"endian": "little"}})
        );
        #[cfg(feature = "crc32c")]
        assert_eq!(configuration["index_codecs"][1], serde_json::json!("crc32c"));
    }

    #[test]
    fn sharding_codec_builder_index_location() {
        let mut builder = ShardingCodecBuilder::new(vec![NonZeroU64::new(2).unwrap(); 2].into());
        builder.index_location(ShardingIndexLocation::Start);
        builder.bytes_to_bytes_codecs(vec![
            #[cfg(feature = "gzip")]
            Box::new(crate::array::codec::GzipCodec::new(5).unwrap()),
        ]);
        let metadata = builder.build().create_metadata().unwrap();
        assert_eq!(
            metadata.configuration().unwrap()["index_location"],
            serde_json::json!("start")
        );
    }
}
