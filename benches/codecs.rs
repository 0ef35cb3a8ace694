use std::num::NonZeroU64;

use criterion::{
    criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion, PlotConfiguration,
    Throughput,
};
use zarrs_engine::array::{
    codec::{ArrayCodecTraits, BytesCodec, BytesToBytesCodecTraits},
    BytesRepresentation, ChunkRepresentation, DataType, Endianness, FillValue,
};

fn u16_representation(num_elements: u64) -> ChunkRepresentation {
    ChunkRepresentation::new(
        vec![NonZeroU64::new(num_elements).unwrap()],
        DataType::UInt16,
        FillValue::from(0u16),
    )
    .unwrap()
}

fn codec_bytes(c: &mut Criterion) {
    let plot_config = PlotConfiguration::default().summary_scale(AxisScale::Logarithmic);
    let mut group = c.benchmark_group("codec_bytes");
    group.plot_config(plot_config);

    // Byte swapping only happens for the non-native endianness
    let codec = if Endianness::Little.is_native() {
        BytesCodec::big()
    } else {
        BytesCodec::little()
    };

    for size in [32u64, 64, 128, 256] {
        let size3 = size * size * size;
        let representation = u16_representation(size3 / 2);
        let data = vec![0u8; usize::try_from(size3).unwrap()];
        group.throughput(Throughput::Bytes(size3));
        group.bench_function(BenchmarkId::new("encode", size3), |b| {
            b.iter(|| codec.encode(data.clone(), &representation).unwrap());
        });
        group.bench_function(BenchmarkId::new("decode", size3), |b| {
            b.iter(|| codec.decode(data.clone(), &representation).unwrap());
        });
    }
}

fn bytes_to_bytes_codecs() -> Vec<(&'static str, Box<dyn BytesToBytesCodecTraits>)> {
    #[allow(unused_mut)]
    let mut codecs: Vec<(&'static str, Box<dyn BytesToBytesCodecTraits>)> = vec![];
    #[cfg(feature = "gzip")]
    codecs.push((
        "gzip",
        Box::new(zarrs_engine::array::codec::GzipCodec::new(5).unwrap()),
    ));
    #[cfg(feature = "zstd")]
    codecs.push((
        "zstd",
        Box::new(zarrs_engine::array::codec::ZstdCodec::new(5, false)),
    ));
    #[cfg(feature = "blosc")]
    codecs.push((
        "blosc",
        Box::new(
            zarrs_engine::array::codec::BloscCodec::new(
                zarrs_engine::array::codec::BloscCompressor::BloscLZ,
                5u8.try_into().unwrap(),
                0,
                zarrs_engine::array::codec::BloscShuffleMode::BitShuffle,
                2,
            )
            .unwrap(),
        ),
    ));
    #[cfg(feature = "crc32c")]
    codecs.push((
        "crc32c",
        Box::new(zarrs_engine::array::codec::Crc32cCodec::new()),
    ));
    codecs
}

fn codec_compressors(c: &mut Criterion) {
    for (name, codec) in bytes_to_bytes_codecs() {
        let plot_config = PlotConfiguration::default().summary_scale(AxisScale::Logarithmic);
        let mut group = c.benchmark_group(format!("codec_{name}"));
        group.plot_config(plot_config);

        for size in [32u64, 64, 128] {
            let size3 = size * size * size;
            let data: Vec<u8> = (0..size3).map(|i| (i % 7) as u8).collect();
            let encoded = codec.encode(data.clone()).unwrap();
            let representation = BytesRepresentation::FixedSize(size3);
            group.throughput(Throughput::Bytes(size3));
            group.bench_function(BenchmarkId::new("encode", size3), |b| {
                b.iter(|| codec.encode(data.clone()).unwrap());
            });
            group.bench_function(BenchmarkId::new("decode", size3), |b| {
                b.iter(|| codec.decode(encoded.clone(), &representation).unwrap());
            });
        }
    }
}

#[cfg(feature = "sharding")]
fn codec_sharding(c: &mut Criterion) {
    use zarrs_engine::array::codec::{ArrayToBytesCodecTraits, ShardingCodecBuilder};
    use zarrs_engine::array_subset::ArraySubset;

    let plot_config = PlotConfiguration::default().summary_scale(AxisScale::Logarithmic);
    let mut group = c.benchmark_group("codec_sharding");
    group.plot_config(plot_config);

    let codec = ShardingCodecBuilder::new(vec![32, 32, 32].try_into().unwrap()).build();
    for size in [64u64, 128] {
        let representation = ChunkRepresentation::new(
            vec![NonZeroU64::new(size).unwrap(); 3],
            DataType::UInt8,
            FillValue::from(0u8),
        )
        .unwrap();
        let size3 = size * size * size;
        let data: Vec<u8> = (0..size3).map(|i| (i % 251) as u8).collect();
        let encoded = codec.encode(data.clone(), &representation).unwrap();
        group.throughput(Throughput::Bytes(size3));
        group.bench_function(BenchmarkId::new("encode", size3), |b| {
            b.iter(|| codec.encode(data.clone(), &representation).unwrap());
        });
        group.bench_function(BenchmarkId::new("par_encode", size3), |b| {
            b.iter(|| codec.par_encode(data.clone(), &representation).unwrap());
        });
        group.bench_function(BenchmarkId::new("decode", size3), |b| {
            b.iter(|| codec.decode(encoded.clone(), &representation).unwrap());
        });
        group.bench_function(BenchmarkId::new("partial_decode", size3), |b| {
            let subset = ArraySubset::new_with_ranges(&[1..17, 1..17, 1..17]);
            b.iter(|| {
                codec
                    .partial_decoder(
                        Box::new(std::io::Cursor::new(encoded.as_slice())),
                        &representation,
                    )
                    .unwrap()
                    .partial_decode(&[subset.clone()])
                    .unwrap()
            });
        });
    }
}

#[cfg(feature = "sharding")]
criterion_group!(benches, codec_bytes, codec_compressors, codec_sharding);
#[cfg(not(feature = "sharding"))]
criterion_group!(benches, codec_bytes, codec_compressors);
criterion_main!(benches);
