use criterion::{
    criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion, PlotConfiguration,
    Throughput,
};
use zarrs_engine::array_subset::ArraySubset;

fn array_subset_bytes(c: &mut Criterion) {
    let plot_config = PlotConfiguration::default().summary_scale(AxisScale::Logarithmic);
    let mut group = c.benchmark_group("array_subset_bytes");
    group.plot_config(plot_config);

    for size in [32u64, 64, 128] {
        let array_shape = vec![size * 2; 3];
        let bytes = vec![0u8; usize::try_from(array_shape.iter().product::<u64>()).unwrap()];
        let subset = ArraySubset::new_with_start_shape(vec![size / 2; 3], vec![size; 3]).unwrap();
        let subset_bytes = subset.extract_bytes(&bytes, &array_shape, 1).unwrap();
        group.throughput(Throughput::Bytes(subset.num_elements()));
        group.bench_function(BenchmarkId::new("extract_bytes", size), |b| {
            b.iter(|| subset.extract_bytes(&bytes, &array_shape, 1).unwrap());
        });
        group.bench_function(BenchmarkId::new("store_bytes", size), |b| {
            let mut bytes = bytes.clone();
            b.iter(|| {
                subset
                    .store_bytes(&subset_bytes, &mut bytes, &array_shape, 1)
                    .unwrap();
            });
        });
    }
}

fn array_subset_chunks(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_subset_chunks");
    let chunk_shape = vec![16u64; 3];
    for size in [128u64, 512, 1024] {
        let subset = ArraySubset::new_with_start_shape(vec![3; 3], vec![size; 3]).unwrap();
        group.bench_function(BenchmarkId::new("iter_chunks", size), |b| {
            b.iter(|| subset.iter_chunks(&chunk_shape).unwrap().count());
        });
    }
}

criterion_group!(benches, array_subset_bytes, array_subset_chunks);
criterion_main!(benches);
