//! Storage backend read benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sparklog_bench::utils::random_data;
use sparklog_storage::{FileBackend, InMemoryBackend, StorageBackend};
use tempfile::TempDir;

fn backend_data(size: usize) -> Vec<u8> {
    random_data(&mut StdRng::seed_from_u64(7), size)
}

/// Benchmark InMemoryBackend read operations.
fn bench_inmemory_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("inmemory_read");

    for size in [17, 256, 4096, 65536].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let backend = InMemoryBackend::with_data(backend_data(size));

            b.iter(|| {
                let result = backend.read_at(black_box(0), black_box(size)).unwrap();
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark FileBackend read operations.
fn bench_file_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_read");

    // Use larger sample size for file operations
    group.sample_size(50);

    for size in [17, 256, 4096, 65536].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("bench.splog");
            std::fs::write(&path, backend_data(size)).unwrap();

            let backend = FileBackend::open_read_only(&path).unwrap();

            b.iter(|| {
                let result = backend.read_at(black_box(0), black_box(size)).unwrap();
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark random read pattern (like hash lookups).
fn bench_random_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_read");

    let record_size = 256;
    let record_count = 1000;
    let data = backend_data(record_size * record_count);

    group.bench_function("inmemory_1000_records", |b| {
        let backend = InMemoryBackend::with_data(data.clone());
        let mut rng = StdRng::seed_from_u64(11);

        b.iter(|| {
            let offset = (rng.gen_range(0..record_count) * record_size) as u64;
            let result = backend.read_at(black_box(offset), black_box(record_size)).unwrap();
            black_box(result);
        });
    });

    group.bench_function("file_1000_records", |b| {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bench.splog");
        std::fs::write(&path, &data).unwrap();
        let backend = FileBackend::open_read_only(&path).unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        b.iter(|| {
            let offset = (rng.gen_range(0..record_count) * record_size) as u64;
            let result = backend.read_at(black_box(offset), black_box(record_size)).unwrap();
            black_box(result);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_inmemory_read,
    bench_file_read,
    bench_random_read,
);

criterion_main!(benches);
