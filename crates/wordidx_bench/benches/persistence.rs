//! Collection write/read benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;
use wordidx_bench::build_collection;
use wordidx_core::{read_all, write_all, Config};
use wordidx_storage::{FileStore, MemoryStore};

/// Benchmark encoding and decoding collections in memory.
fn bench_memory_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_memory");

    for docs in [10, 100].iter() {
        let collection = build_collection(*docs, 2_000, 11);
        let store = MemoryStore::new();
        let bytes = write_all(&collection, &store).unwrap();
        group.throughput(Throughput::Bytes(bytes as u64));

        group.bench_with_input(BenchmarkId::new("write", docs), &collection, |b, collection| {
            b.iter(|| black_box(write_all(collection, &store).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("read", docs), &store, |b, store| {
            b.iter(|| black_box(read_all(store, &Config::default()).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark writing collections to disk.
fn bench_file_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_file");
    group.sample_size(20);

    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path().join("bench.wdx"));
    let collection = build_collection(50, 2_000, 12);

    group.bench_function("write", |b| {
        b.iter(|| black_box(write_all(&collection, &store).unwrap()));
    });
    group.bench_function("read", |b| {
        b.iter(|| black_box(read_all(&store, &Config::default()).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_memory_round_trip, bench_file_write);
criterion_main!(benches);
