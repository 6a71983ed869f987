//! Index insertion, lookup and traversal benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::thread;
use wordidx_bench::{build_index, vocabulary, zipf_stream};
use wordidx_core::{Config, Index, TraversalEngine};

/// Benchmark single-threaded adds.
fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");
    let vocab = vocabulary(5_000, 1);

    for count in [1_000, 10_000, 100_000].iter() {
        let stream = zipf_stream(&vocab, *count, 2);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("one_by_one", count), &stream, |b, stream| {
            b.iter(|| {
                let index = Index::new();
                for token in stream {
                    index.add(black_box(token)).unwrap();
                }
                black_box(index.size());
            });
        });
        group.bench_with_input(BenchmarkId::new("add_all", count), &stream, |b, stream| {
            b.iter(|| {
                let index = Index::new();
                index.add_all(black_box(stream)).unwrap();
                black_box(index.size());
            });
        });
    }

    group.finish();
}

/// Benchmark adds from several threads into one index.
fn bench_concurrent_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_add");
    let vocab = vocabulary(5_000, 3);
    let per_thread = 10_000;

    for threads in [1, 2, 4, 8].iter() {
        let streams: Vec<Arc<Vec<String>>> = (0..*threads)
            .map(|t| Arc::new(zipf_stream(&vocab, per_thread, 10 + t as u64)))
            .collect();
        group.throughput(Throughput::Elements((threads * per_thread) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &streams, |b, streams| {
            b.iter(|| {
                let index = Arc::new(Index::new());
                let handles: Vec<_> = streams
                    .iter()
                    .map(|stream| {
                        let index = Arc::clone(&index);
                        let stream = Arc::clone(stream);
                        thread::spawn(move || {
                            for token in stream.iter() {
                                index.add(token).unwrap();
                            }
                        })
                    })
                    .collect();
                for h in handles {
                    h.join().unwrap();
                }
                black_box(index.size());
            });
        });
    }

    group.finish();
}

/// Benchmark point lookups.
fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    let vocab = vocabulary(20_000, 4);
    let index = build_index(&vocab);

    group.bench_function("hit", |b| {
        let mut i = 0;
        b.iter(|| {
            let token = &vocab[i % vocab.len()];
            i += 1;
            black_box(index.get(black_box(token)).unwrap());
        });
    });
    group.bench_function("miss", |b| {
        b.iter(|| black_box(index.get(black_box("zzzzzzzzzzzz")).unwrap()));
    });

    group.finish();
}

/// Benchmark flatten across pool sizes.
fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");
    let index = build_index(&vocabulary(50_000, 5));
    group.throughput(Throughput::Elements(index.stats().distinct_tokens as u64));

    for threads in [1, 2, 4, 8].iter() {
        let engine = TraversalEngine::new(&Config::new().worker_threads(*threads)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(threads), &engine, |b, engine| {
            b.iter(|| black_box(engine.flatten(&index)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_add,
    bench_concurrent_add,
    bench_get,
    bench_flatten
);
criterion_main!(benches);
