//! Encoder and decoder benchmarks through backing stores.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use largemsg_bench::utils::{file_factory, memory_factory, random_data};
use tempfile::tempdir;

const MAX_SIZE: usize = 16 * 1024;

/// Benchmark the inline and backed paths against the in-memory store.
fn bench_memory(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory");

    for size in [1024, MAX_SIZE + 1, 1024 * 1024] {
        let data = random_data(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("encode", size), &data, |b, data| {
            let (store, factory) = memory_factory(MAX_SIZE);
            let encoder = factory.encoder();
            b.iter(|| {
                let wire = encoder.encode("bench", Some(black_box(data)), false).unwrap();
                black_box(wire);
            });
            store.clear();
        });

        group.bench_with_input(BenchmarkId::new("decode", size), &data, |b, data| {
            let (_store, factory) = memory_factory(MAX_SIZE);
            let wire = factory.encoder().encode("bench", Some(data), false).unwrap();
            let decoder = factory.decoder();
            b.iter(|| black_box(decoder.decode(black_box(wire.as_deref())).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark the backed path against the file store.
fn bench_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("file");
    let dir = tempdir().unwrap();
    let factory = file_factory(dir.path(), MAX_SIZE);

    let data = random_data(256 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("encode", |b| {
        let encoder = factory.encoder();
        b.iter(|| black_box(encoder.encode("bench", Some(&data), false).unwrap()));
    });

    group.bench_function("decode", |b| {
        let wire = factory.encoder().encode("bench", Some(&data), false).unwrap();
        let decoder = factory.decoder();
        b.iter(|| black_box(decoder.decode(wire.as_deref()).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_memory, bench_file);
criterion_main!(benches);
