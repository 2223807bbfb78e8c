// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Benchmarks for capture index scans and batch writes.

use cdxdb::cdx::{url_key, CaptureRecord, CaptureTimestamp};
use cdxdb::index::{CaptureIndex, IndexConfig};
use cdxdb::scan::{Direction, IncludeAll, Limit};
use cdxdb::storage::RocksStore;
use cdxdb::CdxCodec;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use tempfile::TempDir;

const URLS: u32 = 1000;
const CAPTURES_PER_URL: u32 = 10;

fn capture(url: u32, n: u32) -> CaptureRecord {
    let original = format!("http://example.org/page{url:04}");
    CaptureRecord::from_cdx_line(&format!(
        "{} 2005{:02}01000000 {original} text/html 200 DIGEST{url}{n} - - 2201 {} IA-001.warc.gz",
        url_key(&original),
        n + 1,
        u64::from(url) * 10_000 + u64::from(n),
    ))
    .unwrap()
}

fn create_test_index() -> (CaptureIndex<RocksStore, CdxCodec>, TempDir) {
    let dir = TempDir::new().unwrap();
    let index = CaptureIndex::open(dir.path(), "captures", IndexConfig::default()).unwrap();
    (index, dir)
}

fn populated_index() -> (CaptureIndex<RocksStore, CdxCodec>, TempDir) {
    let (index, dir) = create_test_index();
    for url in 0..URLS {
        let batch: Vec<_> = (0..CAPTURES_PER_URL).map(|n| capture(url, n)).collect();
        index.write_all(&batch).unwrap();
    }
    (index, dir)
}

fn bench_scan(c: &mut Criterion) {
    let (index, _dir) = populated_index();

    let mut group = c.benchmark_group("scan");
    group.throughput(Throughput::Elements(100));

    for direction in [Direction::Forward, Direction::Backward] {
        group.bench_function(format!("{direction:?}_100").to_lowercase(), |b| {
            b.iter_batched(
                || format!("example.org/page{:04} ", rand::random::<u32>() % URLS),
                |start| {
                    index
                        .scan(start.as_bytes(), direction, &mut Limit::new(IncludeAll, 100))
                        .unwrap()
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let (index, _dir) = populated_index();
    let at = CaptureTimestamp::earliest("200506").unwrap();

    let mut group = c.benchmark_group("query");
    group.throughput(Throughput::Elements(1));

    group.bench_function("query_url", |b| {
        b.iter_batched(
            || format!("http://example.org/page{:04}", rand::random::<u32>() % URLS),
            |url| index.query_url(&url, None).unwrap(),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("closest_3", |b| {
        b.iter_batched(
            || format!("http://example.org/page{:04}", rand::random::<u32>() % URLS),
            |url| index.closest(&url, at, 3).unwrap(),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_write_all(c: &mut Criterion) {
    let (index, _dir) = create_test_index();

    let mut group = c.benchmark_group("batch");
    group.throughput(Throughput::Elements(u64::from(CAPTURES_PER_URL)));

    let counter = std::sync::atomic::AtomicU32::new(0);

    group.bench_function("write_all_10", |b| {
        b.iter_batched(
            || {
                let url = counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                (0..CAPTURES_PER_URL)
                    .map(|n| capture(url, n))
                    .collect::<Vec<_>>()
            },
            |batch| index.write_all(&batch).unwrap(),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_scan, bench_query, bench_write_all);
criterion_main!(benches);
