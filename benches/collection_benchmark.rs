use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use luxdb::core::config::{Config, ResizePolicy};
use luxdb::core::types::Record;
use luxdb::memory::cache::RecordCache;
use luxdb::query::matcher::{Comparator, Matcher, Operand};
use luxdb::query::projection::project;
use luxdb::query::scan::select;
use luxdb::Collection;
use rand::Rng;
use serde_json::json;
use tokio::runtime::Runtime;

/// Helper to create test records
fn create_test_record(id: u64) -> Record {
    let mut rng = rand::thread_rng();
    let statuses = ["pending", "done", "blocked", "review"];

    let value = json!({
        "id": id.to_string(),
        "title": format!("Task {}", id),
        "status": statuses[rng.gen_range(0..statuses.len())],
        "priority": rng.gen_range(0..10),
        "author": {
            "name": format!("user_{}", id % 50),
            "team": format!("team_{}", id % 5),
        },
    });
    value.as_object().cloned().unwrap_or_default()
}

fn seeded_cache(size: u64, config: &Config) -> RecordCache {
    let mut cache = RecordCache::new(config);
    for id in 0..size {
        cache.insert(create_test_record(id)).unwrap();
    }
    cache
}

/// Benchmark indexed equality against a forced scan
fn bench_equality_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("equality_select");

    for size in [100u64, 1_000, 10_000].iter() {
        let config = Config {
            max_cache_size: *size as usize,
            ..Config::default()
        };
        let cache = seeded_cache(*size, &config);
        let target = (size / 2).to_string();

        let indexed = [Matcher::new("id", Comparator::Equals, Operand::Value(json!(target)))];
        group.bench_with_input(BenchmarkId::new("indexed", size), size, |b, _| {
            b.iter(|| black_box(select(&cache, &indexed, true).unwrap()));
        });

        // nested keys never take the index
        let scanned = [Matcher::new("author.name", Comparator::Equals, Operand::Value(json!("user_7")))];
        group.bench_with_input(BenchmarkId::new("scan", size), size, |b, _| {
            b.iter(|| black_box(select(&cache, &scanned, false).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark range and pattern comparators over a full scan
fn bench_comparators(c: &mut Criterion) {
    let config = Config {
        max_cache_size: 5_000,
        ..Config::default()
    };
    let cache = seeded_cache(5_000, &config);

    let between = [Matcher::new("priority", Comparator::Between, Operand::Value(json!([2, 7])))];
    c.bench_function("between_scan_5000", |b| {
        b.iter(|| black_box(select(&cache, &between, false).unwrap()));
    });

    let pattern = [Matcher::new("title", Comparator::Matches, Operand::Pattern(r"^Task 4\d+$".into()))];
    c.bench_function("matches_scan_5000", |b| {
        b.iter(|| black_box(select(&cache, &pattern, false).unwrap()));
    });
}

/// Benchmark insert under both resize policies
fn bench_cache_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_insert");

    for (label, resize) in [("fixed", ResizePolicy::Fixed), ("dynamic", ResizePolicy::default())] {
        group.bench_function(label, |b| {
            let mut cache = RecordCache::new(&Config {
                max_cache_size: 1_000,
                resize,
                ..Config::default()
            });
            let mut id = 0u64;
            b.iter(|| {
                cache.insert(create_test_record(id)).unwrap();
                id += 1;
            });
        });
    }

    group.finish();
}

fn bench_projection(c: &mut Criterion) {
    let record = create_test_record(42);
    let fields = ["title", "author.name", "status"];

    c.bench_function("project_three_paths", |b| {
        b.iter(|| black_box(project(&fields, &record).unwrap()));
    });
}

/// Benchmark batch insert followed by a durable flush
fn bench_collection_flush(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("insert_and_flush");
    group.sample_size(20);

    for batch_size in [10u64, 100, 1_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            batch_size,
            |b, &batch_size| {
                let dir = tempfile::tempdir().unwrap();
                let collection = rt
                    .block_on(Collection::open("bench", dir.path()))
                    .unwrap();
                let mut id_counter = 0u64;

                b.iter(|| {
                    let records: Vec<Record> = (0..batch_size)
                        .map(|_| {
                            let record = create_test_record(id_counter);
                            id_counter += 1;
                            record
                        })
                        .collect();

                    rt.block_on(async {
                        collection.insert_many(records).await.unwrap();
                        collection.flushed().await.unwrap();
                    });
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_equality_select,
    bench_comparators,
    bench_cache_insert,
    bench_projection,
    bench_collection_flush
);
criterion_main!(benches);
