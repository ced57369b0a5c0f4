//! Throughput Benchmark for PebbleKV
//!
//! This benchmark measures the performance of the data store
//! under various workloads.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use pebblekv::storage::{expires_in, DataStore, SharedStore, Value};
use std::time::{Duration, SystemTime};

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let mut store = DataStore::new();

    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            store.set(format!("key:{}", i), "small_value", None);
            i += 1;
        });
    });

    group.bench_function("set_medium", |b| {
        let mut i = 0u64;
        let value = Value::from("x".repeat(1024)); // 1KB value
        b.iter(|| {
            store.set(format!("key:{}", i), value.clone(), None);
            i += 1;
        });
    });

    group.bench_function("set_hash", |b| {
        let mut i = 0u64;
        let value = Value::hash((0..16).map(|f| (format!("field:{}", f), f)));
        b.iter(|| {
            store.set(format!("hash:{}", i), value.clone(), None);
            i += 1;
        });
    });

    group.bench_function("overwrite", |b| {
        let mut i = 0u64;
        b.iter(|| {
            store.set("hot", i as i64, None);
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let mut store = DataStore::new();

    // Pre-populate with data
    for i in 0..100_000 {
        store.set(format!("key:{}", i), format!("value:{}", i), None);
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i % 100_000);
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("missing:{}", i);
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark mixed workload (80% reads, 20% writes)
fn bench_mixed(c: &mut Criterion) {
    let store = SharedStore::new();

    // Pre-populate
    for i in 0..10_000 {
        store.set(format!("key:{}", i), format!("value:{}", i), None);
    }

    let mut group = c.benchmark_group("mixed");
    group.throughput(Throughput::Elements(1));

    group.bench_function("80_read_20_write", |b| {
        let mut i = 0u64;
        b.iter(|| {
            if i % 5 == 0 {
                // 20% writes
                store.set(format!("new:{}", i), "value", None);
            } else {
                // 80% reads
                let key = format!("key:{}", i % 10_000);
                black_box(store.get(&key));
            }
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark concurrent access
fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("4_threads_mixed", |b| {
        b.iter(|| {
            let store = SharedStore::new();
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let store = store.clone();
                    thread::spawn(move || {
                        for i in 0..10_000 {
                            let key = format!("key:{}:{}", t, i);
                            store.set(key.as_str(), "value", None);
                            store.get(&key);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(store.len());
        });
    });

    group.finish();
}

/// Benchmark expiry operations
fn bench_expiry(c: &mut Criterion) {
    let mut group = c.benchmark_group("expiry");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_with_ttl", |b| {
        let mut store = DataStore::new();
        let mut i = 0u64;
        b.iter(|| {
            store.set(
                format!("key:{}", i),
                "value",
                expires_in(Duration::from_secs(3600)),
            );
            i += 1;
        });
    });

    group.bench_function("lazy_removal", |b| {
        let mut store = DataStore::new();
        let past = SystemTime::now() - Duration::from_secs(1);
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("gone:{}", i);
            store.set(key.as_str(), "value", Some(past));
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark KEYS pattern matching
fn bench_keys(c: &mut Criterion) {
    let mut store = DataStore::new();

    // Pre-populate with various key patterns
    for i in 0..1_000 {
        store.set(format!("user:{}", i), "user_data", None);
        store.set(format!("session:{}", i), "session_data", None);
        store.set(format!("cache:{}", i), "cache_data", None);
    }

    let mut group = c.benchmark_group("keys");

    group.bench_function("keys_pattern", |b| {
        b.iter(|| {
            black_box(store.keys("user:*"));
        });
    });

    group.bench_function("keys_class", |b| {
        b.iter(|| {
            black_box(store.keys("[us]*:1?"));
        });
    });

    group.bench_function("keys_all", |b| {
        b.iter(|| {
            black_box(store.keys("*"));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_set,
    bench_get,
    bench_mixed,
    bench_concurrent,
    bench_expiry,
    bench_keys,
);

criterion_main!(benches);
