//! Reconciliation and Apply Benchmarks
//!
//! Measures the pure prefix reconciliation over growing histories and a
//! full apply run against the in-memory tracking store.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench --bench reconcile
//!
//! # Only the pure reconciliation
//! cargo bench --bench reconcile -- reconcile
//! ```

use chrono::{Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pgmigrator::core::Applier;
use pgmigrator::prelude::*;
use std::hint::black_box;

fn migrations(count: usize) -> Vec<Migration> {
    (0..count)
        .map(|i| {
            Migration::new(
                format!("{:04}_migration", i),
                format!("CREATE TABLE t{} (id bigint primary key);", i),
                format!("DROP TABLE t{};", i),
            )
        })
        .collect()
}

fn applied(migrations: &[Migration]) -> Vec<AppliedRecord> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    migrations
        .iter()
        .enumerate()
        .map(|(i, m)| AppliedRecord::new(m.clone(), base + Duration::seconds(i as i64)))
        .collect()
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for size in [10, 100, 1_000] {
        let desired = migrations(size);
        let history = applied(&desired);

        group.bench_with_input(BenchmarkId::new("unchanged", size), &size, |b, _| {
            b.iter(|| reconcile(black_box(history.as_slice()), black_box(desired.as_slice())))
        });

        // Edit in the middle: half skipped, the rest removed and re-added
        let mut edited = desired.clone();
        let mid = size / 2;
        edited[mid] = Migration::new(edited[mid].name(), "SELECT 1;", "SELECT 1;");
        group.bench_with_input(BenchmarkId::new("diverged", size), &size, |b, _| {
            b.iter(|| reconcile(black_box(history.as_slice()), black_box(edited.as_slice())))
        });

        // Baseline trimmed to the last quarter
        let trimmed = desired[size - size / 4..].to_vec();
        group.bench_with_input(BenchmarkId::new("shrunk", size), &size, |b, _| {
            b.iter(|| reconcile(black_box(history.as_slice()), black_box(trimmed.as_slice())))
        });

        let empty: Vec<AppliedRecord> = Vec::new();
        group.bench_with_input(BenchmarkId::new("fresh", size), &size, |b, _| {
            b.iter(|| reconcile(black_box(empty.as_slice()), black_box(desired.as_slice())))
        });
    }

    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("apply");

    for size in [10, 100] {
        let desired = migrations(size);
        let history = applied(&desired);
        let mut edited = desired.clone();
        edited[0] = Migration::new(edited[0].name(), "SELECT 1;", "SELECT 1;");
        let actions = reconcile(&history, &edited);

        group.bench_with_input(BenchmarkId::new("memory_store", size), &size, |b, _| {
            b.to_async(&runtime).iter(|| async {
                let store = MemoryStore::with_records(history.clone());
                Applier::new(&history, &edited)
                    .apply_silent(&store, black_box(actions.as_slice()))
                    .await
                    .unwrap();
                store
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reconcile, bench_apply);
criterion_main!(benches);
