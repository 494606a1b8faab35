//! Benchmarks for pointer nearest-point lookup

use chart_interact_core::nearest::DEFAULT_TIME_FIELD;
use chart_interact_core::{nearest_by_euclidean, nearest_by_time, LinearTimeScale};
use chart_interact_shared::{DataRecord, ScreenPoint};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;

fn generate_points(count: usize) -> Vec<ScreenPoint> {
    (0..count)
        .map(|i| {
            let x = i as f64 * 0.5;
            ScreenPoint::new(x, (x * 0.01).sin() * 200.0 + 250.0)
        })
        .collect()
}

fn generate_series(count: usize) -> Vec<DataRecord> {
    (0..count)
        .map(|i| {
            DataRecord::try_from(json!({ "time": i as f64 * 60_000.0, "value": i % 97 }))
                .unwrap_or_default()
        })
        .collect()
}

fn bench_euclidean(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_by_euclidean");

    for size in [1_000, 10_000, 100_000] {
        let points = generate_points(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| {
                let found = nearest_by_euclidean(black_box(412.0), black_box(180.0), points);
                black_box(found);
            });
        });
    }

    group.finish();
}

fn bench_time_bisect(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_by_time");

    for size in [1_000, 100_000, 1_000_000] {
        let series = generate_series(size);
        let end = (size - 1) as f64 * 60_000.0;
        let scale = LinearTimeScale::new((0.0, end), (0.0, 1200.0));

        group.bench_with_input(BenchmarkId::from_parameter(size), &series, |b, series| {
            b.iter(|| {
                let found = nearest_by_time(black_box(733.3), &scale, series, DEFAULT_TIME_FIELD);
                black_box(found);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_euclidean, bench_time_bisect);
criterion_main!(benches);
