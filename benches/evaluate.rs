//! Benchmarks for timeline evaluation.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use keyline::{
    compute::{Timeline, sample_times},
    schema::InterpolationKind,
};

fn build_timeline(points: usize, dimensions: usize, kind: InterpolationKind) -> Timeline {
    let mut timeline = Timeline::new(dimensions);
    for i in 0..points {
        let t = i as f64 * 0.25;
        let value: Vec<f64> = (0..dimensions)
            .map(|d| ((i * 7 + d * 3) % 11) as f64 * 0.1)
            .collect();
        timeline.add(t, value, kind);
    }
    timeline.recompute_tangents();
    timeline
}

fn bench_get_by_kind(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_by_kind");

    for kind in InterpolationKind::ALL {
        let timeline = build_timeline(1000, 4, kind);
        let mut out = vec![0.0; 4];

        group.bench_with_input(
            BenchmarkId::from_parameter(kind.persistent_name()),
            &kind,
            |b, _| {
                let mut t = 0.0;
                b.iter(|| {
                    t = (t + 0.013) % 250.0;
                    timeline.get_into(black_box(t), &mut out);
                    black_box(&out);
                });
            },
        );
    }

    group.finish();
}

fn bench_get_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_by_size");

    for points in [10, 100, 1_000, 10_000, 100_000] {
        let timeline = build_timeline(points, 1, InterpolationKind::Spline6);
        let span = timeline.time_max();
        let mut out = [0.0];

        group.bench_with_input(BenchmarkId::from_parameter(points), &points, |b, _| {
            let mut t = 0.0;
            b.iter(|| {
                t = (t + 0.37) % span.max(1.0);
                timeline.get_into(black_box(t), &mut out);
                black_box(out[0]);
            });
        });
    }

    group.finish();
}

fn bench_sample_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_many");
    group.sample_size(20);

    let timeline = build_timeline(10_000, 3, InterpolationKind::Symmetric);
    for samples in [1_000, 10_000, 100_000] {
        let times = sample_times(0.0, timeline.time_max(), samples);

        group.bench_with_input(BenchmarkId::from_parameter(samples), &times, |b, times| {
            b.iter(|| black_box(timeline.sample_many(black_box(times))));
        });
    }

    group.finish();
}

fn bench_add_points(c: &mut Criterion) {
    c.bench_function("add_10000_points", |b| {
        b.iter(|| black_box(build_timeline(10_000, 2, InterpolationKind::Hermite)));
    });
}

criterion_group!(
    benches,
    bench_get_by_kind,
    bench_get_by_size,
    bench_sample_many,
    bench_add_points
);
criterion_main!(benches);
