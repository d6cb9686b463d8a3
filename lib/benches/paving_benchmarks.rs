//! Paving benchmarks
//!
//! Run with: cargo bench

use bitpaver::geometry::{Point, Ring};
use bitpaver::{convex_hull, lift_point, Area, BorderPaver, Shape};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn circle_points(count: usize) -> Vec<Point> {
    Ring::circle(Point::zero(), 100.0, count).into_points()
}

fn hull_benchmark(c: &mut Criterion) {
    let points = circle_points(1000);
    c.bench_function("convex_hull_1000", |b| {
        b.iter(|| convex_hull(black_box(&points)))
    });
}

fn optimize_benchmark(c: &mut Criterion) {
    let ring = Ring::circle(Point::zero(), 100.0, 2000);
    let segments: Vec<(Point, Point)> = ring.edges().iter().map(|s| (s.start, s.end)).collect();
    c.bench_function("shape_optimize_2000", |b| {
        b.iter(|| {
            let mut shape = Shape::from_segments(segments.iter().copied()).unwrap();
            shape.optimize().map(|p| p.len()).unwrap()
        })
    });
}

fn paving_benchmark(c: &mut Criterion) {
    let shape = Shape::from_rings(&[
        Ring::circle(Point::zero(), 150.0, 360),
        Ring::circle(Point::zero(), 100.0, 360),
    ])
    .unwrap();
    let paver = BorderPaver::default();
    c.bench_function("pave_annulus", |b| {
        b.iter(|| paver.pave_shape(black_box(&shape)))
    });
}

fn lift_benchmark(c: &mut Criterion) {
    let area = Area::from_rings(&[
        Ring::rectangle(Point::new(0.0, 0.0), Point::new(120.0, 24.0)),
        Ring::rectangle(Point::new(40.0, 4.0), Point::new(80.0, 20.0)),
    ]);
    c.bench_function("lift_point_grid", |b| {
        b.iter(|| lift_point(black_box(&area), 5.0))
    });
}

criterion_group!(
    benches,
    hull_benchmark,
    optimize_benchmark,
    paving_benchmark,
    lift_benchmark
);
criterion_main!(benches);
