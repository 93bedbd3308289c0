//! Benchmarks for dies-per-wafer packing.

use chipcost_core::{dies_per_wafer_grid, dies_per_wafer_line};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn bench_line_fill(c: &mut Criterion) {
    c.bench_function("line_fill_10mm_die_300mm_wafer", |b| {
        b.iter(|| dies_per_wafer_line(black_box(10.0), black_box(10.0), 300.0, 0.1));
    });
}

fn bench_grid_fill(c: &mut Criterion) {
    c.bench_function("grid_fill_10mm_die_300mm_wafer", |b| {
        b.iter(|| dies_per_wafer_grid(black_box(10.0), black_box(10.0), 300.0, 0.1));
    });
    c.bench_function("grid_fill_1mm_die_300mm_wafer", |b| {
        b.iter(|| dies_per_wafer_grid(black_box(1.0), black_box(1.0), 300.0, 0.1));
    });
}

criterion_group!(benches, bench_line_fill, bench_grid_fill);
criterion_main!(benches);
