// Line diff benchmarks

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use linefate::analysis::diff::{diff_lines, distance, lcs_len};
use std::hint::black_box;

mod common;

fn bench_lcs_len(c: &mut Criterion) {
    let mut group = c.benchmark_group("lcs_len");
    for size in [100, 1_000, 5_000] {
        let old = common::generate_lines(size, 1);
        let new = common::perturb(&old, 7, 2);
        group.bench_with_input(BenchmarkId::new("lines", size), &(old, new), |b, (old, new)| {
            b.iter(|| black_box(lcs_len(old, new)));
        });
    }
    group.finish();
}

fn bench_distance_identical(c: &mut Criterion) {
    // Prefix trimming makes this linear
    let lines = common::generate_lines(20_000, 3);
    c.bench_function("distance_identical_20k", |b| {
        b.iter(|| black_box(distance(&lines, &lines)));
    });
}

fn bench_diff_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_lines");
    for size in [100, 500, 2_000] {
        let old = common::generate_lines(size, 4);
        let new = common::perturb(&old, 5, 6);
        group.bench_with_input(BenchmarkId::new("lines", size), &(old, new), |b, (old, new)| {
            b.iter(|| black_box(diff_lines(old, new)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lcs_len, bench_distance_identical, bench_diff_lines);
criterion_main!(benches);
