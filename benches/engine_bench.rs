// History building and full engine benchmarks

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use linefate::repository::NoopProgress;
use linefate::{AnalysisConfig, Engine, History};
use std::hint::black_box;

mod common;

fn bench_build_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_build");
    group.sample_size(20);
    for commits in [100, 500] {
        let source = common::generate_history(commits, 20, 200);
        group.bench_with_input(BenchmarkId::new("commits", commits), &source, |b, source| {
            b.iter(|| black_box(History::build(source, &NoopProgress).unwrap()));
        });
    }
    group.finish();
}

fn bench_engine_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_run");
    group.sample_size(20);
    let engine = Engine::new(AnalysisConfig::default()).unwrap();
    for commits in [100, 500, 2_000] {
        let source = common::generate_history(commits, 40, 200);
        let history = History::build(&source, &NoopProgress).unwrap();
        group.bench_with_input(BenchmarkId::new("commits", commits), &history, |b, history| {
            b.iter(|| black_box(engine.run(history)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_history, bench_engine_run);
criterion_main!(benches);
