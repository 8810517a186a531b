use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use rapm_design::synthetic::SyntheticBatch;
use rapm_design::{BuildOptions, NormalizeOptions, build_design, normalize};

fn bench_normalize(c: &mut Criterion) {
    let events = SyntheticBatch {
        events: 10_000,
        ..Default::default()
    }
    .generate();
    c.bench_function("normalize_10k", |b| {
        b.iter(|| {
            let batch = normalize(black_box(events.clone()), NormalizeOptions::default()).unwrap();
            black_box(batch.players().len());
        })
    });
}

fn bench_build_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_design_rows");
    for n in [1_000usize, 10_000, 50_000] {
        let events = SyntheticBatch {
            events: n,
            ..Default::default()
        }
        .generate();
        let batch = normalize(events, NormalizeOptions::default()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &batch, |b, batch| {
            b.iter(|| {
                let design = build_design(black_box(batch), BuildOptions::default()).unwrap();
                black_box(design.players.nnz());
            })
        });
    }
    group.finish();
}

fn bench_build_player_universe(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_design_players");
    for players in [500usize, 5_000, 50_000] {
        let events = SyntheticBatch {
            events: 10_000,
            players,
            ..Default::default()
        }
        .generate();
        let batch = normalize(events, NormalizeOptions::default()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(players), &batch, |b, batch| {
            b.iter(|| {
                let design = build_design(black_box(batch), BuildOptions::default()).unwrap();
                black_box(design.players.nnz());
            })
        });
    }
    group.finish();
}

fn bench_build_parallel(c: &mut Criterion) {
    let events = SyntheticBatch {
        events: 50_000,
        ..Default::default()
    }
    .generate();
    let batch = normalize(events, NormalizeOptions::default()).unwrap();
    let opts = BuildOptions {
        parallel: true,
        ..Default::default()
    };
    c.bench_function("build_design_parallel_50k", |b| {
        b.iter(|| {
            let design = build_design(black_box(&batch), opts).unwrap();
            black_box(design.rows());
        })
    });
}

criterion_group!(
    perf,
    bench_normalize,
    bench_build_rows,
    bench_build_player_universe,
    bench_build_parallel
);
criterion_main!(perf);
