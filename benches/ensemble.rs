use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use qprox::{
    base::{Ensemble, Representation, RepresentationKind},
    stats::{Limits, NormalDist1D},
};
use std::{hint::black_box, time::Duration};

const ENSEMBLE_SIZE: usize = 2_usize.pow(10);

fn normal_ensemble() -> Ensemble<f64> {
    let payload = (0..ENSEMBLE_SIZE)
        .map(|i| {
            Representation::Truth(
                NormalDist1D::new((i % 32) as f64 * 0.1, 1.0 + (i % 7) as f64 * 0.1).unwrap(),
            )
        })
        .collect();

    Ensemble::new(
        ENSEMBLE_SIZE,
        RepresentationKind::Truth,
        payload,
        Limits::new((-8.0, 12.0)).unwrap(),
        false,
    )
    .unwrap()
}

fn benchmark_ensemble_f64(c: &mut Criterion) {
    let points = (0..200).map(|i| -8.0 + i as f64 * 0.1).collect::<Vec<f64>>();

    let mut group = c.benchmark_group("ensemble_bench");

    group
        .significance_level(0.05)
        .sample_size(20)
        .measurement_time(Duration::from_secs(5));

    group.throughput(Throughput::Elements(ENSEMBLE_SIZE as u64));
    group.bench_function("ensemble_quantize", |b| {
        b.iter(|| {
            let mut ensemble = normal_ensemble();

            ensemble.quantize(black_box(20)).unwrap();
        });
    });

    group.throughput(Throughput::Elements((ENSEMBLE_SIZE * points.len()) as u64));
    group.bench_function("ensemble_evaluate", |b| {
        let mut ensemble = normal_ensemble();

        ensemble.quantize(20).unwrap();

        b.iter(|| {
            ensemble
                .evaluate(black_box(&points), RepresentationKind::Quantiles, false)
                .unwrap();
        });
    });

    group.throughput(Throughput::Elements(ENSEMBLE_SIZE as u64));
    group.bench_function("ensemble_sample", |b| {
        let mut ensemble = normal_ensemble();

        b.iter(|| {
            ensemble
                .sample(black_box(500), RepresentationKind::Truth, 42)
                .unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_ensemble_f64);
criterion_main!(benches);
