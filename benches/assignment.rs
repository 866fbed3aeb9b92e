//! Assignment benchmarks
//!
//! Measures the per-call cost of bucketing: hash, normalize, cumulative walk.
//!
//! Run with: cargo bench --bench assignment

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use variant_bucketing::assign::{bucket_hash, VariantAssigner};
use variant_bucketing::registry::{Experiment, ExperimentRegistry};

fn experiment_with(variant_count: usize) -> Experiment {
    #[allow(clippy::cast_precision_loss)]
    let weight = 1.0 / variant_count as f64;
    let mut builder = Experiment::builder(format!("exp-{variant_count}"), "bench");
    for i in 0..variant_count {
        builder = builder.variant(format!("v{i}"), format!("Variant {i}"), weight);
    }
    builder.build()
}

/// Benchmark the raw rolling hash
fn bench_hash(c: &mut Criterion) {
    c.bench_function("bucket_hash", |b| {
        b.iter(|| bucket_hash(black_box("user_Q3fz81LkPq0aZx7M"), black_box("heroCTA")));
    });
}

/// Benchmark deterministic assignment across variant counts
fn bench_assign(c: &mut Criterion) {
    let mut group = c.benchmark_group("assign_deterministic");

    for variant_count in [2usize, 3, 10, 50] {
        let experiment = experiment_with(variant_count);
        let id = experiment.id().to_string();
        let registry = ExperimentRegistry::builder()
            .experiment(experiment)
            .build()
            .expect("valid bench registry");
        let assigner = VariantAssigner::new(Arc::new(registry));

        group.bench_with_input(BenchmarkId::from_parameter(variant_count), &id, |b, id| {
            b.iter(|| assigner.assign(black_box(id), black_box(Some("user_Q3fz81LkPq0aZx7M"))));
        });
    }

    group.finish();
}

/// Benchmark the anonymous (random) path
fn bench_assign_anonymous(c: &mut Criterion) {
    let registry = ExperimentRegistry::builder()
        .experiment(experiment_with(3))
        .build()
        .expect("valid bench registry");
    let assigner = VariantAssigner::new(Arc::new(registry));

    c.bench_function("assign_anonymous", |b| {
        b.iter(|| assigner.assign(black_box("exp-3"), None));
    });
}

criterion_group!(benches, bench_hash, bench_assign, bench_assign_anonymous);
criterion_main!(benches);
