use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ptuplan_core::config::Configuration;
use ptuplan_core::rates::RateCatalog;
use ptuplan_core::Workload;

fn sample_workloads(n: usize) -> Vec<Workload> {
    let models = RateCatalog::builtin();
    let names = models.model_names();
    (0..n)
        .map(|i| {
            Workload::new(
                i as u32,
                format!("workload-{}", i),
                names[i % names.len()],
                [500.0, 800.0, 1200.0, 2500.0, 4000.0][i % 5],
                [200.0, 400.0, 600.0, 1000.0, 1500.0][i % 5],
                [10.0, 25.0, 40.0, 80.0, 120.0][i % 5],
                [6.0, 8.0, 10.0, 12.0, 18.0][i % 5],
            )
        })
        .collect()
}

fn bench_plan_100(c: &mut Criterion) {
    let config = Configuration::default();
    let catalog = RateCatalog::builtin();
    let workloads = sample_workloads(100);

    c.bench_function("plan_100_workloads", |b| {
        b.iter(|| {
            ptuplan_core::run_plan(
                black_box(&config),
                black_box(&workloads),
                black_box(&catalog),
            )
        })
    });
}

fn bench_compare_tiers_1k(c: &mut Criterion) {
    let config = Configuration::default();
    let catalog = RateCatalog::builtin();
    let workloads = sample_workloads(1_000);

    c.bench_function("compare_tiers_1k_workloads", |b| {
        b.iter(|| {
            ptuplan_core::compare_deployment_types(
                black_box(&config),
                black_box(&workloads),
                black_box(&catalog),
            )
        })
    });
}

criterion_group!(benches, bench_plan_100, bench_compare_tiers_1k);
criterion_main!(benches);
