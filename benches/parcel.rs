//! Run these benches with `cargo bench --bench parcel -- --verbose`

use criterion::{criterion_group, criterion_main, Criterion};
use skewt_engine::DiagramConfig;

mod utils;

fn build_tester() -> Criterion {
    Criterion::default()
        .sample_size(200)
        .measurement_time(std::time::Duration::from_secs(10))
        .noise_threshold(0.03)
        .significance_level(0.01)
}

criterion_main!(parcel_benches);

criterion_group!(
    name = parcel_benches;
    config = build_tester();
    targets = mixed_layer_parcel_bench, most_unstable_parcel_bench, lift_parcel_bench,
              lift_parcel_virtual_bench
);

fn mixed_layer_parcel_bench(c: &mut Criterion) {
    let profiles = utils::load_all_test_files();

    c.bench_function("mixed_layer_parcel", |b| {
        b.iter(|| {
            for profile in &profiles {
                let _x = skewt_engine::mixed_layer_parcel(profile).expect("oops");
            }
        });
    });
}

// No bench for surface_parcel or pressure_parcel, they are trivial.

fn most_unstable_parcel_bench(c: &mut Criterion) {
    let profiles = utils::load_all_test_files();

    c.bench_function("most_unstable_parcel", |b| {
        b.iter(|| {
            for profile in &profiles {
                let _x = skewt_engine::most_unstable_parcel(profile).expect("oops");
            }
        });
    });
}

fn lift_parcel_bench(c: &mut Criterion) {
    let profiles = utils::load_all_test_files();
    let config = DiagramConfig::default();

    c.bench_function("lift_parcel", |b| {
        b.iter(|| {
            for profile in &profiles {
                let _x = skewt_engine::lift_parcel(profile, 0usize, &config).expect("oops");
            }
        });
    });
}

fn lift_parcel_virtual_bench(c: &mut Criterion) {
    let profiles = utils::load_all_test_files();
    let config = DiagramConfig {
        virtual_temperature: true,
        ..DiagramConfig::default()
    };

    c.bench_function("lift_parcel_virtual", |b| {
        b.iter(|| {
            for profile in &profiles {
                let _x = skewt_engine::lift_parcel(profile, 0usize, &config).expect("oops");
            }
        });
    });
}
