//! Benchmarks for density reduction and interpolation.
//!
//! Run with: cargo bench --package station-analysis --bench analysis_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use projection::{ProjectedPoint, ProjectionDefinition};
use station_analysis::{
    interpolate, reduce, reduce_points, InterpolationMethod, InterpolationParams, RbfFunction,
};
use test_utils::{observation_lattice, pressure_bowl_values, station_lattice};

fn planar(coords: &[(f64, f64)]) -> Vec<ProjectedPoint> {
    coords.iter().map(|&(x, y)| ProjectedPoint::new(x, y)).collect()
}

// =============================================================================
// REDUCTION BENCHMARKS
// =============================================================================

fn bench_reduce_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce_points");

    for side in [20usize, 50, 100] {
        let points = planar(&station_lattice(side, side, 10_000.0));
        group.throughput(Throughput::Elements(points.len() as u64));

        for separation in [25_000.0, 100_000.0] {
            group.bench_with_input(
                BenchmarkId::new(format!("sep_{}km", separation / 1000.0), side * side),
                &points,
                |b, points| b.iter(|| reduce_points(black_box(points), black_box(separation))),
            );
        }
    }

    group.finish();
}

fn bench_reduce_observations(c: &mut Criterion) {
    let projection = ProjectionDefinition::europe().build().unwrap();
    // Roughly the METAR density over Europe
    let observations = observation_lattice(-5.5, 42.0, 75, 40, 0.5);

    c.bench_function("reduce_europe_180km", |b| {
        b.iter(|| reduce(black_box(&observations), &projection, black_box(180_000.0)))
    });
}

// =============================================================================
// INTERPOLATION BENCHMARKS
// =============================================================================

fn bench_interpolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate");

    let coords = station_lattice(30, 30, 60_000.0);
    let values = pressure_bowl_values(&coords, (900_000.0, 900_000.0), 25.0, 40_000.0);
    let points = planar(&coords);

    let methods = [
        ("cressman", InterpolationMethod::Cressman),
        ("inverse_distance", InterpolationMethod::InverseDistance),
        (
            "barnes_two_pass",
            InterpolationMethod::Barnes {
                kappa: 5e9,
                gamma: Some(0.25),
            },
        ),
        (
            "rbf_multiquadric",
            InterpolationMethod::Rbf {
                function: RbfFunction::Multiquadric,
                smooth: 0.0,
            },
        ),
    ];

    for (name, method) in methods {
        let params = InterpolationParams {
            method,
            ..InterpolationParams::default()
        };
        group.bench_with_input(BenchmarkId::new("method", name), &params, |b, params| {
            b.iter(|| interpolate(black_box(&points), black_box(&values), params))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_reduce_points,
    bench_reduce_observations,
    bench_interpolate,
);
criterion_main!(benches);
