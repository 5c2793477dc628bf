//! Integration tests for scalar field interpolation.

use projection::ProjectedPoint;
use station_analysis::{
    interpolate, remove_missing, InterpolationMethod, InterpolationParams, RbfFunction,
};
use test_utils::{assert_approx_eq, linear_field, pressure_bowl, pressure_bowl_values, station_lattice};

fn planar(coords: &[(f64, f64)]) -> Vec<ProjectedPoint> {
    coords.iter().map(|&(x, y)| ProjectedPoint::new(x, y)).collect()
}

fn params(method: InterpolationMethod) -> InterpolationParams {
    InterpolationParams {
        method,
        search_radius: 250_000.0,
        min_neighbors: 1,
        resolution: 50_000.0,
        padding: 0.0,
    }
}

// ============================================================================
// Grid layout
// ============================================================================

#[test]
fn test_grid_spans_inputs_plus_padding() {
    let points = planar(&[(-120_000.0, 30_000.0), (240_000.0, 80_000.0)]);
    let p = InterpolationParams {
        padding: 100_000.0,
        ..params(InterpolationMethod::Cressman)
    };
    let grid = interpolate(&points, &[1000.0, 1010.0], &p).unwrap();

    assert_eq!(grid.x.first(), Some(&-220_000.0));
    assert!(*grid.x.last().unwrap() >= 340_000.0);
    assert_eq!(grid.y.first(), Some(&-70_000.0));
    assert!(*grid.y.last().unwrap() >= 180_000.0);
    assert_eq!(grid.values.len(), grid.nx() * grid.ny());
}

#[test]
fn test_single_observation_grid() {
    let grid = interpolate(
        &planar(&[(5.0, 5.0)]),
        &[999.0],
        &params(InterpolationMethod::Cressman),
    )
    .unwrap();
    assert_eq!(grid.nx(), 1);
    assert_eq!(grid.ny(), 1);
    assert_eq!(grid.get(0, 0), Some(999.0));
}

// ============================================================================
// Methods
// ============================================================================

#[test]
fn test_cressman_recovers_pressure_bowl() {
    let coords = station_lattice(11, 11, 100_000.0);
    let center = (500_000.0, 500_000.0);
    let values = pressure_bowl_values(&coords, center, 25.0, 40_000.0);
    let grid = interpolate(&planar(&coords), &values, &params(InterpolationMethod::Cressman)).unwrap();

    assert_eq!(grid.valid_count(), grid.values.len());
    let (lo, hi) = grid.value_range().unwrap();
    assert!(lo >= 988.0 - 1e-9);
    assert!(hi <= values.iter().cloned().fold(f64::MIN, f64::max) + 1e-9);

    // The analysed low sits at the centre of the bowl
    let centre_i = grid.x.iter().position(|&x| x == 500_000.0).unwrap();
    let centre_j = grid.y.iter().position(|&y| y == 500_000.0).unwrap();
    let centre_value = grid.get(centre_i, centre_j).unwrap();
    assert_eq!(grid.value_range().unwrap().0, centre_value);
    assert!(centre_value < pressure_bowl(0.0, 0.0, center, 25.0, 40_000.0));
}

#[test]
fn test_inverse_distance_exact_at_stations() {
    let coords = station_lattice(5, 5, 100_000.0);
    let values = linear_field(&coords, 1000.0, 1e-4, -5e-5);
    let grid = interpolate(
        &planar(&coords),
        &values,
        &params(InterpolationMethod::InverseDistance),
    )
    .unwrap();

    // Every second node coincides with a station
    for (k, &(x, y)) in coords.iter().enumerate() {
        let i = grid.x.iter().position(|&gx| gx == x).unwrap();
        let j = grid.y.iter().position(|&gy| gy == y).unwrap();
        assert_approx_eq!(grid.get(i, j).unwrap(), values[k], 1e-9);
    }
}

#[test]
fn test_rbf_linear_reproduces_stations() {
    let coords = station_lattice(4, 4, 100_000.0);
    let values = pressure_bowl_values(&coords, (150_000.0, 150_000.0), 10.0, 30_000.0);
    let p = params(InterpolationMethod::Rbf {
        function: RbfFunction::Linear,
        smooth: 0.0,
    });
    let grid = interpolate(&planar(&coords), &values, &p).unwrap();

    for (k, &(x, y)) in coords.iter().enumerate() {
        let i = grid.x.iter().position(|&gx| gx == x).unwrap();
        let j = grid.y.iter().position(|&gy| gy == y).unwrap();
        assert_approx_eq!(grid.get(i, j).unwrap(), values[k], 1e-6);
    }
}

#[test]
fn test_rbf_only_evaluated_near_observations() {
    let p = InterpolationParams {
        search_radius: 60_000.0,
        ..params(InterpolationMethod::Rbf {
            function: RbfFunction::Multiquadric,
            smooth: 0.0,
        })
    };
    let grid = interpolate(
        &planar(&[(0.0, 0.0), (500_000.0, 0.0)]),
        &[1000.0, 1020.0],
        &p,
    )
    .unwrap();
    assert!(grid.get(0, 0).is_some());
    assert_eq!(grid.get(5, 0), None);
    assert!(grid.get(10, 0).is_some());
}

#[test]
fn test_barnes_second_pass_fits_closer() {
    let coords = station_lattice(6, 6, 80_000.0);
    let values = pressure_bowl_values(&coords, (200_000.0, 200_000.0), 30.0, 20_000.0);
    let points = planar(&coords);

    let single = interpolate(
        &points,
        &values,
        &params(InterpolationMethod::Barnes {
            kappa: 1e10,
            gamma: None,
        }),
    )
    .unwrap();
    let double = interpolate(
        &points,
        &values,
        &params(InterpolationMethod::Barnes {
            kappa: 1e10,
            gamma: Some(0.3),
        }),
    )
    .unwrap();

    let error = |grid: &station_analysis::InterpolationGrid| -> f64 {
        coords
            .iter()
            .zip(&values)
            .map(|(&(x, y), v)| {
                let i = grid.x.iter().position(|&gx| gx == x).unwrap();
                let j = grid.y.iter().position(|&gy| gy == y).unwrap();
                (grid.get(i, j).unwrap() - v).abs()
            })
            .sum()
    };
    assert!(error(&double) < error(&single));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_input_order_only_affects_rounding() {
    let coords = station_lattice(7, 5, 90_000.0);
    let values = pressure_bowl_values(&coords, (270_000.0, 180_000.0), 15.0, 25_000.0);

    let mut rev_coords = coords.clone();
    rev_coords.reverse();
    let mut rev_values = values.clone();
    rev_values.reverse();

    let p = params(InterpolationMethod::Cressman);
    let a = interpolate(&planar(&coords), &values, &p).unwrap();
    let b = interpolate(&planar(&rev_coords), &rev_values, &p).unwrap();

    assert_eq!(a.x, b.x);
    assert_eq!(a.y, b.y);
    for (va, vb) in a.values.iter().zip(&b.values) {
        match (va, vb) {
            (Some(va), Some(vb)) => assert_approx_eq!(*va, *vb, 1e-9),
            (None, None) => {}
            other => panic!("mismatched node {:?}", other),
        }
    }
}

#[test]
fn test_remove_missing_then_interpolate() {
    let points = planar(&[(0.0, 0.0), (100_000.0, 0.0), (200_000.0, 0.0)]);
    let raw = [Some(1001.0), None, Some(1003.0)];
    let (points, values) = remove_missing(&points, &raw);
    assert_eq!(values, vec![1001.0, 1003.0]);

    let grid = interpolate(&points, &values, &params(InterpolationMethod::Cressman)).unwrap();
    assert_approx_eq!(grid.get(2, 0).unwrap(), 1002.0, 1e-9);
}
