//! Integration tests for station density reduction.

use projection::{ProjectedPoint, ProjectionDefinition};
use station_analysis::{reduce, reduce_points, AnalysisError};
use station_common::{Observation, ReportKind};
use test_utils::{alpine_metars, observation_lattice, station_lattice, stations};

fn planar(coords: &[(f64, f64)]) -> Vec<ProjectedPoint> {
    coords.iter().map(|&(x, y)| ProjectedPoint::new(x, y)).collect()
}

fn kept<'a>(mask: &[bool], coords: &'a [(f64, f64)]) -> Vec<&'a (f64, f64)> {
    coords.iter().zip(mask).filter(|(_, &k)| k).map(|(c, _)| c).collect()
}

// ============================================================================
// Greedy semantics
// ============================================================================

#[test]
fn test_three_points_on_a_line() {
    let coords = [(0.0, 0.0), (100.0, 0.0), (1000.0, 0.0)];
    let mask = reduce_points(&planar(&coords), 500.0).unwrap();
    assert_eq!(kept(&mask, &coords), vec![&(0.0, 0.0), &(1000.0, 0.0)]);
}

#[test]
fn test_input_order_changes_result() {
    // Middle station is within range of both ends, ends are far apart
    let ends_first = [(0.0, 0.0), (160.0, 0.0), (80.0, 0.0)];
    let middle_first = [(80.0, 0.0), (0.0, 0.0), (160.0, 0.0)];

    let mask = reduce_points(&planar(&ends_first), 100.0).unwrap();
    assert_eq!(kept(&mask, &ends_first), vec![&(0.0, 0.0), &(160.0, 0.0)]);

    let mask = reduce_points(&planar(&middle_first), 100.0).unwrap();
    assert_eq!(kept(&mask, &middle_first), vec![&(80.0, 0.0)]);
}

#[test]
fn test_reduction_is_idempotent() {
    let coords = station_lattice(20, 20, 37.0);
    let points = planar(&coords);
    let mask = reduce_points(&points, 100.0).unwrap();
    let thinned: Vec<ProjectedPoint> = points
        .iter()
        .zip(&mask)
        .filter(|(_, &k)| k)
        .map(|(p, _)| *p)
        .collect();

    let again = reduce_points(&thinned, 100.0).unwrap();
    assert!(again.iter().all(|&k| k));
}

#[test]
fn test_larger_separation_never_keeps_more() {
    let points = planar(&station_lattice(15, 10, 25.0));
    let mut previous = usize::MAX;
    for separation in [0.0, 10.0, 25.0, 40.0, 60.0, 100.0, 250.0, 1000.0] {
        let count = reduce_points(&points, separation)
            .unwrap()
            .iter()
            .filter(|&&k| k)
            .count();
        assert!(count <= previous, "separation {} kept {}", separation, count);
        previous = count;
    }
    assert_eq!(previous, 1);
}

#[test]
fn test_kept_points_respect_separation() {
    let points = planar(&station_lattice(12, 12, 30.0));
    let mask = reduce_points(&points, 75.0).unwrap();
    let kept: Vec<&ProjectedPoint> = points.iter().zip(&mask).filter(|(_, &k)| k).map(|(p, _)| p).collect();
    for (i, a) in kept.iter().enumerate() {
        for b in &kept[i + 1..] {
            assert!(a.distance_to(b) >= 75.0);
        }
    }
}

// ============================================================================
// Observations through a projection
// ============================================================================

#[test]
fn test_reduce_preserves_fields_and_order() {
    let projection = ProjectionDefinition::europe().build().unwrap();
    let input = alpine_metars();

    // Munich is ~130 km from Innsbruck, everything else is further apart
    let reduced = reduce(&input, &projection, 150_000.0).unwrap();
    let ids: Vec<&str> = reduced.iter().map(|o| o.station.as_str()).collect();
    assert_eq!(ids, vec!["LOWW", "LOWI", "LSZH"]);
    assert_eq!(reduced[0], input[0]);
    assert_eq!(reduced[2], input[3]);
}

#[test]
fn test_reduce_zero_separation_keeps_all() {
    let projection = ProjectionDefinition::europe().build().unwrap();
    let input = observation_lattice(10.0, 45.0, 5, 5, 0.01);
    assert_eq!(reduce(&input, &projection, 0.0).unwrap(), input);
}

#[test]
fn test_reduce_empty() {
    let projection = ProjectionDefinition::greenland().build().unwrap();
    assert!(reduce(&[], &projection, 50_000.0).unwrap().is_empty());
}

#[test]
fn test_reduce_coincident_stations() {
    let projection = ProjectionDefinition::south_polar().build().unwrap();
    let (id, lon, lat) = stations::SOUTH_POLE;
    let input: Vec<Observation> = (0..4)
        .map(|_| Observation::at(ReportKind::Synop, id, lon, lat))
        .collect();
    assert_eq!(reduce(&input, &projection, 110_000.0).unwrap().len(), 1);
}

#[test]
fn test_reduce_unprojectable_station_is_error() {
    let projection = ProjectionDefinition::north_polar().build().unwrap();
    let input = vec![Observation::at(ReportKind::Synop, "89009", 0.0, -90.0)];
    assert!(matches!(
        reduce(&input, &projection, 60_000.0),
        Err(AnalysisError::Projection(_))
    ));
}

#[test]
fn test_reduce_non_finite_position_is_error() {
    let projection = ProjectionDefinition::europe().build().unwrap();
    for (lon, lat) in [(f64::INFINITY, 50.0), (f64::NAN, 50.0), (10.0, f64::NEG_INFINITY)] {
        let input = vec![Observation::at(ReportKind::Metar, "XXXX", lon, lat)];
        assert!(matches!(
            reduce(&input, &projection, 1_000.0),
            Err(AnalysisError::Projection(_))
        ));
    }
}
