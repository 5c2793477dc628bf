//! Greedy point-density reduction.
//!
//! Stations are visited in input order and kept when no previously kept
//! station lies closer than the minimum separation. Kept stations go into an
//! R-tree so each candidate only checks its immediate neighbourhood. The
//! result depends on input order: a station rejected early is never
//! reconsidered, even if the station that blocked it is later found to be
//! isolated.

use projection::{MapProjection, ProjectedPoint};
use rstar::RTree;
use station_common::Observation;
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// Thin observations so that no two kept stations are closer than
/// `min_separation` metres in the given projection.
///
/// The output is a subsequence of the input: order and field values are
/// preserved. A separation of zero or less keeps everything.
pub fn reduce(
    observations: &[Observation],
    projection: &MapProjection,
    min_separation: f64,
) -> Result<Vec<Observation>> {
    let points = observations
        .iter()
        .map(|obs| projection.project(obs.longitude, obs.latitude))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let keep = reduce_points(&points, min_separation)?;

    let reduced: Vec<Observation> = observations
        .iter()
        .zip(&keep)
        .filter(|(_, &kept)| kept)
        .map(|(obs, _)| obs.clone())
        .collect();

    debug!(
        input = observations.len(),
        kept = reduced.len(),
        min_separation = min_separation,
        "Reduced station density"
    );

    Ok(reduced)
}

/// Compute a keep-mask for already projected points.
///
/// `mask[i]` is true when point `i` survives the greedy pass.
pub fn reduce_points(points: &[ProjectedPoint], min_separation: f64) -> Result<Vec<bool>> {
    if min_separation.is_nan() {
        return Err(AnalysisError::invalid_parameter(
            "minimum separation is NaN",
        ));
    }
    if let Some((index, point)) = points.iter().enumerate().find(|(_, p)| !p.is_finite()) {
        return Err(AnalysisError::invalid_input(format!(
            "point {} has non-finite coordinates ({}, {})",
            index, point.x, point.y
        )));
    }

    if min_separation <= 0.0 {
        return Ok(vec![true; points.len()]);
    }
    if min_separation == f64::INFINITY {
        return Ok((0..points.len()).map(|i| i == 0).collect());
    }

    let radius_2 = min_separation * min_separation;
    let mut accepted: RTree<[f64; 2]> = RTree::new();
    let mut mask = Vec::with_capacity(points.len());

    for point in points {
        let candidate = [point.x, point.y];
        // The tree query is inclusive, acceptance at exactly the separation is not blocked
        let blocked = accepted
            .locate_within_distance(candidate, radius_2)
            .any(|kept| squared_distance(kept, &candidate) < radius_2);

        if !blocked {
            accepted.insert(candidate);
        }
        mask.push(!blocked);
    }

    Ok(mask)
}

fn squared_distance(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}
