//! Scattered observations to regular grid interpolation.
//!
//! Every grid node gathers the observations within `search_radius`
//! (inclusive) and, when at least `max(min_neighbors, 1)` are found, combines
//! them with the selected method. Nodes failing the neighbour test carry no
//! data. The radial basis function method is fitted once over all
//! observations but is still only evaluated at nodes that pass the test.

mod rbf;
mod weights;

use projection::ProjectedPoint;
use rstar::primitives::GeomWithData;
use rstar::RTree;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::grid::{axis, InterpolationGrid};

pub use rbf::RbfFunction;

use rbf::RbfModel;
use weights::Neighbor;

/// Upper bound on grid nodes for a single request.
const MAX_GRID_NODES: f64 = 16_000_000.0;

/// How neighbouring observations are combined at a grid node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Weights `1 / d²`; a coincident observation gives its value exactly.
    InverseDistance,
    /// Weights `(R² - d²) / (R² + d²)`.
    Cressman,
    /// Gaussian weights `exp(-d² / kappa)`, with an optional second pass on
    /// the residuals using `kappa * gamma`.
    Barnes {
        kappa: f64,
        #[serde(default)]
        gamma: Option<f64>,
    },
    /// Global radial basis function fit.
    Rbf {
        #[serde(default)]
        function: RbfFunction,
        #[serde(default)]
        smooth: f64,
    },
}

/// Parameters for [`interpolate`].
///
/// Distances are in projected metres. The defaults match the sea level
/// pressure analysis of the SYNOP maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationParams {
    pub method: InterpolationMethod,
    pub search_radius: f64,
    pub min_neighbors: usize,
    pub resolution: f64,
    pub padding: f64,
}

impl Default for InterpolationParams {
    fn default() -> Self {
        Self {
            method: InterpolationMethod::Cressman,
            search_radius: 400_000.0,
            min_neighbors: 1,
            resolution: 100_000.0,
            padding: 0.0,
        }
    }
}

impl InterpolationParams {
    /// Check every parameter, failing on the first invalid one.
    pub fn validate(&self) -> Result<()> {
        if !(self.search_radius.is_finite() && self.search_radius > 0.0) {
            return Err(AnalysisError::invalid_parameter(format!(
                "search radius must be positive and finite, got {}",
                self.search_radius
            )));
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(AnalysisError::invalid_parameter(format!(
                "resolution must be positive and finite, got {}",
                self.resolution
            )));
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return Err(AnalysisError::invalid_parameter(format!(
                "padding must be non-negative and finite, got {}",
                self.padding
            )));
        }

        match self.method {
            InterpolationMethod::Barnes { kappa, gamma } => {
                if !(kappa.is_finite() && kappa > 0.0) {
                    return Err(AnalysisError::invalid_parameter(format!(
                        "Barnes kappa must be positive, got {}",
                        kappa
                    )));
                }
                if let Some(gamma) = gamma {
                    if !(gamma.is_finite() && gamma > 0.0) {
                        return Err(AnalysisError::invalid_parameter(format!(
                            "Barnes gamma must be positive, got {}",
                            gamma
                        )));
                    }
                }
            }
            InterpolationMethod::Rbf { smooth, .. } => {
                if !(smooth.is_finite() && smooth >= 0.0) {
                    return Err(AnalysisError::invalid_parameter(format!(
                        "RBF smoothing must be non-negative, got {}",
                        smooth
                    )));
                }
            }
            InterpolationMethod::InverseDistance | InterpolationMethod::Cressman => {}
        }

        Ok(())
    }
}

/// Drop observations whose value or position is missing or non-finite.
///
/// Returns the surviving points and their values, in input order.
pub fn remove_missing(
    points: &[ProjectedPoint],
    values: &[Option<f64>],
) -> (Vec<ProjectedPoint>, Vec<f64>) {
    points
        .iter()
        .zip(values)
        .filter_map(|(point, value)| match value {
            Some(v) if v.is_finite() && point.is_finite() => Some((*point, *v)),
            _ => None,
        })
        .unzip()
}

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Interpolate scattered values onto a regular grid.
///
/// The grid spans the bounding box of `points` expanded by `params.padding`
/// on every side. Zero input points produce an empty grid.
pub fn interpolate(
    points: &[ProjectedPoint],
    values: &[f64],
    params: &InterpolationParams,
) -> Result<InterpolationGrid> {
    params.validate()?;

    if points.len() != values.len() {
        return Err(AnalysisError::invalid_input(format!(
            "{} points but {} values",
            points.len(),
            values.len()
        )));
    }
    for (index, (point, value)) in points.iter().zip(values).enumerate() {
        if !point.is_finite() || !value.is_finite() {
            return Err(AnalysisError::invalid_input(format!(
                "observation {} is not finite: ({}, {}) = {}",
                index, point.x, point.y, value
            )));
        }
    }

    if points.is_empty() {
        return Ok(InterpolationGrid::empty());
    }

    let (min_x, max_x, min_y, max_y) = points.iter().fold(
        (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
        |(x0, x1, y0, y1), p| (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y)),
    );
    let (min_x, max_x) = (min_x - params.padding, max_x + params.padding);
    let (min_y, max_y) = (min_y - params.padding, max_y + params.padding);

    let node_count = (((max_x - min_x) / params.resolution).ceil() + 1.0)
        * (((max_y - min_y) / params.resolution).ceil() + 1.0);
    if node_count > MAX_GRID_NODES {
        return Err(AnalysisError::invalid_parameter(format!(
            "resolution {} yields {} grid nodes",
            params.resolution, node_count
        )));
    }

    let xs = axis(min_x, max_x, params.resolution);
    let ys = axis(min_y, max_y, params.resolution);

    let tree: RTree<IndexedPoint> = RTree::bulk_load(
        points
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new([p.x, p.y], i))
            .collect(),
    );
    let radius_2 = params.search_radius * params.search_radius;
    let min_neighbors = params.min_neighbors.max(1);

    let evaluator = Evaluator::prepare(points, values, params, &tree)?;

    let mut grid_values = Vec::with_capacity(xs.len() * ys.len());
    for &y in &ys {
        for &x in &xs {
            let neighbors = neighbors_within(&tree, points, [x, y], radius_2);
            let value = if neighbors.len() < min_neighbors {
                None
            } else {
                Some(evaluator.evaluate([x, y], &neighbors, values))
            };
            grid_values.push(value);
        }
    }

    let grid = InterpolationGrid {
        x: xs,
        y: ys,
        values: grid_values,
    };

    debug!(
        observations = points.len(),
        nx = grid.nx(),
        ny = grid.ny(),
        valid = grid.valid_count(),
        method = ?params.method,
        "Interpolated scalar field"
    );

    Ok(grid)
}

/// Observations within `radius_2` (squared, inclusive) of `node`, sorted by
/// input index so sums do not depend on tree layout.
fn neighbors_within(
    tree: &RTree<IndexedPoint>,
    points: &[ProjectedPoint],
    node: [f64; 2],
    radius_2: f64,
) -> Vec<Neighbor> {
    let mut neighbors: Vec<Neighbor> = tree
        .locate_within_distance(node, radius_2)
        .map(|found| {
            let p = &points[found.data];
            let dx = p.x - node[0];
            let dy = p.y - node[1];
            Neighbor {
                index: found.data,
                dist_2: dx * dx + dy * dy,
            }
        })
        .collect();
    neighbors.sort_unstable_by_key(|n| n.index);
    neighbors
}

/// Method-specific state computed once before the grid pass.
enum Evaluator {
    InverseDistance,
    Cressman { radius_2: f64 },
    Barnes {
        kappa: f64,
        second_pass: Option<(f64, Vec<f64>)>,
    },
    Rbf(RbfModel),
}

impl Evaluator {
    fn prepare(
        points: &[ProjectedPoint],
        values: &[f64],
        params: &InterpolationParams,
        tree: &RTree<IndexedPoint>,
    ) -> Result<Self> {
        let radius_2 = params.search_radius * params.search_radius;
        Ok(match params.method {
            InterpolationMethod::InverseDistance => Self::InverseDistance,
            InterpolationMethod::Cressman => Self::Cressman { radius_2 },
            InterpolationMethod::Barnes { kappa, gamma } => {
                let second_pass = gamma.map(|gamma| {
                    // First pass estimate at each observation, always at least itself
                    let residuals = points
                        .iter()
                        .zip(values)
                        .map(|(p, &v)| {
                            let near = neighbors_within(tree, points, [p.x, p.y], radius_2);
                            v - weights::barnes(&near, values, kappa)
                        })
                        .collect();
                    (kappa * gamma, residuals)
                });
                Self::Barnes { kappa, second_pass }
            }
            InterpolationMethod::Rbf { function, smooth } => {
                Self::Rbf(RbfModel::fit(points, values, function, smooth)?)
            }
        })
    }

    fn evaluate(&self, node: [f64; 2], neighbors: &[Neighbor], values: &[f64]) -> f64 {
        match self {
            Self::InverseDistance => weights::inverse_distance(neighbors, values),
            Self::Cressman { radius_2 } => weights::cressman(neighbors, values, *radius_2),
            Self::Barnes { kappa, second_pass } => {
                let first = weights::barnes(neighbors, values, *kappa);
                match second_pass {
                    Some((kappa_2, residuals)) => {
                        first + weights::barnes(neighbors, residuals, *kappa_2)
                    }
                    None => first,
                }
            }
            Self::Rbf(model) => model.evaluate(node),
        }
    }
}
