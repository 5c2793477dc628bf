//! Radial basis function interpolation.
//!
//! Solves `(Φ - smooth·I) w = v` once for all observations, where
//! `Φ[i][j] = φ(|p_i - p_j|)`, then evaluates `Σ w_i φ(|x - p_i|)` at grid
//! nodes. The shape parameter `epsilon` is the average spacing of the
//! observations, `(Π edges / N)^(1/dims)` over the non-degenerate axes of
//! their bounding box.

use nalgebra::{DMatrix, DVector};
use projection::ProjectedPoint;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Radial basis kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RbfFunction {
    #[default]
    Multiquadric,
    InverseMultiquadric,
    Gaussian,
    Linear,
    Cubic,
    Quintic,
    ThinPlate,
}

impl RbfFunction {
    fn apply(self, r: f64, epsilon: f64) -> f64 {
        let s = r / epsilon;
        match self {
            Self::Multiquadric => (s * s + 1.0).sqrt(),
            Self::InverseMultiquadric => 1.0 / (s * s + 1.0).sqrt(),
            Self::Gaussian => (-(s * s)).exp(),
            Self::Linear => r,
            Self::Cubic => r.powi(3),
            Self::Quintic => r.powi(5),
            Self::ThinPlate => {
                if r == 0.0 {
                    0.0
                } else {
                    r * r * r.ln()
                }
            }
        }
    }
}

/// A fitted radial basis function interpolant.
pub(crate) struct RbfModel {
    centers: Vec<[f64; 2]>,
    weights: DVector<f64>,
    function: RbfFunction,
    epsilon: f64,
}

impl RbfModel {
    pub(crate) fn fit(
        points: &[ProjectedPoint],
        values: &[f64],
        function: RbfFunction,
        smooth: f64,
    ) -> Result<Self> {
        let centers: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        let epsilon = average_spacing(&centers);
        let n = centers.len();

        let matrix = DMatrix::from_fn(n, n, |i, j| {
            let phi = function.apply(distance(&centers[i], &centers[j]), epsilon);
            if i == j {
                phi - smooth
            } else {
                phi
            }
        });
        let rhs = DVector::from_column_slice(values);

        let weights = matrix.lu().solve(&rhs).ok_or_else(|| {
            AnalysisError::SingularSystem(format!(
                "{:?} kernel over {} observations (duplicate positions need smooth > 0)",
                function, n
            ))
        })?;

        if weights.iter().any(|w| !w.is_finite()) {
            return Err(AnalysisError::SingularSystem(format!(
                "{:?} kernel produced non-finite weights",
                function
            )));
        }

        Ok(Self {
            centers,
            weights,
            function,
            epsilon,
        })
    }

    pub(crate) fn evaluate(&self, node: [f64; 2]) -> f64 {
        self.centers
            .iter()
            .zip(self.weights.iter())
            .map(|(c, w)| w * self.function.apply(distance(c, &node), self.epsilon))
            .sum()
    }
}

fn distance(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

/// Average spacing of the observations, 1.0 when they all coincide.
fn average_spacing(centers: &[[f64; 2]]) -> f64 {
    let mut edges = Vec::with_capacity(2);
    for axis in 0..2 {
        let (lo, hi) = centers.iter().fold((f64::MAX, f64::MIN), |(lo, hi), c| {
            (lo.min(c[axis]), hi.max(c[axis]))
        });
        if hi > lo {
            edges.push(hi - lo);
        }
    }
    if edges.is_empty() {
        return 1.0;
    }
    let product: f64 = edges.iter().product();
    (product / centers.len() as f64).powf(1.0 / edges.len() as f64)
}
