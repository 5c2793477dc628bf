//! Test data generators for creating synthetic station layouts and fields.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use station_common::{Observation, ReportKind};

/// Creates a regular lattice of planar points.
///
/// Points are emitted row by row starting at `(0, 0)`, with `spacing`
/// metres between neighbours in both directions.
///
/// # Example
///
/// ```
/// use test_utils::station_lattice;
///
/// let points = station_lattice(3, 2, 1000.0);
/// assert_eq!(points.len(), 6);
/// assert_eq!(points[4], (1000.0, 1000.0));
/// ```
pub fn station_lattice(nx: usize, ny: usize, spacing: f64) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(nx * ny);
    for row in 0..ny {
        for col in 0..nx {
            points.push((col as f64 * spacing, row as f64 * spacing));
        }
    }
    points
}

/// Creates METAR observations on a regular longitude/latitude lattice.
///
/// Stations are named `S000`, `S001`, ... in row-major order.
pub fn observation_lattice(
    west: f64,
    south: f64,
    nx: usize,
    ny: usize,
    step_deg: f64,
) -> Vec<Observation> {
    let mut observations = Vec::with_capacity(nx * ny);
    for row in 0..ny {
        for col in 0..nx {
            let id = format!("S{:03}", row * nx + col);
            let lon = west + col as f64 * step_deg;
            let lat = south + row as f64 * step_deg;
            observations.push(Observation::at(ReportKind::Metar, id, lon, lat));
        }
    }
    observations
}

/// Sea level pressure of a circular low centred at `center`.
///
/// Pressure rises from `depth` below 1013 hPa at the centre by 1 hPa per
/// `gradient` metres.
pub fn pressure_bowl(x: f64, y: f64, center: (f64, f64), depth: f64, gradient: f64) -> f64 {
    let r = ((x - center.0).powi(2) + (y - center.1).powi(2)).sqrt();
    1013.0 - depth + r / gradient
}

/// Samples [`pressure_bowl`] at each point.
pub fn pressure_bowl_values(
    points: &[(f64, f64)],
    center: (f64, f64),
    depth: f64,
    gradient: f64,
) -> Vec<f64> {
    points
        .iter()
        .map(|&(x, y)| pressure_bowl(x, y, center, depth, gradient))
        .collect()
}

/// Creates a linear field `a + b*x + c*y` sampled at each point.
pub fn linear_field(points: &[(f64, f64)], a: f64, b: f64, c: f64) -> Vec<f64> {
    points.iter().map(|&(x, y)| a + b * x + c * y).collect()
}
