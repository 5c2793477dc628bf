//! Regular grids in projected coordinates.

/// Values interpolated onto a regular lattice.
///
/// `values` is row-major: the node at column `i` (x) and row `j` (y) lives at
/// `values[j * x.len() + i]`. `None` marks nodes without enough nearby
/// observations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpolationGrid {
    /// Node x coordinates (metres), ascending
    pub x: Vec<f64>,
    /// Node y coordinates (metres), ascending
    pub y: Vec<f64>,
    pub values: Vec<Option<f64>>,
}

impl InterpolationGrid {
    /// A grid with no nodes.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at column `i`, row `j`. Out-of-range nodes have no data.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.nx() || j >= self.ny() {
            return None;
        }
        self.values[j * self.nx() + i]
    }

    /// Number of nodes carrying a value.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Minimum and maximum of the valid values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Node coordinates along one axis: `min + k * resolution` for
/// `k = 0..=ceil((max - min) / resolution)`.
pub(crate) fn axis(min: f64, max: f64, resolution: f64) -> Vec<f64> {
    let steps = ((max - min) / resolution).ceil().max(0.0) as usize;
    (0..=steps).map(|k| min + k as f64 * resolution).collect()
}
