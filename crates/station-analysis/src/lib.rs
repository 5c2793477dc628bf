//! Density reduction and scalar field analysis for station plots.
//!
//! Two passes turn a raw set of observations into something that can be
//! drawn legibly:
//!
//! ```text
//! Observations ──► thinning::reduce ──► stations to plot
//!      │
//!      └─► (x, y, slp) ──► interpolation::interpolate ──► InterpolationGrid ──► isobars
//! ```
//!
//! Both passes work in the planar coordinates of a map projection, so
//! distances, radii and grid resolutions are in metres.

pub mod error;
pub mod grid;
pub mod interpolation;
pub mod thinning;

pub use error::{AnalysisError, Result};
pub use grid::InterpolationGrid;
pub use interpolation::{
    interpolate, remove_missing, InterpolationMethod, InterpolationParams, RbfFunction,
};
pub use thinning::{reduce, reduce_points};
