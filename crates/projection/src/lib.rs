//! Map projections for station plots.
//!
//! Implements the conformal projections used by the regional maps from
//! scratch, on a spherical earth:
//! - Lambert Conformal Conic for mid-latitude regions
//! - Polar Stereographic for the Arctic and Antarctic
//!
//! A [`ProjectionDefinition`] is the serializable description selected per
//! region; [`ProjectionDefinition::build`] turns it into a [`MapProjection`]
//! that transforms between geographic degrees and planar metres.

pub mod lambert;
pub mod polar;

use serde::{Deserialize, Serialize};
use station_common::GeoBounds;
use thiserror::Error;

pub use lambert::LambertConformal;
pub use polar::{PolarStereographic, Pole};

/// Mean earth radius used by all projections (meters).
pub const EARTH_RADIUS: f64 = 6_371_229.0;

/// Number of samples per edge when computing a projected envelope.
const EDGE_SAMPLES: usize = 64;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("invalid projection parameter: {0}")]
    InvalidParameter(String),

    #[error("point ({lon}, {lat}) cannot be projected")]
    Unprojectable { lon: f64, lat: f64 },
}

pub type Result<T> = std::result::Result<T, ProjectionError>;

/// Serializable description of a map projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectionDefinition {
    LambertConformal {
        central_longitude: f64,
        central_latitude: f64,
        standard_parallels: [f64; 2],
    },
    PolarStereographic {
        pole: Pole,
        #[serde(default)]
        central_longitude: f64,
    },
}

impl ProjectionDefinition {
    /// Lambert conformal projection centred on central Europe.
    pub fn europe() -> Self {
        Self::LambertConformal {
            central_longitude: 13.0,
            central_latitude: 47.0,
            standard_parallels: [35.0, 35.0],
        }
    }

    /// Lambert conformal projection centred on Greenland and Iceland.
    pub fn greenland() -> Self {
        Self::LambertConformal {
            central_longitude: -35.0,
            central_latitude: 65.0,
            standard_parallels: [35.0, 35.0],
        }
    }

    pub fn north_polar() -> Self {
        Self::PolarStereographic {
            pole: Pole::North,
            central_longitude: 0.0,
        }
    }

    pub fn south_polar() -> Self {
        Self::PolarStereographic {
            pole: Pole::South,
            central_longitude: 0.0,
        }
    }

    /// Build the projection described by this definition.
    pub fn build(&self) -> Result<MapProjection> {
        match *self {
            Self::LambertConformal {
                central_longitude,
                central_latitude,
                standard_parallels: [latin1, latin2],
            } => LambertConformal::new(central_longitude, central_latitude, latin1, latin2)
                .map(MapProjection::Lambert),
            Self::PolarStereographic {
                pole,
                central_longitude,
            } => PolarStereographic::new(pole, central_longitude).map(MapProjection::Polar),
        }
    }
}

/// A point in a planar map projection (meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &ProjectedPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned extent in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedExtent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ProjectedExtent {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, point: &ProjectedPoint) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// A ready-to-use projection.
#[derive(Debug, Clone)]
pub enum MapProjection {
    Lambert(LambertConformal),
    Polar(PolarStereographic),
}

impl MapProjection {
    /// Forward transform without validation. May return non-finite values.
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            Self::Lambert(p) => p.forward(lon, lat),
            Self::Polar(p) => p.forward(lon, lat),
        }
    }

    /// Inverse transform, returns (lon, lat) in degrees.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Self::Lambert(p) => p.inverse(x, y),
            Self::Polar(p) => p.inverse(x, y),
        }
    }

    /// Project a geographic position, failing if the result is not finite.
    pub fn project(&self, lon: f64, lat: f64) -> Result<ProjectedPoint> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ProjectionError::Unprojectable { lon, lat });
        }
        let (x, y) = self.forward(lon, lat);
        let point = ProjectedPoint::new(x, y);
        if point.is_finite() {
            Ok(point)
        } else {
            Err(ProjectionError::Unprojectable { lon, lat })
        }
    }

    /// Projected envelope of a geographic bounding box.
    ///
    /// The box edges are sampled because parallels and meridians are curved in
    /// both projections; the pole of a polar projection is included when the
    /// box reaches it.
    pub fn projected_extent(&self, bounds: &GeoBounds) -> Result<ProjectedExtent> {
        let mut extent = ProjectedExtent {
            min_x: f64::MAX,
            min_y: f64::MAX,
            max_x: f64::MIN,
            max_y: f64::MIN,
        };

        let mut include = |lon: f64, lat: f64| -> Result<()> {
            let p = self.project(lon, lat)?;
            extent.min_x = extent.min_x.min(p.x);
            extent.min_y = extent.min_y.min(p.y);
            extent.max_x = extent.max_x.max(p.x);
            extent.max_y = extent.max_y.max(p.y);
            Ok(())
        };

        for t in 0..=EDGE_SAMPLES {
            let frac = t as f64 / EDGE_SAMPLES as f64;
            let lon = bounds.west + frac * bounds.width();
            let lat = bounds.south + frac * bounds.height();

            // Bottom and top edges
            include(lon, bounds.south)?;
            include(lon, bounds.north)?;
            // Left and right edges
            include(bounds.west, lat)?;
            include(bounds.east, lat)?;
        }

        Ok(extent)
    }
}
