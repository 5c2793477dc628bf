//! Polar stereographic projection.
//!
//! Used for the Arctic and Antarctic maps. The projection plane touches the
//! sphere at the pole, so the scale is true at the pole and the pole maps to
//! the origin. For the north pole the central meridian points down (negative
//! y), for the south pole it points up.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::lambert::normalize_angle;
use crate::{ProjectionError, EARTH_RADIUS};

/// Which pole the projection is centred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pole {
    North,
    South,
}

/// Polar stereographic projection parameters.
#[derive(Debug, Clone)]
pub struct PolarStereographic {
    pub pole: Pole,
    /// Central meridian in radians
    pub lon0: f64,
    pub earth_radius: f64,
}

impl PolarStereographic {
    pub fn new(pole: Pole, central_longitude: f64) -> Result<Self, ProjectionError> {
        if !central_longitude.is_finite() {
            return Err(ProjectionError::InvalidParameter(format!(
                "non-finite central longitude {}",
                central_longitude
            )));
        }
        Ok(Self {
            pole,
            lon0: central_longitude.to_radians(),
            earth_radius: EARTH_RADIUS,
        })
    }

    /// Convert geographic coordinates (degrees) to projected metres.
    ///
    /// The opposite pole maps to infinity.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let lat = lat_deg.to_radians();
        let dlon = normalize_angle(lon_deg.to_radians() - self.lon0);

        match self.pole {
            Pole::North => {
                let rho = 2.0 * self.earth_radius * (PI / 4.0 - lat / 2.0).tan();
                (rho * dlon.sin(), -rho * dlon.cos())
            }
            Pole::South => {
                let rho = 2.0 * self.earth_radius * (PI / 4.0 + lat / 2.0).tan();
                (rho * dlon.sin(), rho * dlon.cos())
            }
        }
    }

    /// Convert projected metres back to geographic coordinates (degrees).
    ///
    /// Returns (lon, lat).
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let rho = (x * x + y * y).sqrt();
        let c = 2.0 * (rho / (2.0 * self.earth_radius)).atan();

        let (lat, dlon) = match self.pole {
            Pole::North => (PI / 2.0 - c, x.atan2(-y)),
            Pole::South => (c - PI / 2.0, x.atan2(y)),
        };
        // Longitude is undefined at the pole itself
        let lon = if rho == 0.0 {
            self.lon0
        } else {
            normalize_angle(self.lon0 + dlon)
        };

        (lon.to_degrees(), lat.to_degrees())
    }
}
