//! Lambert Conformal Conic projection.
//!
//! This projection is used for the mid-latitude station maps (Europe,
//! Greenland/Iceland). It maps a cone tangent or secant to the Earth's surface
//! onto a flat plane.
//!
//! The projection parameters include:
//! - Central meridian (lon0): x = 0 along this meridian
//! - Central latitude (lat0): y = 0 along this parallel
//! - Standard parallel(s): latin1 and latin2 (equal for a tangent cone)
//!
//! Coordinates are metres from the origin `(lon0, lat0)` on a spherical earth.

use std::f64::consts::PI;

use crate::{ProjectionError, EARTH_RADIUS};

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in radians
    pub lon0: f64,
    /// Latitude of origin in radians
    pub lat0: f64,
    /// First standard parallel in radians
    pub latin1: f64,
    /// Second standard parallel in radians
    pub latin2: f64,
    /// Earth radius (meters)
    pub earth_radius: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the latitude of origin
    rho0: f64,
}

impl LambertConformal {
    /// Create a new Lambert Conformal projection.
    ///
    /// # Arguments
    /// * `central_longitude` - Central meridian (degrees)
    /// * `central_latitude` - Latitude of origin (degrees)
    /// * `latin1` - First standard parallel (degrees)
    /// * `latin2` - Second standard parallel (degrees)
    pub fn new(
        central_longitude: f64,
        central_latitude: f64,
        latin1: f64,
        latin2: f64,
    ) -> Result<Self, ProjectionError> {
        let params = [central_longitude, central_latitude, latin1, latin2];
        if params.iter().any(|v| !v.is_finite()) {
            return Err(ProjectionError::InvalidParameter(format!(
                "non-finite Lambert parameters {:?}",
                params
            )));
        }
        if latin1.abs() >= 90.0 || latin2.abs() >= 90.0 || central_latitude.abs() >= 90.0 {
            return Err(ProjectionError::InvalidParameter(format!(
                "standard parallels and origin must be off the poles: {:?}",
                params
            )));
        }

        let lon0 = central_longitude.to_radians();
        let lat0 = central_latitude.to_radians();
        let latin1 = latin1.to_radians();
        let latin2 = latin2.to_radians();
        let earth_radius = EARTH_RADIUS;

        // Compute cone constant n
        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        if n.abs() < 1e-10 || !n.is_finite() {
            return Err(ProjectionError::InvalidParameter(
                "standard parallels produce a degenerate cone".to_string(),
            ));
        }

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = earth_radius * f / (PI / 4.0 + lat0 / 2.0).tan().powf(n);

        Ok(Self {
            lon0,
            lat0,
            latin1,
            latin2,
            earth_radius,
            n,
            f,
            rho0,
        })
    }

    /// Cone constant of the projection.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    /// Convert geographic coordinates (degrees) to projected metres.
    ///
    /// The pole opposite the cone apex maps to infinity; callers check the
    /// result for finiteness.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let lat = lat_deg.to_radians();
        let dlon = normalize_angle(lon_deg.to_radians() - self.lon0);

        let rho = self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * dlon;

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();
        (x, y)
    }

    /// Convert projected metres back to geographic coordinates (degrees).
    ///
    /// Returns (lon, lat).
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let dy = self.rho0 - y;
        let mut rho = (x * x + dy * dy).sqrt();
        let theta = if self.n < 0.0 {
            rho = -rho;
            (-x).atan2(-dy)
        } else {
            x.atan2(dy)
        };

        let lat = if rho == 0.0 {
            PI / 2.0 * self.n.signum()
        } else {
            2.0 * ((self.earth_radius * self.f / rho).powf(1.0 / self.n)).atan() - PI / 2.0
        };
        let lon = normalize_angle(self.lon0 + theta / self.n);

        (lon.to_degrees(), lat.to_degrees())
    }
}

/// Normalize an angle difference to [-π, π).
pub(crate) fn normalize_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}
