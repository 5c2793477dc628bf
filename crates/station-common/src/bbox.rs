//! Geographic bounding boxes for plotting regions.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees.
///
/// Longitudes may wrap the full globe (`west = -180`, `east = 180`) for polar
/// regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl GeoBounds {
    /// Create a new bounding box from its edges.
    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self {
            west,
            east,
            south,
            north,
        }
    }

    /// Parse a comma separated "west,east,south,north" string.
    pub fn parse(s: &str) -> Result<Self, BoundsParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BoundsParseError::InvalidFormat(s.to_string()));
        }

        let mut values = [0.0f64; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part
                .parse()
                .map_err(|_| BoundsParseError::InvalidNumber(part.to_string()))?;
        }

        let bounds = Self::new(values[0], values[1], values[2], values[3]);
        bounds.validate()?;
        Ok(bounds)
    }

    /// Check that the edges are finite, ordered, and within geographic range.
    pub fn validate(&self) -> Result<(), BoundsParseError> {
        let edges = [self.west, self.east, self.south, self.north];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(BoundsParseError::OutOfRange(format!("{:?}", self)));
        }
        if self.west >= self.east || self.south >= self.north {
            return Err(BoundsParseError::OutOfRange(format!(
                "edges are not ordered: {:?}",
                self
            )));
        }
        if self.south < -90.0 || self.north > 90.0 || self.west < -180.0 || self.east > 360.0 {
            return Err(BoundsParseError::OutOfRange(format!("{:?}", self)));
        }
        Ok(())
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Check if a point is contained within this box (edges inclusive).
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    /// Check whether the box spans every longitude.
    pub fn is_global_in_longitude(&self) -> bool {
        self.width() >= 360.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BoundsParseError {
    #[error("Invalid bounds format: {0}. Expected 'west,east,south,north'")]
    InvalidFormat(String),

    #[error("Invalid number in bounds: {0}")]
    InvalidNumber(String),

    #[error("Bounds out of range: {0}")]
    OutOfRange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bounds() {
        let bounds = GeoBounds::parse("-10.1, 9.4, 48.64, 58.4").unwrap();
        assert_eq!(bounds.west, -10.1);
        assert_eq!(bounds.east, 9.4);
        assert_eq!(bounds.south, 48.64);
        assert_eq!(bounds.north, 58.4);
    }

    #[test]
    fn test_parse_bounds_rejects_swapped_edges() {
        let result = GeoBounds::parse("10,-10,40,50");
        assert!(matches!(result, Err(BoundsParseError::OutOfRange(_))));
    }

    #[test]
    fn test_contains() {
        let bounds = GeoBounds::new(8.9, 17.42, 45.9, 49.4);
        assert!(bounds.contains(16.37, 48.21)); // Vienna
        assert!(!bounds.contains(2.35, 48.86)); // Paris
    }

    #[test]
    fn test_global_longitude() {
        assert!(GeoBounds::new(-180.0, 180.0, 60.0, 90.0).is_global_in_longitude());
        assert!(!GeoBounds::new(-58.0, -12.0, 57.0, 70.5).is_global_in_longitude());
    }
}
