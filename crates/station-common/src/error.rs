//! Error types for observation handling.

use thiserror::Error;

/// Result type alias using StationError.
pub type StationResult<T> = Result<T, StationError>;

/// Errors raised while validating observation data.
#[derive(Debug, Error)]
pub enum StationError {
    #[error("Observation from station '{station}' has no position")]
    MissingPosition { station: String },

    #[error("Observation from station '{station}' has invalid position ({longitude}, {latitude})")]
    InvalidPosition {
        station: String,
        longitude: f64,
        latitude: f64,
    },

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),
}
