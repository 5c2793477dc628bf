//! Error types for station analysis.

use projection::ProjectionError;
use thiserror::Error;

/// Errors that can occur while thinning or interpolating observations.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A parameter is out of its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Input coordinates or values are malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An observation could not be projected.
    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// The radial basis function system has no unique solution.
    #[error("singular interpolation system: {0}")]
    SingularSystem(String),
}

impl AnalysisError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
