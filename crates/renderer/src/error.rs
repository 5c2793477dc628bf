use projection::ProjectionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid image size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("map extent is degenerate: {0}")]
    DegenerateExtent(String),

    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
