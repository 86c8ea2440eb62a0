//! Error types for flux-lbm.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LbmError {
    #[error("Direction out of bounds: {0} (expected 1..=9)")]
    DirectionOutOfBounds(usize),

    #[error("Invalid grid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Site {site} out of bounds for {num_sites} sites")]
    SiteOutOfBounds { site: usize, num_sites: usize },

    #[error("Coordinate ({x}, {y}) outside {width}x{height} grid")]
    CoordinateOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("Relaxation time must be finite and positive, got {0}")]
    InvalidRelaxationTime(f64),

    #[error("Activity map has {actual} entries, grid has {expected} sites")]
    ActivityMapSize { expected: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LbmError>;
