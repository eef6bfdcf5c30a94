//! Error type shared by generators, renderer and CLI

use thiserror::Error;

/// Errors that can occur while generating or exporting a sketch.
#[derive(Error, Debug)]
pub enum SketchError {
    #[error("invalid {field}: {value} (must be at least {min})")]
    InvalidInput {
        field: &'static str,
        value: usize,
        min: usize,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SketchError>;

/// Reject counts below `min` before they reach a spacing computation
pub fn require_at_least(field: &'static str, value: usize, min: usize) -> Result<()> {
    if value < min {
        return Err(SketchError::InvalidInput { field, value, min });
    }
    Ok(())
}
