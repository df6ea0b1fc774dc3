//! Error types for key signature extraction.
//!
//! "Nothing found" is never an error here: empty candidate lists and
//! unassigned slices are plain `Option` / `Vec` values. Errors only
//! report malformed input handed over by the caller.

use thiserror::Error;

/// Errors raised when building extraction inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// Pixel buffer with a zero dimension.
    #[error("invalid image dimensions: {0}x{1}")]
    InvalidDimensions(usize, usize),

    /// Pixel data does not match the declared dimensions.
    #[error("pixel count mismatch: expected {expected}, got {actual}")]
    PixelCountMismatch { expected: usize, actual: usize },

    /// Key area or slice rectangle with non-positive size.
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    /// Interline must be strictly positive.
    #[error("invalid scale: interline {0}")]
    InvalidScale(u32),

    /// Configuration value out of range.
    #[error("config error: {0}")]
    Config(String),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ExtractError {
    fn from(e: serde_json::Error) -> Self {
        ExtractError::Json(e.to_string())
    }
}

/// Result type for extraction setup.
pub type ExtractResult<T> = Result<T, ExtractError>;
