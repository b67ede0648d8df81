//! Error taxonomy of the detection engine.
//!
//! - [`ValidationError`]: bad input or configuration, reported to the caller
//!   as-is and never retried.
//! - [`DetectionError`]: what [`detect`](crate::detect) returns; wraps
//!   validation failures and unexpected internal failures. No partial result
//!   accompanies an error.
//!
//! Degenerate extractor inputs (flat images, zero-variance fields) are not
//! errors at this level: they are recovered inside the extractor layer as an
//! all-zero feature mask.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("image has zero width or height")]
    EmptyImage,

    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("image {width}x{height} is below the minimum {min}x{min}")]
    TooSmall {
        width: usize,
        height: usize,
        min: usize,
    },

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("internal failure in {stage}: {message}")]
    Internal {
        stage: &'static str,
        message: String,
    },
}

impl DetectionError {
    pub(crate) fn internal(stage: &'static str, message: impl Into<String>) -> Self {
        DetectionError::Internal {
            stage,
            message: message.into(),
        }
    }
}
