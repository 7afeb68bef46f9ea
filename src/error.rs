// THEORY:
// The `error` module defines the single error type surfaced at the stage
// boundaries of the counting pipeline. Stages are single-pass per-frame
// computations: an error aborts the current frame and nothing else. There is
// no internal retry; the caller simply skips the frame and submits the next
// one, and background learning continues from wherever it left off.
//
// Only two conditions are errors by contract:
// 1.  An image buffer that is empty, malformed, or whose dimensions disagree
//     with what the background model has already observed.
// 2.  A non-positive morphology kernel size.
//
// Everything else that looks suspicious is deliberately permitted. In
// particular, `min_area > max_area` is a legal configuration that matches no
// blob, and it must stay that way.

use thiserror::Error;

/// Errors produced at the stage boundaries of the counting pipeline.
#[derive(Debug, Error)]
pub enum VisionError {
    /// The input buffer is empty, malformed, or dimension-mismatched.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// A configuration value is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Encoding a frame for inspection failed.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, VisionError>;
