//! Error types for the `meltdown` crate.
//!
//! This module defines [`DistortError`], the unified error type returned by
//! all fallible operations in the crate. Variants carry enough context
//! (paths, detected types, upstream messages) to diagnose a failed job
//! without additional logging at the call site.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `meltdown` operations.
///
/// Every public method that can fail returns `Result<T, DistortError>`.
/// Failures propagate unchanged to the caller: there are no retries, and
/// nothing is swallowed except best-effort staging cleanup (which logs and
/// continues).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DistortError {
    /// The named source entry does not exist in the input store.
    #[error("Source entry not found: {path}")]
    SourceNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The source is neither a still image, an animated image, nor a video.
    #[error("This kind of file can not be distorted (detected type: {detected})")]
    UnsupportedType {
        /// The sniffed MIME type, or `"unknown"` when nothing matched.
        detected: String,
    },

    /// The rescale strength is below the minimum of 1.0.
    #[error("Rescale strength must be at least 1.0 (got {value})")]
    InvalidStrength {
        /// The rejected strength value.
        value: f64,
    },

    /// The media file could not be probed for dimensions and frame count.
    #[error("Failed to probe {path}: {reason}")]
    ProbeFailed {
        /// Path to the file that could not be probed.
        path: PathBuf,
        /// Underlying reason the probe failed.
        reason: String,
    },

    /// The content-aware shrink/restore transform failed.
    #[error("Frame transform failed: {0}")]
    TransformFailed(String),

    /// Frame decomposition, reassembly, or audio muxing failed.
    #[error("Transcode error: {0}")]
    TranscodeFailed(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while decoding or encoding a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for DistortError {
    fn from(error: FfmpegError) -> Self {
        DistortError::TranscodeFailed(error.to_string())
    }
}
