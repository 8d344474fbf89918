//! The single-frame shrink/restore distortion transform.
//!
//! One application of [`distort_frame`] is the whole still-image pipeline
//! and one step of the animated pipeline: shrink the raster content-aware
//! to `floor(d / strength)` in each dimension, then blow the shrunk canvas
//! back up to 200% with ordinary interpolation. The re-expansion starts
//! from the *reduced* canvas, so the output is `2·floor(d/strength)` per
//! dimension, not the original size, and the uniform upscale compounds the
//! warp the seam removal introduced.

use image::{DynamicImage, GenericImageView, imageops, imageops::FilterType};

use crate::{carve, error::DistortError};

/// Apply the content-aware shrink-then-restore distortion to one frame.
///
/// `strength` is the divisor applied to the original dimensions before
/// re-expansion: 1.0 barely distorts (the output is simply the frame at
/// 200%), values around 2.5 approach maximum distortion. Shrink targets are
/// clamped to at least one pixel.
///
/// The output is RGB; alpha is discarded. Output dimensions are
/// `2·floor(width/strength) × 2·floor(height/strength)`; callers must not
/// assume the original size is preserved.
///
/// # Errors
///
/// - [`DistortError::InvalidStrength`] if `strength < 1.0` (or NaN).
/// - [`DistortError::TransformFailed`] if the frame has a zero dimension.
pub fn distort_frame(frame: &DynamicImage, strength: f64) -> Result<DynamicImage, DistortError> {
    if !(strength >= 1.0) {
        return Err(DistortError::InvalidStrength { value: strength });
    }

    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(DistortError::TransformFailed(format!(
            "cannot distort an empty raster ({width}x{height})"
        )));
    }

    let target_width = ((width as f64 / strength).floor() as u32).max(1);
    let target_height = ((height as f64 / strength).floor() as u32).max(1);

    log::debug!(
        "Distorting frame {width}x{height} at strength {strength} (carve target {target_width}x{target_height})",
    );

    let carved = carve::shrink(&frame.to_rgb8(), target_width, target_height);
    let expanded = imageops::resize(
        &carved,
        carved.width() * 2,
        carved.height() * 2,
        FilterType::Lanczos3,
    );

    Ok(DynamicImage::ImageRgb8(expanded))
}
