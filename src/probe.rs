//! Lightweight source probing.
//!
//! [`probe`] opens a media file just long enough to read the native video
//! dimensions, frame count, and frame rate, then drops the demuxer. The
//! sequence orchestrator runs it before decomposition so that reassembly
//! can target the original geometry and timing.

use std::path::Path;

use ffmpeg_next::{codec::context::Context as CodecContext, media::Type};

use crate::error::DistortError;

/// Geometry and timing of a motion source, as reported by its demuxer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceInfo {
    /// Native frame width in pixels.
    pub width: u32,
    /// Native frame height in pixels.
    pub height: u32,
    /// Total frame count. Taken from the stream when the container records
    /// it, otherwise estimated from duration × frame rate.
    pub frame_count: u64,
    /// Average frames per second; 0.0 when the container reports none.
    pub frames_per_second: f64,
}

/// Probe a motion source for its native geometry and frame count.
///
/// # Errors
///
/// Returns [`DistortError::ProbeFailed`] if the file cannot be opened as a
/// media container, has no video stream, or its video codec parameters
/// cannot be read.
pub fn probe<P: AsRef<Path>>(path: P) -> Result<SourceInfo, DistortError> {
    let path = path.as_ref();
    let probe_error = |reason: String| DistortError::ProbeFailed {
        path: path.to_path_buf(),
        reason,
    };

    ffmpeg_next::init().map_err(|error| probe_error(format!("FFmpeg initialisation failed: {error}")))?;

    let input_context = ffmpeg_next::format::input(&path)
        .map_err(|error| probe_error(error.to_string()))?;

    let stream = input_context
        .streams()
        .best(Type::Video)
        .ok_or_else(|| probe_error("no video stream".to_string()))?;

    let decoder_context = CodecContext::from_parameters(stream.parameters())
        .map_err(|error| probe_error(format!("cannot read video codec parameters: {error}")))?;
    let decoder = decoder_context
        .decoder()
        .video()
        .map_err(|error| probe_error(format!("cannot create video decoder: {error}")))?;

    let width = decoder.width();
    let height = decoder.height();

    // Average frame rate, falling back to the raw stream rate.
    let frame_rate = stream.avg_frame_rate();
    let frames_per_second = if frame_rate.denominator() != 0 {
        frame_rate.numerator() as f64 / frame_rate.denominator() as f64
    } else {
        let rate = stream.rate();
        if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        }
    };

    // Prefer the container's own frame count; estimate only when absent.
    let recorded_frames = stream.frames();
    let frame_count = if recorded_frames > 0 {
        recorded_frames as u64
    } else {
        let duration_microseconds = input_context.duration();
        if duration_microseconds > 0 && frames_per_second > 0.0 {
            (duration_microseconds as f64 / 1_000_000.0 * frames_per_second) as u64
        } else {
            0
        }
    };

    let info = SourceInfo {
        width,
        height,
        frame_count,
        frames_per_second,
    };

    log::debug!(
        "Probed {}: {}x{}, ~{} frames @ {:.2} fps",
        path.display(),
        info.width,
        info.height,
        info.frame_count,
        info.frames_per_second,
    );

    Ok(info)
}
