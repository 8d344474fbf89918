//! Source decomposition into numbered raster frames.
//!
//! [`decompose`] decodes every frame of the best video stream and writes it
//! into the raw staging directory as a JPEG named `frame_NNNN.jpg`, with a
//! 1-based zero-padded index so that lexicographic order equals temporal
//! order. The sequence orchestrator later reads the directory back in
//! sorted-name order.

use std::path::Path;

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::Pixel,
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::error::DistortError;

/// Decode all frames of `source` into `staging` as numbered JPEGs.
///
/// Returns the number of frames written.
///
/// # Errors
///
/// Returns [`DistortError::TranscodeFailed`] if the source cannot be
/// demuxed or decoded, or [`DistortError::ImageError`] /
/// [`DistortError::IoError`] if a frame cannot be written.
pub fn decompose(source: &Path, staging: &Path) -> Result<usize, DistortError> {
    ffmpeg_next::init()?;

    log::debug!("Decomposing {} into {}", source.display(), staging.display());

    let mut input_context = ffmpeg_next::format::input(&source)?;

    let stream = input_context
        .streams()
        .best(Type::Video)
        .ok_or_else(|| DistortError::TranscodeFailed("no video stream to decompose".to_string()))?;
    let video_stream_index = stream.index();

    let decoder_context = CodecContext::from_parameters(stream.parameters())?;
    let mut decoder = decoder_context.decoder().video()?;

    let width = decoder.width();
    let height = decoder.height();

    let mut scaler = ScalingContext::get(
        decoder.format(),
        width,
        height,
        Pixel::RGB24,
        width,
        height,
        ScalingFlags::BILINEAR,
    )?;

    let mut decoded_frame = VideoFrame::empty();
    let mut rgb_frame = VideoFrame::empty();
    let mut written = 0usize;

    for (stream, packet) in input_context.packets() {
        if stream.index() != video_stream_index {
            continue;
        }

        decoder.send_packet(&packet)?;

        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            scaler.run(&decoded_frame, &mut rgb_frame)?;
            written += 1;
            save_frame(&rgb_frame, width, height, staging, written)?;
        }
    }

    // Flush the decoder.
    decoder.send_eof()?;
    while decoder.receive_frame(&mut decoded_frame).is_ok() {
        scaler.run(&decoded_frame, &mut rgb_frame)?;
        written += 1;
        save_frame(&rgb_frame, width, height, staging, written)?;
    }

    log::info!("Decomposed {} into {written} frames", source.display());

    Ok(written)
}

/// Write one scaled RGB24 frame as `frame_NNNN.jpg` under `staging`.
fn save_frame(
    rgb_frame: &VideoFrame,
    width: u32,
    height: u32,
    staging: &Path,
    index: usize,
) -> Result<(), DistortError> {
    let buffer = frame_to_rgb_buffer(rgb_frame, width, height);
    let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        DistortError::TranscodeFailed(
            "failed to construct RGB image from decoded frame data".to_string(),
        )
    })?;
    image.save(staging.join(format!("frame_{index:04}.jpg")))?;
    Ok(())
}

/// Copy pixel data from an FFmpeg video frame into a tightly-packed RGB
/// buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3);
/// this strips it so the result can go straight into
/// [`image::RgbImage::from_raw`].
fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}
