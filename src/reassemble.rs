//! Frame-sequence reassembly into an H.264 MP4.
//!
//! [`Reassembler`] encodes an ordered list of distorted frame files back
//! into a video container at the source's native geometry and frame rate.
//! Distorted frames vary in size from one index to the next, so each one is
//! resized back to the target geometry before encoding. When an
//! [`AudioSource`] is given, its audio track is transcoded through the
//! warble filter chain and muxed alongside the video.

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    Packet, Rational,
    codec::{Id, context::Context as CodecContext},
    format::{Flags as FormatFlags, Pixel},
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::imageops::FilterType;

use crate::{
    audio::{AudioEffects, AudioPipeline},
    error::DistortError,
};

/// Target geometry and timing for a reassembled video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReassembleOptions {
    /// Target frames per second. Values of 0 are treated as 1.
    pub fps: u32,
    /// Target width in pixels. Rounded down to an even value for YUV420P.
    pub width: u32,
    /// Target height in pixels. Rounded down to an even value for YUV420P.
    pub height: u32,
}

/// An original media file whose audio track should be carried into the
/// reassembled output, warbled by the given effects.
#[derive(Debug, Clone)]
pub struct AudioSource {
    /// Path of the original source file.
    pub path: PathBuf,
    /// Filter parameters for the audio warble.
    pub effects: AudioEffects,
}

/// Encodes distorted frame files into an MP4, optionally with audio.
///
/// Create via [`Reassembler::new`], then call [`write`](Reassembler::write).
pub struct Reassembler {
    options: ReassembleOptions,
}

impl Reassembler {
    /// Create a reassembler targeting the given geometry and frame rate.
    pub fn new(options: ReassembleOptions) -> Self {
        Self { options }
    }

    /// Encode `frame_paths`, in order, into `destination`.
    ///
    /// The container format is inferred from the destination extension;
    /// video is H.264 in YUV420P. Each frame file is loaded, resized to the
    /// target geometry if it differs, and encoded with a pts equal to its
    /// index. If `audio` is given and its source actually has an audio
    /// stream, the track is filtered and muxed as AAC; a source without
    /// audio produces a silent output.
    ///
    /// # Errors
    ///
    /// - [`DistortError::TranscodeFailed`] if `frame_paths` is empty, the
    ///   encoder cannot be created, or any encode/mux step fails.
    /// - [`DistortError::ImageError`] if a frame file cannot be loaded.
    pub fn write(
        &self,
        frame_paths: &[PathBuf],
        destination: &Path,
        audio: Option<&AudioSource>,
    ) -> Result<(), DistortError> {
        if frame_paths.is_empty() {
            return Err(DistortError::TranscodeFailed(
                "no frames to assemble".to_string(),
            ));
        }

        ffmpeg_next::init()?;

        let fps = self.options.fps.max(1);
        // YUV420P subsamples chroma 2x2, so both dimensions must be even.
        let width = (self.options.width & !1).max(2);
        let height = (self.options.height & !1).max(2);

        log::info!(
            "Assembling {} frames into {} ({width}x{height} @ {fps} fps, audio: {})",
            frame_paths.len(),
            destination.display(),
            audio.is_some(),
        );

        let mut output = ffmpeg_next::format::output(&destination)
            .map_err(|error| DistortError::TranscodeFailed(format!("cannot open output: {error}")))?;

        // Read the flag before add_stream takes its borrow.
        let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

        let mut audio_pipeline = match audio {
            Some(source) => AudioPipeline::open(&source.path, &source.effects, needs_global_header)?,
            None => None,
        };

        let video_codec = ffmpeg_next::encoder::find(Id::H264).ok_or_else(|| {
            DistortError::TranscodeFailed("H.264 encoder not available".to_string())
        })?;

        let (video_stream_index, mut video_encoder) = {
            let mut stream = output.add_stream(video_codec).map_err(|error| {
                DistortError::TranscodeFailed(format!("cannot add video stream: {error}"))
            })?;
            let stream_index = stream.index();

            let mut encoder = CodecContext::from_parameters(stream.parameters())
                .map_err(|error| {
                    DistortError::TranscodeFailed(format!("cannot create codec context: {error}"))
                })?
                .encoder()
                .video()
                .map_err(|error| {
                    DistortError::TranscodeFailed(format!("cannot create video encoder: {error}"))
                })?;

            encoder.set_width(width);
            encoder.set_height(height);
            encoder.set_format(Pixel::YUV420P);
            encoder.set_time_base(Rational::new(1, fps as i32));
            encoder.set_frame_rate(Some(Rational::new(fps as i32, 1)));

            if needs_global_header {
                unsafe {
                    (*encoder.as_mut_ptr()).flags |=
                        ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
                }
            }

            let opened = encoder.open_as(video_codec).map_err(|error| {
                DistortError::TranscodeFailed(format!("cannot open H.264 encoder: {error}"))
            })?;

            stream.set_parameters(&opened);
            (stream_index, opened)
        };

        let audio_stream_index = match &audio_pipeline {
            Some(pipeline) => {
                let audio_codec = ffmpeg_next::encoder::find(Id::AAC).ok_or_else(|| {
                    DistortError::TranscodeFailed("AAC encoder not available".to_string())
                })?;
                let mut stream = output.add_stream(audio_codec).map_err(|error| {
                    DistortError::TranscodeFailed(format!("cannot add audio stream: {error}"))
                })?;
                stream.set_parameters(pipeline.encoder());
                stream.set_time_base(pipeline.encoder_time_base());
                Some(stream.index())
            }
            None => None,
        };

        output
            .write_header()
            .map_err(|error| DistortError::TranscodeFailed(format!("cannot write header: {error}")))?;

        // The muxer may adjust stream time bases while writing the header.
        let video_time_base = output
            .stream(video_stream_index)
            .map(|stream| stream.time_base())
            .ok_or_else(|| DistortError::TranscodeFailed("video stream vanished".to_string()))?;
        let encoder_time_base = Rational::new(1, fps as i32);

        let mut scaler = ScalingContext::get(
            Pixel::RGB24,
            width,
            height,
            Pixel::YUV420P,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| DistortError::TranscodeFailed(format!("cannot create scaler: {error}")))?;

        let mut packet = Packet::empty();

        for (frame_index, frame_path) in frame_paths.iter().enumerate() {
            let loaded = image::open(frame_path)?;
            let rgb = if loaded.width() != width || loaded.height() != height {
                loaded.resize_exact(width, height, FilterType::Lanczos3).to_rgb8()
            } else {
                loaded.to_rgb8()
            };

            let mut source_frame = VideoFrame::new(Pixel::RGB24, width, height);
            let stride = source_frame.stride(0);
            let frame_data = source_frame.data_mut(0);
            let rgb_bytes = rgb.as_raw();
            let row_length = (width as usize) * 3;
            for row in 0..height as usize {
                let source_start = row * row_length;
                let target_start = row * stride;
                frame_data[target_start..target_start + row_length]
                    .copy_from_slice(&rgb_bytes[source_start..source_start + row_length]);
            }

            let mut encode_frame = VideoFrame::empty();
            scaler
                .run(&source_frame, &mut encode_frame)
                .map_err(|error| DistortError::TranscodeFailed(format!("scaling failed: {error}")))?;

            encode_frame.set_pts(Some(frame_index as i64));

            video_encoder
                .send_frame(&encode_frame)
                .map_err(|error| DistortError::TranscodeFailed(format!("send_frame failed: {error}")))?;

            while video_encoder.receive_packet(&mut packet).is_ok() {
                packet.set_stream(video_stream_index);
                packet.rescale_ts(encoder_time_base, video_time_base);
                packet.write_interleaved(&mut output).map_err(|error| {
                    DistortError::TranscodeFailed(format!("write packet failed: {error}"))
                })?;
            }
        }

        // Flush the video encoder.
        video_encoder
            .send_eof()
            .map_err(|error| DistortError::TranscodeFailed(format!("send_eof failed: {error}")))?;
        while video_encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(video_stream_index);
            packet.rescale_ts(encoder_time_base, video_time_base);
            packet.write_interleaved(&mut output).map_err(|error| {
                DistortError::TranscodeFailed(format!("write flush packet failed: {error}"))
            })?;
        }

        if let (Some(pipeline), Some(stream_index)) = (&mut audio_pipeline, audio_stream_index) {
            pipeline.transcode_into(&mut output, stream_index)?;
        }

        output
            .write_trailer()
            .map_err(|error| DistortError::TranscodeFailed(format!("cannot write trailer: {error}")))?;

        Ok(())
    }
}
