//! Audio carry-over for reassembled videos.
//!
//! When a true video is distorted, its audio track is not dropped: it is
//! decoded from the original source, run through a tremolo + vibrato filter
//! chain so the sound warbles along with the picture, re-encoded as AAC,
//! and muxed into the output container. [`AudioEffects`] holds the filter
//! parameters; [`AudioPipeline`] owns the demuxer, decoder, filter graph,
//! and encoder for one source file.

use std::path::Path;

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::{self, Id, context::Context as CodecContext},
    decoder::Audio as AudioDecoder,
    encoder::Audio as AudioEncoder,
    filter::Graph as FilterGraph,
    format::{Sample, context::{Input, Output}, sample::Type as SampleType},
    frame::Audio as AudioFrame,
    media::Type,
    util::error::EAGAIN,
};

use crate::error::DistortError;

/// Parameters of the audio warble applied alongside the visual distortion.
///
/// The defaults match the visual pipeline's character: a gentle 5 Hz
/// amplitude wobble (tremolo) layered with a 5 Hz pitch wobble (vibrato),
/// both at 10% depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioEffects {
    /// Tremolo LFO frequency in Hz.
    pub tremolo_frequency: f64,
    /// Tremolo depth, 0.0 to 1.0.
    pub tremolo_depth: f64,
    /// Vibrato LFO frequency in Hz.
    pub vibrato_frequency: f64,
    /// Vibrato depth, 0.0 to 1.0.
    pub vibrato_depth: f64,
}

impl Default for AudioEffects {
    fn default() -> Self {
        Self {
            tremolo_frequency: 5.0,
            tremolo_depth: 0.1,
            vibrato_frequency: 5.0,
            vibrato_depth: 0.1,
        }
    }
}

impl AudioEffects {
    /// Render the effects as an FFmpeg filter chain specification.
    pub(crate) fn filter_spec(&self) -> String {
        format!(
            "tremolo=f={}:d={},vibrato=f={}:d={}",
            self.tremolo_frequency, self.tremolo_depth, self.vibrato_frequency, self.vibrato_depth,
        )
    }
}

/// Decode → filter → encode chain for one source file's audio track.
///
/// Opened before the output container is built so the encoder parameters
/// can seed the output stream, then driven to completion with
/// [`AudioPipeline::transcode_into`] once the container header is written.
pub(crate) struct AudioPipeline {
    input: Input,
    stream_index: usize,
    decoder: AudioDecoder,
    encoder: AudioEncoder,
    graph: FilterGraph,
    encoder_time_base: Rational,
}

impl AudioPipeline {
    /// Open `source` and prepare its best audio stream for transcoding.
    ///
    /// Returns `Ok(None)` when the source has no audio stream; the caller
    /// then writes a silent output. `global_header` must be set when the
    /// target container requires global codec headers (MP4 does).
    ///
    /// # Errors
    ///
    /// Returns [`DistortError::TranscodeFailed`] if the source cannot be
    /// demuxed or decoded, no AAC encoder is available, or the filter
    /// graph cannot be built.
    pub(crate) fn open(
        source: &Path,
        effects: &AudioEffects,
        global_header: bool,
    ) -> Result<Option<Self>, DistortError> {
        ffmpeg_next::init()?;

        let input = ffmpeg_next::format::input(&source)?;

        let Some(stream) = input.streams().best(Type::Audio) else {
            log::debug!("{} has no audio stream, skipping audio", source.display());
            return Ok(None);
        };
        let stream_index = stream.index();
        let source_time_base = stream.time_base();

        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let decoder = decoder_context
            .decoder()
            .audio()
            .map_err(|error| DistortError::TranscodeFailed(format!("cannot decode audio: {error}")))?;

        let encoder = create_aac_encoder(&decoder, global_header)?;
        let encoder_time_base = Rational(1, encoder.rate() as i32);

        let graph = build_effects_graph(&decoder, &encoder, source_time_base, effects)?;

        log::debug!(
            "Audio pipeline for {}: {} Hz, effects '{}'",
            source.display(),
            decoder.rate(),
            effects.filter_spec(),
        );

        Ok(Some(Self {
            input,
            stream_index,
            decoder,
            encoder,
            graph,
            encoder_time_base,
        }))
    }

    /// The configured AAC encoder, for seeding the output stream parameters.
    pub(crate) fn encoder(&self) -> &AudioEncoder {
        &self.encoder
    }

    /// Time base of the encoder's packets (`1 / sample_rate`).
    pub(crate) fn encoder_time_base(&self) -> Rational {
        self.encoder_time_base
    }

    /// Run the full decode → filter → encode → mux loop.
    ///
    /// `output_context` must already have its header written and hold a
    /// stream at `out_stream_index` created from this pipeline's encoder.
    pub(crate) fn transcode_into(
        &mut self,
        output_context: &mut Output,
        out_stream_index: usize,
    ) -> Result<(), DistortError> {
        let out_time_base = output_context
            .stream(out_stream_index)
            .map(|stream| stream.time_base())
            .ok_or_else(|| {
                DistortError::TranscodeFailed(format!("no output stream at index {out_stream_index}"))
            })?;

        let mut decoded = AudioFrame::empty();
        let mut filtered = AudioFrame::empty();
        let mut encoded = Packet::empty();
        let mut samples_written: i64 = 0;

        for (stream, packet) in self.input.packets() {
            if stream.index() != self.stream_index {
                continue;
            }

            self.decoder.send_packet(&packet)?;
            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let timestamp = decoded.timestamp();
                decoded.set_pts(timestamp);
                feed_graph(&mut self.graph, &decoded)?;
                drain_graph(
                    &mut self.graph,
                    &mut self.encoder,
                    &mut filtered,
                    &mut encoded,
                    &mut samples_written,
                    self.encoder_time_base,
                    out_time_base,
                    output_context,
                    out_stream_index,
                )?;
            }
        }

        // Flush the decoder through the graph.
        self.decoder.send_eof()?;
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            let timestamp = decoded.timestamp();
            decoded.set_pts(timestamp);
            feed_graph(&mut self.graph, &decoded)?;
            drain_graph(
                &mut self.graph,
                &mut self.encoder,
                &mut filtered,
                &mut encoded,
                &mut samples_written,
                self.encoder_time_base,
                out_time_base,
                output_context,
                out_stream_index,
            )?;
        }

        // Flush the graph itself.
        graph_source(&mut self.graph)?
            .source()
            .flush()
            .map_err(|error| DistortError::TranscodeFailed(format!("cannot flush audio filter: {error}")))?;
        drain_graph(
            &mut self.graph,
            &mut self.encoder,
            &mut filtered,
            &mut encoded,
            &mut samples_written,
            self.encoder_time_base,
            out_time_base,
            output_context,
            out_stream_index,
        )?;

        // Flush the encoder.
        self.encoder.send_eof()?;
        while self.encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(out_stream_index);
            encoded.rescale_ts(self.encoder_time_base, out_time_base);
            encoded.write_interleaved(output_context)?;
        }

        log::debug!("Audio transcode finished ({samples_written} samples)");

        Ok(())
    }
}

/// Create an AAC encoder matching the decoder's rate and channel layout.
fn create_aac_encoder(
    decoder: &AudioDecoder,
    global_header: bool,
) -> Result<AudioEncoder, DistortError> {
    let output_codec = ffmpeg_next::encoder::find(Id::AAC)
        .ok_or_else(|| DistortError::TranscodeFailed("no AAC encoder available".to_string()))?;

    let sample_format = output_codec
        .audio()
        .ok()
        .and_then(|audio_codec| audio_codec.formats())
        .and_then(|mut formats| formats.next())
        .unwrap_or(Sample::I16(SampleType::Packed));

    let mut encoder_context = CodecContext::new()
        .encoder()
        .audio()
        .map_err(|error| DistortError::TranscodeFailed(format!("cannot create audio encoder: {error}")))?;

    encoder_context.set_rate(decoder.rate() as i32);
    encoder_context.set_channel_layout(decoder.channel_layout());
    encoder_context.set_format(sample_format);
    encoder_context.set_time_base(Rational(1, decoder.rate() as i32));
    encoder_context.set_bit_rate(128_000);
    if global_header {
        encoder_context.set_flags(codec::Flags::GLOBAL_HEADER);
    }

    encoder_context
        .open_as(output_codec)
        .map_err(|error| DistortError::TranscodeFailed(format!("cannot open AAC encoder: {error}")))
}

/// Build the `abuffer → tremolo,vibrato → abuffersink` filter graph.
fn build_effects_graph(
    decoder: &AudioDecoder,
    encoder: &AudioEncoder,
    source_time_base: Rational,
    effects: &AudioEffects,
) -> Result<FilterGraph, DistortError> {
    let graph_error =
        |stage: &str, error: ffmpeg_next::Error| DistortError::TranscodeFailed(format!("{stage}: {error}"));

    let mut graph = FilterGraph::new();

    let buffer_args = format!(
        "time_base={}/{}:sample_rate={}:sample_fmt={}:channels={}",
        source_time_base.numerator(),
        source_time_base.denominator(),
        decoder.rate(),
        decoder.format().name(),
        decoder.channel_layout().channels(),
    );

    graph
        .add(
            &ffmpeg_next::filter::find("abuffer").ok_or_else(|| {
                DistortError::TranscodeFailed("FFmpeg 'abuffer' filter not found".to_string())
            })?,
            "in",
            &buffer_args,
        )
        .map_err(|error| graph_error("cannot add abuffer filter", error))?;

    graph
        .add(
            &ffmpeg_next::filter::find("abuffersink").ok_or_else(|| {
                DistortError::TranscodeFailed("FFmpeg 'abuffersink' filter not found".to_string())
            })?,
            "out",
            "",
        )
        .map_err(|error| graph_error("cannot add abuffersink filter", error))?;

    {
        let mut sink = graph.get("out").ok_or_else(|| {
            DistortError::TranscodeFailed("audio filter 'out' not found".to_string())
        })?;
        sink.set_sample_format(encoder.format());
        sink.set_channel_layout(encoder.channel_layout());
        sink.set_sample_rate(encoder.rate());
    }

    let spec = effects.filter_spec();
    graph
        .output("in", 0)
        .map_err(|error| graph_error("audio filter graph output error", error))?
        .input("out", 0)
        .map_err(|error| graph_error("audio filter graph input error", error))?
        .parse(&spec)
        .map_err(|error| graph_error("audio filter graph parse error", error))?;

    graph
        .validate()
        .map_err(|error| graph_error("audio filter graph validation", error))?;

    // AAC wants fixed-size frames; make the sink deliver them.
    if let Some(output_codec) = encoder.codec()
        && !output_codec
            .capabilities()
            .contains(codec::Capabilities::VARIABLE_FRAME_SIZE)
    {
        graph
            .get("out")
            .ok_or_else(|| DistortError::TranscodeFailed("audio filter 'out' not found".to_string()))?
            .sink()
            .set_frame_size(encoder.frame_size() as u32);
    }

    Ok(graph)
}

/// Push one decoded frame into the graph's source.
fn feed_graph(graph: &mut FilterGraph, frame: &AudioFrame) -> Result<(), DistortError> {
    graph_source(graph)?
        .source()
        .add(frame)
        .map_err(|error| DistortError::TranscodeFailed(format!("cannot feed audio filter: {error}")))
}

fn graph_source(graph: &mut FilterGraph) -> Result<ffmpeg_next::filter::Context, DistortError> {
    graph
        .get("in")
        .ok_or_else(|| DistortError::TranscodeFailed("audio filter 'in' not found".to_string()))
}

/// Pull every pending frame out of the sink, stamp it, encode it, and write
/// the resulting packets interleaved.
#[allow(clippy::too_many_arguments)]
fn drain_graph(
    graph: &mut FilterGraph,
    encoder: &mut AudioEncoder,
    filtered: &mut AudioFrame,
    encoded: &mut Packet,
    samples_written: &mut i64,
    encoder_time_base: Rational,
    out_time_base: Rational,
    output_context: &mut Output,
    out_stream_index: usize,
) -> Result<(), DistortError> {
    loop {
        let pulled = graph
            .get("out")
            .ok_or_else(|| DistortError::TranscodeFailed("audio filter 'out' not found".to_string()))?
            .sink()
            .frame(filtered);
        match pulled {
            Ok(()) => {}
            Err(error) if sink_drained(&error) => return Ok(()),
            Err(error) => {
                return Err(DistortError::TranscodeFailed(format!(
                    "audio filter sink failed: {error}"
                )));
            }
        }

        // Continuous pts in encoder time base, counted in samples.
        filtered.set_pts(Some(*samples_written));
        *samples_written += filtered.samples() as i64;

        encoder.send_frame(filtered)?;
        while encoder.receive_packet(encoded).is_ok() {
            encoded.set_stream(out_stream_index);
            encoded.rescale_ts(encoder_time_base, out_time_base);
            encoded.write_interleaved(output_context)?;
        }
    }
}

/// Whether a sink error means "no more frames right now" rather than a
/// real filter failure. EAGAIN asks for more input, EOF ends the stream;
/// anything else must propagate.
fn sink_drained(error: &FfmpegError) -> bool {
    matches!(error, FfmpegError::Eof | FfmpegError::Other { errno: EAGAIN })
}

#[cfg(test)]
mod tests {
    use ffmpeg_next::{Error as FfmpegError, util::error::EAGAIN};

    use super::{AudioEffects, sink_drained};

    #[test]
    fn sink_drained_accepts_only_eagain_and_eof() {
        assert!(sink_drained(&FfmpegError::Eof));
        assert!(sink_drained(&FfmpegError::Other { errno: EAGAIN }));
        assert!(!sink_drained(&FfmpegError::InvalidData));
        assert!(!sink_drained(&FfmpegError::Other { errno: 0 }));
    }

    #[test]
    fn default_effects_render_the_expected_filter_chain() {
        assert_eq!(
            AudioEffects::default().filter_spec(),
            "tremolo=f=5:d=0.1,vibrato=f=5:d=0.1"
        );
    }
}
