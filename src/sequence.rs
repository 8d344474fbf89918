//! The decompose → distort → reassemble pipeline for motion sources.
//!
//! [`SequenceOrchestrator`] runs one animated-image or video job end to
//! end: probe the source geometry, decompose it into staged frames, apply
//! the distortion transform to each frame with progressively increasing
//! strength, reassemble the distorted frames into an MP4, and remove the
//! source. Staging directories are emptied on every exit path by a drop
//! guard, so a failed job never leaves frame files behind.

use std::{
    fs,
    path::{Path, PathBuf},
};

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    audio::AudioEffects,
    decompose,
    error::DistortError,
    probe,
    reassemble::{AudioSource, ReassembleOptions, Reassembler},
    schedule,
    transform,
    workspace::{StagingGuard, Workspace},
};

/// Runs the full frame-sequence distortion pipeline against one workspace.
pub struct SequenceOrchestrator<'a> {
    workspace: &'a Workspace,
}

impl<'a> SequenceOrchestrator<'a> {
    /// Create an orchestrator over the given workspace.
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Distort `source` end to end and place the result in the workspace
    /// output directory.
    ///
    /// The output is always an MP4 named after the source file name with
    /// `.mp4` appended. `carry_audio` selects whether the source's audio
    /// track is filtered and muxed into the result; animated images have
    /// none, so their jobs pass `false`. On success the source file is
    /// removed and the output file name is returned.
    ///
    /// Any failure propagates; no partial success is reported. Staging is
    /// emptied whether the job succeeds or fails.
    ///
    /// # Errors
    ///
    /// Propagates [`DistortError::ProbeFailed`],
    /// [`DistortError::TranscodeFailed`], and the transform and I/O errors
    /// of the stages involved.
    pub fn run(
        &self,
        source: &Path,
        base_strength: f64,
        carry_audio: bool,
    ) -> Result<String, DistortError> {
        let _guard = StagingGuard::new(self.workspace);

        let info = probe::probe(source)?;
        decompose::decompose(source, &self.workspace.raw_staging)?;

        let raw_frames = list_sorted(&self.workspace.raw_staging)?;
        if raw_frames.is_empty() {
            return Err(DistortError::TranscodeFailed(
                "decomposition produced no frames".to_string(),
            ));
        }

        log::info!(
            "Distorting {} frames of {} (base strength {base_strength})",
            raw_frames.len(),
            source.display(),
        );

        distort_frames(&raw_frames, &self.workspace.distorted_staging, base_strength)?;

        let distorted_frames = list_sorted(&self.workspace.distorted_staging)?;

        let source_name = source
            .file_name()
            .ok_or_else(|| {
                DistortError::TranscodeFailed(format!("source has no file name: {}", source.display()))
            })?
            .to_string_lossy()
            .into_owned();
        let output_name = format!("{source_name}.mp4");
        let destination = self.workspace.output.join(&output_name);

        let fps = if info.frames_per_second > 0.0 {
            info.frames_per_second.round() as u32
        } else {
            25
        };
        let options = ReassembleOptions {
            fps,
            width: info.width,
            height: info.height,
        };

        let audio = carry_audio.then(|| AudioSource {
            path: source.to_path_buf(),
            effects: AudioEffects::default(),
        });

        Reassembler::new(options).write(&distorted_frames, &destination, audio.as_ref())?;

        // The source is consumed only once the output exists.
        fs::remove_file(source)?;

        log::info!("Assembled {output_name}");

        Ok(output_name)
    }
}

/// Apply the distortion transform to every staged frame, writing results
/// under the same file names into `target`.
///
/// Strength grows with the 1-based frame index over the schedule, so later
/// frames melt further than earlier ones.
#[cfg(not(feature = "rayon"))]
fn distort_frames(
    raw_frames: &[PathBuf],
    target: &Path,
    base_strength: f64,
) -> Result<(), DistortError> {
    let total = raw_frames.len();
    for (index, frame_path) in raw_frames.iter().enumerate() {
        distort_one(frame_path, target, index + 1, total, base_strength)?;
    }
    Ok(())
}

/// Apply the distortion transform to every staged frame, writing results
/// under the same file names into `target`.
///
/// Frames are independent, so they are distributed across rayon threads.
#[cfg(feature = "rayon")]
fn distort_frames(
    raw_frames: &[PathBuf],
    target: &Path,
    base_strength: f64,
) -> Result<(), DistortError> {
    let total = raw_frames.len();
    raw_frames
        .iter()
        .enumerate()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(index, frame_path)| distort_one(frame_path, target, index + 1, total, base_strength))
        .collect()
}

/// Distort one staged frame and write it under the same name into `target`.
fn distort_one(
    frame_path: &Path,
    target: &Path,
    frame_index: usize,
    total_frames: usize,
    base_strength: f64,
) -> Result<(), DistortError> {
    let strength = schedule::strength_at(frame_index, total_frames, base_strength);
    let frame = image::open(frame_path)?;
    let distorted = transform::distort_frame(&frame, strength)?;

    let file_name = frame_path.file_name().ok_or_else(|| {
        DistortError::TransformFailed(format!("staged frame has no file name: {}", frame_path.display()))
    })?;
    distorted.save(target.join(file_name))?;
    Ok(())
}

/// List the files directly inside `directory`, sorted by file name.
///
/// Frame files carry zero-padded indices, so name order is frame order.
fn list_sorted(directory: &Path) -> Result<Vec<PathBuf>, DistortError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));
    Ok(files)
}
