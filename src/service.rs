//! The top-level distortion entry point.
//!
//! [`DistortionService`] is the facade the CLI (or an embedding
//! application) talks to: given the file name of a source inside the
//! service's input directory, it classifies the file and dispatches to the
//! matching pipeline. Still images go through a single transform; animated
//! images and videos go through the frame-sequence orchestrator.

use std::path::{Path, PathBuf};

use crate::{
    classify::{self, MediaKind},
    error::DistortError,
    schedule::DEFAULT_BASE_STRENGTH,
    sequence::SequenceOrchestrator,
    transform,
    workspace::Workspace,
};

/// Classifies sources and dispatches them to the right pipeline.
pub struct DistortionService {
    input_dir: PathBuf,
    workspace: Workspace,
}

impl DistortionService {
    /// Create a service reading sources from `input_dir` and working
    /// through `workspace`.
    pub fn new<P: AsRef<Path>>(input_dir: P, workspace: Workspace) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
            workspace,
        }
    }

    /// Distort the named source at the default base strength.
    ///
    /// See [`distort_with_strength`](DistortionService::distort_with_strength).
    pub fn distort(&self, name: &str) -> Result<String, DistortError> {
        self.distort_with_strength(name, DEFAULT_BASE_STRENGTH)
    }

    /// Distort the named source, returning the output file name.
    ///
    /// `name` is resolved against the service's input directory. Still
    /// images keep their name; motion sources gain a `.mp4` suffix. On
    /// success the source file has been consumed and the result sits in
    /// the workspace output directory.
    ///
    /// # Errors
    ///
    /// - [`DistortError::InvalidStrength`] if `base_strength < 1.0`.
    /// - [`DistortError::SourceNotFound`] if the source does not exist.
    /// - [`DistortError::UnsupportedType`] if the content is neither an
    ///   image, an animated image, nor a video.
    /// - Any pipeline error from the dispatched stage.
    pub fn distort_with_strength(
        &self,
        name: &str,
        base_strength: f64,
    ) -> Result<String, DistortError> {
        if !(base_strength >= 1.0) {
            return Err(DistortError::InvalidStrength {
                value: base_strength,
            });
        }

        let source = self.input_dir.join(name);
        if !source.is_file() {
            return Err(DistortError::SourceNotFound { path: source });
        }

        let kind = classify::classify(&source)?;
        log::info!("Distorting {name} as {kind:?} (base strength {base_strength})");

        match kind {
            MediaKind::Image => self.distort_still(&source, name, base_strength),
            MediaKind::AnimatedImage => {
                SequenceOrchestrator::new(&self.workspace).run(&source, base_strength, false)
            }
            MediaKind::Video => {
                SequenceOrchestrator::new(&self.workspace).run(&source, base_strength, true)
            }
        }
    }

    /// Single-transform pipeline for still images.
    fn distort_still(
        &self,
        source: &Path,
        name: &str,
        strength: f64,
    ) -> Result<String, DistortError> {
        let frame = image::open(source)?;
        let distorted = transform::distort_frame(&frame, strength)?;
        distorted.save(self.workspace.output.join(name))?;

        std::fs::remove_file(source)?;

        log::info!("Distorted still image {name}");
        Ok(name.to_string())
    }
}
