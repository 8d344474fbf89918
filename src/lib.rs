//! # meltdown
//!
//! Progressive content-aware distortion ("melting") for images, animated
//! images, and videos.
//!
//! The pipeline shrinks each frame with seam carving, then re-expands the
//! shrunk canvas to 200% with ordinary interpolation, compounding the warp
//! the seam removal introduced. Still images get a single application;
//! animated images and videos get one application per frame with strength
//! growing linearly over the sequence, so the result melts progressively.
//! Video output keeps the original audio, run through a tremolo + vibrato
//! chain so the sound warbles along with the picture.
//!
//! # Quick start
//!
//! ```no_run
//! use meltdown::{DistortionService, Workspace};
//!
//! # fn main() -> Result<(), meltdown::DistortError> {
//! let workspace = Workspace::under(".meltdown")?;
//! let service = DistortionService::new("media", workspace);
//! let output_name = service.distort("clip.mp4")?;
//! println!("distorted into {output_name}");
//! # Ok(())
//! # }
//! ```
//!
//! # Pipeline stages
//!
//! - [`classify`] — decide whether a source is a still image, an animated
//!   image, or a video, from its magic bytes.
//! - [`distort_frame`] — the single-frame shrink/restore transform.
//! - [`strength_at`] — the per-frame strength schedule.
//! - [`SequenceOrchestrator`] — decompose, distort, and reassemble motion
//!   sources.
//! - [`DistortionService`] — the facade tying classification and dispatch
//!   together.
//!
//! # Features
//!
//! - `rayon` — distort the frames of a sequence across a thread pool.

pub mod audio;
pub mod carve;
pub mod classify;
pub mod decompose;
pub mod error;
pub mod ffmpeg;
pub mod probe;
pub mod reassemble;
pub mod schedule;
pub mod sequence;
pub mod service;
pub mod transform;
pub mod workspace;

pub use audio::AudioEffects;
pub use classify::{MediaKind, classify};
pub use error::DistortError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use probe::{SourceInfo, probe};
pub use reassemble::{AudioSource, ReassembleOptions, Reassembler};
pub use schedule::{DEFAULT_BASE_STRENGTH, strength_at};
pub use sequence::SequenceOrchestrator;
pub use service::DistortionService;
pub use transform::distort_frame;
pub use workspace::Workspace;
