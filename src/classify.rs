//! Content-based input classification.
//!
//! Distortion dispatch depends on what a file actually *is*, not what its
//! name claims: a renamed `.jpg` that contains GIF data must still go down
//! the animated path. [`classify`] sniffs the leading bytes of the file via
//! the [`infer`](https://crates.io/crates/infer) crate and maps the
//! `major/minor` MIME pair onto the closed [`MediaKind`] enum.

use std::path::Path;

use crate::error::DistortError;

/// The three kinds of input the distortion pipeline accepts.
///
/// Produced exclusively by [`classify`]; every dispatch site matches on this
/// enum exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// A still image (PNG, JPEG, …). Distorted in a single transform pass.
    Image,
    /// An animated image (GIF). Decomposed into frames, reassembled silent.
    AnimatedImage,
    /// A true video. Decomposed into frames, reassembled with distorted audio.
    Video,
}

/// Classify a source file by sniffing its content.
///
/// The decision rule is evaluated in order:
///
/// 1. minor type `gif` → [`MediaKind::AnimatedImage`]
/// 2. major type `video` → [`MediaKind::Video`]
/// 3. major type `image` → [`MediaKind::Image`]
/// 4. otherwise → [`DistortError::UnsupportedType`]
///
/// The GIF check runs first so that an animated container is never treated
/// as a still image, whatever its major type reads.
///
/// # Errors
///
/// - [`DistortError::SourceNotFound`] if `path` does not name a file.
/// - [`DistortError::UnsupportedType`] if the content matches none of the
///   supported kinds (the variant carries the sniffed type, or `"unknown"`).
/// - [`DistortError::IoError`] if the file cannot be read.
pub fn classify<P: AsRef<Path>>(path: P) -> Result<MediaKind, DistortError> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(DistortError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let sniffed = infer::get_from_path(path)?.ok_or_else(|| DistortError::UnsupportedType {
        detected: "unknown".to_string(),
    })?;

    let mime = sniffed.mime_type();
    let (major, minor) = mime.split_once('/').unwrap_or((mime, ""));

    let kind = if minor == "gif" {
        MediaKind::AnimatedImage
    } else if major == "video" {
        MediaKind::Video
    } else if major == "image" {
        MediaKind::Image
    } else {
        return Err(DistortError::UnsupportedType {
            detected: mime.to_string(),
        });
    };

    log::debug!("Classified {} as {:?} (mime={})", path.display(), kind, mime);

    Ok(kind)
}
