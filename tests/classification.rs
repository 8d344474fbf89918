//! Content-based media classification.

use std::fs;

use meltdown::{DistortError, MediaKind, classify};
use tempfile::tempdir;

#[test]
fn gif_magic_bytes_classify_as_animated_image() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("loop.gif");
    let mut bytes = b"GIF89a".to_vec();
    bytes.extend_from_slice(&[0u8; 64]);
    fs::write(&path, bytes).unwrap();

    assert_eq!(classify(&path).unwrap(), MediaKind::AnimatedImage);
}

#[test]
fn png_magic_bytes_classify_as_image() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("photo.png");
    let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 64]);
    fs::write(&path, bytes).unwrap();

    assert_eq!(classify(&path).unwrap(), MediaKind::Image);
}

#[test]
fn jpeg_magic_bytes_classify_as_image() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("photo.jpg");
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.extend_from_slice(&[0u8; 64]);
    fs::write(&path, bytes).unwrap();

    assert_eq!(classify(&path).unwrap(), MediaKind::Image);
}

#[test]
fn mp4_magic_bytes_classify_as_video() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clip.mp4");
    let mut bytes = vec![0x00, 0x00, 0x00, 0x18];
    bytes.extend_from_slice(b"ftypmp42");
    bytes.extend_from_slice(&[0u8; 64]);
    fs::write(&path, bytes).unwrap();

    assert_eq!(classify(&path).unwrap(), MediaKind::Video);
}

#[test]
fn extension_does_not_override_content() {
    // GIF bytes behind a .png name still classify as an animated image.
    let dir = tempdir().unwrap();
    let path = dir.path().join("disguised.png");
    let mut bytes = b"GIF87a".to_vec();
    bytes.extend_from_slice(&[0u8; 64]);
    fs::write(&path, bytes).unwrap();

    assert_eq!(classify(&path).unwrap(), MediaKind::AnimatedImage);
}

#[test]
fn text_content_is_unsupported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "just some text, nothing distortable").unwrap();

    assert!(matches!(
        classify(&path),
        Err(DistortError::UnsupportedType { .. })
    ));
}

#[test]
fn missing_file_reports_source_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.mp4");

    assert!(matches!(
        classify(&path),
        Err(DistortError::SourceNotFound { .. })
    ));
}
