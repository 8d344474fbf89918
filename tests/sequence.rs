//! Frame-sequence pipeline behavior.
//!
//! The happy-path tests need a real video fixture at
//! `tests/fixtures/sample_video.mp4` and skip themselves when it is absent.
//! The failure-path tests run everywhere.

use std::{fs, path::Path, path::PathBuf};

use image::{DynamicImage, Rgb, RgbImage};
use meltdown::{ReassembleOptions, Reassembler, SequenceOrchestrator, Workspace, probe};
use tempfile::tempdir;

const VIDEO_FIXTURE: &str = "tests/fixtures/sample_video.mp4";

/// Encode `frame_count` synthetic frames into an MP4 at `destination`.
///
/// Returns `false` when no H.264 encoder is available on this platform,
/// in which case the caller should skip its assertions.
fn write_synthetic_video(destination: &Path, frame_count: usize) -> bool {
    let frame_dir = destination.parent().unwrap().join("fixture_frames");
    fs::create_dir_all(&frame_dir).unwrap();

    let mut frame_paths: Vec<PathBuf> = Vec::new();
    for index in 1..=frame_count {
        let shade = (index * 40 % 256) as u8;
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(64, 48, |x, y| {
            Rgb([shade, (x * 4 % 256) as u8, (y * 5 % 256) as u8])
        }));
        let path = frame_dir.join(format!("frame_{index:04}.jpg"));
        image.save(&path).unwrap();
        frame_paths.push(path);
    }

    let options = ReassembleOptions {
        fps: 5,
        width: 64,
        height: 48,
    };
    let result = Reassembler::new(options).write(&frame_paths, destination, None);

    // Skip if the H.264 encoder is not available on this platform.
    if let Err(ref error) = result {
        let message = format!("{error}");
        if message.contains("encoder") || message.contains("codec") {
            eprintln!("Skipping: H.264 encoder not available ({message})");
            return false;
        }
    }
    result.expect("write synthetic video");
    true
}

#[test]
fn video_round_trip_produces_an_mp4_and_consumes_the_source() {
    if !Path::new(VIDEO_FIXTURE).exists() {
        return;
    }

    let dir = tempdir().unwrap();
    let source = dir.path().join("sample_video.mp4");
    fs::copy(VIDEO_FIXTURE, &source).unwrap();

    let workspace = Workspace::under(dir.path().join("work")).unwrap();
    let orchestrator = SequenceOrchestrator::new(&workspace);

    let output_name = orchestrator.run(&source, 1.7, true).unwrap();
    assert_eq!(output_name, "sample_video.mp4.mp4");

    let output_path = workspace.output.join(&output_name);
    assert!(output_path.is_file());
    assert!(fs::metadata(&output_path).unwrap().len() > 0);

    // Source consumed, staging emptied.
    assert!(!source.exists());
    assert_eq!(fs::read_dir(&workspace.raw_staging).unwrap().count(), 0);
    assert_eq!(fs::read_dir(&workspace.distorted_staging).unwrap().count(), 0);
}

#[test]
fn silent_run_works_on_a_video_source() {
    if !Path::new(VIDEO_FIXTURE).exists() {
        return;
    }

    let dir = tempdir().unwrap();
    let source = dir.path().join("sample_video.mp4");
    fs::copy(VIDEO_FIXTURE, &source).unwrap();

    let workspace = Workspace::under(dir.path().join("work")).unwrap();
    let orchestrator = SequenceOrchestrator::new(&workspace);

    // carry_audio=false is the animated-image path; it must also hold for
    // sources that happen to have audio.
    let output_name = orchestrator.run(&source, 1.7, false).unwrap();
    assert!(workspace.output.join(output_name).is_file());
}

#[test]
fn five_frame_source_stages_and_outputs_exactly_five_frames() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("five.mp4");
    if !write_synthetic_video(&source, 5) {
        return;
    }

    let info = probe(&source).unwrap();
    assert_eq!(info.frame_count, 5);

    // Decomposition stages one file per probed frame.
    let staging = dir.path().join("staging");
    fs::create_dir_all(&staging).unwrap();
    let staged = meltdown::decompose::decompose(&source, &staging).unwrap();
    assert_eq!(staged, 5);
    assert_eq!(fs::read_dir(&staging).unwrap().count(), 5);

    // The full pipeline keeps the count: five in, five out.
    let workspace = Workspace::under(dir.path().join("work")).unwrap();
    let orchestrator = SequenceOrchestrator::new(&workspace);
    let output_name = orchestrator.run(&source, 1.7, false).unwrap();

    let output_info = probe(workspace.output.join(&output_name)).unwrap();
    assert_eq!(output_info.frame_count, 5);
    assert_eq!((output_info.width, output_info.height), (64, 48));
}

#[test]
fn failure_empties_staging_and_keeps_the_source() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("broken.gif");
    let mut bytes = b"GIF89a".to_vec();
    bytes.extend_from_slice(&[0u8; 256]);
    fs::write(&source, bytes).unwrap();

    let workspace = Workspace::under(dir.path().join("work")).unwrap();
    let orchestrator = SequenceOrchestrator::new(&workspace);

    assert!(orchestrator.run(&source, 1.7, false).is_err());

    // The drop guard cleans staging on the error path too.
    assert_eq!(fs::read_dir(&workspace.raw_staging).unwrap().count(), 0);
    assert_eq!(fs::read_dir(&workspace.distorted_staging).unwrap().count(), 0);
    assert!(source.exists());
    assert_eq!(fs::read_dir(&workspace.output).unwrap().count(), 0);
}
