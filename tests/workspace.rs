//! Workspace directory management.

use std::fs;

use meltdown::Workspace;
use tempfile::tempdir;

#[test]
fn under_creates_the_conventional_layout() {
    let dir = tempdir().unwrap();
    let workspace = Workspace::under(dir.path().join("work")).unwrap();

    assert!(workspace.raw_staging.is_dir());
    assert!(workspace.distorted_staging.is_dir());
    assert!(workspace.output.is_dir());
    assert_eq!(workspace.raw_staging, dir.path().join("work/frames"));
    assert_eq!(workspace.distorted_staging, dir.path().join("work/distorted"));
    assert_eq!(workspace.output, dir.path().join("work/edited"));
}

#[test]
fn new_accepts_preexisting_directories() {
    let dir = tempdir().unwrap();
    let raw = dir.path().join("a");
    let distorted = dir.path().join("b");
    let output = dir.path().join("c");
    fs::create_dir_all(&raw).unwrap();

    let workspace = Workspace::new(&raw, &distorted, &output).unwrap();
    assert!(workspace.raw_staging.is_dir());
    assert!(workspace.distorted_staging.is_dir());
    assert!(workspace.output.is_dir());
}

#[test]
fn new_accepts_mixed_path_argument_types() {
    let dir = tempdir().unwrap();
    let raw = dir.path().join("raw");
    let distorted = dir.path().join("distorted");
    let output = dir.path().join("out");

    // One owned PathBuf, one borrowed Path, one &str.
    let workspace =
        Workspace::new(raw, distorted.as_path(), output.to_str().unwrap()).unwrap();
    assert!(workspace.raw_staging.is_dir());
    assert!(workspace.distorted_staging.is_dir());
    assert!(workspace.output.is_dir());
}

#[test]
fn clean_staging_empties_staging_but_keeps_output() {
    let dir = tempdir().unwrap();
    let workspace = Workspace::under(dir.path().join("work")).unwrap();

    fs::write(workspace.raw_staging.join("frame_0001.jpg"), b"raw").unwrap();
    fs::write(workspace.distorted_staging.join("frame_0001.jpg"), b"warped").unwrap();
    fs::write(workspace.output.join("result.mp4"), b"keep me").unwrap();

    workspace.clean_staging();

    assert_eq!(fs::read_dir(&workspace.raw_staging).unwrap().count(), 0);
    assert_eq!(fs::read_dir(&workspace.distorted_staging).unwrap().count(), 0);
    // The directories themselves survive, as does the output.
    assert!(workspace.raw_staging.is_dir());
    assert!(workspace.distorted_staging.is_dir());
    assert!(workspace.output.join("result.mp4").is_file());
}

#[test]
fn clean_staging_removes_nested_entries() {
    let dir = tempdir().unwrap();
    let workspace = Workspace::under(dir.path().join("work")).unwrap();

    let nested = workspace.raw_staging.join("leftover");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("junk.bin"), b"junk").unwrap();

    workspace.clean_staging();
    assert_eq!(fs::read_dir(&workspace.raw_staging).unwrap().count(), 0);
}
