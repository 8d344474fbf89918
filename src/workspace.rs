//! Job-scoped working directories.
//!
//! A [`Workspace`] holds the three directory roles one distortion job needs:
//! raw-frame staging, distorted-frame staging, and the output store. The
//! staging roles are scratch space with a hard invariant: they are empty
//! after every job, success or failure. [`StagingGuard`] enforces that with
//! a drop guard, so cleanup runs on every exit path including propagated
//! errors.
//!
//! Callers must not run two jobs against the same workspace concurrently:
//! both would write overlapping frame-index filenames into the same staging
//! directories.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::DistortError;

/// The three temporary-directory roles of one distortion job.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Staging for frames extracted from the source, in decode order.
    pub raw_staging: PathBuf,
    /// Staging for frames that have been through the distortion transform.
    pub distorted_staging: PathBuf,
    /// Where finished results are placed.
    pub output: PathBuf,
}

impl Workspace {
    /// Create a workspace from three explicit directory paths.
    ///
    /// Each directory is created if it does not exist. The directories
    /// themselves are never removed by the crate, only emptied.
    ///
    /// # Errors
    ///
    /// Returns [`DistortError::IoError`] if a directory cannot be created.
    pub fn new<R: AsRef<Path>, D: AsRef<Path>, O: AsRef<Path>>(
        raw_staging: R,
        distorted_staging: D,
        output: O,
    ) -> Result<Self, DistortError> {
        let workspace = Self {
            raw_staging: raw_staging.as_ref().to_path_buf(),
            distorted_staging: distorted_staging.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
        };
        for role in [
            &workspace.raw_staging,
            &workspace.distorted_staging,
            &workspace.output,
        ] {
            fs::create_dir_all(role)?;
        }
        Ok(workspace)
    }

    /// Create a workspace with the conventional layout under one root:
    /// `root/frames`, `root/distorted`, and `root/edited`.
    ///
    /// # Errors
    ///
    /// Returns [`DistortError::IoError`] if a directory cannot be created.
    pub fn under<P: AsRef<Path>>(root: P) -> Result<Self, DistortError> {
        let root = root.as_ref();
        Self::new(
            root.join("frames"),
            root.join("distorted"),
            root.join("edited"),
        )
    }

    /// Empty both staging roles, best-effort.
    ///
    /// Individual deletions that fail are logged via `log::warn!` and
    /// skipped; this method never returns an error and never panics, so it
    /// is safe to call from a drop guard. The output role is not touched.
    pub fn clean_staging(&self) {
        empty_directory(&self.raw_staging);
        empty_directory(&self.distorted_staging);
    }
}

/// Remove every entry inside `directory`, leaving the directory itself.
fn empty_directory(directory: &Path) {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(error) => {
            log::warn!("Cannot read staging directory {}: {error}", directory.display());
            return;
        }
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(error) => {
                log::warn!("Cannot list entry in {}: {error}", directory.display());
                continue;
            }
        };
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        if let Err(error) = result {
            log::warn!("Cannot remove staging entry {}: {error}", path.display());
        }
    }
}

/// Drop guard that empties both staging roles when it goes out of scope.
///
/// Constructed at the start of a sequence job so cleanup runs on every exit
/// path, including propagated errors.
pub(crate) struct StagingGuard<'a> {
    workspace: &'a Workspace,
}

impl<'a> StagingGuard<'a> {
    pub(crate) fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }
}

impl Drop for StagingGuard<'_> {
    fn drop(&mut self) {
        self.workspace.clean_staging();
    }
}
