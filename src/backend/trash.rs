//! File relocation primitives: plain moves and the per-source trash.
//!
//! Trash directories live under `XDG_DATA_HOME/mediasort/trash/`, one per
//! source folder, named by the xxhash of the folder string so restores never
//! need an index file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

/// Moves `src` into `dest_dir`, keeping its file name.
///
/// Creates `dest_dir` if needed and never overwrites. Falls back to
/// copy-then-remove when a rename is not possible (different filesystem).
pub fn move_into(src: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let name = src
        .file_name()
        .with_context(|| format!("{} has no file name", src.display()))?;
    if !src.is_file() {
        bail!("{} does not exist", src.display());
    }

    fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create {}", dest_dir.display()))?;

    let target = dest_dir.join(name);
    if target.exists() {
        bail!(
            "{} already exists in {}",
            name.to_string_lossy(),
            dest_dir.display()
        );
    }

    if let Err(rename_err) = fs::rename(src, &target) {
        debug!(
            "Rename {:?} -> {:?} failed ({}), copying instead",
            src, target, rename_err
        );
        fs::copy(src, &target)
            .with_context(|| format!("Failed to move {} to {}", src.display(), dest_dir.display()))?;
        if let Err(e) = fs::remove_file(src) {
            // Leave exactly one copy behind.
            if let Err(cleanup) = fs::remove_file(&target) {
                warn!("Failed to clean up {:?}: {}", target, cleanup);
            }
            return Err(e).with_context(|| format!("Failed to remove {}", src.display()));
        }
    }

    Ok(target)
}

#[derive(Debug, Clone)]
pub struct Trash {
    root: PathBuf,
}

impl Trash {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn new_default() -> Result<Self> {
        Ok(Self::new(Self::default_root()?))
    }

    /// Returns `XDG_DATA_HOME/mediasort/trash`.
    pub fn default_root() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "mediasort")
            .context("Failed to determine project directories")?;
        Ok(proj_dirs.data_dir().join("trash"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Trash directory holding files deleted from `source_folder`.
    pub fn dir_for(&self, source_folder: &str) -> PathBuf {
        self.root
            .join(format!("{:016x}", xxh3_64(source_folder.as_bytes())))
    }

    /// Moves `source_folder/filename` into the trash.
    pub fn delete(&self, source: &Path, source_folder: &str) -> Result<PathBuf> {
        move_into(source, &self.dir_for(source_folder))
    }

    /// Moves a trashed `filename` back into `source_folder`.
    pub fn restore(&self, filename: &str, source_folder: &str) -> Result<PathBuf> {
        let trashed = self.dir_for(source_folder).join(filename);
        if !trashed.is_file() {
            bail!("{} is not in the trash", filename);
        }
        move_into(&trashed, Path::new(source_folder))
    }
}
