//! Directory enumeration for the triage queue.
//!
//! This module provides the `FileScanner` struct which handles:
//! - Flat (depth 1) directory listing using walkdir
//! - Extension filtering against the active `SortFilterConfig`
//! - Sorting by name, modification time or size

use std::cmp::Ordering;
use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::{bail, Context, Result};
use tokio::task;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::models::{SortBy, SortFilterConfig, SortOrder};

/// A matching file found during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DiscoveredEntry {
    filename: String,
    mtime: i64,
    size: u64,
}

/// Lists the media files of one folder. Symlinks are not followed.
#[derive(Debug, Default)]
pub struct FileScanner;

impl FileScanner {
    pub fn new() -> Self {
        Self
    }

    /// Returns the ordered filenames in `dir` that pass `filter`.
    ///
    /// Runs the walk on the blocking pool. An unreadable or missing folder is an
    /// error; individual unreadable entries are skipped.
    pub async fn scan(&self, dir: &Path, filter: &SortFilterConfig) -> Result<Vec<String>> {
        let dir = dir.to_path_buf();
        let filter = filter.clone();

        task::spawn_blocking(move || Self::scan_sync(&dir, &filter))
            .await
            .context("Scan task panicked")?
    }

    fn scan_sync(dir: &Path, filter: &SortFilterConfig) -> Result<Vec<String>> {
        let meta = std::fs::metadata(dir).with_context(|| format!("Cannot read {}", dir.display()))?;
        if !meta.is_dir() {
            bail!("{} is not a directory", dir.display());
        }

        let mut entries = Self::discover_files(dir, filter)?;
        Self::sort_entries(&mut entries, filter.sort_by, filter.sort_order);
        info!("Discovered {} media files in {:?}", entries.len(), dir);

        Ok(entries.into_iter().map(|e| e.filename).collect())
    }

    /// Collects regular files directly inside `dir` whose extension is enabled.
    fn discover_files(dir: &Path, filter: &SortFilterConfig) -> Result<Vec<DiscoveredEntry>> {
        let walker = WalkDir::new(dir).min_depth(1).max_depth(1);

        let mut entries = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(filename) = entry.file_name().to_str() else {
                debug!("Skipping non UTF-8 filename {:?}", entry.file_name());
                continue;
            };
            if !filter.matches(filename) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    warn!("Failed to read metadata for {:?}: {}", entry.path(), e);
                    continue;
                }
            };

            let mtime = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);

            entries.push(DiscoveredEntry {
                filename: filename.to_string(),
                mtime,
                size: metadata.len(),
            });
        }

        Ok(entries)
    }

    fn sort_entries(entries: &mut [DiscoveredEntry], sort_by: SortBy, order: SortOrder) {
        entries.sort_by(|a, b| {
            let primary = match sort_by {
                SortBy::Name => Ordering::Equal,
                SortBy::Date => a.mtime.cmp(&b.mtime),
                SortBy::Size => a.size.cmp(&b.size),
            };
            let ordering = primary.then_with(|| compare_names(&a.filename, &b.filename));
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }
}

/// Case-insensitive, with the exact name as tie-break for a stable order.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
