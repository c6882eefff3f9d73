//! Filesystem implementation of every content and file-operation collaborator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::task;
use tracing::{debug, info, warn};

use super::preview_cache::PreviewCache;
use super::trash::{move_into, Trash};
use crate::engine::{MediaBackend, MediaMetadata, OpStatus, Preview};
use crate::models::{join_path, mime_for, MediaKind, SortFilterConfig};
use crate::scanner::{FileScanner, MetadataExtractor};

pub struct LocalBackend {
    scanner: FileScanner,
    previews: PreviewCache,
    trash: Trash,
}

impl LocalBackend {
    pub fn new(trash: Trash, previews: PreviewCache) -> Self {
        Self {
            scanner: FileScanner::new(),
            previews,
            trash,
        }
    }

    /// XDG trash location and an env-sized preview cache.
    pub fn new_default() -> Result<Self> {
        let trash = Trash::new_default()?;
        debug!("Trash root at {:?}", trash.root());
        Ok(Self::new(trash, PreviewCache::from_env()))
    }

    #[cfg(test)]
    pub fn trash(&self) -> &Trash {
        &self.trash
    }

    async fn read_preview(&self, full_path: &str) -> Result<Preview> {
        if MediaKind::from_filename(full_path).is_video() {
            let path = PathBuf::from(full_path);
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                bail!("{} does not exist", full_path);
            }
            return Ok(Preview::Stream(path));
        }

        let data = match self.previews.get(full_path) {
            Some(data) => data,
            None => {
                let bytes = tokio::fs::read(full_path)
                    .await
                    .with_context(|| format!("Failed to read {full_path}"))?;
                let data: Arc<[u8]> = Arc::from(bytes);
                self.previews.insert(full_path, Arc::clone(&data));
                data
            }
        };
        Ok(Preview::Bytes {
            mime: mime_for(full_path),
            data,
        })
    }

    /// Runs a blocking relocation and reports it as an `OpStatus`.
    async fn relocate<F>(&self, what: &'static str, op: F) -> OpStatus
    where
        F: FnOnce() -> Result<PathBuf> + Send + 'static,
    {
        let result = task::spawn_blocking(op)
            .await
            .context("File operation panicked")
            .and_then(|r| r);
        match result {
            Ok(target) => {
                info!("{} -> {:?}", what, target);
                OpStatus::ok()
            }
            Err(e) => {
                warn!("{} failed: {:#}", what, e);
                OpStatus::failed(format!("{e:#}"))
            }
        }
    }
}

impl MediaBackend for LocalBackend {
    async fn scan(&self, folder: &str, config: &SortFilterConfig) -> Result<Vec<String>> {
        self.scanner.scan(Path::new(folder), config).await
    }

    async fn load_preview(&self, full_path: &str) -> Result<Preview> {
        self.read_preview(full_path).await
    }

    async fn load_metadata(&self, full_path: &str) -> Option<MediaMetadata> {
        let path = PathBuf::from(full_path);
        match task::spawn_blocking(move || MetadataExtractor::extract(&path)).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Metadata task for {} failed: {}", full_path, e);
                None
            }
        }
    }

    async fn move_file(&self, filename: &str, from_folder: &str, to_folder: &str) -> OpStatus {
        let src_path = join_path(from_folder, filename);
        self.previews.remove(&src_path);
        let src = PathBuf::from(src_path);
        let dest = PathBuf::from(to_folder);
        self.relocate("Move", move || move_into(&src, &dest)).await
    }

    async fn delete_file(&self, filename: &str, from_folder: &str) -> OpStatus {
        let src_path = join_path(from_folder, filename);
        self.previews.remove(&src_path);
        let src = PathBuf::from(src_path);
        let trash = self.trash.clone();
        let folder = from_folder.to_string();
        self.relocate("Delete", move || trash.delete(&src, &folder)).await
    }

    async fn restore(&self, filename: &str, from_folder: &str) -> OpStatus {
        let trash = self.trash.clone();
        let filename = filename.to_string();
        let folder = from_folder.to_string();
        self.relocate("Restore", move || trash.restore(&filename, &folder))
            .await
    }
}
