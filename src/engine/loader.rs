//! Preview and metadata loading for the current item.
//!
//! - Every request is stamped with a fresh `LoadToken`
//! - Fetches run as spawned tasks and report back over an async channel
//! - Only events carrying the latest token are applied, so the last
//!   navigation always wins no matter which fetch completes first
//! - Nothing is cancelled; superseded results are dropped on arrival

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_channel::{Receiver, Sender};
use tracing::{debug, trace, warn};

use crate::engine::backend::{MediaBackend, MediaMetadata, Preview};
use crate::engine::error::EngineError;
use crate::models::MediaItem;

/// Freshness stamp of a load request. Later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadToken(u64);

impl LoadToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// What a single load request resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTarget {
    pub token: LoadToken,
    pub index: usize,
    pub item: MediaItem,
}

/// Result of one half of a load, sent back to the owning loop.
#[derive(Debug, Clone)]
pub enum LoadEvent {
    Preview {
        token: LoadToken,
        result: Result<Preview, EngineError>,
    },
    Metadata {
        token: LoadToken,
        metadata: Option<MediaMetadata>,
    },
}

impl LoadEvent {
    pub fn token(&self) -> LoadToken {
        match self {
            Self::Preview { token, .. } | Self::Metadata { token, .. } => *token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    Loading,
    Ready(Preview),
    /// Placeholder shown instead of the preview. Carries the failure text.
    Unavailable(String),
}

/// The content currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Displayed {
    pub token: LoadToken,
    pub index: usize,
    pub item: MediaItem,
    pub preview: PreviewState,
    pub metadata: Option<MediaMetadata>,
    pub metadata_loaded: bool,
}

impl Displayed {
    fn pending(target: &LoadTarget) -> Self {
        Self {
            token: target.token,
            index: target.index,
            item: target.item.clone(),
            preview: PreviewState::Loading,
            metadata: None,
            metadata_loaded: false,
        }
    }

    #[cfg(test)]
    pub fn is_loading(&self) -> bool {
        self.preview == PreviewState::Loading
    }

    /// Still images get the blurred backdrop behind them; videos never do.
    pub fn shows_backdrop(&self) -> bool {
        !self.item.is_video() && matches!(self.preview, PreviewState::Ready(_))
    }
}

pub struct LoadCoordinator<B> {
    backend: Arc<B>,
    latest: LoadToken,
    /// Mirror of `latest` readable from fetch tasks, letting them skip work.
    latest_shared: Arc<AtomicU64>,
    displayed: Option<Displayed>,
    events_tx: Sender<LoadEvent>,
    events_rx: Receiver<LoadEvent>,
}

impl<B: MediaBackend> LoadCoordinator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let (events_tx, events_rx) = async_channel::unbounded();
        Self {
            backend,
            latest: LoadToken::default(),
            latest_shared: Arc::new(AtomicU64::new(0)),
            displayed: None,
            events_tx,
            events_rx,
        }
    }

    #[cfg(test)]
    pub fn latest(&self) -> LoadToken {
        self.latest
    }

    pub fn displayed(&self) -> Option<&Displayed> {
        self.displayed.as_ref()
    }

    /// Receiver for load events. Feed what it yields to [`Self::accept`].
    pub fn events(&self) -> Receiver<LoadEvent> {
        self.events_rx.clone()
    }

    fn bump(&mut self) -> LoadToken {
        self.latest = LoadToken(self.latest.0 + 1);
        self.latest_shared.store(self.latest.value(), Ordering::Release);
        self.latest
    }

    /// Issues a new token for `filename` at `index` and shows it as loading.
    pub fn issue(&mut self, source_folder: &str, index: usize, filename: &str) -> LoadTarget {
        let token = self.bump();
        let target = LoadTarget {
            token,
            index,
            item: MediaItem::resolve(source_folder, filename),
        };
        self.displayed = Some(Displayed::pending(&target));
        target
    }

    /// Issues a token and spawns the fetch. Must be called inside a tokio runtime.
    pub fn load_for(&mut self, source_folder: &str, index: usize, filename: &str) -> LoadToken {
        let target = self.issue(source_folder, index, filename);
        let token = target.token;
        debug!(token = token.value(), index, path = %target.item.full_path, "Loading item");

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        let latest = Arc::clone(&self.latest_shared);

        tokio::spawn(async move {
            let preview = Self::fetch_preview(backend.as_ref(), &target).await;
            if tx.send(preview).await.is_err() {
                return;
            }
            if target.token.value() != latest.load(Ordering::Acquire) {
                trace!(token = target.token.value(), "Skipping metadata for superseded load");
                return;
            }
            let metadata = Self::fetch_metadata(backend.as_ref(), &target).await;
            let _ = tx.send(metadata).await;
        });

        token
    }

    pub async fn fetch_preview(backend: &B, target: &LoadTarget) -> LoadEvent {
        let path = &target.item.full_path;
        let result = backend
            .load_preview(path)
            .await
            .map_err(|e| EngineError::load(path, &e));
        LoadEvent::Preview {
            token: target.token,
            result,
        }
    }

    pub async fn fetch_metadata(backend: &B, target: &LoadTarget) -> LoadEvent {
        LoadEvent::Metadata {
            token: target.token,
            metadata: backend.load_metadata(&target.item.full_path).await,
        }
    }

    /// Applies `event` if it belongs to the latest request. Returns whether it was applied.
    pub fn accept(&mut self, event: LoadEvent) -> bool {
        let token = event.token();
        if token != self.latest {
            trace!(
                token = token.value(),
                latest = self.latest.value(),
                "Discarding stale load result"
            );
            return false;
        }
        let Some(displayed) = self.displayed.as_mut() else {
            return false;
        };

        match event {
            LoadEvent::Preview { result, .. } => {
                displayed.preview = match result {
                    Ok(preview) => PreviewState::Ready(preview),
                    Err(e) => {
                        warn!("{}", e);
                        PreviewState::Unavailable(e.to_string())
                    }
                };
            }
            LoadEvent::Metadata { metadata, .. } => {
                displayed.metadata = metadata;
                displayed.metadata_loaded = true;
            }
        }
        true
    }

    /// Nothing to show (empty queue). In-flight results become stale.
    pub fn clear(&mut self) {
        self.bump();
        self.displayed = None;
    }
}
