//! The ordered triage queue and everything that mutates it.
//!
//! State changes are committed only after the collaborator reports success, so
//! a failed move, delete, restore or scan leaves the queue and the history
//! exactly as they were.

use std::sync::Arc;

use async_channel::Receiver;
use tracing::{debug, info, warn};

use crate::engine::backend::{Interaction, MediaBackend};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::history::{ActionHistory, HistoryEntry};
use crate::engine::loader::{Displayed, LoadCoordinator, LoadEvent};
use crate::engine::viewport::Viewport;
use crate::engine::window::{window_for, ViewWindow, WINDOW_AHEAD, WINDOW_BEHIND};
use crate::models::{DestinationList, SortBy, SortFilterConfig, SortOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user said no. Not an error.
    Declined,
    /// Queue was empty.
    Nothing,
}

pub struct QueueController<B> {
    backend: Arc<B>,
    source: Option<String>,
    items: Vec<String>,
    current: usize,
    filter: SortFilterConfig,
    destinations: DestinationList,
    history: ActionHistory,
    loader: LoadCoordinator<B>,
    viewport: Viewport,
}

impl<B: MediaBackend> QueueController<B> {
    pub fn new(backend: Arc<B>, filter: SortFilterConfig) -> Self {
        let loader = LoadCoordinator::new(Arc::clone(&backend));
        Self {
            backend,
            source: None,
            items: Vec::new(),
            current: 0,
            filter,
            destinations: DestinationList::new(),
            history: ActionHistory::new(),
            loader,
            viewport: Viewport::new(),
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&str> {
        self.items.get(self.current).map(String::as_str)
    }

    /// Everything has been triaged (or nothing matched).
    pub fn is_done(&self) -> bool {
        self.items.is_empty()
    }

    pub fn filter(&self) -> &SortFilterConfig {
        &self.filter
    }

    pub fn destinations(&self) -> &DestinationList {
        &self.destinations
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn displayed(&self) -> Option<&Displayed> {
        self.loader.displayed()
    }

    pub fn window(&self) -> ViewWindow<'_, String> {
        window_for(&self.items, self.current, WINDOW_BEHIND, WINDOW_AHEAD)
    }

    pub fn load_events(&self) -> Receiver<LoadEvent> {
        self.loader.events()
    }

    pub fn accept_load(&mut self, event: LoadEvent) -> bool {
        self.loader.accept(event)
    }

    /// Replaces the source folder and rescans. On scan failure the previous
    /// folder and queue stay in place.
    pub async fn set_source(&mut self, folder: impl Into<String>) -> EngineResult<()> {
        let folder = folder.into();
        info!("Source folder set to {}", folder);
        let previous = self.source.replace(folder);
        let result = self.rescan().await;
        if result.is_err() {
            self.source = previous;
        }
        result
    }

    /// Asks for a source folder. Returns false if the chooser was cancelled.
    pub async fn pick_source<U: Interaction>(&mut self, ui: &mut U) -> EngineResult<bool> {
        match ui.pick_folder("Select source folder").await {
            Some(folder) => self.set_source(folder).await.map(|_| true),
            None => Ok(false),
        }
    }

    /// Re-enumerates the source folder with the current config and starts at index 0.
    pub async fn rescan(&mut self) -> EngineResult<()> {
        let Some(folder) = self.source.clone() else {
            return Ok(());
        };

        debug!(
            folder = %folder,
            sort_by = %self.filter.sort_by,
            sort_order = %self.filter.sort_order,
            extensions = self.filter.extensions.len(),
            "Scanning"
        );
        match self.backend.scan(&folder, &self.filter).await {
            Ok(items) => {
                info!("Scanned {}: {} items", folder, items.len());
                self.items = items;
                self.current = 0;
                self.on_current_changed();
                Ok(())
            }
            Err(e) => {
                let err = EngineError::scan(&folder, &e);
                warn!("{}", err);
                Err(err)
            }
        }
    }

    /// Installs a new config and rescans if it differs. Returns whether a rescan ran.
    /// On scan failure the previous config is restored.
    pub async fn set_filter(&mut self, filter: SortFilterConfig) -> EngineResult<bool> {
        if filter == self.filter {
            return Ok(false);
        }
        let previous = std::mem::replace(&mut self.filter, filter);
        if self.source.is_none() {
            return Ok(false);
        }
        match self.rescan().await {
            Ok(()) => Ok(true),
            Err(e) => {
                self.filter = previous;
                Err(e)
            }
        }
    }

    pub async fn toggle_extension(&mut self, ext: &str) -> EngineResult<bool> {
        let mut filter = self.filter.clone();
        filter.toggle_extension(ext);
        self.set_filter(filter).await
    }

    pub async fn toggle_group(&mut self, group: &str) -> EngineResult<bool> {
        let mut filter = self.filter.clone();
        if !filter.toggle_group(group) {
            return Ok(false);
        }
        self.set_filter(filter).await
    }

    pub async fn set_sort(&mut self, sort_by: SortBy, sort_order: SortOrder) -> EngineResult<bool> {
        let filter = SortFilterConfig {
            sort_by,
            sort_order,
            ..self.filter.clone()
        };
        self.set_filter(filter).await
    }

    pub fn next(&mut self) -> bool {
        if self.current + 1 >= self.items.len() {
            return false;
        }
        self.current += 1;
        self.on_current_changed();
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.current == 0 || self.items.is_empty() {
            return false;
        }
        self.current -= 1;
        self.on_current_changed();
        true
    }

    /// Thumbnail click.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.items.len() || index == self.current {
            return false;
        }
        self.current = index;
        self.on_current_changed();
        true
    }

    /// Registers a move target. Duplicates are rejected.
    pub fn add_destination(&mut self, folder: impl Into<String>) -> bool {
        self.destinations.add(folder)
    }

    pub async fn pick_destination<U: Interaction>(&mut self, ui: &mut U) -> bool {
        match ui.pick_folder("Add destination folder").await {
            Some(folder) => self.add_destination(folder),
            None => false,
        }
    }

    pub fn remove_destination(&mut self, folder: &str) -> bool {
        self.destinations.remove(folder)
    }

    /// Moves the current item to `dest_folder`. Returns false if the queue is empty.
    pub async fn move_current(&mut self, dest_folder: &str) -> EngineResult<bool> {
        let (Some(source), Some(filename)) = (self.source.clone(), self.current().map(str::to_string))
        else {
            return Ok(false);
        };

        let status = self
            .backend
            .move_file(&filename, &source, dest_folder)
            .await;
        if !status.success {
            let message = status.error_message();
            warn!("Failed to move {}: {}", filename, message);
            return Err(EngineError::Operation(message));
        }

        info!("Moved {} to {}", filename, dest_folder);
        self.history.push(HistoryEntry::Move {
            filename,
            from_folder: source,
            to_folder: dest_folder.to_string(),
        });
        self.remove_current();
        Ok(true)
    }

    /// Numeric shortcut: moves the current item to destination `slot` (1-based).
    pub async fn move_to_slot(&mut self, slot: usize) -> EngineResult<bool> {
        let Some(dest) = self.destinations.for_slot(slot).map(str::to_string) else {
            return Ok(false);
        };
        self.move_current(&dest).await
    }

    /// Asks for confirmation, then deletes the current item.
    pub async fn delete_current<U: Interaction>(&mut self, ui: &mut U) -> EngineResult<DeleteOutcome> {
        let (Some(source), Some(filename)) = (self.source.clone(), self.current().map(str::to_string))
        else {
            return Ok(DeleteOutcome::Nothing);
        };

        let description = format!("{filename} will be moved to the trash. Undo can restore it.");
        if !ui.confirm("Delete this file?", &description).await {
            debug!("Delete of {} declined", filename);
            return Ok(DeleteOutcome::Declined);
        }

        let status = self.backend.delete_file(&filename, &source).await;
        if !status.success {
            let message = status.error_message();
            warn!("Failed to delete {}: {}", filename, message);
            return Err(EngineError::Operation(message));
        }

        info!("Deleted {}", filename);
        self.history.push(HistoryEntry::Delete {
            filename,
            from_folder: source,
        });
        self.remove_current();
        Ok(DeleteOutcome::Deleted)
    }

    /// Reverts the most recent move or delete. The restored file goes to the
    /// front of the queue, not back to its sorted position.
    ///
    /// Returns the restored filename, or `None` when there was nothing to undo.
    /// A failed undo is abandoned: its entry does not go back on the stack.
    pub async fn undo(&mut self) -> EngineResult<Option<String>> {
        let Some(entry) = self.history.pop() else {
            return Ok(None);
        };

        let (status, from_folder) = match &entry {
            HistoryEntry::Move {
                filename,
                from_folder,
                to_folder,
            } => (
                self.backend
                    .move_file(filename, to_folder, from_folder)
                    .await,
                from_folder,
            ),
            HistoryEntry::Delete {
                filename,
                from_folder,
            } => (self.backend.restore(filename, from_folder).await, from_folder),
        };

        if !status.success {
            let message = status.error_message();
            warn!("Undo of {} failed: {}", entry.description(), message);
            return Err(EngineError::Operation(message));
        }

        info!("Undid {}", entry.description());
        let filename = entry.filename().to_string();
        // Files restored into a folder that is no longer the source stay out of the queue.
        if self.source.as_deref() == Some(from_folder.as_str()) {
            self.items.insert(0, filename.clone());
            self.current = 0;
            self.on_current_changed();
        }
        Ok(Some(filename))
    }

    fn remove_current(&mut self) {
        if self.current < self.items.len() {
            self.items.remove(self.current);
        }
        if self.current >= self.items.len() {
            self.current = self.items.len().saturating_sub(1);
        }
        self.on_current_changed();
    }

    fn on_current_changed(&mut self) {
        self.viewport.reset_for_new_item();
        match (self.source.as_deref(), self.items.get(self.current)) {
            (Some(source), Some(filename)) => {
                self.loader.load_for(source, self.current, filename);
            }
            _ => self.loader.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::backend::mock::{Call, MockBackend, ScriptedInteraction};
    use crate::engine::viewport::BUTTON_STEP;

    async fn controller_with(files: &[&str]) -> (Arc<MockBackend>, QueueController<MockBackend>) {
        let backend = Arc::new(MockBackend::with_files(files));
        let mut queue = QueueController::new(Arc::clone(&backend), SortFilterConfig::default());
        queue.set_source("/src").await.unwrap();
        (backend, queue)
    }

    fn assert_index_in_bounds<B: MediaBackend>(queue: &QueueController<B>) {
        if queue.is_done() {
            assert!(queue.current().is_none());
        } else {
            assert!(queue.current_index() < queue.items().len());
        }
    }

    #[tokio::test]
    async fn test_scan_populates_queue() {
        let (backend, queue) = controller_with(&["a.jpg", "b.png", "notes.txt"]).await;
        assert_eq!(queue.items(), ["a.jpg", "b.png"]);
        assert_eq!(queue.current_index(), 0);
        assert_eq!(queue.displayed().unwrap().item.full_path, "/src/a.jpg");
        assert_eq!(backend.scan_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_navigation_is_clamped() {
        let (_, mut queue) = controller_with(&["a.jpg", "b.jpg", "c.jpg"]).await;

        assert!(!queue.prev());
        assert_eq!(queue.current_index(), 0);

        assert!(queue.next());
        assert!(queue.next());
        assert!(!queue.next());
        assert_eq!(queue.current_index(), 2);

        assert!(queue.prev());
        assert!(queue.next());
        assert_eq!(queue.current_index(), 2);
        assert_index_in_bounds(&queue);
    }

    #[tokio::test]
    async fn test_next_then_prev_returns_to_start() {
        let (_, mut queue) = controller_with(&["a.jpg", "b.jpg", "c.jpg", "d.jpg"]).await;
        queue.jump_to(2);
        queue.next();
        queue.prev();
        assert_eq!(queue.current_index(), 2);
        assert_eq!(queue.displayed().unwrap().index, 2);
    }

    #[tokio::test]
    async fn test_jump_to_bounds() {
        let (_, mut queue) = controller_with(&["a.jpg", "b.jpg"]).await;
        assert!(queue.jump_to(1));
        assert!(!queue.jump_to(1));
        assert!(!queue.jump_to(5));
        assert_eq!(queue.current(), Some("b.jpg"));
    }

    #[tokio::test]
    async fn test_navigation_resets_viewport() {
        let (_, mut queue) = controller_with(&["a.jpg", "b.jpg"]).await;
        queue.viewport_mut().zoom_in(BUTTON_STEP);
        queue.viewport_mut().pan_by(20.0, 20.0);
        queue.next();
        assert_eq!(queue.viewport().scale(), 1.0);
        assert_eq!(queue.viewport().translation(), (0.0, 0.0));
    }

    #[tokio::test]
    async fn test_move_middle_item() {
        let (backend, mut queue) = controller_with(&["a.jpg", "b.jpg", "c.jpg"]).await;
        queue.next();

        assert!(queue.move_current("/keep").await.unwrap());
        assert_eq!(queue.items(), ["a.jpg", "c.jpg"]);
        assert_eq!(queue.current_index(), 1);
        assert_eq!(queue.current(), Some("c.jpg"));
        assert_eq!(
            queue.history().peek(),
            Some(&HistoryEntry::Move {
                filename: "b.jpg".into(),
                from_folder: "/src".into(),
                to_folder: "/keep".into(),
            })
        );
        assert!(backend.calls().contains(&Call::Move {
            filename: "b.jpg".into(),
            from: "/src".into(),
            to: "/keep".into(),
        }));

        // Undo puts the file at the front, not back in its old slot.
        let depth = queue.history().len();
        assert_eq!(queue.undo().await.unwrap().as_deref(), Some("b.jpg"));
        assert_eq!(queue.items(), ["b.jpg", "a.jpg", "c.jpg"]);
        assert_eq!(queue.current_index(), 0);
        assert_eq!(queue.history().len(), depth - 1);
        assert!(backend.calls().contains(&Call::Move {
            filename: "b.jpg".into(),
            from: "/keep".into(),
            to: "/src".into(),
        }));
    }

    #[tokio::test]
    async fn test_move_last_item_clamps_index() {
        let (_, mut queue) = controller_with(&["a.jpg", "b.jpg"]).await;
        queue.next();
        queue.move_current("/keep").await.unwrap();
        assert_eq!(queue.current_index(), 0);
        assert_eq!(queue.current(), Some("a.jpg"));

        queue.move_current("/keep").await.unwrap();
        assert!(queue.is_done());
        assert_eq!(queue.current_index(), 0);
        assert!(queue.displayed().is_none());
        assert_index_in_bounds(&queue);

        // Empty queue: no-op, no collaborator call
        assert!(!queue.move_current("/keep").await.unwrap());
        assert_eq!(queue.history().len(), 2);
    }

    #[tokio::test]
    async fn test_move_failure_changes_nothing() {
        let (backend, mut queue) = controller_with(&["a.jpg", "b.jpg"]).await;
        backend.state().move_error = Some("File exists".into());

        let err = queue.move_current("/keep").await.unwrap_err();
        assert_eq!(err, EngineError::Operation("File exists".into()));
        assert_eq!(queue.items(), ["a.jpg", "b.jpg"]);
        assert!(queue.history().is_empty());
    }

    #[tokio::test]
    async fn test_numeric_slot_moves() {
        let (backend, mut queue) = controller_with(&["a.jpg", "b.jpg"]).await;
        queue.add_destination("/one");
        queue.add_destination("/two");
        assert!(!queue.add_destination("/one"));

        assert!(queue.move_to_slot(2).await.unwrap());
        assert!(!queue.move_to_slot(3).await.unwrap());
        assert!(backend.calls().contains(&Call::Move {
            filename: "a.jpg".into(),
            from: "/src".into(),
            to: "/two".into(),
        }));
        assert_eq!(queue.items(), ["b.jpg"]);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let (backend, mut queue) = controller_with(&["a.jpg", "b.jpg"]).await;
        let mut ui = ScriptedInteraction::answering(&[false, true]);

        assert_eq!(
            queue.delete_current(&mut ui).await.unwrap(),
            DeleteOutcome::Declined
        );
        assert_eq!(queue.items().len(), 2);
        assert!(!backend
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Delete { .. })));

        assert_eq!(
            queue.delete_current(&mut ui).await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert_eq!(queue.items(), ["b.jpg"]);
        assert_eq!(ui.prompts.len(), 2);

        // Undo of a delete goes through restore
        assert_eq!(queue.undo().await.unwrap().as_deref(), Some("a.jpg"));
        assert!(backend.calls().contains(&Call::Restore {
            filename: "a.jpg".into(),
            from: "/src".into(),
        }));
        assert_eq!(queue.items(), ["a.jpg", "b.jpg"]);
    }

    #[tokio::test]
    async fn test_delete_failure_changes_nothing() {
        let (backend, mut queue) = controller_with(&["a.jpg", "b.jpg", "c.jpg"]).await;
        queue.move_current("/keep").await.unwrap();
        queue.next();
        backend.state().delete_error = Some("Permission denied".into());

        let items = queue.items().to_vec();
        let index = queue.current_index();
        let history = queue.history().entries().to_vec();

        let mut ui = ScriptedInteraction::answering(&[true]);
        let err = queue.delete_current(&mut ui).await.unwrap_err();
        assert_eq!(err.to_string(), "Permission denied");
        assert_eq!(queue.items(), items.as_slice());
        assert_eq!(queue.current_index(), index);
        assert_eq!(queue.history().entries(), history.as_slice());
    }

    #[tokio::test]
    async fn test_delete_on_empty_queue() {
        let (_, mut queue) = controller_with(&[]).await;
        let mut ui = ScriptedInteraction::answering(&[true]);
        assert_eq!(
            queue.delete_current(&mut ui).await.unwrap(),
            DeleteOutcome::Nothing
        );
        assert!(ui.prompts.is_empty());
    }

    #[tokio::test]
    async fn test_undo_empty_is_noop() {
        let (backend, mut queue) = controller_with(&["a.jpg"]).await;
        let calls = backend.calls().len();
        assert_eq!(queue.undo().await.unwrap(), None);
        assert_eq!(backend.calls().len(), calls);
    }

    #[tokio::test]
    async fn test_failed_undo_is_abandoned() {
        let (backend, mut queue) = controller_with(&["a.jpg", "b.jpg"]).await;
        queue.move_current("/keep").await.unwrap();
        backend.state().move_error = Some("Source missing".into());

        let err = queue.undo().await.unwrap_err();
        assert_eq!(err, EngineError::Operation("Source missing".into()));
        assert!(queue.history().is_empty());
        assert_eq!(queue.items(), ["b.jpg"]);
    }

    #[tokio::test]
    async fn test_failed_restore_is_abandoned() {
        let (backend, mut queue) = controller_with(&["a.jpg", "b.jpg"]).await;
        let mut ui = ScriptedInteraction::answering(&[true]);
        assert_eq!(queue.delete_current(&mut ui).await.unwrap(), DeleteOutcome::Deleted);
        backend.state().restore_error = Some("not in trash".into());

        let err = queue.undo().await.unwrap_err();
        assert_eq!(err, EngineError::Operation("not in trash".into()));
        assert_eq!(err.to_string(), "not in trash");
        assert!(queue.history().is_empty());
        assert_eq!(queue.items(), ["b.jpg"]);
        assert_eq!(queue.current_index(), 0);

        // Abandoned: a second undo has nothing left to try
        assert_eq!(queue.undo().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_blank_extension_is_ignored() {
        let (backend, mut queue) = controller_with(&["a.jpg"]).await;
        let before = queue.filter().clone();
        assert!(!queue.toggle_extension(".").await.unwrap());
        assert!(!queue.toggle_extension("  ").await.unwrap());
        assert_eq!(queue.filter(), &before);
        assert_eq!(backend.scan_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_undo_after_source_change_keeps_queue() {
        let (backend, mut queue) = controller_with(&["a.jpg", "b.jpg"]).await;
        queue.move_current("/keep").await.unwrap();
        queue.set_source("/other").await.unwrap();
        let before = queue.items().to_vec();

        assert_eq!(queue.undo().await.unwrap().as_deref(), Some("a.jpg"));
        assert_eq!(queue.items(), before.as_slice());
        assert!(backend.calls().contains(&Call::Move {
            filename: "a.jpg".into(),
            from: "/keep".into(),
            to: "/src".into(),
        }));
    }

    #[tokio::test]
    async fn test_extension_change_rescans_once() {
        let (backend, mut queue) = controller_with(&["a.jpg", "b.jpg", "c.png"]).await;
        queue.next();
        queue.next();
        let before = backend.scan_calls().len();

        assert!(queue.toggle_extension("jpg").await.unwrap());
        let scans = backend.scan_calls();
        assert_eq!(scans.len(), before + 1);
        match scans.last() {
            Some(Call::Scan { extensions, .. }) => assert!(!extensions.contains(&"jpg".to_string())),
            other => panic!("unexpected call {:?}", other),
        }
        assert_eq!(queue.items(), ["c.png"]);
        assert_eq!(queue.current_index(), 0);
    }

    #[tokio::test]
    async fn test_unchanged_filter_does_not_rescan() {
        let (backend, mut queue) = controller_with(&["a.jpg"]).await;
        let filter = queue.filter().clone();
        assert!(!queue.set_filter(filter).await.unwrap());
        assert_eq!(backend.scan_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_sort_change_is_forwarded() {
        let (backend, mut queue) = controller_with(&["a.jpg"]).await;
        assert!(queue.set_sort(SortBy::Size, SortOrder::Desc).await.unwrap());
        match backend.scan_calls().last() {
            Some(Call::Scan {
                sort_by,
                sort_order,
                ..
            }) => {
                assert_eq!(*sort_by, SortBy::Size);
                assert_eq!(*sort_order, SortOrder::Desc);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_filter_without_source_does_not_scan() {
        let backend = Arc::new(MockBackend::with_files(&["a.jpg"]));
        let mut queue = QueueController::new(Arc::clone(&backend), SortFilterConfig::default());
        assert!(!queue.toggle_extension("jpg").await.unwrap());
        assert!(!queue.filter().extensions.contains("jpg"));
        assert!(backend.scan_calls().is_empty());
    }

    #[tokio::test]
    async fn test_scan_failure_keeps_previous_state() {
        let (backend, mut queue) = controller_with(&["a.jpg", "b.jpg"]).await;
        queue.next();
        backend.state().scan_error = Some("permission denied".into());

        let err = queue.set_source("/locked").await.unwrap_err();
        assert!(matches!(err, EngineError::Scan { .. }));
        assert_eq!(queue.source(), Some("/src"));
        assert_eq!(queue.items(), ["a.jpg", "b.jpg"]);
        assert_eq!(queue.current_index(), 1);

        let filter = queue.filter().clone();
        assert!(queue.toggle_extension("png").await.is_err());
        assert_eq!(queue.filter(), &filter);
    }

    #[tokio::test]
    async fn test_pick_source_and_destination() {
        let backend = Arc::new(MockBackend::with_files(&["a.jpg"]));
        let mut queue = QueueController::new(Arc::clone(&backend), SortFilterConfig::default());
        let mut ui = ScriptedInteraction::picking(&[None, Some("/src"), Some("/dst"), Some("/dst")]);

        assert!(!queue.pick_source(&mut ui).await.unwrap());
        assert!(queue.pick_source(&mut ui).await.unwrap());
        assert_eq!(queue.items(), ["a.jpg"]);

        assert!(queue.pick_destination(&mut ui).await);
        assert!(!queue.pick_destination(&mut ui).await);
        assert_eq!(queue.destinations().len(), 1);
        assert!(queue.remove_destination("/dst"));
    }

    #[tokio::test]
    async fn test_window_follows_current() {
        let files: Vec<String> = (0..20).map(|i| format!("i{i}.jpg")).collect();
        let refs: Vec<&str> = files.iter().map(String::as_str).collect();
        let (_, mut queue) = controller_with(&refs).await;
        queue.jump_to(10);

        let window = queue.window();
        assert_eq!((window.start, window.end), (7, 20));
        assert!(window.has_more_before);
        assert!(!window.has_more_after);
    }

    #[tokio::test]
    async fn test_loads_reach_display() {
        let (_, mut queue) = controller_with(&["a.jpg", "b.jpg"]).await;
        let events = queue.load_events();
        queue.next();

        // Drain until the current item's metadata has landed.
        while !queue.displayed().map(|d| d.metadata_loaded).unwrap_or(false) {
            let event = events.recv().await.unwrap();
            queue.accept_load(event);
        }
        let shown = queue.displayed().unwrap();
        assert_eq!(shown.item.filename, "b.jpg");
        assert!(!shown.is_loading());
    }
}
