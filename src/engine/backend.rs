//! Narrow interfaces to everything the engine does not do itself.
//!
//! `MediaBackend` covers enumeration, content fetching and file operations and
//! may be shared with spawned load tasks. `Interaction` covers prompts that
//! need the user and stays on the UI side.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use crate::models::SortFilterConfig;

/// Outcome record of a move, delete or restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpStatus {
    pub success: bool,
    pub error: Option<String>,
}

impl OpStatus {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }

    /// Message to surface for a failed operation.
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

/// Something the display layer can render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// Encoded image bytes.
    Bytes { mime: &'static str, data: Arc<[u8]> },
    /// Played straight from the file.
    Stream(PathBuf),
}

impl Preview {
    pub fn describe(&self) -> String {
        match self {
            Self::Bytes { mime, data } => format!("{} ({} bytes)", mime, data.len()),
            Self::Stream(path) => format!("stream {}", path.display()),
        }
    }
}

/// Fields shown in the metadata panel. Absent values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaMetadata {
    pub filename: String,
    pub resolution: Option<String>,
    pub size: Option<String>,
    pub format: Option<String>,
    pub date: Option<String>,
    pub camera: Option<String>,
    pub iso: Option<String>,
    pub aperture: Option<String>,
    pub shutter: Option<String>,
}

impl MediaMetadata {
    /// Label/value pairs for every present field, in panel order.
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        let mut rows = vec![("File", self.filename.as_str())];
        let optional = [
            ("Resolution", &self.resolution),
            ("Size", &self.size),
            ("Format", &self.format),
            ("Date", &self.date),
            ("Camera", &self.camera),
            ("ISO", &self.iso),
            ("Aperture", &self.aperture),
            ("Shutter", &self.shutter),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                rows.push((label, value.as_str()));
            }
        }
        rows
    }
}

/// Content and file-operation collaborator.
///
/// Folders are passed as the strings the user picked; full paths are built by
/// the engine with the folder's own separator.
pub trait MediaBackend: Send + Sync + 'static {
    /// Matching filenames directly inside `folder`, already ordered.
    fn scan(
        &self,
        folder: &str,
        config: &SortFilterConfig,
    ) -> impl Future<Output = anyhow::Result<Vec<String>>> + Send;

    fn load_preview(&self, full_path: &str) -> impl Future<Output = anyhow::Result<Preview>> + Send;

    fn load_metadata(&self, full_path: &str) -> impl Future<Output = Option<MediaMetadata>> + Send;

    fn move_file(
        &self,
        filename: &str,
        from_folder: &str,
        to_folder: &str,
    ) -> impl Future<Output = OpStatus> + Send;

    fn delete_file(&self, filename: &str, from_folder: &str)
        -> impl Future<Output = OpStatus> + Send;

    /// Undoes a `delete_file` of the same name from the same folder.
    fn restore(&self, filename: &str, from_folder: &str) -> impl Future<Output = OpStatus> + Send;
}

/// Prompts that need the user.
pub trait Interaction {
    /// Native folder chooser. `None` when cancelled.
    fn pick_folder(&mut self, title: &str) -> impl Future<Output = Option<String>>;

    /// Yes/no prompt. Nothing proceeds until it resolves.
    fn confirm(&mut self, title: &str, description: &str) -> impl Future<Output = bool>;
}

#[cfg(test)]
pub mod mock {
    //! In-memory collaborators with failure injection and a call log.

    use std::collections::{HashMap, HashSet, VecDeque};
    use std::sync::Arc;

    use parking_lot::{Mutex, MutexGuard};
    use tokio::sync::Notify;

    use super::*;
    use crate::models::{mime_for, SortBy, SortOrder};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Scan {
            folder: String,
            extensions: Vec<String>,
            sort_by: SortBy,
            sort_order: SortOrder,
        },
        Preview(String),
        Metadata(String),
        Move {
            filename: String,
            from: String,
            to: String,
        },
        Delete {
            filename: String,
            from: String,
        },
        Restore {
            filename: String,
            from: String,
        },
    }

    #[derive(Default)]
    pub struct MockState {
        /// Listing returned by `scan`, filtered by the config but not re-sorted.
        pub listing: Vec<String>,
        pub scan_error: Option<String>,
        pub move_error: Option<String>,
        pub delete_error: Option<String>,
        pub restore_error: Option<String>,
        pub broken_previews: HashSet<String>,
        /// Preview loads for these paths wait until the gate is notified.
        pub gates: HashMap<String, Arc<Notify>>,
        pub calls: Vec<Call>,
    }

    #[derive(Default)]
    pub struct MockBackend {
        state: Mutex<MockState>,
    }

    impl MockBackend {
        pub fn with_files(files: &[&str]) -> Self {
            let backend = Self::default();
            backend.state().listing = files.iter().map(|f| f.to_string()).collect();
            backend
        }

        pub fn state(&self) -> MutexGuard<'_, MockState> {
            self.state.lock()
        }

        pub fn calls(&self) -> Vec<Call> {
            self.state().calls.clone()
        }

        pub fn scan_calls(&self) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|c| matches!(c, Call::Scan { .. }))
                .collect()
        }

        pub fn gate(&self, full_path: &str) -> Arc<Notify> {
            let notify = Arc::new(Notify::new());
            self.state()
                .gates
                .insert(full_path.to_string(), Arc::clone(&notify));
            notify
        }
    }

    impl MediaBackend for MockBackend {
        async fn scan(
            &self,
            folder: &str,
            config: &SortFilterConfig,
        ) -> anyhow::Result<Vec<String>> {
            let mut state = self.state();
            state.calls.push(Call::Scan {
                folder: folder.to_string(),
                extensions: config.extensions.iter().cloned().collect(),
                sort_by: config.sort_by,
                sort_order: config.sort_order,
            });
            if let Some(err) = &state.scan_error {
                anyhow::bail!("{err}");
            }
            Ok(state
                .listing
                .iter()
                .filter(|f| config.matches(f))
                .cloned()
                .collect())
        }

        async fn load_preview(&self, full_path: &str) -> anyhow::Result<Preview> {
            let gate = {
                let mut state = self.state();
                state.calls.push(Call::Preview(full_path.to_string()));
                state.gates.get(full_path).cloned()
            };
            if let Some(gate) = gate {
                gate.notified().await;
            }
            if self.state().broken_previews.contains(full_path) {
                anyhow::bail!("no preview for {full_path}");
            }
            Ok(Preview::Bytes {
                mime: mime_for(full_path),
                data: Arc::from(full_path.as_bytes()),
            })
        }

        async fn load_metadata(&self, full_path: &str) -> Option<MediaMetadata> {
            self.state()
                .calls
                .push(Call::Metadata(full_path.to_string()));
            let filename = full_path.rsplit(['/', '\\']).next().unwrap_or(full_path);
            Some(MediaMetadata {
                filename: filename.to_string(),
                format: Some("JPEG".to_string()),
                ..Default::default()
            })
        }

        async fn move_file(&self, filename: &str, from_folder: &str, to_folder: &str) -> OpStatus {
            let mut state = self.state();
            state.calls.push(Call::Move {
                filename: filename.to_string(),
                from: from_folder.to_string(),
                to: to_folder.to_string(),
            });
            match &state.move_error {
                Some(err) => OpStatus::failed(err.clone()),
                None => OpStatus::ok(),
            }
        }

        async fn delete_file(&self, filename: &str, from_folder: &str) -> OpStatus {
            let mut state = self.state();
            state.calls.push(Call::Delete {
                filename: filename.to_string(),
                from: from_folder.to_string(),
            });
            match &state.delete_error {
                Some(err) => OpStatus::failed(err.clone()),
                None => OpStatus::ok(),
            }
        }

        async fn restore(&self, filename: &str, from_folder: &str) -> OpStatus {
            let mut state = self.state();
            state.calls.push(Call::Restore {
                filename: filename.to_string(),
                from: from_folder.to_string(),
            });
            match &state.restore_error {
                Some(err) => OpStatus::failed(err.clone()),
                None => OpStatus::ok(),
            }
        }
    }

    /// Answers prompts from a script and records what was asked.
    #[derive(Default)]
    pub struct ScriptedInteraction {
        pub folders: VecDeque<Option<String>>,
        pub answers: VecDeque<bool>,
        pub prompts: Vec<String>,
    }

    impl ScriptedInteraction {
        pub fn answering(answers: &[bool]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                ..Default::default()
            }
        }

        pub fn picking(folders: &[Option<&str>]) -> Self {
            Self {
                folders: folders.iter().map(|f| f.map(str::to_string)).collect(),
                ..Default::default()
            }
        }
    }

    impl Interaction for ScriptedInteraction {
        async fn pick_folder(&mut self, title: &str) -> Option<String> {
            self.prompts.push(title.to_string());
            self.folders.pop_front().flatten()
        }

        async fn confirm(&mut self, title: &str, _description: &str) -> bool {
            self.prompts.push(title.to_string());
            self.answers.pop_front().unwrap_or(false)
        }
    }
}
