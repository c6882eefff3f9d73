//! SQLite-backed key-value record for settings that survive restarts.
//!
//! Only two things are persisted: the shortcut map and the sort/filter
//! defaults. The queue, history and destinations live in memory only.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::models::{ShortcutAction, ShortcutMap, SortFilterConfig};

/// Environment variable overriding the settings database location.
pub const SETTINGS_PATH_ENV: &str = "MEDIASORT_SETTINGS";

const KEY_SORT_BY: &str = "filter.sort_by";
const KEY_SORT_ORDER: &str = "filter.sort_order";
const KEY_EXTENSIONS: &str = "filter.extensions";

fn shortcut_key(action: ShortcutAction) -> String {
    format!("shortcut.{}", action.as_str())
}

pub struct SettingsStore {
    conn: Connection,
}

impl SettingsStore {
    /// Opens the store at `$MEDIASORT_SETTINGS` or the XDG config location.
    pub fn open_default() -> Result<Self> {
        let path = match std::env::var_os(SETTINGS_PATH_ENV) {
            Some(p) => PathBuf::from(p),
            None => Self::default_db_path()?,
        };
        Self::open(&path)
    }

    /// Returns `XDG_CONFIG_HOME/mediasort/settings.sqlite`.
    pub fn default_db_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "mediasort")
            .context("Failed to determine project directories")?;
        Ok(proj_dirs.config_dir().join("settings.sqlite"))
    }

    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory: {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open settings at {:?}", path))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            ",
        )
        .context("Failed to initialize settings schema")?;

        info!("Opened settings store at {:?}", path);
        Ok(Self { conn })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read setting {key}"))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .with_context(|| format!("Failed to write setting {key}"))?;
        Ok(())
    }
}

/// Settings loaded at startup and handed to the engine and input layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub shortcuts: ShortcutMap,
    pub filter: SortFilterConfig,
}

impl Settings {
    /// Reads every known key, keeping the default for anything missing or unparsable.
    pub fn load(store: &SettingsStore) -> Result<Self> {
        let mut settings = Self::default();

        for action in ShortcutAction::ALL {
            if let Some(key) = store.get(&shortcut_key(action))? {
                if !key.is_empty() {
                    settings.shortcuts.set(action, key);
                }
            }
        }

        if let Some(raw) = store.get(KEY_SORT_BY)? {
            match raw.parse() {
                Ok(sort_by) => settings.filter.sort_by = sort_by,
                Err(e) => warn!("Ignoring stored sort key: {}", e),
            }
        }
        if let Some(raw) = store.get(KEY_SORT_ORDER)? {
            match raw.parse() {
                Ok(order) => settings.filter.sort_order = order,
                Err(e) => warn!("Ignoring stored sort order: {}", e),
            }
        }
        if let Some(raw) = store.get(KEY_EXTENSIONS)? {
            // An empty set is a valid user choice, so it is kept as-is.
            settings.filter.extensions = SortFilterConfig::parse_extensions(&raw);
        }

        debug!(?settings, "Loaded settings");
        Ok(settings)
    }

    pub fn save_shortcuts(&self, store: &SettingsStore) -> Result<()> {
        for action in ShortcutAction::ALL {
            store.set(&shortcut_key(action), self.shortcuts.key_for(action))?;
        }
        debug!(shortcuts = ?self.shortcuts, "Saved shortcuts");
        Ok(())
    }

    pub fn save_filter(&self, store: &SettingsStore) -> Result<()> {
        store.set(KEY_SORT_BY, self.filter.sort_by.as_str())?;
        store.set(KEY_SORT_ORDER, self.filter.sort_order.as_str())?;
        store.set(KEY_EXTENSIONS, &self.filter.extensions_csv())?;
        debug!(filter = ?self.filter, "Saved sort/filter defaults");
        Ok(())
    }
}
