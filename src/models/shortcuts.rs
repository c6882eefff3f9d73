use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

/// Remappable logical actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Next,
    Prev,
    Delete,
}

impl ShortcutAction {
    pub const ALL: [ShortcutAction; 3] = [Self::Next, Self::Prev, Self::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Prev => "prev",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for ShortcutAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            "delete" => Ok(Self::Delete),
            other => Err(anyhow!("Unknown action: {other}")),
        }
    }
}

impl fmt::Display for ShortcutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical key identifiers bound to the remappable actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutMap {
    pub next: String,
    pub prev: String,
    pub delete: String,
}

impl Default for ShortcutMap {
    fn default() -> Self {
        Self {
            next: "ArrowRight".to_string(),
            prev: "ArrowLeft".to_string(),
            delete: "Delete".to_string(),
        }
    }
}

impl ShortcutMap {
    pub fn key_for(&self, action: ShortcutAction) -> &str {
        match action {
            ShortcutAction::Next => &self.next,
            ShortcutAction::Prev => &self.prev,
            ShortcutAction::Delete => &self.delete,
        }
    }

    pub fn set(&mut self, action: ShortcutAction, key: impl Into<String>) {
        let key = key.into();
        match action {
            ShortcutAction::Next => self.next = key,
            ShortcutAction::Prev => self.prev = key,
            ShortcutAction::Delete => self.delete = key,
        }
    }

    /// Action bound to `key`, checked in next/prev/delete order.
    pub fn action_for(&self, key: &str) -> Option<ShortcutAction> {
        ShortcutAction::ALL
            .into_iter()
            .find(|action| self.key_for(*action) == key)
    }
}
