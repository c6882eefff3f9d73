//! Inclusion rules and ordering for a scan.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

/// Extensions enabled when nothing has been persisted yet.
pub const DEFAULT_EXTENSIONS: [&str; 18] = [
    "png", "jpg", "jpeg", "gif", "webp", "arw", "cr2", "cr3", "nef", "raf", "dng", "orf", "rw2",
    "mp4", "mov", "avi", "mkv", "webm",
];

/// Named extension groups, used for "toggle group" in the filter menu.
pub const EXTENSION_GROUPS: [(&str, &[&str]); 3] = [
    ("Common", &["jpg", "jpeg", "png", "webp", "gif"]),
    ("RAW", &["arw", "cr2", "cr3", "nef", "raf", "dng", "orf", "rw2"]),
    ("Video", &["mp4", "mov", "avi", "mkv", "webm"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Name,
    Date,
    Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Date => "date",
            Self::Size => "size",
        }
    }
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "date" => Ok(Self::Date),
            "size" => Ok(Self::Size),
            other => Err(anyhow!("Unknown sort key: {other}")),
        }
    }
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(anyhow!("Unknown sort order: {other}")),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortFilterConfig {
    /// Lower-case extensions without the leading dot.
    pub extensions: BTreeSet<String>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl Default for SortFilterConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl SortFilterConfig {
    #[cfg(test)]
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions.into_iter().map(|e| normalize_extension(e.as_ref())).collect(),
            ..Default::default()
        }
    }

    pub fn matches(&self, filename: &str) -> bool {
        let ext = crate::models::extension_of(filename);
        !ext.is_empty() && self.extensions.contains(&ext.to_ascii_lowercase())
    }

    /// Adds the extension if absent, removes it otherwise. Returns true if now enabled.
    /// A blank extension (`""`, `"."`) is ignored.
    pub fn toggle_extension(&mut self, ext: &str) -> bool {
        let ext = normalize_extension(ext);
        if ext.is_empty() {
            return false;
        }
        if self.extensions.remove(&ext) {
            false
        } else {
            self.extensions.insert(ext);
            true
        }
    }

    /// Enables the whole group unless every member is already enabled, in which case
    /// the group is disabled.
    pub fn toggle_group(&mut self, group: &str) -> bool {
        let Some((_, members)) = EXTENSION_GROUPS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(group))
        else {
            return false;
        };

        let all_on = members.iter().all(|e| self.extensions.contains(*e));
        for ext in members.iter() {
            if all_on {
                self.extensions.remove(*ext);
            } else {
                self.extensions.insert(ext.to_string());
            }
        }
        true
    }

    /// Comma-separated form used by the settings store.
    pub fn extensions_csv(&self) -> String {
        self.extensions.iter().cloned().collect::<Vec<_>>().join(",")
    }

    pub fn parse_extensions(csv: &str) -> BTreeSet<String> {
        csv.split(',')
            .map(normalize_extension)
            .filter(|e| !e.is_empty())
            .collect()
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}
