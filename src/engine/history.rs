//! Linear undo stack for destructive triage actions.

/// A completed, reversible action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    Move {
        filename: String,
        from_folder: String,
        to_folder: String,
    },
    Delete {
        filename: String,
        from_folder: String,
    },
}

impl HistoryEntry {
    pub fn filename(&self) -> &str {
        match self {
            Self::Move { filename, .. } | Self::Delete { filename, .. } => filename,
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Move {
                filename,
                to_folder,
                ..
            } => format!("move {} to {}", filename, to_folder),
            Self::Delete { filename, .. } => format!("delete {}", filename),
        }
    }
}

/// Strict LIFO, unbounded, never persisted. Entries are never edited in place.
#[derive(Debug, Default)]
pub struct ActionHistory {
    entries: Vec<HistoryEntry>,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delete(name: &str) -> HistoryEntry {
        HistoryEntry::Delete {
            filename: name.to_string(),
            from_folder: "/src".to_string(),
        }
    }

    #[test]
    fn test_lifo_order() {
        let mut history = ActionHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.pop(), None);

        history.push(delete("a"));
        history.push(HistoryEntry::Move {
            filename: "b".into(),
            from_folder: "/src".into(),
            to_folder: "/keep".into(),
        });
        assert_eq!(history.len(), 2);
        assert_eq!(history.peek().map(|e| e.filename()), Some("b"));

        assert_eq!(history.pop().map(|e| e.filename().to_string()).as_deref(), Some("b"));
        assert_eq!(history.pop(), Some(delete("a")));
        assert!(history.is_empty());
    }

    #[test]
    fn test_description() {
        assert_eq!(delete("x.jpg").description(), "delete x.jpg");
    }
}
