/// Ordered move targets. Position `n` (zero-based) is reached with key `n + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationList {
    folders: Vec<String>,
}

impl DestinationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a folder. Returns false if it is already registered.
    pub fn add(&mut self, folder: impl Into<String>) -> bool {
        let folder = folder.into();
        if folder.is_empty() || self.folders.contains(&folder) {
            return false;
        }
        self.folders.push(folder);
        true
    }

    pub fn remove(&mut self, folder: &str) -> bool {
        let before = self.folders.len();
        self.folders.retain(|f| f != folder);
        self.folders.len() != before
    }

    /// Folder bound to numeric key `slot` (1-based).
    pub fn for_slot(&self, slot: usize) -> Option<&str> {
        slot.checked_sub(1)
            .and_then(|i| self.folders.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.folders.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_rejected() {
        let mut list = DestinationList::new();
        assert!(list.add("/a"));
        assert!(list.add("/b"));
        assert!(!list.add("/a"));
        assert!(!list.add(""));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_slots_follow_order() {
        let mut list = DestinationList::new();
        list.add("/a");
        list.add("/b");
        list.add("/c");
        assert_eq!(list.for_slot(1), Some("/a"));
        assert_eq!(list.for_slot(3), Some("/c"));
        assert_eq!(list.for_slot(0), None);
        assert_eq!(list.for_slot(4), None);

        assert!(list.remove("/a"));
        assert_eq!(list.for_slot(1), Some("/b"));
        assert!(!list.remove("/a"));
        assert_eq!(list.for_slot(2), Some("/c"));
    }
}
