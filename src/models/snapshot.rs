use std::collections::HashMap;

/// Write-once originals used for diffing edits against the content a file
/// had when it entered the workspace.
///
/// Absence of a snapshot means "no diff available" for that file, which is
/// distinct from a snapshot whose original content is the empty string.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    originals: HashMap<String, String>,
}

/// A snapshot paired with the file's current content, ready for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffView<'a> {
    pub original: &'a str,
    pub current: &'a str,
}

impl DiffView<'_> {
    pub fn has_changes(&self) -> bool {
        self.original != self.current
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the original content for a file. Later calls for the same
    /// name are no-ops; the original is never overwritten by edits.
    pub fn capture(&mut self, name: &str, content: &str) {
        self.originals
            .entry(name.to_string())
            .or_insert_with(|| content.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.originals.get(name).map(String::as_str)
    }

    /// Removes the snapshot when the owning file closes.
    pub fn drop_for(&mut self, name: &str) {
        self.originals.remove(name);
    }

    /// Follows a file rename.
    pub fn rename(&mut self, old: &str, new: &str) {
        if let Some(original) = self.originals.remove(old) {
            self.originals.insert(new.to_string(), original);
        }
    }

    pub fn clear(&mut self) {
        self.originals.clear();
    }
}
