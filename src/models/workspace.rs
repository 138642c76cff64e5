use std::collections::HashMap;

use crate::error::PlaygroundError;
use crate::models::file::{PlaygroundFile, has_recognized_extension};

/// Name and content of the file every fresh workspace starts with.
pub const DEFAULT_FILE_NAME: &str = "main.py";
pub const DEFAULT_FILE_CONTENT: &str = "# main.py\nprint(\"Hello from main.py\")";

/// The file store: every open file plus the active-file pointer.
///
/// Two invariants hold at all times and every operation preserves them:
/// the workspace is never empty (the last file cannot be closed), and
/// `active_file` always names a key present in `files`. Tab order is kept
/// in a companion vector because the map itself is unordered.
#[derive(Debug, Clone)]
pub struct Workspace {
    files: HashMap<String, PlaygroundFile>,
    tab_order: Vec<String>,
    active_file: String,
}

impl Workspace {
    /// A fresh workspace with the single default file.
    pub fn seeded() -> Self {
        let mut files = HashMap::new();
        files.insert(
            DEFAULT_FILE_NAME.to_string(),
            PlaygroundFile::new(DEFAULT_FILE_NAME.into(), DEFAULT_FILE_CONTENT.into()),
        );
        Self {
            files,
            tab_order: vec![DEFAULT_FILE_NAME.to_string()],
            active_file: DEFAULT_FILE_NAME.to_string(),
        }
    }

    /// Rebuilds a workspace from persisted contents.
    ///
    /// The underlying store does not record tab order, so tabs come back
    /// sorted by name. An active file that no longer matches a key falls
    /// back to the first tab; an empty map falls back to the seeded state.
    pub fn from_parts(contents: HashMap<String, String>, active_file: &str) -> Self {
        if contents.is_empty() {
            return Self::seeded();
        }

        let mut tab_order: Vec<String> = contents.keys().cloned().collect();
        tab_order.sort();

        let files = contents
            .into_iter()
            .map(|(name, content)| (name.clone(), PlaygroundFile::new(name, content)))
            .collect::<HashMap<_, _>>();

        let active_file = if files.contains_key(active_file) {
            active_file.to_string()
        } else {
            tab_order[0].clone()
        };

        Self {
            files,
            tab_order,
            active_file,
        }
    }

    fn validate_new_name(&self, name: &str) -> Result<(), PlaygroundError> {
        if name.trim().is_empty() {
            return Err(PlaygroundError::EmptyFileName);
        }
        if !has_recognized_extension(name) {
            return Err(PlaygroundError::UnsupportedExtension(name.to_string()));
        }
        Ok(())
    }

    /// Opens a new empty tab. Fails when the name is invalid or already
    /// taken; the workspace is untouched on failure.
    pub fn create_file(
        &mut self,
        name: &str,
        initial_content: &str,
    ) -> Result<&PlaygroundFile, PlaygroundError> {
        self.validate_new_name(name)?;
        if self.files.contains_key(name) {
            return Err(PlaygroundError::DuplicateFile(name.to_string()));
        }

        self.files.insert(
            name.to_string(),
            PlaygroundFile::new(name.to_string(), initial_content.to_string()),
        );
        self.tab_order.push(name.to_string());
        Ok(&self.files[name])
    }

    /// Closes a tab. The last remaining file cannot be closed. When the
    /// active file goes away the first remaining tab becomes active and
    /// its name is returned.
    pub fn close_file(&mut self, name: &str) -> Result<Option<String>, PlaygroundError> {
        if !self.files.contains_key(name) {
            return Err(PlaygroundError::UnknownFile(name.to_string()));
        }
        if self.files.len() == 1 {
            return Err(PlaygroundError::LastFileOpen);
        }

        self.files.remove(name);
        self.tab_order.retain(|n| n != name);

        if self.active_file == name {
            self.active_file = self.tab_order[0].clone();
            Ok(Some(self.active_file.clone()))
        } else {
            Ok(None)
        }
    }

    /// Replaces a file's content in place. Arbitrary text is allowed.
    pub fn update_content(&mut self, name: &str, content: String) -> Result<(), PlaygroundError> {
        match self.files.get_mut(name) {
            Some(file) => {
                file.update_content(content);
                Ok(())
            }
            None => Err(PlaygroundError::UnknownFile(name.to_string())),
        }
    }

    /// The upload primitive: overwrite the content when the name already
    /// exists, otherwise open a new tab. Returns true when a tab was
    /// created.
    pub fn rename_or_upload_replace(
        &mut self,
        name: &str,
        content: String,
    ) -> Result<bool, PlaygroundError> {
        if self.files.contains_key(name) {
            self.update_content(name, content)?;
            Ok(false)
        } else {
            self.create_file(name, &content)?;
            Ok(true)
        }
    }

    /// Renames a file in place: content, tab position and active status
    /// all carry over to the new name.
    pub fn rename_file(&mut self, old: &str, new: &str) -> Result<(), PlaygroundError> {
        if !self.files.contains_key(old) {
            return Err(PlaygroundError::UnknownFile(old.to_string()));
        }
        self.validate_new_name(new)?;
        if old == new {
            return Ok(());
        }
        if self.files.contains_key(new) {
            return Err(PlaygroundError::DuplicateFile(new.to_string()));
        }

        let mut file = self
            .files
            .remove(old)
            .ok_or_else(|| PlaygroundError::UnknownFile(old.to_string()))?;
        file.name = new.to_string();
        self.files.insert(new.to_string(), file);

        if let Some(slot) = self.tab_order.iter_mut().find(|n| n.as_str() == old) {
            *slot = new.to_string();
        }
        if self.active_file == old {
            self.active_file = new.to_string();
        }
        Ok(())
    }

    /// Moves the active-file pointer. The target must be open.
    pub fn set_active(&mut self, name: &str) -> Result<(), PlaygroundError> {
        if !self.files.contains_key(name) {
            return Err(PlaygroundError::UnknownFile(name.to_string()));
        }
        self.active_file = name.to_string();
        Ok(())
    }

    pub fn active_file_name(&self) -> &str {
        &self.active_file
    }

    /// The active file itself. The pointer invariant makes the lookup
    /// infallible.
    pub fn active_file(&self) -> &PlaygroundFile {
        &self.files[&self.active_file]
    }

    pub fn get(&self, name: &str) -> Option<&PlaygroundFile> {
        self.files.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Tab names in display order.
    pub fn file_names(&self) -> &[String] {
        &self.tab_order
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Full name-to-content mapping, cloned for persistence. Every save
    /// serializes the complete current state, never a delta.
    pub fn contents(&self) -> HashMap<String, String> {
        self.files
            .iter()
            .map(|(name, file)| (name.clone(), file.content.clone()))
            .collect()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_workspace_has_one_default_file() {
        let ws = Workspace::seeded();
        assert_eq!(ws.len(), 1);
        assert_eq!(ws.active_file_name(), DEFAULT_FILE_NAME);
        assert_eq!(ws.active_file().content, DEFAULT_FILE_CONTENT);
    }

    #[test]
    fn create_rejects_bad_names() {
        let mut ws = Workspace::seeded();
        assert_eq!(
            ws.create_file("", ""),
            Err(PlaygroundError::EmptyFileName)
        );
        assert_eq!(
            ws.create_file("notes.txt", ""),
            Err(PlaygroundError::UnsupportedExtension("notes.txt".into()))
        );
        assert_eq!(
            ws.create_file("main.py", ""),
            Err(PlaygroundError::DuplicateFile("main.py".into()))
        );
        assert_eq!(ws.len(), 1);
    }

    #[test]
    fn create_preserves_insertion_order() {
        let mut ws = Workspace::seeded();
        ws.create_file("utils.py", "").unwrap();
        ws.create_file("app.js", "").unwrap();
        assert_eq!(ws.file_names(), &["main.py", "utils.py", "app.js"]);
    }

    #[test]
    fn last_file_cannot_be_closed() {
        let mut ws = Workspace::seeded();
        assert_eq!(
            ws.close_file(DEFAULT_FILE_NAME),
            Err(PlaygroundError::LastFileOpen)
        );
        assert_eq!(ws.len(), 1);
    }

    #[test]
    fn closing_active_file_activates_first_remaining_tab() {
        let mut ws = Workspace::seeded();
        ws.create_file("utils.py", "").unwrap();
        ws.set_active("utils.py").unwrap();

        let new_active = ws.close_file("utils.py").unwrap();
        assert_eq!(new_active.as_deref(), Some("main.py"));
        assert_eq!(ws.active_file_name(), "main.py");
    }

    #[test]
    fn closing_inactive_file_keeps_active_pointer() {
        let mut ws = Workspace::seeded();
        ws.create_file("utils.py", "").unwrap();

        let new_active = ws.close_file("utils.py").unwrap();
        assert_eq!(new_active, None);
        assert_eq!(ws.active_file_name(), "main.py");
    }

    #[test]
    fn active_file_always_present_across_create_close_sequences() {
        let mut ws = Workspace::seeded();
        ws.create_file("a.py", "").unwrap();
        ws.create_file("b.js", "").unwrap();
        ws.create_file("c.py", "").unwrap();
        ws.set_active("b.js").unwrap();

        for name in ["a.py", "b.js", "c.py"] {
            ws.close_file(name).unwrap();
            assert!(!ws.is_empty());
            let active = ws.active_file_name().to_string();
            assert!(ws.contains(&active));
        }
        assert_eq!(ws.len(), 1);
    }

    #[test]
    fn upload_replace_overwrites_without_new_tab() {
        let mut ws = Workspace::seeded();
        let created = ws
            .rename_or_upload_replace("main.py", "print(2)".into())
            .unwrap();
        assert!(!created);
        assert_eq!(ws.len(), 1);
        assert_eq!(ws.get("main.py").unwrap().content, "print(2)");

        let created = ws
            .rename_or_upload_replace("extra.js", "console.log(1)".into())
            .unwrap();
        assert!(created);
        assert_eq!(ws.file_names(), &["main.py", "extra.js"]);
    }

    #[test]
    fn rename_keeps_content_tab_position_and_active_status() {
        let mut ws = Workspace::seeded();
        ws.create_file("b.py", "x = 1").unwrap();
        ws.create_file("c.py", "").unwrap();
        ws.set_active("b.py").unwrap();

        ws.rename_file("b.py", "renamed.py").unwrap();
        assert_eq!(ws.file_names(), &["main.py", "renamed.py", "c.py"]);
        assert_eq!(ws.active_file_name(), "renamed.py");
        assert_eq!(ws.get("renamed.py").unwrap().content, "x = 1");
        assert_eq!(
            ws.rename_file("renamed.py", "c.py"),
            Err(PlaygroundError::DuplicateFile("c.py".into()))
        );
    }

    #[test]
    fn from_parts_restores_contents_and_active_file() {
        let mut contents = HashMap::new();
        contents.insert("b.py".to_string(), "two".to_string());
        contents.insert("a.py".to_string(), "one".to_string());

        let ws = Workspace::from_parts(contents.clone(), "b.py");
        assert_eq!(ws.active_file_name(), "b.py");
        assert_eq!(ws.file_names(), &["a.py", "b.py"]);
        assert_eq!(ws.contents(), contents);

        // A stale active pointer falls back to the first tab.
        let mut contents = HashMap::new();
        contents.insert("a.py".to_string(), "one".to_string());
        let ws = Workspace::from_parts(contents, "gone.py");
        assert_eq!(ws.active_file_name(), "a.py");
    }

    #[test]
    fn from_parts_with_nothing_persisted_seeds() {
        let ws = Workspace::from_parts(HashMap::new(), "");
        assert_eq!(ws.active_file_name(), DEFAULT_FILE_NAME);
        assert_eq!(ws.len(), 1);
    }
}
