use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::models::workspace::Workspace;

/// Key under which the serialized filename-to-content map is stored.
pub const FILES_KEY: &str = "files";
/// Key under which the active file name is stored.
pub const ACTIVE_FILE_KEY: &str = "active_file";

/// The opaque key-value seam the workspace persists through.
///
/// The workspace only ever stores two entries (the files map and the
/// active-file name); implementations are free to keep them wherever they
/// like. Values are opaque strings from the store's point of view.
pub trait KvStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Disk-backed store keeping one JSON document per key under the platform
/// data directory.
#[derive(Debug)]
pub struct DiskStore {
    data_dir: PathBuf,
}

impl DiskStore {
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .context("Failed to get data directory")?
            .join("codepad");
        Self::at(data_dir)
    }

    /// Opens a store rooted at an explicit directory.
    pub fn at(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
        Ok(Self { data_dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }
}

impl KvStore for DiskStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read stored entry '{key}'"))?;
        Ok(Some(value))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::write(self.path_for(key), value)
            .with_context(|| format!("Failed to write stored entry '{key}'"))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove stored entry '{key}'"))?;
        }
        Ok(())
    }
}

/// In-memory store backing tests. Clones share the same entries so a test
/// can keep a handle to the map a controller writes through.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Store lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

/// Storage manager serializing the workspace round-trip.
///
/// Saving writes the complete current state (full files map plus active
/// file) on every call; loading reproduces the same contents and active
/// file, with tab order rebuilt because the store is unordered.
pub struct StorageManager {
    store: Box<dyn KvStore>,
}

impl StorageManager {
    pub fn new() -> Result<Self> {
        Ok(Self {
            store: Box::new(DiskStore::new()?),
        })
    }

    pub fn with_store(store: Box<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn save_workspace(&mut self, workspace: &Workspace) -> Result<()> {
        let files = serde_json::to_string_pretty(&workspace.contents())
            .context("Failed to serialize workspace files")?;
        self.store.set(FILES_KEY, &files)?;

        let active = serde_json::to_string(workspace.active_file_name())
            .context("Failed to serialize active file name")?;
        self.store.set(ACTIVE_FILE_KEY, &active)
    }

    /// Loads the persisted workspace. `Ok(None)` means nothing was ever
    /// saved; a corrupt payload is an error the caller recovers from.
    pub fn load_workspace(&self) -> Result<Option<Workspace>> {
        let Some(raw_files) = self.store.get(FILES_KEY)? else {
            return Ok(None);
        };
        let contents: HashMap<String, String> =
            serde_json::from_str(&raw_files).context("Failed to parse stored workspace files")?;
        if contents.is_empty() {
            return Ok(None);
        }

        let active_file = match self.store.get(ACTIVE_FILE_KEY)? {
            Some(raw) => {
                serde_json::from_str(&raw).context("Failed to parse stored active file name")?
            }
            None => String::new(),
        };

        Ok(Some(Workspace::from_parts(contents, &active_file)))
    }

    /// Removes both persisted entries.
    pub fn clear_workspace(&mut self) -> Result<()> {
        self.store.remove(FILES_KEY)?;
        self.store.remove(ACTIVE_FILE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with_memory() -> (StorageManager, MemoryStore) {
        let store = MemoryStore::new();
        (StorageManager::with_store(Box::new(store.clone())), store)
    }

    #[test]
    fn load_without_saved_state_returns_none() {
        let (manager, _store) = manager_with_memory();
        assert!(manager.load_workspace().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips_contents_and_active_file() {
        let (mut manager, _store) = manager_with_memory();

        let mut workspace = Workspace::seeded();
        workspace.create_file("utils.py", "def f(): pass").unwrap();
        workspace.create_file("app.js", "console.log(1)").unwrap();
        workspace.set_active("app.js").unwrap();

        manager.save_workspace(&workspace).unwrap();
        let restored = manager.load_workspace().unwrap().unwrap();

        assert_eq!(restored.contents(), workspace.contents());
        assert_eq!(restored.active_file_name(), "app.js");
    }

    #[test]
    fn every_save_replaces_the_full_state() {
        let (mut manager, _store) = manager_with_memory();

        let mut workspace = Workspace::seeded();
        manager.save_workspace(&workspace).unwrap();

        workspace.update_content("main.py", "print(99)".into()).unwrap();
        manager.save_workspace(&workspace).unwrap();

        let restored = manager.load_workspace().unwrap().unwrap();
        assert_eq!(restored.get("main.py").unwrap().content, "print(99)");
    }

    #[test]
    fn corrupt_files_payload_is_an_error() {
        let (manager, mut store) = manager_with_memory();
        store.set(FILES_KEY, "not json").unwrap();
        assert!(manager.load_workspace().is_err());
    }

    #[test]
    fn clear_workspace_removes_both_entries() {
        let (mut manager, store) = manager_with_memory();
        manager.save_workspace(&Workspace::seeded()).unwrap();
        assert!(store.contains(FILES_KEY));
        assert!(store.contains(ACTIVE_FILE_KEY));

        manager.clear_workspace().unwrap();
        assert!(!store.contains(FILES_KEY));
        assert!(!store.contains(ACTIVE_FILE_KEY));
        assert!(manager.load_workspace().unwrap().is_none());
    }

    #[test]
    fn disk_store_round_trips_through_real_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager =
            StorageManager::with_store(Box::new(DiskStore::at(dir.path().to_path_buf()).unwrap()));

        let mut workspace = Workspace::seeded();
        workspace.create_file("extra.js", "let x = 1;").unwrap();
        manager.save_workspace(&workspace).unwrap();

        let restored = manager.load_workspace().unwrap().unwrap();
        assert_eq!(restored.contents(), workspace.contents());
        assert_eq!(restored.active_file_name(), "main.py");
    }
}
