use crate::config::PlaygroundConfig;
use crate::error::PlaygroundError;
use crate::handlers::{ExecutionDispatcher, ExecutionResult, SuggestionCoordinator, SuggestionOutcome};
use crate::models::{DiffView, SnapshotStore, StorageManager, Workspace};

/// The workspace controller: the public surface composing the file store,
/// diff snapshots, persistence, the execution dispatcher and the
/// suggestion coordinator into user-facing operations.
///
/// Construction restores the persisted workspace when one exists and is
/// intact, otherwise seeds a fresh one; reset returns to the seeded state.
/// Every mutation persists the full current state immediately; there is
/// no batching, so the store always holds the latest workspace.
pub struct App {
    pub workspace: Workspace,
    pub snapshots: SnapshotStore,
    pub executor: ExecutionDispatcher,
    pub suggestions: SuggestionCoordinator,
    storage: Option<StorageManager>,
}

impl App {
    /// Opens the playground against the default on-disk store. A store
    /// that cannot be opened degrades to a non-persistent session.
    pub fn new(config: &PlaygroundConfig) -> Self {
        let storage = match StorageManager::new() {
            Ok(manager) => Some(manager),
            Err(e) => {
                tracing::warn!(error = %e, "storage unavailable, running without persistence");
                None
            }
        };
        Self::with_storage(storage, config)
    }

    /// Opens the playground against an explicit store (or none).
    pub fn with_storage(storage: Option<StorageManager>, config: &PlaygroundConfig) -> Self {
        let workspace = match storage.as_ref().map(StorageManager::load_workspace) {
            Some(Ok(Some(workspace))) => {
                tracing::info!(files = workspace.len(), "restored persisted workspace");
                workspace
            }
            Some(Ok(None)) => Workspace::seeded(),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "persisted workspace unreadable, reseeding");
                Workspace::seeded()
            }
            None => Workspace::seeded(),
        };

        // Everything present at this point just entered the workspace, so
        // it gets its diff original now.
        let mut snapshots = SnapshotStore::new();
        for name in workspace.file_names() {
            if let Some(file) = workspace.get(name) {
                snapshots.capture(name, &file.content);
            }
        }

        Self {
            workspace,
            snapshots,
            executor: ExecutionDispatcher::new(config),
            suggestions: SuggestionCoordinator::new(config),
            storage,
        }
    }

    fn persist(&mut self) {
        if let Some(storage) = self.storage.as_mut() {
            if let Err(e) = storage.save_workspace(&self.workspace) {
                tracing::warn!(error = %e, "failed to persist workspace");
            }
        }
    }

    /// Opens a new empty tab and makes it active. New tabs have no diff
    /// snapshot until content is loaded into them from outside.
    pub fn create_file(&mut self, name: &str) -> Result<(), PlaygroundError> {
        self.workspace.create_file(name, "")?;
        self.workspace.set_active(name)?;
        self.persist();
        Ok(())
    }

    /// Closes a tab and drops its snapshot. Closing the active tab moves
    /// the pointer to the first remaining one.
    pub fn close_file(&mut self, name: &str) -> Result<(), PlaygroundError> {
        self.workspace.close_file(name)?;
        self.snapshots.drop_for(name);
        self.persist();
        Ok(())
    }

    pub fn switch_file(&mut self, name: &str) -> Result<(), PlaygroundError> {
        self.workspace.set_active(name)?;
        self.persist();
        Ok(())
    }

    pub fn rename_file(&mut self, old: &str, new: &str) -> Result<(), PlaygroundError> {
        self.workspace.rename_file(old, new)?;
        self.snapshots.rename(old, new);
        self.persist();
        Ok(())
    }

    /// Replaces a file's content with edited text.
    pub fn update_content(&mut self, name: &str, content: String) -> Result<(), PlaygroundError> {
        self.workspace.update_content(name, content)?;
        self.persist();
        Ok(())
    }

    /// Brings an uploaded file into the workspace: overwrite when the name
    /// exists, open a tab otherwise, capture the diff original, and make
    /// the file active. Returns true when a new tab was opened.
    pub fn upload(&mut self, name: &str, content: String) -> Result<bool, PlaygroundError> {
        let created = self
            .workspace
            .rename_or_upload_replace(name, content.clone())?;
        self.snapshots.capture(name, &content);
        self.workspace.set_active(name)?;
        self.persist();
        Ok(created)
    }

    /// Runs the active file. One run at a time; the caller awaits this
    /// before issuing another.
    pub async fn run_active_file(&self) -> ExecutionResult {
        self.executor.run(self.workspace.active_file()).await
    }

    /// Issues an inline-suggestion request for the active file with the
    /// given code prefix (document start up to the cursor).
    pub fn request_suggestion(&mut self, code_prefix: &str) -> u64 {
        let language = self.workspace.active_file().language();
        self.suggestions.request(code_prefix, language)
    }

    /// Issues a suggestion request keyed to a cursor position in the
    /// active file. Only text before the cursor goes to the provider.
    pub fn request_suggestion_at(&mut self, line: usize, column: usize) -> u64 {
        let file = self.workspace.active_file();
        let prefix = crate::handlers::suggest::prefix_at(&file.content, line, column).to_string();
        let language = file.language();
        self.suggestions.request(&prefix, language)
    }

    /// Forwards suggestion results that have arrived; stale ones are
    /// already filtered out by the coordinator.
    pub fn poll_suggestion(&mut self) -> Option<SuggestionOutcome> {
        self.suggestions.poll()
    }

    /// Diff view for the active file, or `None` when no snapshot exists.
    /// Absence is surfaced as "no changes to show", never as a comparison
    /// against the empty string.
    pub fn diff_active_file(&self) -> Option<DiffView<'_>> {
        let file = self.workspace.active_file();
        self.snapshots.get(&file.name).map(|original| DiffView {
            original,
            current: &file.content,
        })
    }

    /// Byte blob for offering a file as a download. Pure: no state is
    /// touched.
    pub fn download_blob(&self, name: &str) -> Result<(String, Vec<u8>), PlaygroundError> {
        let file = self
            .workspace
            .get(name)
            .ok_or_else(|| PlaygroundError::UnknownFile(name.to_string()))?;
        Ok((file.name.clone(), file.content.clone().into_bytes()))
    }

    /// Clears all persisted state and returns the workspace to its seeded
    /// initial state. The next mutation persists again.
    pub fn reset(&mut self) {
        if let Some(storage) = self.storage.as_mut() {
            if let Err(e) = storage.clear_workspace() {
                tracing::warn!(error = %e, "failed to clear persisted workspace");
            }
        }
        self.workspace = Workspace::seeded();
        self.snapshots.clear();
        let seeded = self.workspace.active_file();
        self.snapshots.capture(&seeded.name, &seeded.content);
        tracing::info!("workspace reset to seeded state");
    }
}
