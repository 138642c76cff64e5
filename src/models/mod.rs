pub mod file;
pub mod snapshot;
pub mod storage;
pub mod workspace;

pub use file::{FileLanguage, PlaygroundFile, has_recognized_extension};
pub use snapshot::{DiffView, SnapshotStore};
pub use storage::{DiskStore, KvStore, MemoryStore, StorageManager};
pub use workspace::{DEFAULT_FILE_CONTENT, DEFAULT_FILE_NAME, Workspace};
