use crate::error::Result;
use crate::model::{Library, SessionRecord};

/// Abstract interface for raw storage I/O.
///
/// This trait handles the "how" of storage (filesystem vs memory), while
/// [`TextLibrary`](super::library::TextLibrary) and
/// [`SessionHistory`](super::sessions::SessionHistory) handle the "what"
/// (caching, validation, rollback). Identifiers passed in are already
/// validated by the stores.
pub trait StorageBackend: Send + Sync {
    // --- Library index ---

    /// Load the library index. Returns Ok(None) if it does not exist.
    fn load_library(&self) -> Result<Option<Library>>;

    /// Replace the library index.
    fn save_library(&self, library: &Library) -> Result<()>;

    // --- Text content ---

    /// Read a text's content. Returns Ok(None) if the file does not exist;
    /// Err only on actual I/O failures.
    fn read_content(&self, id: &str) -> Result<Option<String>>;

    /// Read the bundled content served in place of a missing file.
    fn read_fallback_content(&self) -> Result<Option<String>>;

    /// Write content, replacing any previous version.
    fn write_content(&self, id: &str, content: &str) -> Result<()>;

    /// Delete a content file. Deleting a missing file is not an error.
    fn delete_content(&self, id: &str) -> Result<()>;

    // --- Session log ---

    /// Load the session log. Returns Ok(None) if it does not exist.
    fn load_sessions(&self) -> Result<Option<Vec<SessionRecord>>>;

    /// Replace the session log.
    fn save_sessions(&self, sessions: &[SessionRecord]) -> Result<()>;
}
