use super::backend::StorageBackend;
use crate::error::{Result, TypistError};
use crate::model::{Library, SessionRecord};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory storage backend for testing.
///
/// Besides holding data, it counts index/log loads and can be told to fail
/// specific writes, which is how rollback paths get exercised.
pub struct MemBackend {
    library: Mutex<Option<Library>>,
    content: Mutex<HashMap<String, String>>,
    sessions: Mutex<Option<Vec<SessionRecord>>>,
    fallback: Mutex<Option<String>>,
    fail_index_writes: AtomicBool,
    fail_content_writes: AtomicBool,
    fail_session_writes: AtomicBool,
    library_loads: AtomicUsize,
    session_loads: AtomicUsize,
}

impl Default for MemBackend {
    fn default() -> Self {
        Self {
            library: Mutex::new(None),
            content: Mutex::new(HashMap::new()),
            sessions: Mutex::new(None),
            fallback: Mutex::new(None),
            fail_index_writes: AtomicBool::new(false),
            fail_content_writes: AtomicBool::new(false),
            fail_session_writes: AtomicBool::new(false),
            library_loads: AtomicUsize::new(0),
            session_loads: AtomicUsize::new(0),
        }
    }
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_library(self, library: Library) -> Self {
        *self.library.lock() = Some(library);
        self
    }

    pub fn with_content(self, id: &str, content: &str) -> Self {
        self.content
            .lock()
            .insert(id.to_string(), content.to_string());
        self
    }

    pub fn with_fallback(self, content: &str) -> Self {
        *self.fallback.lock() = Some(content.to_string());
        self
    }

    pub fn with_sessions(self, sessions: Vec<SessionRecord>) -> Self {
        *self.sessions.lock() = Some(sessions);
        self
    }

    /// Make `save_library` fail until switched off.
    pub fn set_fail_index_writes(&self, fail: bool) {
        self.fail_index_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `write_content` and `delete_content` fail until switched off.
    pub fn set_fail_content_writes(&self, fail: bool) {
        self.fail_content_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_session_writes(&self, fail: bool) {
        self.fail_session_writes.store(fail, Ordering::SeqCst);
    }

    pub fn library_loads(&self) -> usize {
        self.library_loads.load(Ordering::SeqCst)
    }

    pub fn session_loads(&self) -> usize {
        self.session_loads.load(Ordering::SeqCst)
    }

    /// Currently stored index, as it would be on disk.
    pub fn stored_library(&self) -> Option<Library> {
        self.library.lock().clone()
    }

    pub fn stored_content(&self, id: &str) -> Option<String> {
        self.content.lock().get(id).cloned()
    }

    pub fn stored_sessions(&self) -> Option<Vec<SessionRecord>> {
        self.sessions.lock().clone()
    }

    fn check(&self, flag: &AtomicBool, virtual_path: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(TypistError::Io {
                path: PathBuf::from(virtual_path),
                source: io::Error::other("simulated write error"),
            });
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn load_library(&self) -> Result<Option<Library>> {
        self.library_loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.library.lock().clone())
    }

    fn save_library(&self, library: &Library) -> Result<()> {
        self.check(&self.fail_index_writes, "mem://texts/index.json")?;
        *self.library.lock() = Some(library.clone());
        Ok(())
    }

    fn read_content(&self, id: &str) -> Result<Option<String>> {
        Ok(self.content.lock().get(id).cloned())
    }

    fn read_fallback_content(&self) -> Result<Option<String>> {
        Ok(self.fallback.lock().clone())
    }

    fn write_content(&self, id: &str, content: &str) -> Result<()> {
        self.check(&self.fail_content_writes, "mem://texts/content")?;
        self.content
            .lock()
            .insert(id.to_string(), content.to_string());
        Ok(())
    }

    fn delete_content(&self, id: &str) -> Result<()> {
        self.check(&self.fail_content_writes, "mem://texts/content")?;
        self.content.lock().remove(id);
        Ok(())
    }

    fn load_sessions(&self) -> Result<Option<Vec<SessionRecord>>> {
        self.session_loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.sessions.lock().clone())
    }

    fn save_sessions(&self, sessions: &[SessionRecord]) -> Result<()> {
        self.check(&self.fail_session_writes, "mem://sessions.json")?;
        *self.sessions.lock() = Some(sessions.to_vec());
        Ok(())
    }
}
