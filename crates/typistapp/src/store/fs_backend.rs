use super::backend::StorageBackend;
use crate::error::{Result, TypistError};
use crate::model::{Library, SessionRecord};
use crate::paths::StorePaths;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use uuid::Uuid;

pub struct FsBackend {
    paths: StorePaths,
}

impl FsBackend {
    pub fn new(paths: StorePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(|e| TypistError::io(path, e))?;
        }
        Ok(())
    }

    fn read_optional(&self, path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TypistError::io(path, e)),
        }
    }

    fn load_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match self.read_optional(path)? {
            Some(raw) => {
                let value = serde_json::from_str(&raw).map_err(|e| TypistError::serde(path, e))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn save_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value).map_err(|e| TypistError::serde(path, e))?;
        write_private(path, content.as_bytes())
    }
}

impl StorageBackend for FsBackend {
    fn load_library(&self) -> Result<Option<Library>> {
        self.load_json(&self.paths.index_file())
    }

    fn save_library(&self, library: &Library) -> Result<()> {
        self.ensure_dir(&self.paths.texts_dir())?;
        self.save_json(&self.paths.index_file(), library)
    }

    fn read_content(&self, id: &str) -> Result<Option<String>> {
        self.read_optional(&self.paths.content_file(id))
    }

    fn read_fallback_content(&self) -> Result<Option<String>> {
        self.read_optional(&self.paths.fallback_file())
    }

    fn write_content(&self, id: &str, content: &str) -> Result<()> {
        self.ensure_dir(&self.paths.content_dir())?;
        write_private(&self.paths.content_file(id), content.as_bytes())
    }

    fn delete_content(&self, id: &str) -> Result<()> {
        let path = self.paths.content_file(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TypistError::io(&path, e)),
        }
    }

    fn load_sessions(&self) -> Result<Option<Vec<SessionRecord>>> {
        self.load_json(&self.paths.sessions_file())
    }

    fn save_sessions(&self, sessions: &[SessionRecord]) -> Result<()> {
        self.ensure_dir(self.paths.root())?;
        self.save_json(&self.paths.sessions_file(), sessions)
    }
}

/// Opens a new file for writing, readable and writable by the owner only.
pub(crate) fn open_private(path: &Path, create_new: bool) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if create_new {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

/// Atomic write: temp file in the target's directory, then rename over it.
pub(crate) fn write_private(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp_path = dir.join(format!(".typist-{}.tmp", Uuid::new_v4()));

    let written = open_private(&tmp_path, true).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(TypistError::io(&tmp_path, e));
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(TypistError::io(path, e));
    }
    Ok(())
}
