//! On-disk layout, relative to a single root directory.
//!
//! ```text
//! <root>/
//! ├── texts/
//! │   ├── index.json           # {defaultTextId, categories[], texts[]}
//! │   └── content/
//! │       ├── {id}.txt         # one file per text
//! │       └── .fallback.txt    # served when a text's file is missing
//! ├── sessions.json            # session log, oldest first
//! └── typist.toml              # optional configuration
//! ```

use std::path::{Path, PathBuf};

const FALLBACK_FILE: &str = ".fallback.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    root: PathBuf,
}

impl StorePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn texts_dir(&self) -> PathBuf {
        self.root.join("texts")
    }

    pub fn content_dir(&self) -> PathBuf {
        self.texts_dir().join("content")
    }

    pub fn index_file(&self) -> PathBuf {
        self.texts_dir().join("index.json")
    }

    /// Path of a text's content file. `id` must already be validated.
    pub fn content_file(&self, id: &str) -> PathBuf {
        self.content_dir().join(format!("{}.txt", id))
    }

    /// Bundled placeholder content. The leading dot keeps it out of reach of
    /// any valid text identifier.
    pub fn fallback_file(&self) -> PathBuf {
        self.content_dir().join(FALLBACK_FILE)
    }

    pub fn sessions_file(&self) -> PathBuf {
        self.root.join("sessions.json")
    }
}
