//! # First Run and Store Setup
//!
//! [`initialize`] turns "a directory somewhere" into ready-to-use stores:
//!
//! 1. Resolve the data directory ([`resolve_data_dir`]).
//! 2. Load [`StoreConfig`] from the environment and `<root>/typist.toml`.
//! 3. [`bootstrap`] the layout and seed files.
//! 4. Build one [`FsBackend`] shared by a [`TextLibrary`] and a [`SessionHistory`].
//!
//! ## Data Directory Resolution
//!
//! 1. Explicit `data_override` argument, used as-is.
//! 2. `TYPIST_DATA` environment variable (primarily for testing).
//! 3. OS-appropriate data directory via the `directories` crate.
//!
//! ## Seeding
//!
//! Seed files are compiled into the binary from `assets/`. Each one is written
//! with create-new semantics: if anything already exists at the target path it
//! is left untouched, so user edits and deletions of seeded texts' metadata
//! survive restarts. Seeding is purely additive and needs no rollback.

use crate::config::StoreConfig;
use crate::error::{Result, TypistError};
use crate::paths::StorePaths;
use crate::store::fs_backend::{open_private, FsBackend};
use crate::store::library::TextLibrary;
use crate::store::sessions::SessionHistory;
use directories::ProjectDirs;
use std::fs::{self, DirBuilder};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const SEED_INDEX: &str = include_str!("../assets/index.json");
const SEED_WELCOME: &str = include_str!("../assets/content/welcome.txt");
const SEED_RUST_OWNERSHIP: &str = include_str!("../assets/content/rust-ownership.txt");
const SEED_FALLBACK: &str = include_str!("../assets/content/fallback.txt");

pub const DATA_DIR_ENV: &str = "TYPIST_DATA";

pub struct TypistContext {
    pub library: TextLibrary<FsBackend>,
    pub sessions: SessionHistory<FsBackend>,
    pub paths: StorePaths,
    pub config: StoreConfig,
}

pub fn resolve_data_dir(data_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = data_override {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    ProjectDirs::from("com", "typist", "typist")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            TypistError::io(
                Path::new("~"),
                io::Error::new(io::ErrorKind::NotFound, "no home directory for data dir"),
            )
        })
}

/// Creates the directory layout and copies in any missing seed files.
pub fn bootstrap(paths: &StorePaths) -> Result<()> {
    for dir in [
        paths.root().to_path_buf(),
        paths.texts_dir(),
        paths.content_dir(),
    ] {
        ensure_private_dir(&dir)?;
    }

    let seeds = [
        (paths.index_file(), SEED_INDEX),
        (paths.content_file("welcome"), SEED_WELCOME),
        (paths.content_file("rust-ownership"), SEED_RUST_OWNERSHIP),
        (paths.fallback_file(), SEED_FALLBACK),
    ];

    for (path, content) in seeds {
        if seed_file(&path, content)? {
            info!("Seeded {}", path.display());
        } else {
            debug!("Keeping existing {}", path.display());
        }
    }
    Ok(())
}

fn ensure_private_dir(path: &Path) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path).map_err(|e| TypistError::io(path, e))
}

/// Writes `content` to `path` unless something is already there.
/// Returns whether the file was written.
fn seed_file(path: &Path, content: &str) -> Result<bool> {
    let mut file = match open_private(path, true) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(TypistError::io(path, e)),
    };
    if let Err(e) = file.write_all(content.as_bytes()) {
        // A half-written seed would otherwise count as existing forever
        let _ = fs::remove_file(path);
        return Err(TypistError::io(path, e));
    }
    Ok(true)
}

/// Sets up the stores rooted at `data_override` (or the resolved default).
pub fn initialize(data_override: Option<PathBuf>) -> Result<TypistContext> {
    let root = resolve_data_dir(data_override)?;
    let paths = StorePaths::new(root);
    let config = StoreConfig::load(paths.root())?;

    bootstrap(&paths)?;

    let backend = Arc::new(FsBackend::new(paths.clone()));
    let library = TextLibrary::new(Arc::clone(&backend), config.content_cache_limit());
    let sessions = SessionHistory::new(backend, config.session_limit());

    Ok(TypistContext {
        library,
        sessions,
        paths,
        config,
    })
}
