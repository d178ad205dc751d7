//! # Storage Layer
//!
//! Two independent stores share one [`backend::StorageBackend`]:
//!
//! - [`library::TextLibrary`]: categories and practice texts.
//! - [`sessions::SessionHistory`]: the capped log of completed sessions.
//!
//! Each store guards all of its state with its own `RwLock`; there is no lock
//! shared between them.
//!
//! ## Split Persistence
//!
//! A text lives in two places:
//! 1. **Index**: `texts/index.json` holds metadata for every text and every
//!    category, with `content` always empty.
//! 2. **Content**: `texts/content/{id}.txt` holds the body.
//!
//! Writes go content first, then index. Each file write is atomic on its own
//! (temp file + rename), but the pair is not: a crash between the two can
//! leave a content file without an index entry, or an index entry pointing at
//! old content. In-process failures of the index write are handled by
//! rolling back memory and the content file.
//!
//! ## Lazy Loading
//!
//! The index and the session log are read on first use, once per store. After
//! that, memory is authoritative and the files are only ever written.
//!
//! ## Missing Content
//!
//! If a text's content file is gone, [`library::TextLibrary::text`] serves the
//! bundled fallback text instead of failing. A successful read can therefore
//! return placeholder content.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: production, files under a root directory.
//! - [`mem_backend::MemBackend`]: in-memory, with failure injection for tests.

pub mod backend;
pub mod cache;
pub mod fs_backend;
pub mod library;
pub mod mem_backend;
pub mod sessions;
