//! # Typist Storage
//!
//! Typist is a typing-practice desktop app. This crate is its persistence
//! layer: a library of practice texts grouped into categories, and a bounded
//! history of completed sessions. Everything else (the keystroke engine, the
//! UI, window management) sits above it and only calls the operations here.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Context (init.rs)                                          │
//! │  - Resolves the data dir, loads config, seeds first run     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Stores (store/library.rs, store/sessions.rs)               │
//! │  - Lazy loading, caching, lookups, rollback                 │
//! │  - Validation before any I/O (validation.rs)                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Backend (store/backend.rs)                                 │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Threading
//!
//! Both stores are `Send + Sync` and meant to be shared (e.g. in an `Arc`)
//! between whatever threads the UI bridge calls from. Every operation is
//! synchronous and blocks on disk I/O.
//!
//! ## Example
//!
//! ```no_run
//! use typistapp::init::initialize;
//! use typistapp::model::TextEntry;
//!
//! let ctx = initialize(None)?;
//! ctx.library.save_text(&TextEntry::new("t1", "Hi", "hello"))?;
//! let text = ctx.library.text("t1")?;
//! assert_eq!(text.language, "text");
//! # Ok::<(), typistapp::error::TypistError>(())
//! ```

pub mod config;
pub mod error;
pub mod init;
pub mod model;
pub mod paths;
pub mod store;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
pub mod validation;

pub use error::{ErrorKind, Result, TypistError};
