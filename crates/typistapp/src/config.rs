//! # Configuration
//!
//! Store tuning knobs, loaded with [`confique`] from layered sources.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `TYPIST_CONTENT_CACHE_LIMIT`, `TYPIST_SESSION_LIMIT`.
//! 2. **Config file**: `<root>/typist.toml`, ignored when absent.
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `content_cache_limit` | `50` | Text contents kept in memory before the cache is cleared |
//! | `session_limit` | `500` | Sessions retained in `sessions.json` |

use crate::error::Result;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "typist.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum number of text contents held in memory.
    #[config(env = "TYPIST_CONTENT_CACHE_LIMIT", default = 50)]
    pub content_cache_limit: usize,

    /// Maximum number of sessions retained on disk and in memory.
    #[config(env = "TYPIST_SESSION_LIMIT", default = 500)]
    pub session_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            content_cache_limit: 50,
            session_limit: 500,
        }
    }
}

impl StoreConfig {
    /// Loads configuration for the store rooted at `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let config = StoreConfig::builder()
            .env()
            .file(root.join(CONFIG_FILE))
            .load()?;
        Ok(config)
    }

    /// Cache limit, never below one entry.
    pub fn content_cache_limit(&self) -> usize {
        self.content_cache_limit.max(1)
    }

    /// Session limit, never below one record.
    pub fn session_limit(&self) -> usize {
        self.session_limit.max(1)
    }
}
