//! Bounded text-content cache.
//!
//! Eviction is coarse: once the cache holds `limit` entries, inserting a new
//! key clears everything first. There is no per-entry recency tracking.
//!
//! Mutations hand back a [`CacheUndo`] so a failed library write can put the
//! cache back exactly as it was, including entries dropped by a clear.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ContentCache {
    entries: HashMap<String, String>,
    limit: usize,
}

#[derive(Debug)]
pub enum CacheUndo {
    /// The insert cleared the cache; this is everything it held before.
    Cleared(HashMap<String, String>),
    /// Previous value for the key (None if it was absent).
    Replaced { id: String, previous: Option<String> },
}

impl ContentCache {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: HashMap::new(),
            limit: limit.max(1),
        }
    }

    pub fn get(&self, id: &str) -> Option<&String> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, id: &str, content: String) -> CacheUndo {
        if !self.entries.contains_key(id) && self.entries.len() >= self.limit {
            let previous = std::mem::take(&mut self.entries);
            self.entries.insert(id.to_string(), content);
            return CacheUndo::Cleared(previous);
        }
        let previous = self.entries.insert(id.to_string(), content);
        CacheUndo::Replaced {
            id: id.to_string(),
            previous,
        }
    }

    pub fn remove(&mut self, id: &str) -> CacheUndo {
        CacheUndo::Replaced {
            id: id.to_string(),
            previous: self.entries.remove(id),
        }
    }

    pub fn undo(&mut self, undo: CacheUndo) {
        match undo {
            CacheUndo::Cleared(previous) => self.entries = previous,
            CacheUndo::Replaced { id, previous } => match previous {
                Some(content) => {
                    self.entries.insert(id, content);
                }
                None => {
                    self.entries.remove(&id);
                }
            },
        }
    }
}
