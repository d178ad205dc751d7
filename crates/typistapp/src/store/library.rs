use super::backend::StorageBackend;
use super::cache::ContentCache;
use crate::error::{Result, TypistError};
use crate::model::{Category, Library, TextEntry, DEFAULT_LANGUAGE};
use crate::validation::{
    is_supported_language, normalize_language, validate_category, validate_identifier,
    validate_text,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// The text library: categories plus text entries, with content loaded on
/// demand.
///
/// The index is read from the backend on first use and kept in memory for the
/// lifetime of the store. Every mutation writes through to the backend and is
/// undone in memory if the index write fails.
pub struct TextLibrary<B: StorageBackend> {
    backend: Arc<B>,
    cache_limit: usize,
    state: RwLock<Option<LibraryState>>,
}

/// Loaded library. `texts` keeps index order; `by_id` and `positions` are
/// lookups over it and must be updated together with it.
struct LibraryState {
    default_text_id: String,
    categories: Vec<Category>,
    texts: Vec<TextEntry>,
    by_id: HashMap<String, TextEntry>,
    positions: HashMap<String, usize>,
    cache: ContentCache,
}

impl LibraryState {
    fn new(library: Library, cache_limit: usize) -> Self {
        let mut texts = Vec::with_capacity(library.texts.len());
        let mut by_id = HashMap::with_capacity(library.texts.len());

        for mut entry in library.texts {
            if validate_identifier(&entry.id).is_err() {
                warn!("Skipping text with invalid identifier {:?} in index", entry.id);
                continue;
            }
            if by_id.contains_key(&entry.id) {
                warn!("Skipping duplicate text {} in index", entry.id);
                continue;
            }
            entry.content.clear();
            let language = normalize_language(&entry.language);
            entry.language = if is_supported_language(&language) {
                language
            } else {
                DEFAULT_LANGUAGE.to_string()
            };
            by_id.insert(entry.id.clone(), entry.clone());
            texts.push(entry);
        }

        let mut state = Self {
            default_text_id: library.default_text_id,
            categories: library.categories,
            texts,
            by_id,
            positions: HashMap::new(),
            cache: ContentCache::new(cache_limit),
        };
        state.rebuild_positions();
        state
    }

    fn rebuild_positions(&mut self) {
        self.positions = self
            .texts
            .iter()
            .enumerate()
            .map(|(pos, entry)| (entry.id.clone(), pos))
            .collect();
    }

    fn to_library(&self) -> Library {
        Library {
            default_text_id: self.default_text_id.clone(),
            categories: self.categories.clone(),
            texts: self.texts.clone(),
        }
    }

    fn cached_text(&self, id: &str) -> Option<TextEntry> {
        let meta = self.by_id.get(id)?;
        let content = self.cache.get(id)?;
        Some(TextEntry {
            content: content.clone(),
            ..meta.clone()
        })
    }
}

/// Trims the title, normalizes the language tag and runs all field checks.
/// No I/O.
fn prepare_text(entry: &TextEntry) -> Result<TextEntry> {
    validate_identifier(&entry.id)?;
    let mut entry = entry.clone();
    entry.title = entry.title.trim().to_string();
    entry.language = normalize_language(&entry.language);
    validate_text(&entry)?;
    Ok(entry)
}

impl<B: StorageBackend> TextLibrary<B> {
    pub fn new(backend: Arc<B>, cache_limit: usize) -> Self {
        Self {
            backend,
            cache_limit,
            state: RwLock::new(None),
        }
    }

    /// Returns the loaded state, reading the index if this is the first use.
    /// Callers hold the write lock; a failed load leaves the slot empty.
    fn load_locked<'a>(
        &self,
        slot: &'a mut Option<LibraryState>,
    ) -> Result<&'a mut LibraryState> {
        let state = match slot.take() {
            Some(state) => state,
            None => {
                let library = self.backend.load_library()?.unwrap_or_default();
                debug!(
                    "Loaded library index: {} texts, {} categories",
                    library.texts.len(),
                    library.categories.len()
                );
                LibraryState::new(library, self.cache_limit)
            }
        };
        Ok(slot.insert(state))
    }

    fn read<T>(&self, f: impl FnOnce(&LibraryState) -> T) -> Result<T> {
        {
            let guard = self.state.read();
            if let Some(state) = guard.as_ref() {
                return Ok(f(state));
            }
        }
        let mut guard = self.state.write();
        let state = self.load_locked(&mut guard)?;
        Ok(f(state))
    }

    /// All categories and texts. Text content is always empty here.
    pub fn library(&self) -> Result<Library> {
        self.read(LibraryState::to_library)
    }

    /// Fetches one text with its content.
    ///
    /// A missing content file is not an error: the bundled fallback content is
    /// returned in its place. Only when that is unreadable too does this fail
    /// with `Unavailable`.
    pub fn text(&self, id: &str) -> Result<TextEntry> {
        validate_identifier(id)?;

        {
            let guard = self.state.read();
            if let Some(state) = guard.as_ref() {
                if !state.by_id.contains_key(id) {
                    return Err(TypistError::text_not_found(id));
                }
                if let Some(entry) = state.cached_text(id) {
                    return Ok(entry);
                }
            }
        }

        let mut guard = self.state.write();
        let state = self.load_locked(&mut guard)?;
        let meta = state
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| TypistError::text_not_found(id))?;
        if let Some(entry) = state.cached_text(id) {
            return Ok(entry);
        }

        let content = self.load_content(id)?;
        state.cache.insert(id, content.clone());
        Ok(TextEntry { content, ..meta })
    }

    fn load_content(&self, id: &str) -> Result<String> {
        if let Some(content) = self.backend.read_content(id)? {
            return Ok(content);
        }
        debug!("Content for text {} missing, serving fallback", id);
        match self.backend.read_fallback_content() {
            Ok(Some(content)) => Ok(content),
            Ok(None) => Err(TypistError::Unavailable { id: id.to_string() }),
            Err(e) => {
                warn!("Fallback content unreadable: {}", e);
                Err(TypistError::Unavailable { id: id.to_string() })
            }
        }
    }

    /// The library's configured default text.
    pub fn default_text(&self) -> Result<TextEntry> {
        let id = self.read(|state| state.default_text_id.clone())?;
        if id.is_empty() {
            return Err(TypistError::NotFound {
                what: "default text",
                id,
            });
        }
        self.text(&id)
    }

    /// Creates a new text. Fails with `AlreadyExists` if the id is taken.
    pub fn save_text(&self, entry: &TextEntry) -> Result<()> {
        let entry = prepare_text(entry)?;
        let id = entry.id.clone();

        let mut guard = self.state.write();
        let state = self.load_locked(&mut guard)?;
        if state.by_id.contains_key(&id) {
            return Err(TypistError::AlreadyExists { what: "text", key: id });
        }

        // 1. Content first; nothing in memory has changed if this fails
        self.backend.write_content(&id, &entry.content)?;

        // 2. In-memory state
        let meta = entry.metadata();
        state.texts.push(meta.clone());
        state.positions.insert(id.clone(), state.texts.len() - 1);
        state.by_id.insert(id.clone(), meta);
        let cache_undo = state.cache.insert(&id, entry.content);

        // 3. Index
        if let Err(err) = self.backend.save_library(&state.to_library()) {
            state.texts.pop();
            state.positions.remove(&id);
            state.by_id.remove(&id);
            state.cache.undo(cache_undo);
            self.restore_content(&id, None);
            return Err(err);
        }
        Ok(())
    }

    /// Replaces an existing text. `created_at` of the stored entry is kept.
    pub fn update_text(&self, entry: &TextEntry) -> Result<()> {
        let entry = prepare_text(entry)?;
        let id = entry.id.clone();

        let mut guard = self.state.write();
        let state = self.load_locked(&mut guard)?;
        let pos = *state
            .positions
            .get(&id)
            .ok_or_else(|| TypistError::text_not_found(&id))?;
        let previous_meta = state.texts[pos].clone();
        let previous_content = self.backend.read_content(&id)?;

        self.backend.write_content(&id, &entry.content)?;

        let mut meta = entry.metadata();
        meta.created_at = previous_meta.created_at;
        state.texts[pos] = meta.clone();
        state.by_id.insert(id.clone(), meta);
        let cache_undo = state.cache.insert(&id, entry.content);

        if let Err(err) = self.backend.save_library(&state.to_library()) {
            state.texts[pos] = previous_meta.clone();
            state.by_id.insert(id.clone(), previous_meta);
            state.cache.undo(cache_undo);
            self.restore_content(&id, previous_content.as_deref());
            return Err(err);
        }
        Ok(())
    }

    pub fn delete_text(&self, id: &str) -> Result<()> {
        validate_identifier(id)?;

        let mut guard = self.state.write();
        let state = self.load_locked(&mut guard)?;
        let pos = *state
            .positions
            .get(id)
            .ok_or_else(|| TypistError::text_not_found(id))?;
        let previous_content = self.backend.read_content(id)?;

        self.backend.delete_content(id)?;

        let removed = state.texts.remove(pos);
        state.by_id.remove(id);
        state.rebuild_positions();
        let cache_undo = state.cache.remove(id);

        if let Err(err) = self.backend.save_library(&state.to_library()) {
            state.texts.insert(pos, removed.clone());
            state.by_id.insert(id.to_string(), removed);
            state.rebuild_positions();
            state.cache.undo(cache_undo);
            if previous_content.is_some() {
                self.restore_content(id, previous_content.as_deref());
            }
            return Err(err);
        }
        Ok(())
    }

    /// Puts a content file back the way it was before a failed mutation:
    /// `Some` rewrites the old content, `None` removes the file.
    fn restore_content(&self, id: &str, previous: Option<&str>) {
        let restored = match previous {
            Some(content) => self.backend.write_content(id, content),
            None => self.backend.delete_content(id),
        };
        if let Err(e) = restored {
            warn!("Rollback of content for text {} failed: {}", id, e);
        }
    }

    /// Adds a category. Ids and names must both be unique.
    pub fn save_category(&self, category: &Category) -> Result<()> {
        validate_category(category)?;
        let mut category = category.clone();
        category.name = category.name.trim().to_string();

        let mut guard = self.state.write();
        let state = self.load_locked(&mut guard)?;
        if state.categories.iter().any(|c| c.id == category.id) {
            return Err(TypistError::AlreadyExists {
                what: "category",
                key: category.id,
            });
        }
        if state.categories.iter().any(|c| c.name == category.name) {
            return Err(TypistError::AlreadyExists {
                what: "category name",
                key: category.name,
            });
        }
        if let Some(parent_id) = &category.parent_id {
            if parent_id == &category.id || !state.categories.iter().any(|c| &c.id == parent_id) {
                return Err(TypistError::Validation(format!(
                    "unknown parent category '{}'",
                    parent_id
                )));
            }
        }

        state.categories.push(category);
        if let Err(err) = self.backend.save_library(&state.to_library()) {
            state.categories.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Removes a category. Texts and child categories keep their references.
    pub fn delete_category(&self, id: &str) -> Result<()> {
        validate_identifier(id)?;

        let mut guard = self.state.write();
        let state = self.load_locked(&mut guard)?;
        let pos = state
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| TypistError::category_not_found(id))?;

        let removed = state.categories.remove(pos);
        if let Err(err) = self.backend.save_library(&state.to_library()) {
            state.categories.insert(pos, removed);
            return Err(err);
        }
        Ok(())
    }
}
