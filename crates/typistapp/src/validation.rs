//! Identifier and field validation.
//!
//! Identifiers double as file names (`texts/content/{id}.txt`), so they are
//! restricted to an allow-list:
//! - ASCII letters, digits, underscores (`_`) and hyphens (`-`)
//! - Never empty
//! - Never `..`, `/` or `\`, even though the allow-list already excludes them
//!
//! Everything here is pure. Nothing touches the filesystem, which lets the
//! stores reject bad input before any I/O happens.

use crate::error::{Result, TypistError};
use crate::model::{
    Category, TextEntry, DEFAULT_LANGUAGE, MAX_CATEGORY_NAME_CHARS, MAX_CONTENT_BYTES,
    MAX_TITLE_CHARS, SUPPORTED_LANGUAGES,
};

/// Validates an identifier used for texts and categories.
///
/// # Examples
/// ```
/// use typistapp::validation::validate_identifier;
///
/// assert!(validate_identifier("intro-01").is_ok());
/// assert!(validate_identifier("rust_basics").is_ok());
///
/// assert!(validate_identifier("").is_err());
/// assert!(validate_identifier("../secrets").is_err());
/// assert!(validate_identifier("a/b").is_err());
/// assert!(validate_identifier("a b").is_err());
/// ```
pub fn validate_identifier(id: &str) -> Result<()> {
    if id.is_empty() || id.contains("..") || id.contains('/') || id.contains('\\') {
        return Err(TypistError::InvalidId(id.to_string()));
    }
    if !id.chars().all(is_valid_id_char) {
        return Err(TypistError::InvalidId(id.to_string()));
    }
    Ok(())
}

fn is_valid_id_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

/// Empty (or blank) tags become `"text"`; others are trimmed and lower-cased.
pub fn normalize_language(tag: &str) -> String {
    let tag = tag.trim();
    if tag.is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        tag.to_ascii_lowercase()
    }
}

pub fn is_supported_language(tag: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&tag)
}

/// Checks the fields of a text entry. The identifier is checked separately
/// with [`validate_identifier`].
pub fn validate_text(entry: &TextEntry) -> Result<()> {
    let title = entry.title.trim();
    if title.is_empty() {
        return Err(TypistError::Validation("title cannot be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(TypistError::Validation(format!(
            "title exceeds {} characters",
            MAX_TITLE_CHARS
        )));
    }

    if entry.content.is_empty() {
        return Err(TypistError::Validation("content cannot be empty".into()));
    }
    if entry.content.len() > MAX_CONTENT_BYTES {
        return Err(TypistError::Validation(format!(
            "content exceeds {} bytes",
            MAX_CONTENT_BYTES
        )));
    }

    let language = normalize_language(&entry.language);
    if !is_supported_language(&language) {
        return Err(TypistError::Validation(format!(
            "unsupported language '{}'",
            language
        )));
    }

    if let Some(category_id) = &entry.category_id {
        validate_identifier(category_id)?;
    }

    Ok(())
}

pub fn validate_category(category: &Category) -> Result<()> {
    validate_identifier(&category.id)?;

    let name = category.name.trim();
    if name.is_empty() {
        return Err(TypistError::Validation(
            "category name cannot be empty".into(),
        ));
    }
    if name.chars().count() > MAX_CATEGORY_NAME_CHARS {
        return Err(TypistError::Validation(format!(
            "category name exceeds {} characters",
            MAX_CATEGORY_NAME_CHARS
        )));
    }

    if let Some(parent_id) = &category.parent_id {
        validate_identifier(parent_id)?;
    }

    Ok(())
}
