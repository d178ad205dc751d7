//! # Domain Model: Texts, Categories and Sessions
//!
//! This module defines the data structures persisted by typist: [`TextEntry`],
//! [`Category`], [`Library`], and the session pair [`SessionPayload`] (raw, as
//! sent by the typing engine) / [`SessionRecord`] (normalized, as stored).
//!
//! ## Content Is Not Metadata
//!
//! A text's body can be large (up to [`MAX_CONTENT_BYTES`]), so it never lives
//! in the library index. `TextEntry::content` is always empty in
//! `texts/index.json` and in [`Library`] listings; it is only filled when a
//! single text is fetched.
//!
//! ## Session Titles and Previews
//!
//! The typing engine does not always know what it was fed. When no title is
//! supplied, one is derived from the source text:
//!
//! 1. **Title**: first non-blank line, trimmed, truncated to 60 characters
//!    (59 chars + ellipsis `…`).
//! 2. **Preview**: whole text with whitespace runs collapsed to single spaces,
//!    truncated to 120 characters the same way.
//!
//! Empty source text yields `"Untitled session"` and an empty preview.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_BYTES: usize = 1_000_000;
pub const MAX_CATEGORY_NAME_CHARS: usize = 100;

/// Ceiling for a session duration that is not backed by timestamps.
pub const MAX_SESSION_SECONDS: f64 = 86_400.0;

pub const DEFAULT_LANGUAGE: &str = "text";

/// Language tags a text may carry. Anything else is rejected on save.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "text",
    "markdown",
    "c",
    "cpp",
    "csharp",
    "css",
    "go",
    "html",
    "java",
    "javascript",
    "json",
    "kotlin",
    "lua",
    "php",
    "python",
    "ruby",
    "rust",
    "shell",
    "sql",
    "swift",
    "typescript",
    "yaml",
];

const SESSION_TITLE_CHARS: usize = 60;
const SESSION_PREVIEW_CHARS: usize = 120;
const UNTITLED_SESSION: &str = "Untitled session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl TextEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            category_id: None,
            language: String::new(),
            favorite: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Copy of this entry with the content dropped, as kept in the index.
    pub fn metadata(&self) -> Self {
        Self {
            content: String::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            icon: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// The whole text library as stored in `texts/index.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    #[serde(default)]
    pub default_text_id: String,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub texts: Vec<TextEntry>,
}

/// Raw metrics reported by the typing engine when a session ends.
///
/// Nothing here is trusted: numbers may be out of range, timestamps may be
/// missing or inverted. [`SessionRecord`] is the normalized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionPayload {
    pub id: Option<String>,
    pub title: Option<String>,
    pub source_text: String,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_seconds: f64,
    pub wpm: f64,
    pub cpm: f64,
    pub accuracy: f64,
    pub total_keystrokes: i64,
    pub total_errors: i64,
    pub character_count: i64,
    pub mistakes: HashMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub preview: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub wpm: f64,
    pub cpm: f64,
    pub accuracy: f64,
    pub total_keystrokes: u64,
    pub total_errors: u64,
    pub character_count: u64,
    #[serde(default)]
    pub mistakes: BTreeMap<String, u64>,
}

/// Rounds to two decimals. Non-finite input becomes 0.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let truncated: String = s.chars().take(max - 1).collect();
        format!("{}…", truncated)
    } else {
        s.to_string()
    }
}

/// Title for a session: first non-blank line of the source text.
pub fn derive_session_title(source: &str) -> String {
    source
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| truncate_chars(line, SESSION_TITLE_CHARS))
        .unwrap_or_else(|| UNTITLED_SESSION.to_string())
}

/// Single-line excerpt of the source text.
pub fn derive_session_preview(source: &str) -> String {
    let collapsed = source.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, SESSION_PREVIEW_CHARS)
}
