use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Coarse classification of a [`TypistError`].
///
/// Callers branch on the kind rather than on individual variants, e.g. to
/// decide whether a failure is worth retrying or should be shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    AlreadyExists,
    Unavailable,
    Io,
    Config,
}

#[derive(Debug, Error)]
pub enum TypistError {
    #[error("invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("{what} already exists: {key}")]
    AlreadyExists { what: &'static str, key: String },

    #[error("content unavailable for text {id}")]
    Unavailable { id: String },

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("serialization error at {}: {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] confique::Error),
}

impl TypistError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TypistError::InvalidId(_) | TypistError::Validation(_) => ErrorKind::Validation,
            TypistError::NotFound { .. } => ErrorKind::NotFound,
            TypistError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            TypistError::Unavailable { .. } => ErrorKind::Unavailable,
            TypistError::Io { .. } | TypistError::Serialization { .. } => ErrorKind::Io,
            TypistError::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        TypistError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn serde(path: &Path, source: serde_json::Error) -> Self {
        TypistError::Serialization {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn text_not_found(id: &str) -> Self {
        TypistError::NotFound {
            what: "text",
            id: id.to_string(),
        }
    }

    pub(crate) fn category_not_found(id: &str) -> Self {
        TypistError::NotFound {
            what: "category",
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TypistError>;
