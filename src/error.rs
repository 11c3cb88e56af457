//! Error types for the fallible boundaries of the site layer.
//!
//! Everything past these boundaries degrades silently: initialisers no-op
//! on missing markup and preference failures fall back to defaults. Only
//! loading dictionaries, loading page snapshots and talking to a durable
//! preference backend can fail, along with reading settings at startup.
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading translation dictionaries
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON from '{origin}': {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid JSON in '{0}': root must be an object")]
    NotAnObject(String),
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("invalid filename: {0}")]
    InvalidFilename(PathBuf),
}

/// Errors raised by a preference backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend refuses all access, e.g. disabled by user policy
    #[error("preference storage is unavailable")]
    Unavailable,
    #[error("preference storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("preference storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Errors raised while loading a page snapshot
#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to read page '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid page snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while reading site settings from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Result type for dictionary loading
pub type LoadResult<T> = Result<T, LoadError>;
