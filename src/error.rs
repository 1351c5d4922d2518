//! Error types for flashdeck operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a conversion.
///
/// Problems confined to a single callout or media file are not errors at
/// this level: the callout is skipped or the media marked missing, and the
/// run carries on.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No HTML export found at {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Unreadable markup in {}: {reason}", path.display())]
    UnreadableMarkup { path: PathBuf, reason: String },

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Unsupported output format: {0} (expected .apkg or .csv)")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;
