//! Media references embedded in cards.

use std::path::PathBuf;

use crate::util::MediaKind;

/// How a media reference was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaStatus {
    /// Found on disk. `name` is the flat file name cards refer to.
    Resolved { path: PathBuf, name: String },
    /// Local reference whose file does not exist. The card keeps the
    /// original reference.
    Missing { attempted: PathBuf },
    /// Remote URL or data URI. Left as-is, never bundled.
    Remote,
}

/// An image or audio clip a card embeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    /// Reference exactly as it appeared in the markup.
    pub original: String,
    pub kind: MediaKind,
    pub status: MediaStatus,
}

impl MediaReference {
    /// Flat media name, if the file was found.
    pub fn media_name(&self) -> Option<&str> {
        match &self.status {
            MediaStatus::Resolved { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.status, MediaStatus::Missing { .. })
    }
}

/// One physical file a sink has to ship alongside the cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledMedia {
    /// Name the cards use (`<img src="NAME">`, `[sound:NAME]`).
    pub name: String,
    /// Where the file lives now.
    pub path: PathBuf,
}
