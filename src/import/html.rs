//! Single exported HTML page.

use std::fs;
use std::path::{Path, PathBuf};

use super::{Document, DocumentSource};
use crate::error::{Error, Result};

/// An HTML file on disk. Media resolves against its directory.
#[derive(Debug, Clone)]
pub struct HtmlFile {
    path: PathBuf,
}

impl HtmlFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DocumentSource for HtmlFile {
    fn load(&self) -> Result<Document> {
        if !self.path.is_file() {
            return Err(Error::InputNotFound(self.path.clone()));
        }
        let bytes = fs::read(&self.path)?;
        log::info!("Loaded {} ({} bytes)", self.path.display(), bytes.len());
        Document::from_bytes(&bytes, &self.path)
    }
}
