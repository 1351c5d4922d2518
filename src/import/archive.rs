//! Notion export archives.
//!
//! Notion wraps large exports in a ZIP of ZIPs, so an archive is unpacked
//! into a temporary directory, any top-level inner archives are unpacked
//! into `extracted/`, and the markup file is picked from what remains.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;
use zip::ZipArchive;

use super::{Document, DocumentSource};
use crate::error::{Error, Result};

/// Directory inner archives are unpacked into.
const NESTED_DIR: &str = "extracted";

/// A ZIP export on disk.
#[derive(Debug, Clone)]
pub struct ZipExport {
    path: PathBuf,
}

impl ZipExport {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DocumentSource for ZipExport {
    fn load(&self) -> Result<Document> {
        if !self.path.is_file() {
            return Err(Error::InputNotFound(self.path.clone()));
        }

        let workspace = TempDir::new()?;
        extract_zip(&self.path, workspace.path())?;
        log::info!(
            "Extracted {} to {}",
            self.path.display(),
            workspace.path().display()
        );

        let inner: Vec<PathBuf> = fs::read_dir(workspace.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_extension(p, &["zip"]))
            .collect();

        let search_root = if inner.is_empty() {
            workspace.path().to_path_buf()
        } else {
            let nested = workspace.path().join(NESTED_DIR);
            fs::create_dir_all(&nested)?;
            for archive in &inner {
                log::info!("Extracting nested archive {}", archive.display());
                extract_zip(archive, &nested)?;
            }
            nested
        };

        let markup = select_markup(&search_root).ok_or_else(|| Error::InputNotFound(self.path.clone()))?;
        let bytes = fs::read(&markup)?;
        Ok(Document::from_bytes(&bytes, markup)?.with_workspace(workspace))
    }
}

/// An export that has already been unpacked.
#[derive(Debug, Clone)]
pub struct DirectoryExport {
    root: PathBuf,
}

impl DirectoryExport {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl DocumentSource for DirectoryExport {
    fn load(&self) -> Result<Document> {
        let markup = select_markup(&self.root).ok_or_else(|| Error::InputNotFound(self.root.clone()))?;
        let bytes = fs::read(&markup)?;
        Document::from_bytes(&bytes, markup)
    }
}

fn extract_zip(path: &Path, dest: &Path) -> Result<()> {
    let file = BufReader::new(File::open(path)?);
    let mut archive = ZipArchive::new(file)?;
    archive.extract(dest)?;
    Ok(())
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// All `.html`/`.htm` files under `root`, sorted by their path relative to
/// `root`.
pub fn find_markup_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<(String, PathBuf)> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, &["html", "htm"]))
        .map(|path| {
            let key = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            (key, path)
        })
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));
    files.into_iter().map(|(_, path)| path).collect()
}

fn select_markup(root: &Path) -> Option<PathBuf> {
    let files = find_markup_files(root);
    let first = files.first()?.clone();
    if files.len() > 1 {
        log::warn!(
            "Found {} HTML files, using {}",
            files.len(),
            first.strip_prefix(root).unwrap_or(&first).display()
        );
    }
    Some(first)
}
