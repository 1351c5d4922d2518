//! Input loaders that turn an export into a [`Document`].
//!
//! The [`DocumentSource`] trait is the seam every input kind plugs into:
//! - [`HtmlFile`]: a single exported page
//! - [`ZipExport`]: a Notion export archive, possibly nested
//! - [`DirectoryExport`]: an archive someone already unpacked
//!
//! A hosted-page fetcher lives outside this crate; it only has to hand
//! back the same kind of [`Document`] through the same trait.

mod archive;
mod html;

pub use archive::{DirectoryExport, ZipExport, find_markup_files};
pub use html::HtmlFile;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::compiler::compile_html_bytes;
use crate::dom::{decode_reference, is_remote};
use crate::error::{Error, Result};
use crate::ir::IRDocument;

/// Anything that can produce a [`Document`].
pub trait DocumentSource {
    /// Load and compile the markup.
    fn load(&self) -> Result<Document>;
}

/// A compiled export page plus what is needed to resolve its media.
///
/// Immutable once built. When the page came out of an archive, the
/// document owns the extraction directory, which is removed on drop.
#[derive(Debug)]
pub struct Document {
    /// The content tree.
    pub ir: IRDocument,
    /// Markup file the tree was compiled from.
    pub source_path: PathBuf,
    /// Directory relative media references resolve against.
    pub base_dir: PathBuf,
    /// Inline `<style>` bodies plus any sibling stylesheets found on disk.
    pub stylesheets: Vec<String>,
    workspace: Option<TempDir>,
}

impl Document {
    /// Compile markup bytes read from `source_path`.
    ///
    /// Fails only when the bytes cannot be markup at all (empty or
    /// binary); structurally odd pages still compile to some tree.
    pub fn from_bytes(bytes: &[u8], source_path: impl Into<PathBuf>) -> Result<Self> {
        let source_path = source_path.into();

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::UnreadableMarkup {
                path: source_path,
                reason: "file is empty".to_string(),
            });
        }
        if crate::util::looks_binary(bytes) {
            return Err(Error::UnreadableMarkup {
                path: source_path,
                reason: "file contains binary data".to_string(),
            });
        }

        let base_dir = source_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let page = compile_html_bytes(bytes);
        let mut stylesheets = page.inline_css;
        for href in page.linked_css {
            if is_remote(&href) {
                continue;
            }
            let css_path = base_dir.join(decode_reference(&href).as_ref());
            match fs::read(&css_path) {
                Ok(css) => stylesheets.push(String::from_utf8_lossy(&css).into_owned()),
                Err(_) => log::debug!("linked stylesheet not found: {}", css_path.display()),
            }
        }

        Ok(Self {
            ir: page.ir,
            source_path,
            base_dir,
            stylesheets,
            workspace: None,
        })
    }

    /// Compile a markup string, resolving media against `base_dir`.
    pub fn from_html(html: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let mut doc = Self::from_bytes(html.as_bytes(), base_dir.join("index.html"))?;
        doc.base_dir = base_dir;
        Ok(doc)
    }

    /// Hand ownership of an extraction directory to this document.
    pub(crate) fn with_workspace(mut self, workspace: TempDir) -> Self {
        self.workspace = Some(workspace);
        self
    }

    /// Directory holding extracted archive contents, if any.
    pub fn workspace(&self) -> Option<&Path> {
        self.workspace.as_ref().map(TempDir::path)
    }
}

/// Pick a source for an input path and load it.
///
/// `.zip` files are archives, directories are unpacked exports, anything
/// else is read as a single HTML file. URLs are rejected.
pub fn load(input: &str) -> Result<Document> {
    if input.starts_with("http://") || input.starts_with("https://") {
        log::warn!("hosted pages are lossy for nested toggles and callouts; export the page instead");
        return Err(Error::UnsupportedInput(format!(
            "{input}: fetching hosted pages is not built in, export the page as HTML or ZIP"
        )));
    }

    let path = Path::new(input);
    let is_zip = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

    if is_zip {
        ZipExport::new(path).load()
    } else if path.is_dir() {
        DirectoryExport::new(path).load()
    } else {
        HtmlFile::new(path).load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Role;

    #[test]
    fn test_empty_markup_is_unreadable() {
        let err = Document::from_bytes(b"  \n ", "empty.html").unwrap_err();
        assert!(matches!(err, Error::UnreadableMarkup { .. }));
    }

    #[test]
    fn test_binary_markup_is_unreadable() {
        let err = Document::from_bytes(b"PK\x03\x04\0\0\0", "page.html").unwrap_err();
        assert!(matches!(err, Error::UnreadableMarkup { .. }));
    }

    #[test]
    fn test_malformed_markup_still_compiles() {
        let doc = Document::from_bytes(b"<figure class=callout><p>Q<p>A", "page.html").unwrap();
        assert!(doc.ir.iter_dfs().any(|id| doc.ir.role(id) == Role::Callout));
    }

    #[test]
    fn test_base_dir_is_markup_parent() {
        let doc = Document::from_bytes(b"<p>x</p>", "/exports/deck/Page.html").unwrap();
        assert_eq!(doc.base_dir, PathBuf::from("/exports/deck"));
        assert!(doc.workspace().is_none());
    }

    #[test]
    fn test_urls_are_rejected() {
        let err = load("https://example.notion.site/Deck-123").unwrap_err();
        assert!(matches!(err, Error::UnsupportedInput(_)));
    }

    #[test]
    fn test_sibling_stylesheet_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notion.css"), ".callout { border: 1px; }").unwrap();
        let html = r#"<html><head><link rel="stylesheet" href="notion.css"><style>p{}</style></head><body></body></html>"#;
        let doc = Document::from_html(html, dir.path()).unwrap();

        assert_eq!(doc.stylesheets.len(), 2);
        assert!(doc.stylesheets[1].contains("border"));
    }
}
