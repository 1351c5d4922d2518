//! Media resolution.
//!
//! Cards refer to media by a flat file name; the sinks ship each
//! physical file once under that name. The resolver owns the mapping so
//! that every card converted in a run agrees on it.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dom::{decode_reference, is_remote, resolve_path};
use crate::model::{MediaReference, MediaStatus};
use crate::util::MediaKind;

#[derive(Debug, Default)]
pub struct MediaResolver {
    base_dir: PathBuf,
    names: HashMap<PathBuf, String>,
    taken: HashSet<String>,
}

impl MediaResolver {
    /// Resolver for references relative to `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Default::default()
        }
    }

    /// Resolve one reference as it appeared in the markup.
    ///
    /// Remote references pass through untouched. Local ones are looked up
    /// relative to the base directory, then by bare file name inside it.
    pub fn resolve(&mut self, original: &str, kind: MediaKind) -> MediaReference {
        let status = if is_remote(original) {
            MediaStatus::Remote
        } else {
            self.resolve_local(original)
        };
        MediaReference {
            original: original.to_string(),
            kind,
            status,
        }
    }

    fn resolve_local(&mut self, original: &str) -> MediaStatus {
        let decoded = decode_reference(original);
        let relative = resolve_path("", &decoded);
        let direct = self.base_dir.join(&relative);

        let found = if direct.is_file() {
            Some(direct.clone())
        } else {
            Path::new(&relative)
                .file_name()
                .map(|name| self.base_dir.join(name))
                .filter(|p| p.is_file())
        };

        match found {
            Some(path) => {
                let path = fs::canonicalize(&path).unwrap_or(path);
                let name = self.name_for(&path);
                MediaStatus::Resolved { path, name }
            }
            None => {
                log::warn!("Missing media: {} (looked for {})", original, direct.display());
                MediaStatus::Missing { attempted: direct }
            }
        }
    }

    /// Flat name for a file, stable for the whole run.
    fn name_for(&mut self, path: &Path) -> String {
        if let Some(name) = self.names.get(path) {
            return name.clone();
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media".to_string());
        let (stem, ext) = match file_name.rfind('.') {
            Some(dot) if dot > 0 => (&file_name[..dot], &file_name[dot..]),
            _ => (file_name.as_str(), ""),
        };

        let mut name = file_name.clone();
        let mut n = 1;
        while self.taken.contains(&name) {
            name = format!("{stem}-{n}{ext}");
            n += 1;
        }

        self.taken.insert(name.clone());
        self.names.insert(path.to_path_buf(), name.clone());
        name
    }
}
