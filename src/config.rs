//! Conversion settings.
//!
//! A [`Config`] is built once (by the CLI or a library caller) and passed
//! by reference to every stage that needs it. Nothing reads flags from
//! anywhere else.

use std::path::Path;

use crate::error::{Error, Result};

/// Name of the subdeck for callouts outside any collapsible section.
pub const DEFAULT_SUBDECK_NAME: &str = "Default";

/// Deck name used when the page has no title.
pub const DEFAULT_DECK_NAME: &str = "Notion Deck";

/// What to do with `#hashtag` tokens in card text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagPolicy {
    /// Leave the token visible in the card.
    #[default]
    Keep,
    /// Cut the token (and one adjacent whitespace character) out of the card.
    Remove,
}

/// Whether sections without any cards survive into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptySubdeckPolicy {
    #[default]
    Keep,
    Drop,
}

/// Output sink, chosen by the output file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tabular export for inspection (`.csv`).
    Csv,
    /// Anki package (`.apkg`).
    Apkg,
}

impl OutputFormat {
    /// Pick the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(OutputFormat::Csv),
            Some("apkg") => Ok(OutputFormat::Apkg),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Settings for a conversion run.
#[derive(Debug, Clone)]
pub struct Config {
    pub tag_policy: TagPolicy,
    pub empty_subdecks: EmptySubdeckPolicy,
    /// Overrides the deck name derived from the page title.
    pub deck_name: Option<String>,
    /// Deck name when neither an override nor a page title exists.
    pub fallback_deck_name: String,
    /// Subdeck for callouts outside any section.
    pub default_subdeck: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tag_policy: TagPolicy::default(),
            empty_subdecks: EmptySubdeckPolicy::default(),
            deck_name: None,
            fallback_deck_name: DEFAULT_DECK_NAME.to_string(),
            default_subdeck: DEFAULT_SUBDECK_NAME.to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag_policy(mut self, policy: TagPolicy) -> Self {
        self.tag_policy = policy;
        self
    }

    pub fn with_empty_subdecks(mut self, policy: EmptySubdeckPolicy) -> Self {
        self.empty_subdecks = policy;
        self
    }

    pub fn with_deck_name(mut self, name: impl Into<String>) -> Self {
        self.deck_name = Some(name.into());
        self
    }
}
