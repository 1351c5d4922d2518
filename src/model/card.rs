//! Flashcards.

use std::collections::BTreeSet;

use super::media::MediaReference;

/// A two-sided flashcard.
///
/// `front` and `back` are HTML fragments restricted to a small set of
/// block and inline tags; media paths inside them are already rewritten
/// to flat media names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Card {
    pub front: String,
    pub back: String,
    /// Lowercased hashtags found anywhere in the callout.
    pub tags: BTreeSet<String>,
    /// Media embedded in front or back, in document order.
    pub media: Vec<MediaReference>,
}

impl Card {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Tags joined with a separator, in sorted order.
    pub fn tags_joined(&self, separator: &str) -> String {
        self.tags
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(separator)
    }
}
