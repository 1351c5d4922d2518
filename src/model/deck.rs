//! Decks and subdecks.

use std::collections::HashSet;

use super::card::Card;
use super::media::{BundledMedia, MediaStatus};

/// A named group of cards, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subdeck {
    pub name: String,
    pub cards: Vec<Card>,
}

impl Subdeck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cards: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// The top-level deck produced by one conversion.
///
/// Subdecks keep the order in which their names first appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub name: String,
    subdecks: Vec<Subdeck>,
}

impl Deck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subdecks: Vec::new(),
        }
    }

    pub fn subdecks(&self) -> &[Subdeck] {
        &self.subdecks
    }

    /// Look up a subdeck by name.
    pub fn subdeck(&self, name: &str) -> Option<&Subdeck> {
        self.subdecks.iter().find(|s| s.name == name)
    }

    /// Get a subdeck by name, appending an empty one if it does not exist yet.
    pub fn subdeck_mut(&mut self, name: &str) -> &mut Subdeck {
        let index = match self.subdecks.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.subdecks.push(Subdeck::new(name));
                self.subdecks.len() - 1
            }
        };
        &mut self.subdecks[index]
    }

    /// Drop subdecks that hold no cards.
    pub fn remove_empty_subdecks(&mut self) -> usize {
        let before = self.subdecks.len();
        self.subdecks.retain(|s| !s.is_empty());
        before - self.subdecks.len()
    }

    /// All cards with their subdeck name, in output order.
    pub fn cards(&self) -> impl Iterator<Item = (&str, &Card)> {
        self.subdecks
            .iter()
            .flat_map(|s| s.cards.iter().map(move |c| (s.name.as_str(), c)))
    }

    pub fn card_count(&self) -> usize {
        self.subdecks.iter().map(|s| s.cards.len()).sum()
    }

    /// Media files referenced by any card, each physical file once.
    pub fn media_files(&self) -> Vec<BundledMedia> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for (_, card) in self.cards() {
            for media in &card.media {
                if let MediaStatus::Resolved { path, name } = &media.status
                    && seen.insert(path.clone())
                {
                    files.push(BundledMedia {
                        name: name.clone(),
                        path: path.clone(),
                    });
                }
            }
        }
        files
    }

    /// Number of media references whose file was missing.
    pub fn missing_media_count(&self) -> usize {
        self.cards()
            .flat_map(|(_, card)| card.media.iter())
            .filter(|m| m.is_missing())
            .count()
    }
}
