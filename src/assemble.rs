//! Deck assembly.
//!
//! Drives the walker and the card extractor in one pass and files every
//! card under the innermost open section, or the default subdeck when no
//! section is open.

use crate::config::{Config, EmptySubdeckPolicy};
use crate::extract::CardExtractor;
use crate::import::Document;
use crate::model::Deck;
use crate::walker::{StructuralEvent, Walker};

/// Outcome of assembling one document.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub deck: Deck,
    /// Callouts that produced no card.
    pub skipped_callouts: usize,
}

/// Accumulates structural events into a [`Deck`].
pub struct DeckAssembler<'a> {
    config: &'a Config,
    deck: Deck,
    title: Option<String>,
    sections: Vec<String>,
    callouts_seen: usize,
    skipped: usize,
}

impl<'a> DeckAssembler<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            deck: Deck::new(config.fallback_deck_name.clone()),
            title: None,
            sections: Vec::new(),
            callouts_seen: 0,
            skipped: 0,
        }
    }

    /// Name of the subdeck new cards go into.
    pub fn active_subdeck(&self) -> &str {
        self.sections
            .last()
            .map(String::as_str)
            .unwrap_or(&self.config.default_subdeck)
    }

    /// Depth of currently open sections.
    pub fn depth(&self) -> usize {
        self.sections.len()
    }

    pub fn handle(&mut self, event: StructuralEvent, extractor: &mut CardExtractor<'_>) {
        match event {
            StructuralEvent::Title(title) => {
                if self.callouts_seen == 0 && self.title.is_none() && !title.is_empty() {
                    self.title = Some(title);
                }
            }
            StructuralEvent::SectionStart(label) => {
                let name = if label.is_empty() {
                    self.active_subdeck().to_string()
                } else {
                    label
                };
                self.deck.subdeck_mut(&name);
                self.sections.push(name);
            }
            StructuralEvent::SectionEnd => {
                self.sections.pop();
            }
            StructuralEvent::Callout(id) => {
                self.callouts_seen += 1;
                let subdeck = self.active_subdeck().to_string();
                self.deck.subdeck_mut(&subdeck);
                match extractor.extract(id) {
                    Ok(card) => self.deck.subdeck_mut(&subdeck).cards.push(card),
                    Err(err) => {
                        log::warn!("Skipping callout {} in {subdeck:?}: {err}", self.callouts_seen);
                        self.skipped += 1;
                    }
                }
            }
            StructuralEvent::Plain(_) => {}
        }
    }

    pub fn finish(mut self) -> Assembly {
        self.deck.name = self
            .config
            .deck_name
            .clone()
            .or(self.title)
            .unwrap_or_else(|| self.config.fallback_deck_name.clone());

        if self.config.empty_subdecks == EmptySubdeckPolicy::Drop {
            let dropped = self.deck.remove_empty_subdecks();
            if dropped > 0 {
                log::debug!("Dropped {dropped} empty subdeck(s)");
            }
        }

        for subdeck in self.deck.subdecks() {
            log::debug!("Subdeck {:?}: {} card(s)", subdeck.name, subdeck.cards.len());
        }

        Assembly {
            deck: self.deck,
            skipped_callouts: self.skipped,
        }
    }
}

/// Build the deck for a document.
pub fn assemble(doc: &Document, config: &Config) -> Assembly {
    let mut extractor = CardExtractor::new(doc, config);
    let mut assembler = DeckAssembler::new(config);
    for event in Walker::new(&doc.ir) {
        assembler.handle(event, &mut extractor);
    }
    assembler.finish()
}
