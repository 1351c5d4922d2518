//! # flashdeck
//!
//! Turn Notion page exports into Anki flashcard decks.
//!
//! ## How a page maps to a deck
//!
//! - the page title names the deck
//! - each toggle (`<details>`) is a subdeck named after its summary;
//!   nested toggles file cards under the innermost one
//! - each callout is a card: its first block is the front, the rest is
//!   the back
//! - `#hashtags` anywhere in a callout become the card's tags
//! - callouts outside any toggle go to the `Default` subdeck
//!
//! ## Pipeline
//!
//! ```text
//! HTML / ZIP ──▶ import ──▶ compiler (IR) ──▶ walker ──▶ extract + assemble ──▶ export
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use flashdeck::{Config, TagPolicy, convert};
//!
//! let config = Config::new().with_tag_policy(TagPolicy::Remove);
//! let report = convert("Export.zip", Path::new("deck.apkg"), &config)?;
//! println!("{report}");
//! # Ok::<(), flashdeck::Error>(())
//! ```
//!
//! ## Working in memory
//!
//! ```
//! use flashdeck::{Config, Document, build_deck};
//!
//! let html = r#"<html><head><title>Algorithms</title></head><body>
//!   <details><summary>Sorting</summary><div class="indented">
//!     <figure class="callout"><div><p>Quicksort worst case?</p><p>O(n²) #hard</p></div></figure>
//!   </div></details>
//! </body></html>"#;
//!
//! let doc = Document::from_html(html, ".")?;
//! let deck = build_deck(&doc, &Config::default()).deck;
//!
//! assert_eq!(deck.name, "Algorithms");
//! let card = &deck.subdeck("Sorting").unwrap().cards[0];
//! assert_eq!(card.front, "Quicksort worst case?");
//! assert!(card.tags.contains("hard"));
//! # Ok::<(), flashdeck::Error>(())
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

pub mod assemble;
pub mod compiler;
pub mod config;
pub mod dom;
pub mod error;
pub mod export;
pub mod extract;
pub mod import;
pub mod ir;
pub mod model;
pub(crate) mod util;
pub mod walker;

pub use assemble::{Assembly, DeckAssembler, assemble};
pub use config::{Config, EmptySubdeckPolicy, OutputFormat, TagPolicy};
pub use error::{Error, Result};
pub use extract::{CardExtractor, ExtractError};
pub use import::{Document, DocumentSource};
pub use model::{Card, Deck, MediaReference, MediaStatus, Subdeck};
pub use util::MediaKind;
pub use walker::{StructuralEvent, Walker};

/// Summary of one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub deck_name: String,
    pub subdecks: usize,
    pub cards: usize,
    /// Callouts that produced no card.
    pub skipped_callouts: usize,
    /// Distinct media files shipped with the deck.
    pub media_bundled: usize,
    /// Media references whose file could not be found.
    pub media_missing: usize,
    pub output: PathBuf,
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} ({} cards, {} subdeck(s), {} media files)",
            self.output.display(),
            self.cards,
            self.subdecks,
            self.media_bundled
        )?;
        if self.skipped_callouts > 0 {
            write!(f, ", skipped {} empty callout(s)", self.skipped_callouts)?;
        }
        if self.media_missing > 0 {
            write!(f, ", {} missing media", self.media_missing)?;
        }
        Ok(())
    }
}

/// Build the deck for an already loaded document.
pub fn build_deck(doc: &Document, config: &Config) -> Assembly {
    assemble(doc, config)
}

/// Load an input (HTML file, export directory or ZIP) and build its deck.
pub fn load_deck(input: &str, config: &Config) -> Result<(Document, Assembly)> {
    let doc = import::load(input)?;
    let assembly = build_deck(&doc, config);
    Ok((doc, assembly))
}

/// Convert `input` into a deck file at `output`.
///
/// The output format follows the extension of `output` (`.apkg` or
/// `.csv`) and is checked before any input is read.
pub fn convert(input: &str, output: &Path, config: &Config) -> Result<ConversionReport> {
    OutputFormat::from_path(output)?;

    let (doc, assembly) = load_deck(input, config)?;
    let deck = &assembly.deck;

    if deck.card_count() == 0 {
        log::warn!("No cards found in {}", doc.source_path.display());
    }

    export::write_deck(deck, &doc.stylesheets, output, config)?;

    let report = ConversionReport {
        deck_name: deck.name.clone(),
        subdecks: deck.subdecks().len(),
        cards: deck.card_count(),
        skipped_callouts: assembly.skipped_callouts,
        media_bundled: deck.media_files().len(),
        media_missing: deck.missing_media_count(),
        output: output.to_path_buf(),
    };
    log::info!("{report}");
    Ok(report)
}
