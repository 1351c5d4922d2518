//! Sinks that write a finished [`Deck`].
//!
//! # Architecture
//!
//! The [`Exporter`] trait uses a builder pattern:
//! - `new()` creates an exporter with default configuration
//! - `with_config()` allows customization
//! - `export()` writes to any `Write + Seek` destination
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//!
//! use flashdeck::export::{CsvExporter, Exporter};
//! use flashdeck::model::{Card, Deck};
//!
//! let mut deck = Deck::new("Algorithms");
//! deck.subdeck_mut("Sorting").cards.push(Card::new("Q", "A").with_tag("easy"));
//!
//! let mut out = Cursor::new(Vec::new());
//! CsvExporter::new().export(&deck, &mut out)?;
//! assert!(String::from_utf8(out.into_inner()).unwrap().contains("Q,A,easy,Sorting"));
//! # Ok::<(), flashdeck::Error>(())
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::model::Deck;

mod apkg;
mod csv;

pub use apkg::{ApkgConfig, ApkgExporter, CARD_STYLE_CSS};
pub use self::csv::{CsvConfig, CsvExporter};

/// Trait for writing decks to a specific format.
///
/// The writer can be:
/// - `std::fs::File` for disk output
/// - `std::io::Cursor<Vec<u8>>` for in-memory output
/// - Any other type implementing `Write + Seek`
pub trait Exporter {
    fn export<W: Write + Seek>(&self, deck: &Deck, writer: &mut W) -> Result<()>;
}

/// Write `deck` to `output` in the format its extension names.
///
/// `stylesheets` are the page's own styles; the package sink puts them
/// in front of the bundled card style. A failed write removes the
/// partial file.
pub fn write_deck(deck: &Deck, stylesheets: &[String], output: &Path, config: &Config) -> Result<()> {
    let format = OutputFormat::from_path(output)?;

    let result = write_file(deck, stylesheets, output, format, config);
    if result.is_err() {
        let _ = fs::remove_file(output);
    }
    result
}

fn write_file(
    deck: &Deck,
    stylesheets: &[String],
    output: &Path,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(output)?);
    match format {
        OutputFormat::Csv => CsvExporter::new().export(deck, &mut writer)?,
        OutputFormat::Apkg => {
            let apkg = ApkgConfig::new()
                .with_page_css(stylesheets.join("\n"))
                .with_default_subdeck(&config.default_subdeck);
            ApkgExporter::with_config(apkg).export(deck, &mut writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}
