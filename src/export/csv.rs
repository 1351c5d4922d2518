//! Tabular sink.
//!
//! Writes a CSV file Anki can import directly: file-level `#` headers
//! carry the separator, deck name and column layout, then one row per
//! card with columns Front, Back, Tags, Subdeck.

use std::io::{Seek, Write};

use super::Exporter;
use crate::error::Result;
use crate::model::Deck;

/// Configuration for CSV export.
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Emit the `#`-prefixed file headers.
    pub file_headers: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self { file_headers: true }
    }
}

/// CSV format exporter.
#[derive(Debug, Clone, Default)]
pub struct CsvExporter {
    config: CsvConfig,
}

impl CsvExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CsvConfig) -> Self {
        Self { config }
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write + Seek>(&self, deck: &Deck, writer: &mut W) -> Result<()> {
        if self.config.file_headers {
            let deck_name = deck.name.replace(['\r', '\n'], " ");
            writeln!(writer, "#separator:comma")?;
            writeln!(writer, "#html:true")?;
            writeln!(writer, "#deck:{deck_name}")?;
            writeln!(writer, "#columns:Front,Back,Tags,Subdeck")?;
            writeln!(writer, "#tags column:3")?;
        }

        let mut csv = ::csv::Writer::from_writer(writer);
        for (subdeck, card) in deck.cards() {
            csv.write_record([
                card.front.as_str(),
                card.back.as_str(),
                card.tags_joined(" ").as_str(),
                subdeck,
            ])?;
        }
        csv.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::model::Card;

    fn export(deck: &Deck, exporter: &CsvExporter) -> String {
        let mut out = Cursor::new(Vec::new());
        exporter.export(deck, &mut out).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_rows_and_headers() {
        let mut deck = Deck::new("Algorithms");
        deck.subdeck_mut("Sorting").cards.push(
            Card::new("<b>Front1</b>", "<p>Back, with comma</p>")
                .with_tag("sorting")
                .with_tag("hard"),
        );
        deck.subdeck_mut("Default").cards.push(Card::new("Q", ""));

        let text = export(&deck, &CsvExporter::new());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[2], "#deck:Algorithms");
        assert_eq!(lines[5], r#"<b>Front1</b>,"<p>Back, with comma</p>",hard sorting,Sorting"#);
        assert_eq!(lines[6], "Q,,,Default");
    }

    #[test]
    fn test_headers_can_be_disabled() {
        let mut deck = Deck::new("D");
        deck.subdeck_mut("Default").cards.push(Card::new("Q", "A"));
        let text = export(&deck, &CsvExporter::with_config(CsvConfig { file_headers: false }));
        assert_eq!(text, "Q,A,,Default\n");
    }

    #[test]
    fn test_empty_deck_still_has_headers() {
        let text = export(&Deck::new("Empty"), &CsvExporter::new());
        assert_eq!(text.lines().count(), 5);
    }
}
