//! Anki package sink.
//!
//! An `.apkg` file is a ZIP archive holding:
//! - `collection.anki2`: an SQLite database in the legacy schema (v11)
//! - `media`: a JSON object mapping `"0"`, `"1"`, ... to media file names
//! - the media files themselves, stored under those numeric names
//!
//! The deck maps to one top-level Anki deck; each subdeck becomes a child
//! deck named `Deck::Subdeck`, except the default subdeck, whose cards go
//! straight into the top-level deck. Every card is one note of a two-field
//! (Front/Back) model.

use std::collections::BTreeMap;
use std::fs;
use std::io::{Seek, Write};
use std::path::Path;

use rusqlite::{Connection, params};
use serde::Serialize;
use serde_json::json;
use sha1_smol::Sha1;
use tempfile::TempDir;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::Exporter;
use crate::config::DEFAULT_SUBDECK_NAME;
use crate::error::Result;
use crate::model::{Card, Deck};
use crate::util::{strip_html, time_now_millis};

/// Stylesheet applied to every card, after the page's own styles.
pub const CARD_STYLE_CSS: &str = include_str!("../../assets/card_style.css");

/// Note model id. Kept fixed so re-imports update the same note type.
pub const MODEL_ID: i64 = 1607392319;
pub const MODEL_NAME: &str = "Notion Basic Model";

const FRONT_TEMPLATE: &str = r#"<div class="front">{{Front}}</div>"#;
const BACK_TEMPLATE: &str = r#"{{FrontSide}}<hr id=answer><div class="back">{{Back}}</div>"#;

const SCHEMA: &str = r#"
CREATE TABLE col (
    id integer primary key,
    crt integer not null,
    mod integer not null,
    scm integer not null,
    ver integer not null,
    dty integer not null,
    usn integer not null,
    ls integer not null,
    conf text not null,
    models text not null,
    decks text not null,
    dconf text not null,
    tags text not null
);
CREATE TABLE notes (
    id integer primary key,
    guid text not null,
    mid integer not null,
    mod integer not null,
    usn integer not null,
    tags text not null,
    flds text not null,
    sfld integer not null,
    csum integer not null,
    flags integer not null,
    data text not null
);
CREATE TABLE cards (
    id integer primary key,
    nid integer not null,
    did integer not null,
    ord integer not null,
    mod integer not null,
    usn integer not null,
    type integer not null,
    queue integer not null,
    due integer not null,
    ivl integer not null,
    factor integer not null,
    reps integer not null,
    lapses integer not null,
    left integer not null,
    odue integer not null,
    odid integer not null,
    flags integer not null,
    data text not null
);
CREATE TABLE revlog (
    id integer primary key,
    cid integer not null,
    usn integer not null,
    ease integer not null,
    ivl integer not null,
    lastIvl integer not null,
    factor integer not null,
    time integer not null,
    type integer not null
);
CREATE TABLE graves (
    usn integer not null,
    oid integer not null,
    type integer not null
);
CREATE INDEX ix_notes_usn on notes (usn);
CREATE INDEX ix_cards_usn on cards (usn);
CREATE INDEX ix_revlog_usn on revlog (usn);
CREATE INDEX ix_cards_nid on cards (nid);
CREATE INDEX ix_cards_sched on cards (did, queue, due);
CREATE INDEX ix_revlog_cid on revlog (cid);
CREATE INDEX ix_notes_csum on notes (csum);
"#;

/// Configuration for package export.
#[derive(Debug, Clone)]
pub struct ApkgConfig {
    /// Styles taken from the exported page, placed before [`CARD_STYLE_CSS`].
    pub page_css: String,
    /// Subdeck whose cards are filed directly in the top-level deck.
    pub default_subdeck: String,
    /// Creation time in milliseconds. Defaults to now; fixing it makes
    /// output reproducible.
    pub timestamp_ms: Option<i64>,
}

impl Default for ApkgConfig {
    fn default() -> Self {
        Self {
            page_css: String::new(),
            default_subdeck: DEFAULT_SUBDECK_NAME.to_string(),
            timestamp_ms: None,
        }
    }
}

impl ApkgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_css(mut self, css: impl Into<String>) -> Self {
        self.page_css = css.into();
        self
    }

    pub fn with_default_subdeck(mut self, name: impl Into<String>) -> Self {
        self.default_subdeck = name.into();
        self
    }

    pub fn with_timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    fn css(&self) -> String {
        if self.page_css.trim().is_empty() {
            CARD_STYLE_CSS.to_string()
        } else {
            format!("{}\n{}", self.page_css, CARD_STYLE_CSS)
        }
    }
}

/// Anki package exporter.
#[derive(Debug, Clone, Default)]
pub struct ApkgExporter {
    config: ApkgConfig,
}

impl ApkgExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ApkgConfig) -> Self {
        Self { config }
    }

    /// Full Anki deck name for a subdeck.
    fn anki_deck_name(&self, deck: &Deck, subdeck: &str) -> String {
        if subdeck == self.config.default_subdeck {
            deck.name.clone()
        } else {
            format!("{}::{}", deck.name, subdeck)
        }
    }

    fn write_collection(&self, deck: &Deck, path: &Path, now_ms: i64) -> Result<()> {
        let now = now_ms / 1000;
        let mut conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;

        // Top-level deck first, then one per subdeck in order
        let mut deck_ids: BTreeMap<String, i64> = BTreeMap::new();
        let mut deck_names = vec![deck.name.clone()];
        deck_names.extend(
            deck.subdecks()
                .iter()
                .map(|s| self.anki_deck_name(deck, &s.name)),
        );
        let mut decks_json = serde_json::Map::new();
        decks_json.insert("1".to_string(), serde_json::to_value(AnkiDeck::new(1, "Default", now))?);
        for name in deck_names {
            let id = stable_id(&name);
            if deck_ids.insert(name.clone(), id).is_none() {
                decks_json.insert(id.to_string(), serde_json::to_value(AnkiDeck::new(id, &name, now))?);
            }
        }

        let top_id = stable_id(&deck.name);
        let mut models_json = serde_json::Map::new();
        models_json.insert(
            MODEL_ID.to_string(),
            serde_json::to_value(AnkiModel::new(top_id, self.config.css(), now))?,
        );

        let conf = json!({
            "activeDecks": [1],
            "curDeck": 1,
            "newSpread": 0,
            "collapseTime": 1200,
            "timeLim": 0,
            "estTimes": true,
            "dueCounts": true,
            "curModel": MODEL_ID.to_string(),
            "nextPos": deck.card_count() + 1,
            "sortType": "noteFld",
            "sortBackwards": false,
            "addToCur": true,
        });

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO col VALUES (1, ?1, ?2, ?3, 11, 0, 0, 0, ?4, ?5, ?6, ?7, '{}')",
            params![
                now,
                now_ms,
                now_ms,
                conf.to_string(),
                serde_json::Value::Object(models_json).to_string(),
                serde_json::Value::Object(decks_json).to_string(),
                default_deck_config().to_string(),
            ],
        )?;

        {
            let mut insert_note = tx.prepare(
                "INSERT INTO notes VALUES (?1, ?2, ?3, ?4, -1, ?5, ?6, ?7, ?8, 0, '')",
            )?;
            let mut insert_card = tx.prepare(
                "INSERT INTO cards VALUES (?1, ?2, ?3, 0, ?4, -1, 0, 0, ?5, 0, 0, 0, 0, 0, 0, 0, 0, '')",
            )?;

            for (index, (subdeck, card)) in deck.cards().enumerate() {
                let position = index as i64;
                let note_id = now_ms + position;
                let deck_name = self.anki_deck_name(deck, subdeck);
                let deck_id = deck_ids
                    .get(&deck_name)
                    .copied()
                    .unwrap_or(top_id);
                let sort_field = strip_html(&card.front);

                insert_note.execute(params![
                    note_id,
                    note_guid(&deck.name, card),
                    MODEL_ID,
                    now,
                    anki_tags(card),
                    format!("{}\x1f{}", card.front, card.back),
                    sort_field,
                    field_checksum(&sort_field),
                ])?;
                insert_card.execute(params![note_id, note_id, deck_id, now, position + 1])?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

impl Exporter for ApkgExporter {
    fn export<W: Write + Seek>(&self, deck: &Deck, writer: &mut W) -> Result<()> {
        let now_ms = self.config.timestamp_ms.unwrap_or_else(time_now_millis);

        let workspace = TempDir::new()?;
        let db_path = workspace.path().join("collection.anki2");
        self.write_collection(deck, &db_path, now_ms)?;

        let media = deck.media_files();
        let manifest: BTreeMap<String, &str> = media
            .iter()
            .enumerate()
            .map(|(i, m)| (i.to_string(), m.name.as_str()))
            .collect();

        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(writer);

        zip.start_file("collection.anki2", deflated)?;
        zip.write_all(&fs::read(&db_path)?)?;

        zip.start_file("media", deflated)?;
        zip.write_all(serde_json::to_string(&manifest)?.as_bytes())?;

        for (i, file) in media.iter().enumerate() {
            zip.start_file(i.to_string(), deflated)?;
            zip.write_all(&fs::read(&file.path)?)?;
        }

        zip.finish()?;
        log::info!(
            "Packaged {} note(s) and {} media file(s)",
            deck.card_count(),
            media.len()
        );
        Ok(())
    }
}

/// Deck id derived from the full deck name, so re-imports land in the
/// same deck.
fn stable_id(name: &str) -> i64 {
    let digest = Sha1::from(name).digest().bytes();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % 9_000_000_000 + 1_000_000_000) as i64
}

fn note_guid(deck_name: &str, card: &Card) -> String {
    let mut hasher = Sha1::new();
    hasher.update(deck_name.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(card.front.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(card.back.as_bytes());
    hasher.digest().to_string()[..16].to_string()
}

/// First 8 hex digits of the SHA-1 of the sort field, as Anki computes it.
fn field_checksum(sort_field: &str) -> i64 {
    let hex = Sha1::from(sort_field).digest().to_string();
    i64::from_str_radix(&hex[..8], 16).unwrap_or(0)
}

fn anki_tags(card: &Card) -> String {
    if card.tags.is_empty() {
        String::new()
    } else {
        format!(" {} ", card.tags_joined(" "))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnkiDeck {
    id: i64,
    name: String,
    #[serde(rename = "mod")]
    modified: i64,
    usn: i64,
    desc: String,
    #[serde(rename = "dyn")]
    dynamic: i64,
    conf: i64,
    collapsed: bool,
    extend_new: i64,
    extend_rev: i64,
    new_today: [i64; 2],
    rev_today: [i64; 2],
    lrn_today: [i64; 2],
    time_today: [i64; 2],
}

impl AnkiDeck {
    fn new(id: i64, name: &str, now: i64) -> Self {
        Self {
            id,
            name: name.to_string(),
            modified: now,
            usn: -1,
            desc: String::new(),
            dynamic: 0,
            conf: 1,
            collapsed: false,
            extend_new: 10,
            extend_rev: 50,
            new_today: [0, 0],
            rev_today: [0, 0],
            lrn_today: [0, 0],
            time_today: [0, 0],
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnkiModel {
    id: String,
    name: &'static str,
    #[serde(rename = "type")]
    kind: i64,
    #[serde(rename = "mod")]
    modified: i64,
    usn: i64,
    sortf: i64,
    did: i64,
    tmpls: Vec<AnkiTemplate>,
    flds: Vec<AnkiField>,
    css: String,
    latex_pre: &'static str,
    latex_post: &'static str,
    tags: Vec<String>,
    vers: Vec<i64>,
    req: serde_json::Value,
}

impl AnkiModel {
    fn new(deck_id: i64, css: String, now: i64) -> Self {
        Self {
            id: MODEL_ID.to_string(),
            name: MODEL_NAME,
            kind: 0,
            modified: now,
            usn: -1,
            sortf: 0,
            did: deck_id,
            tmpls: vec![AnkiTemplate {
                name: "Card 1",
                ord: 0,
                qfmt: FRONT_TEMPLATE,
                afmt: BACK_TEMPLATE,
                bqfmt: "",
                bafmt: "",
                did: None,
            }],
            flds: vec![AnkiField::new("Front", 0), AnkiField::new("Back", 1)],
            css,
            latex_pre: "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage[utf8]{inputenc}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n",
            latex_post: "\\end{document}",
            tags: Vec::new(),
            vers: Vec::new(),
            req: json!([[0, "any", [0]]]),
        }
    }
}

#[derive(Serialize)]
struct AnkiTemplate {
    name: &'static str,
    ord: i64,
    qfmt: &'static str,
    afmt: &'static str,
    bqfmt: &'static str,
    bafmt: &'static str,
    did: Option<i64>,
}

#[derive(Serialize)]
struct AnkiField {
    name: &'static str,
    ord: i64,
    sticky: bool,
    rtl: bool,
    font: &'static str,
    size: i64,
    media: Vec<String>,
}

impl AnkiField {
    fn new(name: &'static str, ord: i64) -> Self {
        Self {
            name,
            ord,
            sticky: false,
            rtl: false,
            font: "Arial",
            size: 20,
            media: Vec::new(),
        }
    }
}

fn default_deck_config() -> serde_json::Value {
    json!({
        "1": {
            "id": 1,
            "name": "Default",
            "mod": 0,
            "usn": 0,
            "maxTaken": 60,
            "autoplay": true,
            "timer": 0,
            "replayq": true,
            "dyn": false,
            "new": {
                "bury": true,
                "delays": [1, 10],
                "initialFactor": 2500,
                "ints": [1, 4, 7],
                "order": 1,
                "perDay": 20,
                "separate": true
            },
            "lapse": {
                "delays": [10],
                "leechAction": 0,
                "leechFails": 8,
                "minInt": 1,
                "mult": 0
            },
            "rev": {
                "bury": true,
                "ease4": 1.3,
                "fuzz": 0.05,
                "ivlFct": 1,
                "maxIvl": 36500,
                "minSpace": 1,
                "perDay": 100
            }
        }
    })
}
