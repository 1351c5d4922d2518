//! Package and CSV output tests.
//!
//! Written packages are reopened with `zip` and the embedded collection
//! is queried with `rusqlite`.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Cursor, Read};
use std::path::Path;

use flashdeck::export::{ApkgConfig, ApkgExporter, Exporter};
use flashdeck::{Config, TagPolicy, convert, load_deck};
use rusqlite::Connection;
use tempfile::TempDir;
use zip::ZipArchive;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> String {
    format!("{}/{}", FIXTURES_DIR, name)
}

fn read_entry<R: Read + std::io::Seek>(zip: &mut ZipArchive<R>, name: &str) -> Vec<u8> {
    let mut entry = zip.by_name(name).expect("entry should exist");
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    data
}

/// Copy the collection out of the package so SQLite can open it.
fn open_collection(package: &Path, dir: &Path) -> Connection {
    let mut zip = ZipArchive::new(File::open(package).unwrap()).unwrap();
    let db = dir.join("collection.anki2");
    fs::write(&db, read_entry(&mut zip, "collection.anki2")).unwrap();
    Connection::open(db).unwrap()
}

#[test]
fn test_apkg_layout() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("algorithms.apkg");
    let report = convert(&fixture_path("algorithms/Algorithms.html"), &output, &Config::default()).unwrap();

    assert_eq!(report.cards, 5);
    assert_eq!(report.media_bundled, 2);
    assert_eq!(report.media_missing, 1);
    assert_eq!(report.skipped_callouts, 1);

    let mut zip = ZipArchive::new(File::open(&output).unwrap()).unwrap();
    let manifest: BTreeMap<String, String> =
        serde_json::from_slice(&read_entry(&mut zip, "media")).unwrap();
    assert_eq!(manifest.get("0").map(String::as_str), Some("graph sketch.png"));
    assert_eq!(manifest.get("1").map(String::as_str), Some("pronounce.mp3"));

    let png = fs::read(fixture_path("algorithms/Algorithms/graph sketch.png")).unwrap();
    assert_eq!(read_entry(&mut zip, "0"), png);
}

#[test]
fn test_apkg_notes_and_decks() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("algorithms.apkg");
    convert(&fixture_path("algorithms/Algorithms.html"), &output, &Config::default()).unwrap();
    let conn = open_collection(&output, dir.path());

    let notes: i64 = conn.query_row("SELECT count(*) FROM notes", [], |r| r.get(0)).unwrap();
    let cards: i64 = conn.query_row("SELECT count(*) FROM cards", [], |r| r.get(0)).unwrap();
    assert_eq!((notes, cards), (5, 5));

    let (flds, tags): (String, String) = conn
        .query_row("SELECT flds, tags FROM notes ORDER BY id LIMIT 1", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    assert_eq!(flds, "<b>Front1</b>\x1f<p>Back1 #easy</p>");
    assert_eq!(tags, " easy ");

    let decks_json: String = conn.query_row("SELECT decks FROM col", [], |r| r.get(0)).unwrap();
    let decks: serde_json::Value = serde_json::from_str(&decks_json).unwrap();
    let mut names: Vec<String> = decks
        .as_object()
        .unwrap()
        .values()
        .map(|d| d["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "Algorithms",
            "Algorithms::Graphs",
            "Algorithms::Shortest paths",
            "Algorithms::Sorting",
            "Algorithms::Trees",
            "Default",
        ]
    );

    // Default-subdeck cards live in the top-level deck
    let top_level: i64 = conn
        .query_row(
            "SELECT count(*) FROM cards c JOIN notes n ON c.nid = n.id WHERE n.sfld IN ('Q', 'Where is the missing picture?')",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(top_level, 2);
    let dids: Vec<i64> = {
        let mut stmt = conn
            .prepare("SELECT DISTINCT c.did FROM cards c JOIN notes n ON c.nid = n.id WHERE n.sfld IN ('Q', 'Where is the missing picture?')")
            .unwrap();
        stmt.query_map([], |r| r.get(0)).unwrap().map(|r| r.unwrap()).collect()
    };
    assert_eq!(dids.len(), 1);
    assert_eq!(decks[dids[0].to_string()]["name"], "Algorithms");
}

#[test]
fn test_apkg_model() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("algorithms.apkg");
    convert(&fixture_path("algorithms/Algorithms.html"), &output, &Config::default()).unwrap();
    let conn = open_collection(&output, dir.path());

    let models_json: String = conn.query_row("SELECT models FROM col", [], |r| r.get(0)).unwrap();
    let models: serde_json::Value = serde_json::from_str(&models_json).unwrap();
    let model = &models["1607392319"];
    assert_eq!(model["name"], "Notion Basic Model");
    assert_eq!(model["flds"][0]["name"], "Front");
    assert_eq!(model["flds"][1]["name"], "Back");
    assert_eq!(model["tmpls"][0]["qfmt"], r#"<div class="front">{{Front}}</div>"#);

    let css = model["css"].as_str().unwrap();
    // Page styles first, bundled card style after
    assert!(css.contains("figure.callout"));
    assert!(css.ends_with(flashdeck::export::CARD_STYLE_CSS));
}

#[test]
fn test_apkg_is_reproducible_with_fixed_timestamp() {
    let (_, assembly) =
        load_deck(&fixture_path("algorithms/Algorithms.html"), &Config::default()).unwrap();
    let exporter = ApkgExporter::with_config(ApkgConfig::new().with_timestamp_ms(1_700_000_000_000));

    let dir = TempDir::new().unwrap();
    let mut note_ids = Vec::new();
    for run in 0..2 {
        let mut out = Cursor::new(Vec::new());
        exporter.export(&assembly.deck, &mut out).unwrap();
        let path = dir.path().join(format!("run{run}.apkg"));
        fs::write(&path, out.into_inner()).unwrap();

        let run_dir = dir.path().join(format!("run{run}"));
        fs::create_dir_all(&run_dir).unwrap();
        let conn = open_collection(&path, &run_dir);
        let ids: Vec<(i64, String)> = {
            let mut stmt = conn.prepare("SELECT id, guid FROM notes ORDER BY id").unwrap();
            stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
                .unwrap()
                .map(|r| r.unwrap())
                .collect()
        };
        note_ids.push(ids);
    }
    assert_eq!(note_ids[0], note_ids[1]);
    assert_eq!(note_ids[0][0].0, 1_700_000_000_000);
}

#[test]
fn test_csv_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("cards.csv");
    let config = Config::default().with_tag_policy(TagPolicy::Remove);
    convert(&fixture_path("algorithms/Algorithms.html"), &output, &config).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], "#separator:comma");
    assert_eq!(lines[2], "#deck:Algorithms");
    assert_eq!(lines[5], "<b>Front1</b>,<p>Back1</p>,easy,Sorting");
    assert!(lines.iter().any(|l| l.ends_with(",Default") && l.starts_with("Q,")));
}

#[test]
fn test_unknown_extension_fails_before_reading_input() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("deck.txt");
    let err = convert("/no/such/input.html", &output, &Config::default()).unwrap_err();
    assert!(matches!(err, flashdeck::Error::UnsupportedFormat(_)));
    assert!(!output.exists());
}
