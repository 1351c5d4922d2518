//! End-to-end conversion tests.
//!
//! Exercise the full pipeline (load, walk, extract, assemble) through the
//! public API, on the Notion-shaped fixture and on small inline pages.

use std::collections::BTreeSet;
use std::fs;

use flashdeck::{Config, Document, EmptySubdeckPolicy, MediaStatus, TagPolicy, build_deck, load_deck};
use tempfile::TempDir;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> String {
    format!("{}/{}", FIXTURES_DIR, name)
}

fn tags(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn deck_from(html: &str, config: &Config) -> flashdeck::Assembly {
    let doc = Document::from_html(html, "/nonexistent").expect("markup should compile");
    build_deck(&doc, config)
}

fn callout(front: &str, back: &str) -> String {
    format!(
        r#"<figure class="block-color-gray_background callout"><div style="font-size:1.5em"><span class="icon">💡</span></div><div style="width:100%"><p>{front}</p><p>{back}</p></div></figure>"#
    )
}

// ============================================================================
// Fixture export
// ============================================================================

#[test]
fn test_fixture_structure() {
    let (_, assembly) =
        load_deck(&fixture_path("algorithms/Algorithms.html"), &Config::default()).unwrap();
    let deck = &assembly.deck;

    assert_eq!(deck.name, "Algorithms");
    let names: Vec<_> = deck.subdecks().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Sorting", "Graphs", "Shortest paths", "Trees", "Default"]);

    assert_eq!(deck.subdeck("Sorting").unwrap().cards.len(), 2);
    assert!(deck.subdeck("Graphs").unwrap().is_empty());
    assert_eq!(deck.subdeck("Shortest paths").unwrap().cards.len(), 1);
    assert!(deck.subdeck("Trees").unwrap().is_empty());
    assert_eq!(deck.subdeck("Default").unwrap().cards.len(), 2);
    assert_eq!(assembly.skipped_callouts, 1);
}

#[test]
fn test_fixture_cards() {
    let (_, assembly) =
        load_deck(&fixture_path("algorithms/Algorithms.html"), &Config::default()).unwrap();
    let sorting = &assembly.deck.subdeck("Sorting").unwrap().cards;

    assert_eq!(sorting[0].front, "<b>Front1</b>");
    assert_eq!(sorting[0].back, "<p>Back1 #easy</p>");
    assert_eq!(sorting[0].tags, tags(&["easy"]));

    assert_eq!(sorting[1].front, "Front2");
    assert_eq!(sorting[1].tags, tags(&["hard", "sorting"]));
    assert!(sorting[1].back.contains(r#"<img src="graph sketch.png">"#));

    let dijkstra = &assembly.deck.subdeck("Shortest paths").unwrap().cards[0];
    assert_eq!(dijkstra.front, "Dijkstra needs <i>non-negative</i> weights?");
    assert!(dijkstra.back.contains("<code>relax(u, v)</code>"));
    assert!(dijkstra.back.contains("[sound:pronounce.mp3]"));
    assert_eq!(dijkstra.tags, tags(&["graphs"]));
}

#[test]
fn test_fixture_media() {
    let (_, assembly) =
        load_deck(&fixture_path("algorithms/Algorithms.html"), &Config::default()).unwrap();
    let deck = &assembly.deck;

    let bundled: Vec<_> = deck.media_files().into_iter().map(|m| m.name).collect();
    assert_eq!(bundled, vec!["graph sketch.png", "pronounce.mp3"]);
    assert_eq!(deck.missing_media_count(), 1);

    let missing = &deck.subdeck("Default").unwrap().cards[1];
    assert!(missing.back.contains(r#"<img src="Algorithms/not-exported.png">"#));
    assert!(matches!(missing.media[0].status, MediaStatus::Missing { .. }));
}

#[test]
fn test_fixture_drop_empty_subdecks() {
    let config = Config::default().with_empty_subdecks(EmptySubdeckPolicy::Drop);
    let (_, assembly) = load_deck(&fixture_path("algorithms/Algorithms.html"), &config).unwrap();
    let names: Vec<_> = assembly.deck.subdecks().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Sorting", "Shortest paths", "Default"]);
}

#[test]
fn test_fixture_directory_input() {
    let (doc, assembly) = load_deck(&fixture_path("algorithms"), &Config::default()).unwrap();
    assert!(doc.source_path.ends_with("Algorithms.html"));
    assert_eq!(assembly.deck.card_count(), 5);
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_algorithms_scenario() {
    let html = format!(
        r#"<html><head><title>Algorithms</title></head><body><div class="page-body">
        <details open=""><summary>Sorting</summary><div class="indented">{}{}</div></details>
        {}</div></body></html>"#,
        callout("<b>Front1</b>", "Back1 #easy"),
        callout("Front2", "Back2 #hard #sorting"),
        callout("Q", "A"),
    );
    let deck = deck_from(&html, &Config::default()).deck;

    assert_eq!(deck.name, "Algorithms");
    let sorting = deck.subdeck("Sorting").unwrap();
    assert_eq!(sorting.cards.len(), 2);
    assert_eq!(sorting.cards[0].tags, tags(&["easy"]));
    assert_eq!(sorting.cards[1].tags, tags(&["hard", "sorting"]));

    let default = deck.subdeck("Default").unwrap();
    assert_eq!(default.cards.len(), 1);
    assert!(default.cards[0].tags.is_empty());
    assert_eq!(default.cards[0].front, "Q");
    assert_eq!(default.cards[0].back, "<p>A</p>");
}

#[test]
fn test_top_level_callouts_fill_default_in_order() {
    let html: String = (0..7).map(|i| callout(&format!("Q{i}"), &format!("A{i}"))).collect();
    let deck = deck_from(&html, &Config::default()).deck;

    assert_eq!(deck.subdecks().len(), 1);
    let default = deck.subdeck("Default").unwrap();
    let fronts: Vec<_> = default.cards.iter().map(|c| c.front.clone()).collect();
    let expected: Vec<_> = (0..7).map(|i| format!("Q{i}")).collect();
    assert_eq!(fronts, expected);
}

#[test]
fn test_one_child_callout() {
    let deck = deck_from(
        r#"<figure class="callout"><div><span class="icon">💡</span></div><div><p>Lonely front</p></div></figure>"#,
        &Config::default(),
    )
    .deck;
    let card = &deck.subdeck("Default").unwrap().cards[0];
    assert_eq!(card.front, "Lonely front");
    assert!(card.back.is_empty());
}

#[test]
fn test_zero_child_callout_is_skipped() {
    let html = format!(
        r#"{}<figure class="callout"></figure>{}"#,
        callout("before", "x"),
        callout("after", "y")
    );
    let assembly = deck_from(&html, &Config::default());
    assert_eq!(assembly.skipped_callouts, 1);
    assert_eq!(assembly.deck.card_count(), 2);
}

#[test]
fn test_nested_sections_file_under_innermost() {
    let html = format!(
        r#"<details><summary>A</summary><div class="indented">
             <details><summary>B</summary><div class="indented">{}</div></details>
           </div></details>"#,
        callout("deep", "answer")
    );
    let deck = deck_from(&html, &Config::default()).deck;
    assert!(deck.subdeck("A").unwrap().is_empty());
    assert_eq!(deck.subdeck("B").unwrap().cards.len(), 1);
}

#[test]
fn test_tag_policy_changes_text_not_tags() {
    let html = callout("Front #topic", "Back2 #hard #sorting");
    let kept = deck_from(&html, &Config::default()).deck;
    let removed = deck_from(&html, &Config::default().with_tag_policy(TagPolicy::Remove)).deck;

    let (_, kept) = kept.cards().next().unwrap();
    let (_, removed) = removed.cards().next().unwrap();
    assert_eq!(kept.tags, removed.tags);
    assert_eq!(kept.tags, tags(&["hard", "sorting", "topic"]));
    assert_eq!(kept.back, "<p>Back2 #hard #sorting</p>");
    assert_eq!(removed.front, "Front");
    assert_eq!(removed.back, "<p>Back2</p>");
}

#[test]
fn test_shared_image_is_bundled_once() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("Deck")).unwrap();
    fs::write(dir.path().join("Deck/shared.png"), b"png").unwrap();

    let img = r#"<img src="Deck/shared.png">"#;
    let html = format!("{}{}", callout("one", img), callout("two", img));
    let doc = Document::from_html(&html, dir.path()).unwrap();
    let deck = build_deck(&doc, &Config::default()).deck;

    for (_, card) in deck.cards() {
        assert!(card.back.contains(r#"<img src="shared.png">"#));
    }
    assert_eq!(deck.media_files().len(), 1);
}

#[test]
fn test_malformed_markup_degrades() {
    let deck = deck_from(
        r#"<details><summary>Unclosed</summary><figure class="callout"><p>Q<p>A"#,
        &Config::default(),
    )
    .deck;
    assert_eq!(deck.subdeck("Unclosed").unwrap().cards.len(), 1);
}

#[test]
fn test_missing_input() {
    let err = load_deck("/no/such/export.zip", &Config::default()).unwrap_err();
    assert!(matches!(err, flashdeck::Error::InputNotFound(_)));
}
