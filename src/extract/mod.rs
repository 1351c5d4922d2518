//! Callout to card extraction.
//!
//! A callout's content is split into fragments: each block child is one
//! fragment, and consecutive inline children form one fragment together.
//! Notion wraps the body of a callout in a single `div` next to the icon
//! wrapper; blank fragments (the icon wrapper among them) are dropped and
//! a lone wrapper is unwrapped until real content shows up.
//!
//! The first fragment is the front, the rest is the back.

mod hashtag;
mod media;
mod render;

pub use hashtag::{HashtagScanner, extract_hashtags};
pub use media::MediaResolver;

use thiserror::Error;

use crate::config::{Config, TagPolicy};
use crate::import::Document;
use crate::ir::{BlockKind, IRDocument, NodeId, Role};
use crate::model::Card;
use render::Renderer;

/// Why a callout produced no card. Never fatal to a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("callout has no content")]
    EmptyCallout,
}

/// Turns callouts of one document into cards.
///
/// Holds the media resolver, so media names stay consistent across all
/// cards extracted through the same extractor.
pub struct CardExtractor<'a> {
    ir: &'a IRDocument,
    policy: TagPolicy,
    media: MediaResolver,
}

impl<'a> CardExtractor<'a> {
    pub fn new(doc: &'a Document, config: &Config) -> Self {
        Self {
            ir: &doc.ir,
            policy: config.tag_policy,
            media: MediaResolver::new(&doc.base_dir),
        }
    }

    /// Extract the card for a callout node.
    pub fn extract(&mut self, callout: NodeId) -> Result<Card, ExtractError> {
        let fragments = fragments(self.ir, callout);
        let Some((front, back)) = fragments.split_first() else {
            return Err(ExtractError::EmptyCallout);
        };

        let mut tags = HashtagScanner::new(self.policy);
        let mut renderer = Renderer::new(self.ir, &mut self.media, &mut tags);

        let front_html = renderer.render_run(front, true);
        let back: String = back
            .iter()
            .map(|run| renderer.render_run(run, false))
            .collect();
        let media = renderer.into_media();

        // A front made only of hashtags would vanish under tag removal;
        // such a front keeps its tokens. Its tags are already collected.
        let mut front_html = front_html.trim().to_string();
        if front_html.is_empty() {
            let mut keep = HashtagScanner::new(TagPolicy::Keep);
            front_html = Renderer::new(self.ir, &mut self.media, &mut keep)
                .render_run(front, true)
                .trim()
                .to_string();
        }
        if front_html.is_empty() {
            return Err(ExtractError::EmptyCallout);
        }

        Ok(Card {
            front: front_html,
            back: back.trim().to_string(),
            tags: tags.into_tags(),
            media,
        })
    }
}

fn flows_inline(role: Role) -> bool {
    role.is_inline() || matches!(role, Role::Break | Role::Image | Role::Audio)
}

/// Content fragments of a callout, in document order.
fn fragments(ir: &IRDocument, callout: NodeId) -> Vec<Vec<NodeId>> {
    let mut parent = callout;
    loop {
        let runs = content_runs(ir, parent);
        match runs.as_slice() {
            [run] if run.len() == 1 && ir.role(run[0]) == Role::Block(BlockKind::Container) => {
                parent = run[0];
            }
            _ => return runs,
        }
    }
}

fn content_runs(ir: &IRDocument, parent: NodeId) -> Vec<Vec<NodeId>> {
    let mut runs = Vec::new();
    let mut inline = Vec::new();

    for child in ir.children(parent) {
        if flows_inline(ir.role(child)) {
            inline.push(child);
            continue;
        }
        if !inline.is_empty() {
            runs.push(std::mem::take(&mut inline));
        }
        runs.push(vec![child]);
    }
    if !inline.is_empty() {
        runs.push(inline);
    }

    runs.retain(|run| run.iter().any(|&id| !ir.is_blank(id)));
    runs
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;

    use super::*;
    use crate::model::MediaStatus;

    fn cards(html: &str, config: &Config) -> Vec<Result<Card, ExtractError>> {
        let doc = Document::from_html(html, "/nonexistent").unwrap();
        let mut extractor = CardExtractor::new(&doc, config);
        let callouts: Vec<_> = doc
            .ir
            .iter_dfs()
            .filter(|&id| doc.ir.role(id) == Role::Callout)
            .collect();
        callouts.into_iter().map(|id| extractor.extract(id)).collect()
    }

    fn card(html: &str) -> Card {
        cards(html, &Config::default()).remove(0).unwrap()
    }

    const NOTION_CALLOUT: &str = r#"<figure class="block-color-gray_background callout" style="white-space:pre-wrap;display:flex">
        <div style="font-size:1.5em"><span class="icon">💡</span></div>
        <div style="width:100%"><p><strong>Front1</strong></p><p>Back1 <em>really</em> #easy</p></div>
        </figure>"#;

    #[test]
    fn test_notion_callout_split() {
        let card = card(NOTION_CALLOUT);
        assert_eq!(card.front, "<b>Front1</b>");
        assert_eq!(card.back, "<p>Back1 <i>really</i> #easy</p>");
        assert_eq!(card.tags, BTreeSet::from(["easy".to_string()]));
    }

    #[test]
    fn test_remove_policy_keeps_formatting() {
        let config = Config::default().with_tag_policy(TagPolicy::Remove);
        let card = cards(NOTION_CALLOUT, &config).remove(0).unwrap();
        assert_eq!(card.back, "<p>Back1 <i>really</i></p>");
        assert_eq!(card.tags, BTreeSet::from(["easy".to_string()]));
    }

    #[test]
    fn test_tag_only_front_survives_removal() {
        let html = r#"<figure class="callout"><div><p>#vocab</p><p>Answer #easy</p></div></figure>"#;
        let config = Config::default().with_tag_policy(TagPolicy::Remove);
        let card = cards(html, &config).remove(0).unwrap();

        assert_eq!(card.front, "#vocab");
        assert_eq!(card.back, "<p>Answer</p>");
        assert_eq!(card.tags, BTreeSet::from(["easy".to_string(), "vocab".to_string()]));
    }

    #[test]
    fn test_tag_after_line_break() {
        let card = card(r#"<figure class="callout"><p>Q</p><p>Answer<br>#easy</p></figure>"#);
        assert_eq!(card.back, "<p>Answer<br>#easy</p>");
        assert!(card.tags.contains("easy"));
    }

    #[test]
    fn test_tag_after_image() {
        let card = card(r#"<figure class="callout"><p>Q</p><p><img src="https://x.test/a.png">#seen</p></figure>"#);
        assert!(card.tags.contains("seen"));
    }

    #[test]
    fn test_relative_links_are_unwrapped() {
        let card = card(
            r#"<figure class="callout"><p>See <a href="Other%20Page%20abc.html">Other Page</a></p>
               <p><a href="https://example.com/x">web</a> <a href="mailto:a@b.test">mail</a></p></figure>"#,
        );
        assert_eq!(card.front, "See Other Page");
        assert!(card.back.contains(r#"<a href="https://example.com/x">web</a>"#));
        assert!(card.back.contains(r#"<a href="mailto:a@b.test">mail</a>"#));
    }

    #[test]
    fn test_single_child_has_empty_back() {
        let card = card(r#"<figure class="callout"><div><p>Only</p></div></figure>"#);
        assert_eq!(card.front, "Only");
        assert!(card.back.is_empty());
    }

    #[test]
    fn test_empty_callouts() {
        let results = cards(
            r#"<figure class="callout"></figure>
               <figure class="callout"><div><span class="icon">💡</span></div><div> </div></figure>"#,
            &Config::default(),
        );
        assert_eq!(results, vec![Err(ExtractError::EmptyCallout), Err(ExtractError::EmptyCallout)]);
    }

    #[test]
    fn test_inline_children_form_one_fragment() {
        let card = card(r#"<figure class="callout"><div>What is <b>2+2</b>?</div><div>4</div></figure>"#);
        assert_eq!(card.front, "<div>What is <b>2+2</b>?</div>");
        assert_eq!(card.back, "<div>4</div>");
    }

    #[test]
    fn test_nested_callout_stays_in_back() {
        let card = card(
            r#"<figure class="callout"><div><p>Outer</p>
                 <figure class="callout"><div><span class="icon">⚠</span></div><div><p>Inner #deep</p></div></figure>
               </div></figure>"#,
        );
        assert_eq!(card.front, "Outer");
        assert!(card.back.starts_with("<div class=\"callout\">"));
        assert!(card.back.contains("Inner #deep"));
        assert!(!card.back.contains('⚠'));
        assert!(card.tags.contains("deep"));
    }

    #[test]
    fn test_text_is_escaped() {
        let card = card(r#"<figure class="callout"><p>a &lt; b</p><p>x &amp; y</p></figure>"#);
        assert_eq!(card.front, "a &lt; b");
        assert_eq!(card.back, "<p>x &amp; y</p>");
    }

    #[test]
    fn test_media_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Deck")).unwrap();
        fs::write(dir.path().join("Deck/tree diagram.png"), b"png").unwrap();
        fs::write(dir.path().join("Deck/say.mp3"), b"mp3").unwrap();

        let doc = Document::from_html(
            r#"<figure class="callout"><p>Q</p>
                 <figure class="image"><a href="Deck/tree%20diagram.png"><img src="Deck/tree%20diagram.png"></a></figure>
                 <p><a href="Deck/say.mp3">say.mp3</a></p>
                 <p><img src="Deck/missing.png"></p>
               </figure>"#,
            dir.path(),
        )
        .unwrap();
        let callout = doc.ir.iter_dfs().find(|&id| doc.ir.role(id) == Role::Callout).unwrap();
        let card = CardExtractor::new(&doc, &Config::default()).extract(callout).unwrap();

        assert!(card.back.contains(r#"<img src="tree diagram.png">"#));
        assert!(!card.back.contains(r#"href="Deck/tree%20diagram.png""#));
        assert!(card.back.contains("[sound:say.mp3]"));
        assert!(card.back.contains(r#"<img src="Deck/missing.png">"#));
        assert_eq!(card.media.len(), 3);
        assert!(matches!(card.media[2].status, MediaStatus::Missing { .. }));
    }
}
