//! Fragment rendering.
//!
//! Card faces are written as a small, clean HTML subset. Source classes,
//! ids and inline styles never survive; roles decide the tags.

use crate::dom::is_remote;
use crate::ir::{BlockKind, IRDocument, NodeId, Role};
use crate::model::{MediaReference, MediaStatus};
use crate::util::{MediaKind, escape_html};

use super::hashtag::HashtagScanner;
use super::media::MediaResolver;

/// Whether a link still leads somewhere once the card leaves the export.
///
/// Relative links point into the export folder (sibling pages, the
/// original of an embedded image); those are rendered as their content.
fn links_outside_export(href: &str) -> bool {
    if is_remote(href) {
        return true;
    }
    href.split_once(':').is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Renders runs of IR nodes to HTML, collecting tags and media as it goes.
pub(crate) struct Renderer<'a> {
    ir: &'a IRDocument,
    resolver: &'a mut MediaResolver,
    tags: &'a mut HashtagScanner,
    media: Vec<MediaReference>,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(
        ir: &'a IRDocument,
        resolver: &'a mut MediaResolver,
        tags: &'a mut HashtagScanner,
    ) -> Self {
        Self {
            ir,
            resolver,
            tags,
            media: Vec::new(),
        }
    }

    /// Render a run. A run that is a single paragraph loses its `<p>`
    /// when `unwrap_paragraph` is set.
    pub(crate) fn render_run(&mut self, run: &[NodeId], unwrap_paragraph: bool) -> String {
        let mut out = String::new();
        match run {
            [only] if unwrap_paragraph && self.ir.role(*only) == Role::Block(BlockKind::Paragraph) => {
                self.tags.break_run();
                self.render_children(*only, &mut out);
                self.tags.break_run();
            }
            _ => {
                for &id in run {
                    self.render_node(id, &mut out);
                }
                self.tags.break_run();
            }
        }
        out
    }

    pub(crate) fn into_media(self) -> Vec<MediaReference> {
        self.media
    }

    fn render_children(&mut self, id: NodeId, out: &mut String) {
        for child in self.ir.children(id) {
            self.render_node(child, out);
        }
    }

    fn wrap(&mut self, id: NodeId, open: &str, close: &str, out: &mut String) {
        self.tags.break_run();
        out.push_str(open);
        self.render_children(id, out);
        out.push_str(close);
        self.tags.break_run();
    }

    fn render_node(&mut self, id: NodeId, out: &mut String) {
        match self.ir.role(id) {
            Role::Text => {
                let text = self.tags.scan(self.ir.node_text(id));
                out.push_str(&escape_html(&text));
            }
            Role::Inline(style) => match style.tag() {
                Some(tag) => {
                    out.push_str(&format!("<{tag}>"));
                    self.render_children(id, out);
                    out.push_str(&format!("</{tag}>"));
                }
                None => self.render_children(id, out),
            },
            Role::Link => match self.ir.semantics.href(id) {
                Some(href) if links_outside_export(href) => {
                    out.push_str(&format!("<a href=\"{}\">", escape_html(href)));
                    self.render_children(id, out);
                    out.push_str("</a>");
                }
                _ => self.render_children(id, out),
            },
            Role::Break => {
                out.push_str("<br>");
                self.tags.break_run();
            }
            Role::Rule => {
                out.push_str("<hr>");
                self.tags.break_run();
            }
            Role::Image => {
                self.render_image(id, out);
                self.tags.break_run();
            }
            Role::Audio => {
                self.render_audio(id, out);
                self.tags.break_run();
            }
            Role::Block(BlockKind::Container) if self.ir.is_blank(id) => {}
            Role::Block(kind) => {
                let tag = kind.tag().unwrap_or("div");
                self.wrap(id, &format!("<{tag}>"), &format!("</{tag}>"), out);
            }
            Role::Callout => self.wrap(id, "<div class=\"callout\">", "</div>", out),
            Role::CalloutIcon => {}
            Role::Section => self.wrap(id, "<details>", "</details>", out),
            Role::SectionLabel => self.wrap(id, "<summary>", "</summary>", out),
            Role::Title => self.wrap(id, "<div>", "</div>", out),
            Role::Root => self.render_children(id, out),
        }
    }

    fn render_image(&mut self, id: NodeId, out: &mut String) {
        let Some(src) = self.ir.semantics.src(id) else {
            return;
        };
        let media = self.resolver.resolve(src, MediaKind::Image);
        let target = media.media_name().unwrap_or(src);
        out.push_str(&format!("<img src=\"{}\"", escape_html(target)));
        if let Some(alt) = self.ir.semantics.alt(id) {
            out.push_str(&format!(" alt=\"{}\"", escape_html(alt)));
        }
        out.push('>');
        self.media.push(media);
    }

    fn render_audio(&mut self, id: NodeId, out: &mut String) {
        let Some(src) = self.ir.semantics.src(id) else {
            return;
        };
        let media = self.resolver.resolve(src, MediaKind::Audio);
        match &media.status {
            MediaStatus::Resolved { name, .. } => out.push_str(&format!("[sound:{name}]")),
            MediaStatus::Missing { .. } | MediaStatus::Remote => {
                let label = src.rsplit('/').next().unwrap_or(src);
                out.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(src),
                    escape_html(label)
                ));
            }
        }
        self.media.push(media);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_outside_export() {
        assert!(links_outside_export("https://www.notion.so/abc"));
        assert!(links_outside_export("mailto:someone@example.com"));
        assert!(links_outside_export("tel:+15550100"));
        assert!(!links_outside_export("Algorithms/graph%20sketch.png"));
        assert!(!links_outside_export("Other%20Page%2012ab.html"));
        assert!(!links_outside_export("#block-id"));
        assert!(!links_outside_export("Notes/Ratio 3:2.html"));
    }
}
