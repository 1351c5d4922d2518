//! Transform ArenaDom to IRDocument.
//!
//! This is the one place that has to tolerate whatever markup the export
//! contains. Every element is classified into a [`Role`] here; later
//! stages only ever match on roles.

use crate::dom::{ArenaDom, ArenaNodeData, ArenaNodeId};
use crate::ir::{BlockKind, IRDocument, InlineStyle, Node, NodeId, Role};
use crate::util::{MediaKind, collapse_whitespace, detect_media_kind};

/// Elements that never contribute content.
const HIDDEN_ELEMENTS: &[&str] = &[
    "head", "script", "style", "link", "meta", "template", "noscript", "base",
];

/// Class marking a callout block in Notion exports (`figure.callout`).
const CALLOUT_CLASS: &str = "callout";

/// Class Notion puts on emoji or image icons.
const ICON_CLASS: &str = "icon";

/// Class Notion puts on the page heading (`h1.page-title`).
const PAGE_TITLE_CLASS: &str = "page-title";

/// Map an element to its role, or `None` if it is hidden.
fn classify_element(dom: &ArenaDom, id: ArenaNodeId) -> Option<Role> {
    let tag = dom.element_name(id)?.as_ref().to_ascii_lowercase();

    if HIDDEN_ELEMENTS.contains(&tag.as_str()) {
        return None;
    }

    let role = match tag.as_str() {
        "title" => Role::Title,
        "details" => Role::Section,
        "summary" => Role::SectionLabel,
        _ if dom.has_class(id, CALLOUT_CLASS) => Role::Callout,
        _ if dom.has_class(id, ICON_CLASS) => Role::CalloutIcon,
        "h1" if dom.has_class(id, PAGE_TITLE_CLASS) || parent_is(dom, id, "header") => Role::Title,

        "img" => Role::Image,
        "audio" => Role::Audio,
        "a" if dom
            .get_attr(id, "href")
            .is_some_and(|href| detect_media_kind(href) == Some(MediaKind::Audio)) =>
        {
            Role::Audio
        }
        "a" => Role::Link,
        "br" => Role::Break,
        "hr" => Role::Rule,

        "p" => Role::Block(BlockKind::Paragraph),
        "h1" => Role::Block(BlockKind::Heading(1)),
        "h2" => Role::Block(BlockKind::Heading(2)),
        "h3" => Role::Block(BlockKind::Heading(3)),
        "h4" => Role::Block(BlockKind::Heading(4)),
        "h5" => Role::Block(BlockKind::Heading(5)),
        "h6" => Role::Block(BlockKind::Heading(6)),
        "ul" => Role::Block(BlockKind::UnorderedList),
        "ol" => Role::Block(BlockKind::OrderedList),
        "li" => Role::Block(BlockKind::ListItem),
        "blockquote" => Role::Block(BlockKind::BlockQuote),
        "pre" => Role::Block(BlockKind::CodeBlock),
        "table" => Role::Block(BlockKind::Table),
        "tr" => Role::Block(BlockKind::TableRow),
        "td" | "th" => Role::Block(BlockKind::TableCell),
        "figure" => Role::Block(BlockKind::Figure),
        "figcaption" | "caption" => Role::Block(BlockKind::Caption),

        "b" | "strong" => Role::Inline(InlineStyle::Bold),
        "i" | "em" | "cite" | "var" | "dfn" => Role::Inline(InlineStyle::Italic),
        "code" | "kbd" | "samp" | "tt" => Role::Inline(InlineStyle::Code),
        "u" | "ins" => Role::Inline(InlineStyle::Underline),
        "s" | "strike" | "del" => Role::Inline(InlineStyle::Strikethrough),
        "mark" => Role::Inline(InlineStyle::Highlight),
        "sub" => Role::Inline(InlineStyle::Subscript),
        "sup" => Role::Inline(InlineStyle::Superscript),
        "span" | "small" | "big" | "abbr" | "time" | "q" | "label" | "font" | "bdi" | "bdo"
        | "ruby" | "rt" | "rp" | "data" | "wbr" => Role::Inline(InlineStyle::Plain),

        _ => Role::Block(BlockKind::Container),
    };

    Some(role)
}

fn parent_is(dom: &ArenaDom, id: ArenaNodeId, tag: &str) -> bool {
    dom.get(id).is_some_and(|n| dom.is_tag(n.parent, tag))
}

/// Context for the transform operation.
struct TransformContext<'a> {
    dom: &'a ArenaDom,
    doc: IRDocument,
    /// Depth of enclosing `<pre>` elements; whitespace is kept verbatim inside.
    preformatted: usize,
}

impl<'a> TransformContext<'a> {
    fn new(dom: &'a ArenaDom) -> Self {
        Self {
            dom,
            doc: IRDocument::new(),
            preformatted: 0,
        }
    }

    fn transform(mut self) -> IRDocument {
        let html = self.dom.find_by_tag("html").unwrap_or(self.dom.document());

        for child in self.dom.children(html).collect::<Vec<_>>() {
            if self.dom.is_tag(child, "head") {
                // Only the document title matters in <head>
                for head_child in self.dom.children(child).collect::<Vec<_>>() {
                    if self.dom.is_tag(head_child, "title") {
                        self.process_node(head_child, NodeId::ROOT);
                    }
                }
            } else if self.dom.is_tag(child, "body") {
                self.process_children(child, NodeId::ROOT);
            } else {
                self.process_node(child, NodeId::ROOT);
            }
        }

        self.doc
    }

    fn process_children(&mut self, dom_parent: ArenaNodeId, ir_parent: NodeId) {
        for child_id in self.dom.children(dom_parent).collect::<Vec<_>>() {
            self.process_node(child_id, ir_parent);
        }
    }

    fn process_node(&mut self, dom_id: ArenaNodeId, ir_parent: NodeId) {
        let Some(node) = self.dom.get(dom_id) else {
            return;
        };

        match &node.data {
            ArenaNodeData::Text(text) => self.process_text(text, ir_parent),
            ArenaNodeData::Element { .. } => self.process_element(dom_id, ir_parent),
            ArenaNodeData::Document | ArenaNodeData::Other => {}
        }
    }

    fn process_text(&mut self, text: &str, ir_parent: NodeId) {
        if self.preformatted > 0 {
            self.doc.push_text(ir_parent, text);
            return;
        }

        if text.trim().is_empty() {
            let parent_role = self.doc.role(ir_parent);
            // Inter-element whitespace in block context is layout, not content.
            // A bare space between inline elements must survive:
            // <p><b>A</b> <i>B</i></p>
            if parent_role == Role::Root || (text.contains('\n') && !parent_role.is_inline()) {
                return;
            }
            self.doc.push_text(ir_parent, " ");
            return;
        }

        self.doc.push_text(ir_parent, &collapse_whitespace(text));
    }

    fn process_element(&mut self, dom_id: ArenaNodeId, ir_parent: NodeId) {
        let Some(role) = classify_element(self.dom, dom_id) else {
            return;
        };

        let ir_id = self.doc.alloc_node(Node::new(role));
        self.doc.append_child(ir_parent, ir_id);

        match role {
            Role::Image => {
                if let Some(src) = self.dom.get_attr(dom_id, "src") {
                    self.doc.semantics.set_src(ir_id, src.trim());
                }
                if let Some(alt) = self.dom.get_attr(dom_id, "alt") {
                    self.doc.semantics.set_alt(ir_id, alt);
                }
            }
            Role::Audio => {
                if let Some(src) = self.audio_source(dom_id) {
                    self.doc.semantics.set_src(ir_id, src.trim());
                }
            }
            Role::Link => {
                if let Some(href) = self.dom.get_attr(dom_id, "href") {
                    self.doc.semantics.set_href(ir_id, href.trim());
                }
                self.process_children(dom_id, ir_id);
            }
            Role::Break | Role::Rule => {}
            Role::Block(BlockKind::CodeBlock) => {
                self.preformatted += 1;
                self.process_children(dom_id, ir_id);
                self.preformatted -= 1;
            }
            _ => self.process_children(dom_id, ir_id),
        }
    }

    /// Source of an audio element: `src`, `href`, or the first `<source src>`.
    fn audio_source(&self, dom_id: ArenaNodeId) -> Option<&'a str> {
        let dom = self.dom;
        dom.get_attr(dom_id, "src")
            .or_else(|| dom.get_attr(dom_id, "href"))
            .or_else(|| {
                dom.children(dom_id)
                    .filter(|&c| dom.is_tag(c, "source"))
                    .find_map(|c| dom.get_attr(c, "src"))
            })
    }
}

/// Transform a parsed DOM into the IR.
pub fn transform(dom: &ArenaDom) -> IRDocument {
    TransformContext::new(dom).transform()
}
