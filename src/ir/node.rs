//! IR node types and roles.

/// Unique identifier for a node within an [`IRDocument`](super::IRDocument).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root node ID (always 0).
    pub const ROOT: NodeId = NodeId(0);
}

/// Role of a node, fixed when the markup is compiled.
///
/// This is the closed set every later stage matches on. Anything the
/// compiler does not recognize lands in `Block(BlockKind::Container)` or
/// `Inline(InlineStyle::Plain)`, so irregular markup never reaches the
/// walker as an unknown shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Root document node.
    Root,
    /// Page title (`<title>`, `header > h1`, `h1.page-title`).
    Title,
    /// Collapsible section (`<details>`).
    Section,
    /// Always-visible label of a section (`<summary>`).
    SectionLabel,
    /// Callout-styled container (`figure.callout`).
    Callout,
    /// Decorative icon inside a callout. Never rendered.
    CalloutIcon,
    /// Block-level content.
    Block(BlockKind),
    /// Inline formatting wrapper.
    Inline(InlineStyle),
    /// Leaf text. References a range in the document's text buffer.
    #[default]
    Text,
    /// Embedded image. `src`/`alt` in the SemanticMap.
    Image,
    /// Embedded or linked audio. `src` in the SemanticMap.
    Audio,
    /// Hyperlink. `href` in the SemanticMap.
    Link,
    /// Line break (`<br>`).
    Break,
    /// Horizontal rule (`<hr>`).
    Rule,
}

impl Role {
    /// Roles whose content flows inline.
    pub fn is_inline(&self) -> bool {
        matches!(self, Role::Inline(_) | Role::Link | Role::Text)
    }
}

/// Kinds of block content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Generic wrapper (div, section, article, ...). Rendered transparently.
    Container,
    Paragraph,
    Heading(u8),
    UnorderedList,
    OrderedList,
    ListItem,
    BlockQuote,
    /// Preformatted code (`<pre>`).
    CodeBlock,
    Table,
    TableRow,
    TableCell,
    /// Non-callout figure.
    Figure,
    /// Figure or table caption.
    Caption,
}

impl BlockKind {
    /// HTML tag used when rendering this block, if any.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            BlockKind::Container => None,
            BlockKind::Paragraph => Some("p"),
            BlockKind::Heading(1) => Some("h1"),
            BlockKind::Heading(2) => Some("h2"),
            BlockKind::Heading(3) => Some("h3"),
            BlockKind::Heading(4) => Some("h4"),
            BlockKind::Heading(5) => Some("h5"),
            BlockKind::Heading(_) => Some("h6"),
            BlockKind::UnorderedList => Some("ul"),
            BlockKind::OrderedList => Some("ol"),
            BlockKind::ListItem => Some("li"),
            BlockKind::BlockQuote => Some("blockquote"),
            BlockKind::CodeBlock => Some("pre"),
            BlockKind::Table => Some("table"),
            BlockKind::TableRow => Some("tr"),
            BlockKind::TableCell => Some("td"),
            BlockKind::Figure => Some("figure"),
            BlockKind::Caption => Some("figcaption"),
        }
    }
}

/// Inline formatting markers carried through to card text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineStyle {
    /// Wrapper with no semantic formatting (span, label, ...).
    Plain,
    Bold,
    Italic,
    Code,
    Underline,
    Strikethrough,
    Highlight,
    Subscript,
    Superscript,
}

impl InlineStyle {
    /// HTML tag used when rendering this style, if any.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            InlineStyle::Plain => None,
            InlineStyle::Bold => Some("b"),
            InlineStyle::Italic => Some("i"),
            InlineStyle::Code => Some("code"),
            InlineStyle::Underline => Some("u"),
            InlineStyle::Strikethrough => Some("s"),
            InlineStyle::Highlight => Some("mark"),
            InlineStyle::Subscript => Some("sub"),
            InlineStyle::Superscript => Some("sup"),
        }
    }
}

/// Range into the text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRange {
    /// Byte offset into the buffer.
    pub start: u32,
    /// Length in bytes.
    pub len: u32,
}

impl TextRange {
    pub fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn end(&self) -> u32 {
        self.start + self.len
    }
}

/// A node in the IR tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub role: Role,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    /// Text content range (only for Text nodes).
    pub text: TextRange,
}

impl Node {
    /// Create a new node with default values.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            text: TextRange::default(),
        }
    }

    /// Create a text node with the given range.
    pub fn text(range: TextRange) -> Self {
        Self {
            text: range,
            ..Self::new(Role::Text)
        }
    }
}
