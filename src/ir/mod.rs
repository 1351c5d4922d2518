//! Intermediate Representation (IR) for a compiled export page.
//!
//! The IR is the only tree the walker and card extractor look at:
//! - nodes carry a [`Role`] from a closed set
//! - `src`/`href`/`alt` live in a sparse [`SemanticMap`]
//! - text lives in one buffer that nodes reference by range
//!
//! # Example
//!
//! ```
//! use flashdeck::ir::{IRDocument, Node, NodeId, Role};
//!
//! let mut doc = IRDocument::new();
//! let title = doc.alloc_node(Node::new(Role::Title));
//! doc.append_child(NodeId::ROOT, title);
//! doc.push_text(title, "Algorithms");
//!
//! assert_eq!(doc.plain_text(title), "Algorithms");
//! ```

mod node;
mod semantic;

pub use node::{BlockKind, InlineStyle, Node, NodeId, Role, TextRange};
pub use semantic::SemanticMap;

/// A compiled page in normalized IR form.
///
/// Parent-pointer / first-child / next-sibling layout; index 0 is the root.
#[derive(Debug, Clone)]
pub struct IRDocument {
    nodes: Vec<Node>,
    /// Sparse semantic attributes (src, href, alt).
    pub semantics: SemanticMap,
    text: String,
}

impl Default for IRDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl IRDocument {
    /// Create a new empty document with a root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(Role::Root)],
            semantics: SemanticMap::new(),
            text: String::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Role of a node; the root role for unknown ids.
    pub fn role(&self, id: NodeId) -> Role {
        self.node(id).map(|n| n.role).unwrap_or(Role::Root)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Allocate a new node and return its ID.
    pub fn alloc_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Append text to the buffer and return the range.
    pub fn append_text(&mut self, text: &str) -> TextRange {
        let start = self.text.len() as u32;
        self.text.push_str(text);
        TextRange::new(start, text.len() as u32)
    }

    /// Allocate a text node under `parent`.
    pub fn push_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let range = self.append_text(text);
        let id = self.alloc_node(Node::text(range));
        self.append_child(parent, id);
        id
    }

    /// Get text from a range.
    pub fn text(&self, range: TextRange) -> &str {
        &self.text[range.start as usize..range.end() as usize]
    }

    /// Text of a Text node, or `""` for any other node.
    pub fn node_text(&self, id: NodeId) -> &str {
        match self.node(id) {
            Some(node) if node.role == Role::Text => self.text(node.text),
            _ => "",
        }
    }

    /// Append a child node to a parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let last = match self.nodes.get(parent.0 as usize) {
            Some(p) => p.last_child,
            None => return,
        };

        if let Some(child_node) = self.nodes.get_mut(child.0 as usize) {
            child_node.parent = Some(parent);
            child_node.next_sibling = None;
        }

        match last {
            Some(last) => {
                if let Some(last_node) = self.nodes.get_mut(last.0 as usize) {
                    last_node.next_sibling = Some(child);
                }
            }
            None => {
                if let Some(p) = self.nodes.get_mut(parent.0 as usize) {
                    p.first_child = Some(child);
                }
            }
        }

        if let Some(p) = self.nodes.get_mut(parent.0 as usize) {
            p.last_child = Some(child);
        }
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        ChildIter {
            doc: self,
            current: self.node(parent).and_then(|n| n.first_child),
        }
    }

    /// Iterate over a node and all its descendants in depth-first order.
    pub fn descendants(&self, id: NodeId) -> DfsIter<'_> {
        DfsIter {
            doc: self,
            stack: vec![id],
        }
    }

    /// Iterate over all nodes in depth-first order.
    pub fn iter_dfs(&self) -> DfsIter<'_> {
        self.descendants(NodeId::ROOT)
    }

    /// Visible text of a subtree with whitespace collapsed and trimmed.
    pub fn plain_text(&self, id: NodeId) -> String {
        let mut raw = String::new();
        for node in self.descendants(id) {
            match self.role(node) {
                Role::Text => raw.push_str(self.node_text(node)),
                Role::Break => raw.push(' '),
                _ => {}
            }
        }
        crate::util::collapse_whitespace(&raw).trim().to_string()
    }

    /// Whether a subtree has nothing to show: no text and no media.
    /// Callout icons do not count as content.
    pub fn is_blank(&self, id: NodeId) -> bool {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match self.role(current) {
                Role::CalloutIcon => continue,
                Role::Text if !self.node_text(current).trim().is_empty() => return false,
                Role::Image | Role::Audio | Role::Rule => return false,
                _ => stack.extend(self.children(current)),
            }
        }
        true
    }
}

/// Iterator over children of a node.
pub struct ChildIter<'a> {
    doc: &'a IRDocument,
    current: Option<NodeId>,
}

impl Iterator for ChildIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.doc.node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Depth-first iterator over a subtree.
pub struct DfsIter<'a> {
    doc: &'a IRDocument,
    stack: Vec<NodeId>,
}

impl Iterator for DfsIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        // Reverse so children come out left-to-right
        let mut children: Vec<NodeId> = self.doc.children(current).collect();
        children.reverse();
        self.stack.extend(children);

        Some(current)
    }
}
