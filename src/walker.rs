//! Structural walk over a compiled page.
//!
//! The walker turns the IR into a flat, document-order stream of
//! [`StructuralEvent`]s. It only looks at roles; anything the compiler
//! did not mark as title, section or callout is plain content.

use crate::ir::{IRDocument, NodeId, Role};

/// One step of the structural walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralEvent {
    /// The first non-empty page title, as plain text.
    Title(String),
    /// Entering a collapsible section with the given label.
    SectionStart(String),
    /// Leaving the innermost open section.
    SectionEnd,
    /// A callout. Its subtree is not walked any further.
    Callout(NodeId),
    /// Any other node.
    Plain(NodeId),
}

enum Frame {
    Enter(NodeId),
    Exit,
}

/// Depth-first iterator producing [`StructuralEvent`]s.
pub struct Walker<'a> {
    ir: &'a IRDocument,
    stack: Vec<Frame>,
    seen_title: bool,
}

impl<'a> Walker<'a> {
    pub fn new(ir: &'a IRDocument) -> Self {
        let mut walker = Self {
            ir,
            stack: Vec::new(),
            seen_title: false,
        };
        walker.push_children(ir.root(), None);
        walker
    }

    /// Schedule the children of `id`, skipping `except`.
    fn push_children(&mut self, id: NodeId, except: Option<NodeId>) {
        let children: Vec<NodeId> = self
            .ir
            .children(id)
            .filter(|&c| Some(c) != except)
            .collect();
        self.stack
            .extend(children.into_iter().rev().map(Frame::Enter));
    }

    fn enter(&mut self, id: NodeId) -> StructuralEvent {
        match self.ir.role(id) {
            Role::Title if !self.seen_title && !self.ir.plain_text(id).trim().is_empty() => {
                self.seen_title = true;
                StructuralEvent::Title(self.ir.plain_text(id).trim().to_string())
            }
            Role::Section => {
                let label = self
                    .ir
                    .children(id)
                    .find(|&c| self.ir.role(c) == Role::SectionLabel);
                let name = label
                    .map(|l| self.ir.plain_text(l))
                    .unwrap_or_default();
                self.stack.push(Frame::Exit);
                self.push_children(id, label);
                StructuralEvent::SectionStart(name)
            }
            Role::Callout => StructuralEvent::Callout(id),
            _ => {
                self.push_children(id, None);
                StructuralEvent::Plain(id)
            }
        }
    }
}

impl Iterator for Walker<'_> {
    type Item = StructuralEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.stack.pop()? {
            Frame::Enter(id) => Some(self.enter(id)),
            Frame::Exit => Some(StructuralEvent::SectionEnd),
        }
    }
}

/// Walk a document from its root.
pub fn walk(ir: &IRDocument) -> Walker<'_> {
    Walker::new(ir)
}
