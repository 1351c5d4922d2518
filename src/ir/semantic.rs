//! Sparse semantic attributes for IR nodes.
//!
//! Only images, audio and links carry attributes, so they live in maps
//! keyed by node instead of on every node.

use std::collections::HashMap;

use super::node::NodeId;

/// Sparse map for `src`, `href` and `alt`.
#[derive(Debug, Default, Clone)]
pub struct SemanticMap {
    href: HashMap<NodeId, String>,
    src: HashMap<NodeId, String>,
    alt: HashMap<NodeId, String>,
}

impl SemanticMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the href for a node. Empty values are ignored.
    pub fn set_href(&mut self, node: NodeId, href: &str) {
        if !href.is_empty() {
            self.href.insert(node, href.to_string());
        }
    }

    pub fn href(&self, node: NodeId) -> Option<&str> {
        self.href.get(&node).map(String::as_str)
    }

    /// Set the src for a node. Empty values are ignored.
    pub fn set_src(&mut self, node: NodeId, src: &str) {
        if !src.is_empty() {
            self.src.insert(node, src.to_string());
        }
    }

    pub fn src(&self, node: NodeId) -> Option<&str> {
        self.src.get(&node).map(String::as_str)
    }

    /// Set the alt text for a node. Empty values are ignored.
    pub fn set_alt(&mut self, node: NodeId, alt: &str) {
        if !alt.is_empty() {
            self.alt.insert(node, alt.to_string());
        }
    }

    pub fn alt(&self, node: NodeId) -> Option<&str> {
        self.alt.get(&node).map(String::as_str)
    }
}
