//! HTML to IR compiler.
//!
//! Parses export markup once and transforms it into an [`IRDocument`]
//! whose nodes carry roles from a closed set. Stylesheets are pulled out
//! on the side; they style the cards but never become card content.
//!
//! # Example
//!
//! ```
//! use flashdeck::compiler::compile_html;
//! use flashdeck::ir::Role;
//!
//! let page = compile_html(r#"<figure class="callout"><p>Q</p><p>A</p></figure>"#);
//! assert!(page.ir.iter_dfs().any(|id| page.ir.role(id) == Role::Callout));
//! ```

mod transform;

pub use transform::transform;

use crate::dom::{extract_stylesheets, parse_html};
use crate::ir::IRDocument;

/// Result of compiling one page of markup.
#[derive(Debug, Clone, Default)]
pub struct CompiledPage {
    /// The content tree.
    pub ir: IRDocument,
    /// Bodies of inline `<style>` elements, in document order.
    pub inline_css: Vec<String>,
    /// `href`s of `<link rel="stylesheet">` elements, in document order.
    pub linked_css: Vec<String>,
}

/// Compile HTML content to IR.
pub fn compile_html(html: &str) -> CompiledPage {
    let dom = parse_html(html);
    let (linked_css, inline_css) = extract_stylesheets(&dom);
    let ir = transform(&dom);

    CompiledPage {
        ir,
        inline_css,
        linked_css,
    }
}

/// Compile HTML bytes to IR, detecting the text encoding first.
pub fn compile_html_bytes(html: &[u8]) -> CompiledPage {
    let hint = crate::util::extract_meta_charset(html);
    let text = crate::util::decode_text(html, hint);
    compile_html(&text)
}
