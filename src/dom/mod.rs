//! HTML parsing into an arena DOM, plus the path helpers the rest of the
//! pipeline uses to make sense of `src` and `href` attributes.

mod arena;
mod tree_sink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute, ChildrenIter};
pub use tree_sink::{ArenaSink, NodeHandle};

use std::borrow::Cow;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use percent_encoding::percent_decode_str;

/// Parse an HTML string into an [`ArenaDom`].
///
/// Never fails: malformed markup is repaired the way a browser would.
pub fn parse_html(html: &str) -> ArenaDom {
    let sink = parse_document(ArenaSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    if sink.parse_errors() > 0 {
        log::debug!("html5ever recovered from {} parse errors", sink.parse_errors());
    }
    sink.into_dom()
}

/// Collect stylesheet references and inline `<style>` bodies.
///
/// Returns `(linked_hrefs, inline_css)` in document order.
pub fn extract_stylesheets(dom: &ArenaDom) -> (Vec<String>, Vec<String>) {
    let mut linked = Vec::new();
    let mut inline = Vec::new();

    let mut stack = vec![dom.document()];
    while let Some(id) = stack.pop() {
        match dom.element_name(id).map(|n| n.as_ref()) {
            Some("link") => {
                let is_stylesheet = dom
                    .get_attr(id, "rel")
                    .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("stylesheet")));
                if is_stylesheet && let Some(href) = dom.get_attr(id, "href") {
                    linked.push(href.to_string());
                }
            }
            Some("style") => {
                let css = dom.collect_text(id);
                if !css.trim().is_empty() {
                    inline.push(css);
                }
            }
            _ => {}
        }

        let children: Vec<_> = dom.children(id).collect();
        stack.extend(children.into_iter().rev());
    }

    (linked, inline)
}

/// Whether a reference points outside the local export.
pub fn is_remote(reference: &str) -> bool {
    let lower = reference.trim_start().to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("//")
        || lower.starts_with("data:")
}

/// Percent-decode a reference, dropping any query string or fragment.
///
/// Notion encodes spaces and non-ASCII characters in asset paths, so
/// `My%20Page/image%201.png` becomes `My Page/image 1.png`.
pub fn decode_reference(reference: &str) -> Cow<'_, str> {
    let path = reference
        .split(['?', '#'])
        .next()
        .unwrap_or(reference);
    percent_decode_str(path).decode_utf8_lossy()
}

/// Resolve a relative path against a base file path logically (no
/// filesystem access).
///
/// ```
/// use flashdeck::dom::resolve_path;
///
/// assert_eq!(resolve_path("export/Deck.html", "Deck/img.png"), "export/Deck/img.png");
/// assert_eq!(resolve_path("export/Deck.html", "../shared/a.png"), "shared/a.png");
/// assert_eq!(resolve_path("Deck.html", "/abs/b.png"), "abs/b.png");
/// ```
pub fn resolve_path(base: &str, rel: &str) -> String {
    use std::path::{Component, Path};

    if is_remote(rel) {
        return rel.to_string();
    }

    let rel_path = Path::new(rel);
    if rel_path.has_root() {
        return rel.trim_start_matches('/').to_string();
    }

    let mut stack: Vec<&str> = Path::new(base)
        .parent()
        .unwrap_or(Path::new(""))
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();

    for component in rel_path.components() {
        match component {
            Component::ParentDir => {
                stack.pop();
            }
            Component::Normal(c) => {
                if let Some(s) = c.to_str() {
                    stack.push(s);
                }
            }
            _ => {}
        }
    }

    stack.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_stylesheets() {
        let dom = parse_html(
            r#"<html><head>
                <link rel="stylesheet" href="notion.css">
                <style>.callout { display: flex; }</style>
                <style>   </style>
            </head><body><p>Content</p></body></html>"#,
        );

        let (linked, inline) = extract_stylesheets(&dom);
        assert_eq!(linked, vec!["notion.css".to_string()]);
        assert_eq!(inline.len(), 1);
        assert!(inline[0].contains("display: flex"));
    }

    #[test]
    fn test_decode_reference() {
        assert_eq!(decode_reference("My%20Page/image%201.png"), "My Page/image 1.png");
        assert_eq!(decode_reference("a.png?width=300"), "a.png");
        assert_eq!(decode_reference("caf%C3%A9.png#x"), "café.png");
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://s3.amazonaws.com/x.png"));
        assert!(is_remote("HTTP://example.com"));
        assert!(is_remote("data:image/png;base64,AAAA"));
        assert!(!is_remote("Page/image.png"));
    }

    #[test]
    fn test_resolve_path_parent_dir() {
        assert_eq!(resolve_path("a/b/c/file.html", "../../images/test.png"), "a/images/test.png");
    }

    #[test]
    fn test_resolve_path_current_dir() {
        assert_eq!(resolve_path("export/page.html", "./img/test.png"), "export/img/test.png");
    }

    #[test]
    fn test_resolve_path_url_passthrough() {
        assert_eq!(
            resolve_path("page.html", "https://example.com/image.png"),
            "https://example.com/image.png"
        );
    }
}
