//! Small helpers shared across the pipeline.

use std::borrow::Cow;

/// Current time as milliseconds since the Unix epoch.
pub fn time_now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Decode bytes to a string, handling various encodings.
///
/// 1. UTF-8 (a BOM is handled by encoding_rs)
/// 2. the hint encoding (from `<meta charset>`), if UTF-8 was malformed
/// 3. Windows-1252
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Find the charset named by a `<meta charset=...>` or
/// `<meta http-equiv content="...; charset=...">` in the first 1 KiB.
pub fn extract_meta_charset(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];
    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;
    let after = &prefix[pos + 8..];
    let after = match after.first() {
        Some(b'"') | Some(b'\'') => &after[1..],
        _ => after,
    };
    let end = after
        .iter()
        .position(|&b| matches!(b, b'"' | b'\'' | b';' | b'>' | b'/') || b.is_ascii_whitespace())
        .unwrap_or(after.len());
    let name = std::str::from_utf8(&after[..end]).ok()?;
    (!name.is_empty()).then_some(name)
}

/// Whether bytes look like binary data rather than markup.
///
/// Text encodings html5ever understands never contain NUL in the first
/// few kilobytes; images, archives and databases almost always do.
pub fn looks_binary(bytes: &[u8]) -> bool {
    let prefix = &bytes[..bytes.len().min(8192)];
    memchr::memchr(0, prefix).is_some()
}

/// Collapse runs of whitespace into single spaces (HTML `white-space: normal`).
pub fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Kinds of media a card can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Audio,
}

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];
const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".ogg", ".m4a", ".flac"];

/// Detect media kind from a path's extension.
pub fn detect_media_kind(path: &str) -> Option<MediaKind> {
    let lower = path.to_ascii_lowercase();
    if IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        Some(MediaKind::Image)
    } else if AUDIO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        Some(MediaKind::Audio)
    } else {
        None
    }
}

/// Escape text for HTML content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Strip tags and decode the handful of entities [`escape_html`] produces.
///
/// Used for sort fields and checksums, where Anki wants plain text.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_text("Grüße".as_bytes(), None), "Grüße");
    }

    #[test]
    fn test_decode_falls_back_to_windows_1252() {
        // "café" in Windows-1252
        assert_eq!(decode_text(b"caf\xe9", None), "café");
    }

    #[test]
    fn test_decode_uses_hint() {
        // "Привет" in KOI8-R
        let bytes = [0xf0, 0xd2, 0xc9, 0xd7, 0xc5, 0xd4];
        assert_eq!(decode_text(&bytes, Some("koi8-r")), "Привет");
    }

    #[test]
    fn test_extract_meta_charset() {
        assert_eq!(extract_meta_charset(br#"<meta charset="utf-8"/>"#), Some("utf-8"));
        assert_eq!(
            extract_meta_charset(br#"<meta http-equiv="Content-Type" content="text/html; charset=iso-8859-1">"#),
            Some("iso-8859-1")
        );
        assert_eq!(extract_meta_charset(b"<html><body>"), None);
    }

    #[test]
    fn test_looks_binary() {
        assert!(looks_binary(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"));
        assert!(!looks_binary(b"<html><body>hi</body></html>"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \n\t b  c"), "a b c");
        assert_eq!(collapse_whitespace("\n"), " ");
    }

    #[test]
    fn test_detect_media_kind() {
        assert_eq!(detect_media_kind("Deck/Diagram.PNG"), Some(MediaKind::Image));
        assert_eq!(detect_media_kind("clip.m4a"), Some(MediaKind::Audio));
        assert_eq!(detect_media_kind("notes.pdf"), None);
    }

    #[test]
    fn test_escape_and_strip_round() {
        let html = format!("<b>{}</b>", escape_html("a < b & \"c\""));
        assert_eq!(html, "<b>a &lt; b &amp; &quot;c&quot;</b>");
        assert_eq!(strip_html(&html), "a < b & \"c\"");
    }
}
