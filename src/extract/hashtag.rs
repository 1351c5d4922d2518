//! Hashtag scanning.
//!
//! A tag is `#` followed by word characters, where the `#` is not glued
//! to a preceding word character (`C#`, `a#b` and URL fragments inside
//! words are not tags). Text arrives one node at a time, so the scanner
//! remembers the last character it saw until a block boundary resets it.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::TagPolicy;

static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\w+)").unwrap());

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Collects tags from a run of text nodes and, under
/// [`TagPolicy::Remove`], cuts them out of the text.
#[derive(Debug)]
pub struct HashtagScanner {
    policy: TagPolicy,
    tags: BTreeSet<String>,
    prev: Option<char>,
}

impl HashtagScanner {
    pub fn new(policy: TagPolicy) -> Self {
        Self {
            policy,
            tags: BTreeSet::new(),
            prev: None,
        }
    }

    /// Forget the previous character. Called at block boundaries, line
    /// breaks and embedded media.
    pub fn break_run(&mut self) {
        self.prev = None;
    }

    /// Scan one text node, returning the text to show.
    pub fn scan<'t>(&mut self, text: &'t str) -> Cow<'t, str> {
        let mut cuts: Vec<(usize, usize)> = Vec::new();

        for caps in HASHTAG.captures_iter(text) {
            let (Some(token), Some(word)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let before = text[..token.start()].chars().next_back().or(self.prev);
            if before.is_some_and(is_word_char) {
                continue;
            }
            self.tags.insert(word.as_str().to_lowercase());

            if self.policy == TagPolicy::Remove {
                cuts.push(excision(text, token.start(), token.end(), cuts.last().map(|c| c.1)));
            }
        }

        if let Some(last) = text.chars().next_back() {
            self.prev = Some(last);
        }

        if cuts.is_empty() {
            return Cow::Borrowed(text);
        }

        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        for (start, end) in cuts {
            out.push_str(&text[pos..start]);
            pos = end;
        }
        out.push_str(&text[pos..]);
        Cow::Owned(out)
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn into_tags(self) -> BTreeSet<String> {
        self.tags
    }
}

/// Byte range to cut for a token at `start..end`: the token plus the
/// whitespace character before it, or failing that the one after it.
fn excision(text: &str, start: usize, end: usize, claimed: Option<usize>) -> (usize, usize) {
    if let Some(c) = text[..start].chars().next_back()
        && c.is_whitespace()
        && claimed.is_none_or(|claimed| claimed <= start - c.len_utf8())
    {
        return (start - c.len_utf8(), end);
    }
    if let Some(c) = text[end..].chars().next()
        && c.is_whitespace()
    {
        return (start, end + c.len_utf8());
    }
    (start, end)
}

/// Scan a single string and return its visible text plus tag set.
pub fn extract_hashtags(text: &str, policy: TagPolicy) -> (String, BTreeSet<String>) {
    let mut scanner = HashtagScanner::new(policy);
    let visible = scanner.scan(text).into_owned();
    (visible, scanner.into_tags())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn tags(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keep_leaves_text_alone() {
        let (text, found) = extract_hashtags("Back2 #hard #Sorting", TagPolicy::Keep);
        assert_eq!(text, "Back2 #hard #Sorting");
        assert_eq!(found, tags(&["hard", "sorting"]));
    }

    #[test]
    fn test_remove_cuts_one_adjacent_space() {
        assert_eq!(extract_hashtags("Back1 #easy", TagPolicy::Remove).0, "Back1");
        assert_eq!(extract_hashtags("Back2 #hard #sorting", TagPolicy::Remove).0, "Back2");
        assert_eq!(extract_hashtags("#tag front", TagPolicy::Remove).0, "front");
        assert_eq!(extract_hashtags("a #x b", TagPolicy::Remove).0, "a b");
        assert_eq!(extract_hashtags("#only", TagPolicy::Remove).0, "");
    }

    #[test]
    fn test_word_prefixed_hash_is_not_a_tag() {
        let (text, found) = extract_hashtags("C# and a#b but #real", TagPolicy::Remove);
        assert_eq!(found, tags(&["real"]));
        assert_eq!(text, "C# and a#b but");
    }

    #[test]
    fn test_previous_node_counts_as_preceding_text() {
        let mut scanner = HashtagScanner::new(TagPolicy::Keep);
        scanner.scan("word");
        scanner.scan("#glued");
        scanner.break_run();
        scanner.scan("#fresh");
        assert_eq!(scanner.tags(), &tags(&["fresh"]));
    }

    #[test]
    fn test_unicode_tags() {
        let (text, found) = extract_hashtags("über #straße", TagPolicy::Remove);
        assert_eq!(text, "über");
        assert_eq!(found, tags(&["straße"]));
    }

    proptest! {
        #[test]
        fn tag_set_does_not_depend_on_policy(text in "[a-z #_\\n]{0,40}") {
            let (_, kept) = extract_hashtags(&text, TagPolicy::Keep);
            let (_, removed) = extract_hashtags(&text, TagPolicy::Remove);
            prop_assert_eq!(kept, removed);
        }

        #[test]
        fn keep_never_changes_text(text in "\\PC{0,40}") {
            let (visible, _) = extract_hashtags(&text, TagPolicy::Keep);
            prop_assert_eq!(visible, text);
        }

        #[test]
        fn remove_only_shortens(text in "\\PC{0,40}") {
            let (visible, found) = extract_hashtags(&text, TagPolicy::Remove);
            prop_assert!(visible.len() <= text.len());
            if found.is_empty() {
                prop_assert_eq!(visible, text);
            }
        }
    }
}
