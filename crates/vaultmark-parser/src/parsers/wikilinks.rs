//! Wikilink scanning: `[[target]]` and `[[target|display]]`.
//!
//! This module does not know about code; callers decide which text is prose.

use regex::Regex;
use std::sync::LazyLock;

pub use vaultmark_core::parse_exact_wikilink as parse_exact;

/// The target cannot contain `[` or `]`, so `[[[a]]]` never yields `[a`.
static WIKILINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]\[|]+)(?:\|([^\]]+))?\]\]").unwrap());

/// A wikilink found in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    pub target: String,
    pub display_text: Option<String>,
    /// Byte offsets of the whole `[[...]]` token
    pub start: usize,
    pub end: usize,
}

/// Find every wikilink in a single line.
///
/// Unless `allow_triple` is set, a `[[` preceded by `[` is skipped so that
/// array-of-refs syntax like `[[[a]], [[b]]]` is left to the value parser.
pub fn find_all_in_line(line: &str, allow_triple: bool) -> Vec<WikiLink> {
    if !line.contains("[[") {
        return Vec::new();
    }

    let mut links = Vec::new();
    for caps in WIKILINK.captures_iter(line) {
        let (Some(full), Some(target)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !allow_triple && full.start() > 0 && line.as_bytes()[full.start() - 1] == b'[' {
            continue;
        }

        let target = target.as_str().trim();
        if target.is_empty() {
            continue;
        }

        links.push(WikiLink {
            target: target.to_string(),
            display_text: caps.get(2).map(|m| m.as_str().trim().to_string()),
            start: full.start(),
            end: full.end(),
        });
    }
    links
}

/// Every ref target inside a value string, including array-of-refs syntax.
pub fn extract_embedded_refs(value: &str) -> Vec<String> {
    find_all_in_line(value, true)
        .into_iter()
        .map(|link| link.target)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_simple_and_display() {
        let links = find_all_in_line("See [[people/freya]] and [[bifrost|The Bridge]].", false);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].target, "people/freya");
        assert_eq!(links[0].display_text, None);
        assert_eq!(links[0].start, 4);
        assert_eq!(links[0].end, 20);
        assert_eq!(links[1].target, "bifrost");
        assert_eq!(links[1].display_text.as_deref(), Some("The Bridge"));
    }

    #[test]
    fn test_trims_and_skips_empty() {
        let links = find_all_in_line("[[  spaced  | shown ]] [[ ]]", false);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, "spaced");
        assert_eq!(links[0].display_text.as_deref(), Some("shown"));
    }

    #[test]
    fn test_triple_brackets() {
        let line = "attendees=[[[people/freya]], [[people/thor]]]";
        let plain = find_all_in_line(line, false);
        assert_eq!(plain.len(), 1);
        assert_eq!(plain[0].target, "people/thor");

        let all = find_all_in_line(line, true);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].target, "people/freya");
    }

    #[test]
    fn test_extract_embedded_refs() {
        assert_eq!(
            extract_embedded_refs("[[[a]], [[b/c|C]]]"),
            vec!["a".to_string(), "b/c".to_string()]
        );
        assert!(extract_embedded_refs("no refs").is_empty());
    }

    #[test]
    fn test_parse_exact() {
        assert_eq!(parse_exact("[[x|y]]"), Some(("x", Some("y"))));
        assert_eq!(parse_exact("[[x]] trailing"), None);
    }
}
