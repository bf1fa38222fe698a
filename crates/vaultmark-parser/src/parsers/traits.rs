//! Trait annotations: `@name` and `@name(value)`.
//!
//! The `@` must start the line or follow whitespace, a list marker, an
//! opening bracket, or `>`, so `foo@bar.com` is never a trait. Matching runs
//! on the line with inline code blanked out.

use regex::Regex;
use std::sync::LazyLock;
use vaultmark_core::FieldValue;

use super::fences::remove_inline_code;
use super::typedecl::parse_trait_value;

static TRAIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s\-\*\(\[\{>])@([\w-]+)(?:\(([^)]*)\))?").unwrap()
});

/// One trait annotation within a line.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitAnnotation {
    pub trait_name: String,
    /// `None` for bare `@name` and empty `@name()`
    pub value: Option<FieldValue>,
    /// The line with every trait annotation removed
    pub content: String,
    pub line: usize,
    /// Byte offsets of the `@name(...)` token
    pub start: usize,
    pub end: usize,
}

/// Byte ranges of every trait token in a line, without the prefix character.
fn trait_spans(line: &str) -> Vec<(usize, usize, regex::Captures<'_>)> {
    TRAIT
        .captures_iter(line)
        .filter_map(|caps| {
            let start = caps.get(1)?.start();
            let end = caps.get(0)?.end();
            // The name is always directly preceded by `@`.
            Some((start - 1, end, caps))
        })
        .collect()
}

/// Parse all trait annotations in a line.
pub fn parse_trait_annotations(line: &str, line_number: usize) -> Vec<TraitAnnotation> {
    if !line.contains('@') {
        return Vec::new();
    }

    let sanitized = remove_inline_code(line);
    let spans = trait_spans(&sanitized);
    if spans.is_empty() {
        return Vec::new();
    }

    let content = strip_trait_annotations(line);

    spans
        .into_iter()
        .map(|(start, end, caps)| {
            let value = caps
                .get(2)
                .map(|m| m.as_str().trim())
                .filter(|v| !v.is_empty())
                .map(parse_trait_value);

            TraitAnnotation {
                trait_name: caps[1].to_string(),
                value,
                content: content.clone(),
                line: line_number,
                start,
                end,
            }
        })
        .collect()
}

/// The line with every trait annotation removed and whitespace collapsed.
pub fn strip_trait_annotations(line: &str) -> String {
    let sanitized = remove_inline_code(line);
    let spans: Vec<_> = trait_spans(&sanitized)
        .into_iter()
        .map(|(s, e, _)| (s, e))
        .collect();
    strip_spans(line, spans.into_iter())
}

fn strip_spans(line: &str, spans: impl Iterator<Item = (usize, usize)>) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for (start, end) in spans {
        out.push_str(&line[last..start]);
        last = end;
    }
    out.push_str(&line[last..]);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
