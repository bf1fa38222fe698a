//! Markup extraction engine built on pulldown-cmark.
//!
//! The markdown tree decides what is code and what is prose:
//! - fenced and indented code blocks are skipped wholesale
//! - heading text is collected from literal text only
//! - a paragraph directly after a heading that starts with `::` is a type
//!   declaration for that heading and is not scanned further
//! - every other paragraph, list item and table cell is reassembled per
//!   source line, inline code re-wrapped in backticks, then scanned for
//!   traits and wikilinks
//! - reassembled lines that the line-level fence scanner places inside a
//!   fence are dropped as well, so a fence opened behind `>` or a list marker
//!   hides everything up to its closing line
//!
//! Line reassembly matters because pulldown-cmark splits text at `[`, so a
//! single `[[target]]` arrives as several text events.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::collections::{BTreeMap, HashSet};
use std::ops::Range;
use vaultmark_core::{Heading, LineIndex, ParseDiagnostic, TypeDeclaration};

use crate::parsers::fences::{ProseLines, remove_inline_code, wrap_inline_code};
use crate::parsers::traits::{TraitAnnotation, parse_trait_annotations};
use crate::parsers::typedecl::parse_type_declaration;
use crate::parsers::wikilinks::{WikiLink, find_all_in_line};

/// A heading plus the declaration attached to it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedHeading {
    pub heading: Heading,
    pub declaration: Option<TypeDeclaration>,
}

/// A wikilink found in prose, with its document line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRef {
    pub link: WikiLink,
    pub line: usize,
}

/// Everything the engine pulls out of a markdown body.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub headings: Vec<ExtractedHeading>,
    pub traits: Vec<TraitAnnotation>,
    pub refs: Vec<LineRef>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Single-pass extractor over one markdown body.
pub struct ParseEngine<'a> {
    content: &'a str,
    index: LineIndex,
    /// Document line of the first body line (after frontmatter)
    start_line: usize,
}

struct OpenHeading {
    level: u8,
    text: String,
    start: usize,
    /// Depth of inline markup (emphasis, links, ...) inside the heading
    nesting: usize,
}

impl<'a> ParseEngine<'a> {
    pub fn new(content: &'a str) -> Self {
        Self::with_start_line(content, 1)
    }

    /// Engine for a body that starts at `start_line` of its document.
    pub fn with_start_line(content: &'a str, start_line: usize) -> Self {
        Self {
            content,
            index: LineIndex::new(content),
            start_line: start_line.max(1),
        }
    }

    /// Document line of a byte offset in the body.
    fn line_of(&self, offset: usize) -> usize {
        self.start_line + self.index.line_of(offset) - 1
    }

    pub fn extract(&self) -> Extraction {
        let mut result = Extraction::default();
        let lines = self.walk(&mut result);
        let prose: HashSet<usize> = ProseLines::new(self.content, self.start_line)
            .map(|(line, _)| line)
            .collect();

        for (line, text) in lines {
            if !prose.contains(&line) {
                log::trace!("Line {} is fenced, skipping", line);
                continue;
            }
            result.traits.extend(parse_trait_annotations(&text, line));

            let sanitized = remove_inline_code(&text);
            let source = self.source_line(line).map(remove_inline_code);
            let mut from = 0;
            for mut link in find_all_in_line(&sanitized, false) {
                // Reassembly drops markup before a link; offsets are source columns.
                let token = &sanitized[link.start..link.end];
                if let Some(source) = &source
                    && let Some(pos) = source.get(from..).and_then(|rest| rest.find(token))
                {
                    link.start = from + pos;
                    link.end = link.start + token.len();
                    from = link.end;
                }
                result.refs.push(LineRef { link, line });
            }
        }

        log::debug!(
            "Extracted {} headings, {} traits, {} refs",
            result.headings.len(),
            result.traits.len(),
            result.refs.len()
        );
        result
    }

    /// Source text of a document line within the body, without its line ending.
    fn source_line(&self, line: usize) -> Option<&'a str> {
        let body_line = line.checked_sub(self.start_line)? + 1;
        let start = self.index.line_start(body_line)?;
        let rest = &self.content[start..];
        let end = rest.find('\n').unwrap_or(rest.len());
        Some(rest[..end].trim_end_matches('\r'))
    }

    /// Walk the markdown tree, collecting headings and declarations into
    /// `result` and returning prose text keyed by document line.
    fn walk(&self, result: &mut Extraction) -> BTreeMap<usize, String> {
        let mut opts = Options::empty();
        opts.insert(Options::ENABLE_TABLES);
        opts.insert(Options::ENABLE_STRIKETHROUGH);
        opts.insert(Options::ENABLE_TASKLISTS);

        let parser = Parser::new_ext(self.content, opts);

        let mut lines: BTreeMap<usize, String> = BTreeMap::new();
        let mut code_depth: usize = 0;
        let mut prose_depth: usize = 0;
        let mut heading: Option<OpenHeading> = None;
        let mut after_heading: Option<usize> = None;
        let mut in_declaration = false;

        for (event, range) in parser.into_offset_iter() {
            // Only the block directly after a heading can be its declaration.
            if let Some(idx) = after_heading.take()
                && matches!(event, Event::Start(Tag::Paragraph))
                && self.attach_declaration(range.clone(), idx, result)
            {
                in_declaration = true;
                continue;
            }

            if in_declaration {
                if matches!(event, Event::End(TagEnd::Paragraph)) {
                    in_declaration = false;
                }
                continue;
            }

            match event {
                // === Code blocks ===
                Event::Start(Tag::CodeBlock(_)) => code_depth += 1,
                Event::End(TagEnd::CodeBlock) => code_depth = code_depth.saturating_sub(1),
                _ if code_depth > 0 => {}

                // === Headings ===
                Event::Start(Tag::Heading { level, .. }) => {
                    heading = Some(OpenHeading {
                        level: heading_level(level),
                        text: String::new(),
                        start: range.start,
                        nesting: 0,
                    });
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(open) = heading.take() {
                        let text = open.text.trim();
                        if !text.is_empty() {
                            result.headings.push(ExtractedHeading {
                                heading: Heading {
                                    level: open.level,
                                    text: text.to_string(),
                                    line: self.line_of(open.start),
                                },
                                declaration: None,
                            });
                            after_heading = Some(result.headings.len() - 1);
                        }
                    }
                }
                Event::Start(_) if heading.is_some() => {
                    if let Some(open) = heading.as_mut() {
                        open.nesting += 1;
                    }
                }
                Event::End(_) if heading.is_some() => {
                    if let Some(open) = heading.as_mut() {
                        open.nesting = open.nesting.saturating_sub(1);
                    }
                }
                Event::Text(text) if heading.is_some() => {
                    if let Some(open) = heading.as_mut()
                        && open.nesting == 0
                    {
                        open.text.push_str(&text);
                    }
                }
                _ if heading.is_some() => {}

                // === Prose blocks ===
                Event::Start(Tag::TableCell) => {
                    // Cells on one row share a line; keep them apart.
                    prose_depth += 1;
                    self.push_text(&mut lines, range.start, " ");
                }
                Event::Start(Tag::Paragraph | Tag::Item) => prose_depth += 1,
                Event::End(TagEnd::Paragraph | TagEnd::Item | TagEnd::TableCell) => {
                    prose_depth = prose_depth.saturating_sub(1);
                }
                Event::Text(text) if prose_depth > 0 => {
                    self.push_text(&mut lines, range.start, &text);
                }
                Event::Code(code) if prose_depth > 0 => {
                    self.push_text(&mut lines, range.start, &wrap_inline_code(&code));
                }

                _ => {}
            }
        }

        lines
    }

    /// Append text to the line buffer, spreading embedded newlines over
    /// consecutive lines.
    fn push_text(&self, lines: &mut BTreeMap<usize, String>, offset: usize, text: &str) {
        let first = self.line_of(offset);
        for (i, piece) in text.split('\n').enumerate() {
            if piece.is_empty() && i > 0 {
                continue;
            }
            lines.entry(first + i).or_default().push_str(piece);
        }
    }

    /// Try to read the paragraph at `range` as a declaration for heading `idx`.
    ///
    /// Returns `true` when the paragraph is declaration-shaped and must not be
    /// scanned as prose, whether or not it parsed.
    fn attach_declaration(
        &self,
        range: Range<usize>,
        idx: usize,
        result: &mut Extraction,
    ) -> bool {
        let text = declaration_text(&self.content[range.clone()]);
        if !text.starts_with("::") {
            return false;
        }

        let line = self.line_of(range.start);
        match parse_type_declaration(&text, line) {
            Ok(Some(decl)) => {
                if let Some(extracted) = result.headings.get_mut(idx) {
                    extracted.declaration = Some(decl);
                }
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("Skipping malformed declaration on line {}: {}", line, e);
                result.diagnostics.push(ParseDiagnostic::new(line, e.reason()));
            }
        }
        true
    }
}

/// Paragraph source as one line: blockquote markers stripped, lines joined by spaces.
fn declaration_text(source: &str) -> String {
    source
        .lines()
        .map(|line| {
            let mut s = line.trim_start();
            while let Some(rest) = s.strip_prefix('>') {
                s = rest.trim_start();
            }
            s.trim_end()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultmark_core::FieldValue;

    fn extract(content: &str) -> Extraction {
        ParseEngine::new(content).extract()
    }

    fn trait_names(result: &Extraction) -> Vec<&str> {
        result.traits.iter().map(|t| t.trait_name.as_str()).collect()
    }

    fn ref_targets(result: &Extraction) -> Vec<&str> {
        result.refs.iter().map(|r| r.link.target.as_str()).collect()
    }

    #[test]
    fn test_headings() {
        let result = extract("# Heading 1\n\ntext\n\n## Heading 2\n\n### Heading 3");
        let headings: Vec<_> = result
            .headings
            .iter()
            .map(|h| (h.heading.level, h.heading.text.as_str(), h.heading.line))
            .collect();
        assert_eq!(
            headings,
            vec![(1, "Heading 1", 1), (2, "Heading 2", 5), (3, "Heading 3", 7)]
        );
    }

    #[test]
    fn test_heading_text_is_literal_only() {
        let result = extract("# Meeting with **Freya** and `code`\n\n#\n");
        assert_eq!(result.headings.len(), 1);
        assert_eq!(result.headings[0].heading.text, "Meeting with  and");
    }

    #[test]
    fn test_declaration_after_heading() {
        let content = "## Weekly Standup\n::meeting(id=standup, time=09:00)\n\n@todo follow up";
        let result = extract(content);

        let decl = result.headings[0].declaration.as_ref().unwrap();
        assert_eq!(decl.type_name, "meeting");
        assert_eq!(decl.id.as_deref(), Some("standup"));
        assert_eq!(decl.line, 2);
        assert_eq!(decl.fields.get("time"), Some(&FieldValue::string("09:00")));
        assert_eq!(trait_names(&result), vec!["todo"]);
    }

    #[test]
    fn test_declaration_with_refs_is_not_prose() {
        let content = "# Bifrost\n\n::project(owner=[[people/freya]], members=[[[a]], [[b]]])\n\nSee [[x]].";
        let result = extract(content);

        let decl = result.headings[0].declaration.as_ref().unwrap();
        assert_eq!(
            decl.fields.get("owner"),
            Some(&FieldValue::reference("people/freya"))
        );
        assert_eq!(
            decl.fields.get("members"),
            Some(&FieldValue::Array(vec![
                FieldValue::reference("a"),
                FieldValue::reference("b")
            ]))
        );
        assert_eq!(ref_targets(&result), vec!["x"]);
    }

    #[test]
    fn test_declaration_only_directly_after_heading() {
        let result = extract("# Title\n\nintro\n\n::meeting()\n");
        assert!(result.headings[0].declaration.is_none());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_malformed_declaration_is_a_diagnostic() {
        let result = extract("# Title\n::meeting(time=10\n\n@todo still here");
        assert!(result.headings[0].declaration.is_none());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].line, 2);
        assert_eq!(
            result.diagnostics[0].message,
            "invalid type declaration syntax: ::meeting(time=10"
        );
        assert_eq!(trait_names(&result), vec!["todo"]);
    }

    #[test]
    fn test_code_blocks_are_skipped() {
        let content = "@before [[a]]\n\n```\n@inside [[b]]\n```\n\n    @indented [[c]]\n\n@after [[d]]";
        let result = extract(content);
        assert_eq!(trait_names(&result), vec!["before", "after"]);
        assert_eq!(ref_targets(&result), vec!["a", "d"]);
    }

    #[test]
    fn test_fence_in_list_and_quote() {
        let content = "- item @one\n  ```\n  @two\n  ```\n\n> ```\n> @three [[q]]\n> ```\n\n> quoted @four";
        let result = extract(content);
        assert_eq!(trait_names(&result), vec!["one", "four"]);
        assert!(result.refs.is_empty());
    }

    #[test]
    fn test_fence_opened_in_quote_runs_past_it() {
        let content = "> ```\n> quoted\n@stray [[x]]\n> ```\n\n@after [[y]]";
        let result = extract(content);
        assert_eq!(trait_names(&result), vec!["after"]);
        assert_eq!(ref_targets(&result), vec!["y"]);
    }

    #[test]
    fn test_ref_offsets_are_source_columns() {
        let content = "- **Note** see [[people/freya|Freya]] and [[b]]\n\n> quoted `[[q]]` [[q]]";
        let result = extract(content);
        let spans: Vec<_> = result
            .refs
            .iter()
            .map(|r| (r.link.target.as_str(), r.line, r.link.start, r.link.end))
            .collect();
        assert_eq!(
            spans,
            vec![("people/freya", 1, 15, 37), ("b", 1, 42, 47), ("q", 3, 17, 22)]
        );
        assert_eq!(&content[15..37], "[[people/freya|Freya]]");
    }

    #[test]
    fn test_inline_code_is_kept_but_not_scanned() {
        let result = extract("@todo Use `foo()` and `[[not]]` with [[yes]]");
        assert_eq!(result.traits.len(), 1);
        assert_eq!(result.traits[0].content, "Use `foo()` and `[[not]]` with [[yes]]");
        assert_eq!(ref_targets(&result), vec!["yes"]);
    }

    #[test]
    fn test_lines_and_start_offset() {
        let content = "first [[a]]\nsecond @due(2025-01-01)\n\n- item [[b|B]]";
        let result = ParseEngine::with_start_line(content, 5).extract();

        let refs: Vec<_> = result
            .refs
            .iter()
            .map(|r| (r.link.target.as_str(), r.line))
            .collect();
        assert_eq!(refs, vec![("a", 5), ("b", 8)]);
        assert_eq!(result.refs[1].link.display_text.as_deref(), Some("B"));
        assert_eq!(result.traits[0].line, 6);
        assert_eq!(result.traits[0].value, Some(FieldValue::date("2025-01-01")));
    }

    #[test]
    fn test_table_cells() {
        let content = "| a | b |\n|---|---|\n| @x | [[t]] |\n";
        let result = extract(content);
        assert_eq!(trait_names(&result), vec!["x"]);
        assert_eq!(ref_targets(&result), vec!["t"]);
    }

    #[test]
    fn test_array_syntax_in_prose() {
        let result = extract("list [[[a]], [[b]]]");
        assert_eq!(ref_targets(&result), vec!["b"]);
    }

    #[test]
    fn test_declaration_text() {
        assert_eq!(declaration_text("> ::a(x=1,\n>   y=2)"), "::a(x=1, y=2)");
    }
}
