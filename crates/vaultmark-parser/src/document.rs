//! Object assembly: turn one file's frontmatter, headings and declarations
//! into a [`ParsedDocument`].
//!
//! Objects come out in document order, file object first. Each heading opens
//! an object nested under the closest preceding heading of a lower level.
//! Traits and references are attached to the object with the greatest
//! `line_start` not after their line.

use std::collections::HashMap;
use vaultmark_core::paths::file_path_to_object_id;
use vaultmark_core::slugs::heading_slug;
use vaultmark_core::{
    FieldValue, Fields, ParseDiagnostic, ParsedDocument, ParsedObject, ParsedTrait, Reference,
};

use crate::engine::{ExtractedHeading, ParseEngine};
use crate::parsers::frontmatter_parser::{Frontmatter, parse_frontmatter, split_frontmatter};
use crate::parsers::wikilinks::find_all_in_line;

/// Directory roots stripped from file paths when computing object IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Root for typed objects, e.g. `objects/`
    pub objects_root: String,
    /// Root for untyped pages, e.g. `pages/`
    pub pages_root: String,
}

impl ParseOptions {
    pub fn new(objects_root: impl Into<String>, pages_root: impl Into<String>) -> Self {
        Self {
            objects_root: objects_root.into(),
            pages_root: pages_root.into(),
        }
    }
}

/// Parse one markdown file.
///
/// Never fails: malformed frontmatter and declarations are recorded in
/// `diagnostics` and the rest of the file is still extracted.
pub fn parse_document(content: &str, file_path: &str, options: &ParseOptions) -> ParsedDocument {
    let file_id = file_path_to_object_id(file_path, &options.objects_root, &options.pages_root);
    let mut diagnostics = Vec::new();
    let mut refs = Vec::new();

    let block = split_frontmatter(content);
    let frontmatter = match &block {
        Some(block) => match parse_frontmatter(block) {
            Ok(fm) => Some(fm),
            Err(e) => {
                log::warn!("Invalid frontmatter in {}: {}", file_path, e);
                diagnostics.push(ParseDiagnostic::new(1, e.reason()));
                None
            }
        },
        None => None,
    };
    let (body, body_start_line) = match &block {
        Some(block) => (&content[block.body_offset..], block.body_start_line()),
        None => (content, 1),
    };

    let Frontmatter {
        object_type,
        tags,
        fields,
        ..
    } = frontmatter.unwrap_or_default();

    let mut objects = vec![ParsedObject {
        id: file_id.clone(),
        object_type: object_type.unwrap_or_else(|| "page".to_string()),
        fields,
        tags: tags.clone(),
        heading: None,
        heading_level: None,
        parent_id: None,
        line_start: 1,
        line_end: None,
    }];

    // Frontmatter text starts on line 2, after the opening `---`.
    if let Some(block) = &block {
        for (idx, line) in block.raw.lines().enumerate() {
            for link in find_all_in_line(line, true) {
                refs.push(Reference {
                    source_id: file_id.clone(),
                    target_raw: link.target,
                    display_text: link.display_text,
                    line: idx + 2,
                    start: link.start,
                    end: link.end,
                });
            }
        }
    }

    let extraction = ParseEngine::with_start_line(body, body_start_line).extract();
    diagnostics.extend(extraction.diagnostics);

    assemble_headings(&file_id, extraction.headings, &mut objects);

    let traits = extraction
        .traits
        .into_iter()
        .map(|t| ParsedTrait {
            parent_object_id: find_parent_for_line(&objects, t.line).to_string(),
            trait_type: t.trait_name,
            value: t.value,
            content: t.content,
            line: t.line,
        })
        .collect();

    refs.extend(extraction.refs.into_iter().map(|r| Reference {
        source_id: find_parent_for_line(&objects, r.line).to_string(),
        target_raw: r.link.target,
        display_text: r.link.display_text,
        line: r.line,
        start: r.link.start,
        end: r.link.end,
    }));

    compute_line_ends(&mut objects);

    let doc = ParsedDocument {
        file_path: file_path.to_string(),
        objects,
        traits,
        refs,
        tags,
        diagnostics,
    };
    log::debug!(
        "Parsed {}: {} objects, {} traits, {} refs",
        doc.file_path,
        doc.objects.len(),
        doc.traits.len(),
        doc.refs.len()
    );
    doc
}

/// One object per heading, parents tracked with a level stack.
fn assemble_headings(file_id: &str, headings: Vec<ExtractedHeading>, objects: &mut Vec<ParsedObject>) {
    let mut used: HashMap<String, usize> = HashMap::new();
    let mut parents: Vec<(String, u8)> = vec![(file_id.to_string(), 0)];

    for ExtractedHeading {
        heading,
        declaration,
    } in headings
    {
        while parents.len() > 1 && parents.last().is_some_and(|(_, level)| *level >= heading.level)
        {
            parents.pop();
        }
        let parent_id = parents
            .last()
            .map(|(id, _)| id.clone())
            .unwrap_or_else(|| file_id.to_string());

        let (object_type, base, fields) = match declaration {
            Some(decl) => {
                let base = decl
                    .id
                    .clone()
                    .unwrap_or_else(|| slug_or(&heading.text, &decl.type_name));
                (decl.type_name, base, decl.fields)
            }
            None => {
                let mut fields = Fields::new();
                fields.insert("title".to_string(), FieldValue::string(&heading.text));
                fields.insert(
                    "level".to_string(),
                    FieldValue::Number(f64::from(heading.level)),
                );
                ("section".to_string(), slug_or(&heading.text, "section"), fields)
            }
        };

        let id = format!("{}#{}", file_id, unique_fragment(&mut used, base));
        parents.push((id.clone(), heading.level));

        objects.push(ParsedObject {
            id,
            object_type,
            fields,
            tags: Vec::new(),
            heading: Some(heading.text),
            heading_level: Some(heading.level),
            parent_id: Some(parent_id),
            line_start: heading.line,
            line_end: None,
        });
    }
}

fn slug_or(text: &str, fallback: &str) -> String {
    let slug = heading_slug(text);
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// The n-th repeat of a fragment gets `-n`; the first stays bare.
fn unique_fragment(used: &mut HashMap<String, usize>, base: String) -> String {
    let count = used.entry(base.clone()).or_insert(0);
    *count += 1;
    if *count > 1 {
        format!("{}-{}", base, count)
    } else {
        base
    }
}

/// ID of the object with the greatest `line_start <= line`.
///
/// A heading on line 1 shares its start with the file object; the heading wins.
pub fn find_parent_for_line(objects: &[ParsedObject], line: usize) -> &str {
    let mut best: Option<&ParsedObject> = None;
    for obj in objects {
        if obj.line_start <= line && best.is_none_or(|b| obj.line_start >= b.line_start) {
            best = Some(obj);
        }
    }
    best.or(objects.first()).map(|o| o.id.as_str()).unwrap_or("")
}

/// Each object ends the line before the next one starts; the last runs to end of file.
fn compute_line_ends(objects: &mut [ParsedObject]) {
    let starts: Vec<usize> = objects.iter().skip(1).map(|o| o.line_start).collect();
    for (obj, next_start) in objects.iter_mut().zip(starts) {
        obj.line_end = Some(next_start.saturating_sub(1));
    }
}
