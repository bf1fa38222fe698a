//! # Vaultmark Parser
//!
//! Extraction of vault markup from markdown, built on `pulldown-cmark`.
//!
//! This crate provides:
//! - A code-boundary scanner for fenced blocks and inline code spans
//! - Trait annotations: `@name` and `@name(value)`
//! - References: `[[target]]` and `[[target|display]]`
//! - Type declarations: `::type(key=value, ...)` with a round-trip serializer
//! - Frontmatter decoding into typed field values
//! - The object assembler that turns a file into a [`ParsedDocument`]
//!
//! Code is never markup: nothing inside fenced or indented code blocks or
//! inline code spans yields a trait or a reference.
//!
//! ## Architecture
//!
//! ### Phase 1: pulldown-cmark pass
//! - Headings (literal text only) and the declaration paragraph that follows each
//! - Prose text reassembled per source line, inline code re-wrapped
//!
//! ### Phase 2: line grammars
//! - Trait and wikilink regexes run over each reassembled line with inline
//!   code blanked out
//!
//! ### Phase 3: assembly
//! - File object from frontmatter, one object per heading, parents from the
//!   heading level stack, traits and references attached by line
//!
//! ## Quick Start
//!
//! ```
//! use vaultmark_parser::{ParseOptions, parse_document};
//!
//! let content = "---\ntype: project\n---\n# Kickoff\n::meeting(time=09:00)\n\n- @todo Email [[people/freya]]\n";
//!
//! let doc = parse_document(content, "projects/bifrost.md", &ParseOptions::default());
//! assert_eq!(doc.objects[0].id, "projects/bifrost");
//! assert_eq!(doc.objects[0].object_type, "project");
//! assert_eq!(doc.objects[1].id, "projects/bifrost#kickoff");
//! assert_eq!(doc.objects[1].object_type, "meeting");
//! assert_eq!(doc.traits[0].trait_type, "todo");
//! assert_eq!(doc.refs[0].target_raw, "people/freya");
//! ```
//!
//! ### Declarations round-trip
//!
//! ```
//! use vaultmark_parser::{parse_type_declaration, serialize_type_declaration};
//!
//! let decl = parse_type_declaration("::book(title=\"Dune, Part 1\", pages=412)", 1)
//!     .unwrap()
//!     .unwrap();
//! let line = serialize_type_declaration(&decl.type_name, &decl.fields);
//! assert_eq!(line, "::book(pages=412, title=\"Dune, Part 1\")");
//! ```

mod document;
mod engine;
pub mod parsers;

pub use document::{ParseOptions, find_parent_for_line, parse_document};
pub use engine::{ExtractedHeading, Extraction, LineRef, ParseEngine};
pub use parsers::Parser;
pub use parsers::fences::{FenceState, ProseLines, remove_inline_code, wrap_inline_code};
pub use parsers::traits::{TraitAnnotation, parse_trait_annotations, strip_trait_annotations};
pub use parsers::typedecl::{
    parse_arguments, parse_field_value, parse_trait_value, parse_type_declaration,
    serialize_field_value, serialize_type_declaration,
};
pub use parsers::wikilinks::{WikiLink, extract_embedded_refs, find_all_in_line};

// Re-export core types for consumers
pub use vaultmark_core::{LineIndex, ParsedDocument, TypeDeclaration};

/// Parse headings from content, skipping any inside code.
///
/// # Example
/// ```
/// use vaultmark_parser::parse_headings;
///
/// let headings = parse_headings("# Title\n\n```\n# not a heading\n```\n\n## Sub");
/// assert_eq!(headings.len(), 2);
/// assert_eq!(headings[1].text, "Sub");
/// ```
pub fn parse_headings(content: &str) -> Vec<vaultmark_core::Heading> {
    ParseEngine::new(content)
        .extract()
        .headings
        .into_iter()
        .map(|h| h.heading)
        .collect()
}

/// Commonly used parser items
pub mod prelude {
    pub use crate::{
        ParseEngine, ParseOptions, Parser, TraitAnnotation, WikiLink, find_all_in_line,
        parse_document, parse_trait_annotations, parse_type_declaration,
        serialize_type_declaration,
    };
    pub use vaultmark_core::prelude::*;
}
