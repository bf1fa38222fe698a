//! Document models produced by the parser and consumed by the resolver and validator.
//!
//! A [`ParsedDocument`] is built once per file and never mutated afterwards:
//! - `objects` starts with the file-level object, followed by one object per heading
//! - `traits` and `refs` are in document order, each tagged with its enclosing object

use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field map keyed by field name.
pub type Fields = BTreeMap<String, FieldValue>;

/// A markdown heading outside of code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// 1..=6
    pub level: u8,
    /// Literal text children only, trimmed
    pub text: String,
    pub line: usize,
}

/// A `::type(k=v, ...)` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub type_name: String,
    /// Explicit `id=` value, if one was given
    pub id: Option<String>,
    pub fields: Fields,
    pub line: usize,
}

/// One addressable unit: a whole file, a section, or a typed object under a heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedObject {
    pub id: String,
    pub object_type: String,
    pub fields: Fields,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub heading: Option<String>,
    pub heading_level: Option<u8>,
    pub parent_id: Option<String>,
    pub line_start: usize,
    /// Last line owned by this object; `None` for the final object (runs to end of file)
    pub line_end: Option<usize>,
}

impl ParsedObject {
    /// Whether this object is embedded under a heading rather than being the file itself.
    pub fn is_embedded(&self) -> bool {
        self.heading.is_some()
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// An inline `@name` or `@name(value)` annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTrait {
    pub trait_type: String,
    pub value: Option<FieldValue>,
    /// The source line with every trait annotation removed
    pub content: String,
    pub parent_object_id: String,
    pub line: usize,
}

impl ParsedTrait {
    pub fn has_value(&self) -> bool {
        self.value.as_ref().is_some_and(|v| !v.is_null())
    }

    /// Value as text, empty for marker traits.
    pub fn value_string(&self) -> String {
        self.value.as_ref().map(|v| v.to_string()).unwrap_or_default()
    }
}

/// A `[[target]]` or `[[target|display]]` occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Innermost object containing the reference
    pub source_id: String,
    pub target_raw: String,
    pub display_text: Option<String>,
    pub line: usize,
    /// Byte offsets of the whole `[[...]]` token within its line
    pub start: usize,
    pub end: usize,
}

/// A recovered extraction failure (malformed declaration, bad frontmatter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostic {
    pub line: usize,
    pub message: String,
}

impl ParseDiagnostic {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Everything extracted from one markdown file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Vault-relative path
    pub file_path: String,
    pub objects: Vec<ParsedObject>,
    pub traits: Vec<ParsedTrait>,
    pub refs: Vec<Reference>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParsedDocument {
    /// The file-level object.
    pub fn file_object(&self) -> Option<&ParsedObject> {
        self.objects.first()
    }

    pub fn object(&self, id: &str) -> Option<&ParsedObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Traits whose parent is `object_id`.
    pub fn traits_of<'a>(&'a self, object_id: &'a str) -> impl Iterator<Item = &'a ParsedTrait> {
        self.traits
            .iter()
            .filter(move |t| t.parent_object_id == object_id)
    }
}

/// Pre-computed line starts for O(log n) line/column lookup.
///
/// Build once per document, then use for all position lookups.
///
/// # Example
/// ```
/// use vaultmark_core::LineIndex;
///
/// let index = LineIndex::new("Line 1\nLine 2\nLine 3");
/// assert_eq!(index.line_col(7), (2, 1));
/// assert_eq!(index.line_of(15), 3);
/// ```
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets where each line starts (line 1 = index 0)
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Get (line, column) for a byte offset via binary search.
    ///
    /// Line numbers start at 1, column numbers start at 1.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line_idx = self.line_starts.partition_point(|&start| start <= offset);
        let line = line_idx.max(1);
        let line_start = self
            .line_starts
            .get(line_idx.saturating_sub(1))
            .copied()
            .unwrap_or(0);
        (line, offset - line_start + 1)
    }

    pub fn line_of(&self, offset: usize) -> usize {
        self.line_col(offset).0
    }

    /// Get the byte offset where a line starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        if line == 0 {
            return None;
        }
        self.line_starts.get(line - 1).copied()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
