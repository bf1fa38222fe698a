//! # Vaultmark Check
//!
//! Schema validation of parsed vault documents.
//!
//! ## Overview
//!
//! A [`Validator`] is built once per vault from the schema and the identity
//! of every object, then fed each [`ParsedDocument`](vaultmark_core::ParsedDocument).
//! Findings come back as [`Issue`]s tied to a file and line; vault-wide
//! findings (unused schema entries, naming collisions) come from
//! [`Validator::validate_schema`] once every document has been seen.
//!
//! ### Per-document checks
//!
//! - Parse diagnostics and duplicate object IDs
//! - Unknown types, typed embedded objects without an `id`
//! - Field values against their definitions, unknown frontmatter keys
//! - Required traits on an object or anywhere beneath it
//! - Trait values against their trait definitions
//! - References: missing, ambiguous, stale `#fragment`s, wrong target type,
//!   and short names that could be written as full paths
//!
//! ### Missing targets
//!
//! Every unresolved target is tracked with the type it should probably have
//! and a [`Confidence`] for that guess. A typed ref field gives a certain type,
//! a type's `default_path` an inferred one. Confidence only ever rises.
//!
//! ## Example
//!
//! ```
//! use vaultmark_check::{IssueKind, ObjectInfo, Validator};
//! use vaultmark_core::Schema;
//! use vaultmark_parser::{ParseOptions, parse_document};
//! use vaultmark_resolver::ResolverOptions;
//!
//! let schema = Schema::from_yaml_str(
//!     "types:\n  person:\n    default_path: people/\n    fields:\n      name: { type: string, required: true }\n",
//! )
//! .unwrap();
//!
//! let doc = parse_document(
//!     "---\ntype: person\n---\nFriends with [[people/loki]].\n",
//!     "people/freya.md",
//!     &ParseOptions::default(),
//! );
//! let objects: Vec<ObjectInfo> = doc.objects.iter().map(ObjectInfo::from).collect();
//!
//! let mut validator = Validator::new(&schema, &objects, ResolverOptions::default());
//! let issues = validator.validate_document(&doc);
//! let kinds: Vec<_> = issues.iter().map(|i| i.kind).collect();
//! assert_eq!(kinds, vec![IssueKind::MissingRequiredField, IssueKind::MissingReference]);
//!
//! let missing = validator.missing_refs();
//! assert_eq!(missing[0].inferred_type.as_deref(), Some("person"));
//! assert!(validator.validate_schema().is_empty());
//! ```

pub mod fields;
pub mod issues;
pub mod tracking;
pub mod traits;
mod validator;

pub use fields::{FieldError, RESERVED_KEYS, is_reserved_key, validate_field_value, validate_fields};
pub use issues::{CheckReport, Issue, IssueKind, SchemaIssue};
pub use tracking::{Confidence, MissingRef, UndefinedTrait, ValidationContext};
pub use traits::{TraitValueError, validate_trait_value};
pub use validator::{ObjectInfo, Validator};

pub mod prelude {
    pub use crate::{CheckReport, Confidence, Issue, IssueKind, ObjectInfo, SchemaIssue, Validator};
    pub use vaultmark_core::prelude::*;
    pub use vaultmark_resolver::{Resolver, ResolverOptions};
}
