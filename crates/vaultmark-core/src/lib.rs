//! # Vaultmark Core
//!
//! Core data models, error types, schema and configuration for the vaultmark markup engine.
//! This crate defines the canonical types that all other crates depend on.
//!
//! ## Core Modules
//!
//! - [`value`] - The [`FieldValue`] sum type carried by objects and traits
//! - [`models`] - Parsed documents: objects, traits, references, diagnostics
//! - [`schema`] - Type and trait definitions loaded from `schema.yaml`
//! - [`config`] - Vault configuration loaded from `vaultmark.yaml`
//! - [`error`] - Error types and Result alias
//! - [`slugs`], [`paths`], [`dates`] - Pure helper functions
//!
//! ## Usage Examples
//!
//! ```
//! use vaultmark_core::prelude::*;
//!
//! let schema = Schema::from_yaml_str(
//!     "types:\n  person:\n    fields:\n      name: { type: string, required: true }\n",
//! )
//! .unwrap();
//! assert!(schema.type_def("person").is_some());
//! assert!(schema.type_def("section").is_some());
//!
//! let id = file_path_to_object_id("people/freya.md", "", "");
//! assert_eq!(id, "people/freya");
//! ```

pub mod config;
pub mod dates;
pub mod error;
pub mod models;
pub mod paths;
pub mod schema;
pub mod slugs;
pub mod validation;
pub mod value;

pub use config::{CONFIG_FILE, Directories, VaultConfig, VaultConfigBuilder};
pub use error::{Error, Result};
pub use models::*;
pub use schema::{
    BUILTIN_TYPES, FieldDefinition, FieldType, SCHEMA_FILE, Schema, TraitDefinition,
    TypeDefinition, TypeTraitConfig, TypeTraits,
};
pub use validation::Severity;
pub use value::{FieldValue, format_number, parse_exact_wikilink};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::VaultConfig;
    pub use crate::dates::{is_valid_date, is_valid_datetime};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        Fields, Heading, LineIndex, ParseDiagnostic, ParsedDocument, ParsedObject, ParsedTrait,
        Reference, TypeDeclaration,
    };
    pub use crate::paths::{file_path_to_object_id, parse_embedded_id, short_name_from_id};
    pub use crate::schema::{FieldDefinition, FieldType, Schema, TraitDefinition, TypeDefinition};
    pub use crate::slugs::{component_slug, heading_slug, path_slug};
    pub use crate::validation::Severity;
    pub use crate::value::FieldValue;
}
