//! Accumulators filled while documents are validated and read back once the
//! pass is over.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Example locations kept per undefined trait.
pub const MAX_EXAMPLE_LOCATIONS: usize = 5;

/// How sure we are about the type a missing target should have.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Unknown,
    /// Matched a type's `default_path`
    Inferred,
    /// Declared by the target of a typed ref field
    Certain,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Inferred => "inferred",
            Self::Certain => "certain",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference whose target does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingRef {
    pub target_path: String,
    pub source_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_object_id: Option<String>,
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inferred_type: Option<String>,
    pub confidence: Confidence,
    /// Ref field the target came from, when certain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_source: Option<String>,
}

/// A trait used in content but absent from the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndefinedTrait {
    pub trait_name: String,
    pub source_file: String,
    pub line: usize,
    /// Any usage carried a value
    pub has_value: bool,
    pub usage_count: usize,
    /// `file:line` of the first few usages
    pub locations: Vec<String>,
}

/// Everything a [`crate::Validator`] accumulates over one pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub used_types: BTreeSet<String>,
    pub used_traits: BTreeSet<String>,
    pub missing_refs: BTreeMap<String, MissingRef>,
    pub undefined_traits: BTreeMap<String, UndefinedTrait>,
    /// Short names written in references, for collision reporting
    pub used_short_names: BTreeSet<String>,
    /// Short references that resolved into a directory, with that target
    pub short_refs: BTreeMap<String, String>,
    /// Aliases claimed by more than one object
    pub duplicate_aliases: BTreeMap<String, Vec<String>>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a missing target.
    ///
    /// The first sighting of a target is kept, except that a certain sighting
    /// replaces the type information of a less certain one. A certain record
    /// never changes.
    pub fn record_missing_ref(&mut self, missing: MissingRef) {
        let Some(existing) = self.missing_refs.get_mut(&missing.target_path) else {
            self.missing_refs
                .insert(missing.target_path.clone(), missing);
            return;
        };

        if existing.confidence < Confidence::Certain && missing.confidence == Confidence::Certain {
            existing.inferred_type = missing.inferred_type;
            existing.confidence = Confidence::Certain;
            existing.field_source = missing.field_source;
            existing.source_object_id = missing.source_object_id;
        }
    }

    pub fn record_undefined_trait(
        &mut self,
        name: &str,
        source_file: &str,
        line: usize,
        has_value: bool,
    ) {
        let location = format!("{}:{}", source_file, line);

        if let Some(existing) = self.undefined_traits.get_mut(name) {
            existing.usage_count += 1;
            existing.has_value |= has_value;
            if existing.locations.len() < MAX_EXAMPLE_LOCATIONS {
                existing.locations.push(location);
            }
            return;
        }

        self.undefined_traits.insert(
            name.to_string(),
            UndefinedTrait {
                trait_name: name.to_string(),
                source_file: source_file.to_string(),
                line,
                has_value,
                usage_count: 1,
                locations: vec![location],
            },
        );
    }
}
