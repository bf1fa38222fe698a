//! Schema definitions loaded from `schema.yaml`.
//!
//! ```yaml
//! types:
//!   person:
//!     default_path: people/
//!     name_field: name
//!     fields:
//!       name: { type: string, required: true }
//!   project:
//!     traits: [due, priority]
//!     fields:
//!       owner: { type: ref, target: person }
//! traits:
//!   due: { type: date }
//!   priority: { type: enum, values: [low, medium, high], default: medium }
//!   highlight: { type: boolean }
//! ```
//!
//! The built-in types `page`, `section` and `date` are always present.

use crate::error::{Error, Result};
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// File name of the schema at the vault root.
pub const SCHEMA_FILE: &str = "schema.yaml";

/// Types every schema carries.
pub const BUILTIN_TYPES: [&str; 3] = ["page", "section", "date"];

/// The complete schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default)]
    pub types: BTreeMap<String, TypeDefinition>,
    #[serde(default)]
    pub traits: BTreeMap<String, TraitDefinition>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    /// A schema holding only the built-in types.
    pub fn new() -> Self {
        let mut schema = Schema {
            version: None,
            types: BTreeMap::new(),
            traits: BTreeMap::new(),
        };
        schema.install_builtins();
        schema
    }

    /// Load `schema.yaml` from a vault root; a missing file yields [`Schema::new`].
    pub fn load(vault_path: &Path) -> Result<Self> {
        let path = vault_path.join(SCHEMA_FILE);
        if !path.exists() {
            log::debug!("No schema at {}, using built-in types", path.display());
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_yaml_str(&content).map_err(|e| {
            Error::schema_error(format!("failed to parse {}: {}", path.display(), e.reason()))
        })
    }

    /// Parse schema YAML, install the built-ins and validate.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut schema: Schema = if yaml.trim().is_empty() {
            Schema::new()
        } else {
            serde_yaml::from_str(yaml)?
        };
        schema.install_builtins();
        schema.validate()?;
        Ok(schema)
    }

    /// Add `page` and `section` if absent; `date` is always reset to an empty type.
    fn install_builtins(&mut self) {
        self.types.entry("page".to_string()).or_default();
        self.types
            .entry("section".to_string())
            .or_insert_with(|| TypeDefinition {
                fields: BTreeMap::from([
                    ("title".to_string(), FieldDefinition::new(FieldType::String)),
                    (
                        "level".to_string(),
                        FieldDefinition {
                            min: Some(1.0),
                            max: Some(6.0),
                            ..FieldDefinition::new(FieldType::Number)
                        },
                    ),
                ]),
                ..Default::default()
            });
        self.types
            .insert("date".to_string(), TypeDefinition::default());
    }

    /// Structural checks that make the schema unusable if violated.
    pub fn validate(&self) -> Result<()> {
        for (type_name, def) in &self.types {
            let Some(name_field) = &def.name_field else {
                continue;
            };
            match def.fields.get(name_field) {
                Some(field) if field.field_type == FieldType::String => {}
                Some(field) => {
                    return Err(Error::schema_error(format!(
                        "type '{}': name_field '{}' must be a string field, found {}",
                        type_name, name_field, field.field_type
                    )));
                }
                None => {
                    return Err(Error::schema_error(format!(
                        "type '{}': name_field '{}' is not a declared field",
                        type_name, name_field
                    )));
                }
            }
        }

        for (trait_name, def) in &self.traits {
            if def.trait_type == Some(FieldType::Enum) && def.values.is_empty() {
                return Err(Error::schema_error(format!(
                    "trait '{}': enum traits need 'values'",
                    trait_name
                )));
            }
        }

        Ok(())
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn trait_def(&self, name: &str) -> Option<&TraitDefinition> {
        self.traits.get(name)
    }

    pub fn is_builtin_type(name: &str) -> bool {
        BUILTIN_TYPES.contains(&name)
    }
}

/// A type (person, meeting, project, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDefinition>,
    /// Directory new objects of this type are created in, e.g. `people/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_path: Option<String>,
    #[serde(default, skip_serializing_if = "TypeTraits::is_empty")]
    pub traits: TypeTraits,
    /// Field holding a display name that references may use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_field: Option<String>,
    /// Type detection rules; carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detect: Option<serde_yaml::Value>,
}

impl TypeDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }
}

/// Per-type trait configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeTraitConfig {
    #[serde(default)]
    pub required: bool,
    /// Overrides the trait-level default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
}

/// Traits attached to a type, written either as a list of names (all
/// optional) or as a map of name to [`TypeTraitConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "TypeTraitsRepr")]
pub struct TypeTraits {
    #[serde(flatten)]
    configs: BTreeMap<String, TypeTraitConfig>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeTraitsRepr {
    List(Vec<String>),
    Map(BTreeMap<String, Option<TypeTraitConfig>>),
}

impl From<TypeTraitsRepr> for TypeTraits {
    fn from(repr: TypeTraitsRepr) -> Self {
        let configs = match repr {
            TypeTraitsRepr::List(names) => names
                .into_iter()
                .map(|name| (name, TypeTraitConfig::default()))
                .collect(),
            TypeTraitsRepr::Map(map) => map
                .into_iter()
                .map(|(name, cfg)| (name, cfg.unwrap_or_default()))
                .collect(),
        };
        TypeTraits { configs }
    }
}

impl TypeTraits {
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn has_trait(&self, name: &str) -> bool {
        self.configs.contains_key(name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.configs.get(name).is_some_and(|c| c.required)
    }

    pub fn default_for(&self, name: &str) -> Option<&FieldValue> {
        self.configs.get(name).and_then(|c| c.default.as_ref())
    }

    /// Trait names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, config: TypeTraitConfig) {
        self.configs.insert(name.into(), config);
    }
}

/// A trait (`@due`, `@priority`, `@highlight`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitDefinition {
    /// Value type; absent or `bool`/`boolean` makes this a marker trait
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub trait_type: Option<FieldType>,
    /// Allowed values for enum traits
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
}

impl TraitDefinition {
    pub fn of_type(trait_type: FieldType) -> Self {
        Self {
            trait_type: Some(trait_type),
            ..Default::default()
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.trait_type, None | Some(FieldType::Bool))
    }

    pub fn is_date(&self) -> bool {
        self.trait_type == Some(FieldType::Date)
    }

    pub fn is_datetime(&self) -> bool {
        self.trait_type == Some(FieldType::Datetime)
    }

    pub fn is_enum(&self) -> bool {
        self.trait_type == Some(FieldType::Enum)
    }
}

/// A field within a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
    /// Allowed values for enum fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// Target type name for ref fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl FieldDefinition {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            default: None,
            values: Vec::new(),
            target: None,
            min: None,
            max: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_ref(&self) -> bool {
        matches!(self.field_type, FieldType::Ref | FieldType::RefArray)
    }
}

/// Field and trait value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    #[serde(rename = "string[]")]
    StringArray,
    Number,
    #[serde(rename = "number[]")]
    NumberArray,
    Date,
    #[serde(rename = "date[]")]
    DateArray,
    Datetime,
    Enum,
    #[serde(alias = "boolean")]
    Bool,
    Ref,
    #[serde(rename = "ref[]")]
    RefArray,
    Url,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::StringArray => "string[]",
            FieldType::Number => "number",
            FieldType::NumberArray => "number[]",
            FieldType::Date => "date",
            FieldType::DateArray => "date[]",
            FieldType::Datetime => "datetime",
            FieldType::Enum => "enum",
            FieldType::Bool => "bool",
            FieldType::Ref => "ref",
            FieldType::RefArray => "ref[]",
            FieldType::Url => "url",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
