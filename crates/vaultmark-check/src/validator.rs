//! Per-document and vault-wide schema validation.

use crate::fields::{is_reserved_key, validate_fields};
use crate::issues::{CheckReport, Issue, IssueKind, SchemaIssue};
use crate::traits::validate_trait_value;
use crate::tracking::{Confidence, MissingRef, UndefinedTrait, ValidationContext};
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};
use vaultmark_core::paths::parse_embedded_id;
use vaultmark_core::slugs::component_slug;
use vaultmark_core::{
    FieldDefinition, FieldValue, ParsedDocument, ParsedObject, ParsedTrait, Reference, Schema,
    TypeDefinition,
};
use vaultmark_resolver::{AliasConflict, Resolver, ResolverOptions};

/// Identity of one object in the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub id: String,
    pub object_type: String,
}

impl ObjectInfo {
    pub fn new(id: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object_type: object_type.into(),
        }
    }
}

impl From<&ParsedObject> for ObjectInfo {
    fn from(object: &ParsedObject) -> Self {
        Self::new(object.id.clone(), object.object_type.clone())
    }
}

/// The ref field a reference came from.
#[derive(Clone, Copy)]
struct FieldContext<'f> {
    name: &'f str,
    target_type: Option<&'f str>,
}

/// Where a reference appears and what to do with it.
struct RefSite<'r> {
    file_path: &'r str,
    source_id: Option<&'r str>,
    raw: &'r str,
    line: usize,
    field: Option<FieldContext<'r>>,
    /// Emit issues; otherwise only track and check target types
    report: bool,
}

/// Validates parsed documents against a schema.
///
/// One value covers one pass over a vault: call [`Validator::validate_document`]
/// for every document, then [`Validator::validate_schema`] once.
pub struct Validator<'s> {
    schema: &'s Schema,
    resolver: Resolver,
    object_types: HashMap<String, String>,
    context: ValidationContext,
}

impl<'s> Validator<'s> {
    pub fn new(schema: &'s Schema, objects: &[ObjectInfo], options: ResolverOptions) -> Self {
        let resolver = Resolver::new(objects.iter().map(|o| o.id.as_str()), options);
        let object_types = objects
            .iter()
            .map(|o| (o.id.clone(), o.object_type.clone()))
            .collect();

        Self {
            schema,
            resolver,
            object_types,
            context: ValidationContext::new(),
        }
    }

    /// Aliases claimed by more than one object, reported by
    /// [`Validator::validate_schema`].
    pub fn with_duplicate_aliases(mut self, duplicates: BTreeMap<String, Vec<String>>) -> Self {
        self.context.duplicate_aliases = duplicates;
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    /// Validate every document, then the schema.
    pub fn check_all<'d, I>(&mut self, documents: I) -> CheckReport
    where
        I: IntoIterator<Item = &'d ParsedDocument>,
    {
        let mut report = CheckReport::new();
        for doc in documents {
            report.add_file(self.validate_document(doc));
        }
        for issue in self.validate_schema() {
            report.add_schema_issue(issue);
        }
        report
    }

    /// All findings for one document.
    pub fn validate_document(&mut self, doc: &ParsedDocument) -> Vec<Issue> {
        let mut issues = Vec::new();

        for diagnostic in &doc.diagnostics {
            issues.push(
                Issue::error(
                    IssueKind::ParseError,
                    &doc.file_path,
                    diagnostic.line,
                    diagnostic.message.clone(),
                )
                .with_fix_hint("Fix the syntax on this line"),
            );
        }

        let mut seen = HashSet::new();
        for object in &doc.objects {
            if !seen.insert(object.id.as_str()) {
                issues.push(
                    Issue::error(
                        IssueKind::DuplicateObjectId,
                        &doc.file_path,
                        object.line_start,
                        format!("Duplicate object ID '{}'", object.id),
                    )
                    .with_value(&object.id)
                    .with_fix_hint("Rename one of the duplicate objects"),
                );
            }
        }

        for object in &doc.objects {
            issues.extend(self.validate_object(doc, object));
        }

        for t in &doc.traits {
            issues.extend(self.validate_trait(&doc.file_path, t));
        }

        for reference in &doc.refs {
            issues.extend(self.validate_reference(&doc.file_path, reference));
        }

        debug!("Validated {}: {} issues", doc.file_path, issues.len());
        issues
    }

    fn validate_object(&mut self, doc: &ParsedDocument, object: &ParsedObject) -> Vec<Issue> {
        let file_path = doc.file_path.as_str();
        let mut issues = Vec::new();
        self.context.used_types.insert(object.object_type.clone());

        let schema = self.schema;
        let Some(type_def) = schema.type_def(&object.object_type) else {
            issues.push(
                Issue::error(
                    IssueKind::UnknownType,
                    file_path,
                    object.line_start,
                    format!("Unknown type '{}'", object.object_type),
                )
                .with_value(&object.object_type)
                .with_fix_command(format!("vaultmark schema add type {}", object.object_type))
                .with_fix_hint(format!("Add type '{}' to schema", object.object_type)),
            );
            return issues;
        };

        let typed_embedded = object.heading.is_some()
            && object.object_type != "section"
            && object.parent_id.is_some();
        if typed_embedded && !object.id.contains('#') {
            issues.push(
                Issue::error(
                    IssueKind::MissingEmbeddedId,
                    file_path,
                    object.line_start,
                    "Embedded object missing 'id' field",
                )
                .with_fix_hint("Add 'id' parameter to the embedded object declaration"),
            );
        }

        let field_hint = if object.is_embedded() {
            "Add the field to the object's type declaration"
        } else {
            "Add the required field to the file's frontmatter"
        };
        for error in validate_fields(&object.fields, &type_def.fields) {
            issues.push(
                Issue::error(
                    IssueKind::MissingRequiredField,
                    file_path,
                    object.line_start,
                    error.to_string(),
                )
                .with_value(error.field)
                .with_fix_hint(field_hint),
            );
        }

        for (field_name, def) in &type_def.fields {
            if !def.is_ref() {
                continue;
            }
            let Some(value) = object.field(field_name) else {
                continue;
            };
            issues.extend(self.validate_ref_field(doc, object, field_name, def, value));
        }

        for key in object.fields.keys() {
            if is_reserved_key(key) || type_def.fields.contains_key(key) {
                continue;
            }
            issues.push(
                Issue::error(
                    IssueKind::UnknownFrontmatterKey,
                    file_path,
                    object.line_start,
                    format!(
                        "Unknown frontmatter key '{}' for type '{}'",
                        key, object.object_type
                    ),
                )
                .with_value(key)
                .with_fix_command(format!(
                    "vaultmark schema add field {} {}",
                    object.object_type, key
                ))
                .with_fix_hint(format!(
                    "Add field '{}' to type '{}', or remove it from the file",
                    key, object.object_type
                )),
            );
        }

        issues.extend(self.check_required_traits(doc, object, type_def));
        issues
    }

    fn validate_ref_field(
        &mut self,
        doc: &ParsedDocument,
        object: &ParsedObject,
        field_name: &str,
        def: &FieldDefinition,
        value: &FieldValue,
    ) -> Vec<Issue> {
        let targets: Vec<&str> = match value.as_array() {
            Some(items) => items.iter().filter_map(FieldValue::as_str).collect(),
            None => value.as_str().into_iter().collect(),
        };

        let mut issues = Vec::new();
        for raw in targets {
            // Wikilinks are validated in the reference pass
            let written_as_link = doc.refs.iter().any(|r| r.target_raw == raw);
            if written_as_link && def.target.is_none() {
                continue;
            }
            issues.extend(self.check_ref(RefSite {
                file_path: &doc.file_path,
                source_id: Some(&object.id),
                raw,
                line: object.line_start,
                field: Some(FieldContext {
                    name: field_name,
                    target_type: def.target.as_deref(),
                }),
                report: !written_as_link,
            }));
        }
        issues
    }

    fn check_required_traits(
        &self,
        doc: &ParsedDocument,
        object: &ParsedObject,
        type_def: &TypeDefinition,
    ) -> Vec<Issue> {
        let mut issues = Vec::new();

        for name in type_def.traits.names() {
            if !type_def.traits.is_required(name) || type_def.traits.default_for(name).is_some() {
                continue;
            }
            if self
                .schema
                .trait_def(name)
                .is_some_and(|def| def.default.is_some())
            {
                continue;
            }

            let present = doc
                .traits
                .iter()
                .any(|t| t.trait_type == name && is_within(doc, &t.parent_object_id, &object.id));
            if !present {
                issues.push(
                    Issue::error(
                        IssueKind::MissingRequiredTrait,
                        &doc.file_path,
                        object.line_start,
                        format!(
                            "Missing required trait '@{}' for type '{}'",
                            name, object.object_type
                        ),
                    )
                    .with_value(name)
                    .with_fix_hint(format!("Add @{} to the object's content", name)),
                );
            }
        }

        issues
    }

    fn validate_trait(&mut self, file_path: &str, t: &ParsedTrait) -> Vec<Issue> {
        let name = t.trait_type.as_str();
        self.context.used_traits.insert(name.to_string());

        let Some(def) = self.schema.trait_def(name) else {
            self.context
                .record_undefined_trait(name, file_path, t.line, t.has_value());
            return vec![
                Issue::warning(
                    IssueKind::UndefinedTrait,
                    file_path,
                    t.line,
                    format!("Undefined trait '@{}'", name),
                )
                .with_value(name)
                .with_fix_command(format!("vaultmark schema add trait {}", name))
                .with_fix_hint(format!("Add trait '{}' to schema", name)),
            ];
        };

        let value = match &t.value {
            Some(value) if !value.is_null() => value,
            _ => {
                if def.is_boolean() || def.default.is_some() {
                    return Vec::new();
                }
                return vec![
                    Issue::warning(
                        IssueKind::InvalidTraitValue,
                        file_path,
                        t.line,
                        format!("Trait '@{}' expects a value", name),
                    )
                    .with_value(name)
                    .with_fix_hint(format!("Add a value: @{}(<value>)", name)),
                ];
            }
        };

        match validate_trait_value(name, def, value) {
            Ok(()) => Vec::new(),
            Err(err) => {
                let mut issue = Issue::error(
                    err.kind,
                    file_path,
                    t.line,
                    format!("Invalid value for trait '@{}': {}", name, err.message),
                )
                .with_value(t.value_string());
                if let Some(hint) = err.hint {
                    issue = issue.with_fix_hint(hint);
                }
                vec![issue]
            }
        }
    }

    fn validate_reference(&mut self, file_path: &str, reference: &Reference) -> Vec<Issue> {
        self.check_ref(RefSite {
            file_path,
            source_id: Some(&reference.source_id),
            raw: &reference.target_raw,
            line: reference.line,
            field: None,
            report: true,
        })
    }

    fn check_ref(&mut self, site: RefSite<'_>) -> Vec<Issue> {
        let raw = site.raw.trim();
        let result = self.resolver.resolve(raw);
        let mut issues = Vec::new();

        if !raw.contains('/') && !raw.contains('#') {
            self.context.used_short_names.insert(raw.to_string());
            self.context.used_short_names.insert(component_slug(raw));
        }

        if result.ambiguous {
            if site.report {
                issues.push(
                    Issue::error(
                        IssueKind::AmbiguousReference,
                        site.file_path,
                        site.line,
                        format!(
                            "Reference [[{}]] is ambiguous (matches: {})",
                            raw,
                            result.labeled_matches().join(", ")
                        ),
                    )
                    .with_value(raw)
                    .with_fix_hint("Use a more specific path to disambiguate"),
                );
            }
            return issues;
        }

        let Some(target_id) = result.target_id.as_deref() else {
            self.report_unresolved(&site, raw, &mut issues);
            return issues;
        };

        if site.report && !raw.contains('/') && target_id.contains('/') {
            self.context
                .short_refs
                .insert(raw.to_string(), target_id.to_string());
            issues.push(
                Issue::warning(
                    IssueKind::ShortRefCouldBeFullPath,
                    site.file_path,
                    site.line,
                    format!(
                        "Short reference [[{}]] could be written as [[{}]] for clarity",
                        raw, target_id
                    ),
                )
                .with_value(raw)
                .with_fix_hint(format!("Consider using full path: [[{}]]", target_id)),
            );
        }

        if let Some(field) = site.field
            && let Some(expected) = field.target_type
            && let Some(actual) = self.object_types.get(target_id)
            && actual != expected
        {
            issues.push(
                Issue::error(
                    IssueKind::WrongTargetType,
                    site.file_path,
                    site.line,
                    format!(
                        "Field '{}' expects type '{}', but [[{}]] is type '{}'",
                        field.name, expected, raw, actual
                    ),
                )
                .with_value(raw)
                .with_fix_hint(format!(
                    "Reference a '{}' object instead, or change the field's target type",
                    expected
                )),
            );
        }

        issues
    }

    fn report_unresolved(&mut self, site: &RefSite<'_>, raw: &str, issues: &mut Vec<Issue>) {
        if let Some((base, fragment)) = parse_embedded_id(raw)
            && let Some(base_id) = self.resolver.resolve(base).target_id
        {
            if site.report {
                issues.push(
                    Issue::warning(
                        IssueKind::StaleFragment,
                        site.file_path,
                        site.line,
                        format!(
                            "Reference [[{}]] points to a missing section '#{}' in [[{}]]",
                            raw, fragment, base_id
                        ),
                    )
                    .with_value(raw)
                    .with_fix_hint(format!(
                        "The heading may have been renamed; link to [[{}]] or update the fragment",
                        base_id
                    )),
                );
            }
            return;
        }

        let certain = site.field.and_then(|f| f.target_type);
        let (inferred_type, confidence) = match certain {
            Some(t) => (Some(t.to_string()), Confidence::Certain),
            None => self.infer_type_from_path(raw),
        };

        if site.report {
            let mut issue = Issue::error(
                IssueKind::MissingReference,
                site.file_path,
                site.line,
                format!("Reference [[{}]] not found", raw),
            )
            .with_value(raw);
            issue = match (&inferred_type, confidence) {
                (Some(t), Confidence::Certain) => issue
                    .with_fix_command(format!("vaultmark new {} \"{}\"", t, raw))
                    .with_fix_hint(format!("Create the missing {}", t)),
                (Some(t), Confidence::Inferred) => issue
                    .with_fix_command(format!("vaultmark new {} \"{}\"", t, raw))
                    .with_fix_hint(format!("Create the missing {} (inferred from path)", t)),
                _ => issue.with_fix_hint("Create the missing page with 'vaultmark new <type> <title>'"),
            };
            issues.push(issue);
        }

        self.context.record_missing_ref(MissingRef {
            target_path: raw.to_string(),
            source_file: site.file_path.to_string(),
            source_object_id: site.source_id.map(str::to_string),
            line: site.line,
            inferred_type,
            confidence,
            field_source: match confidence {
                Confidence::Certain => site.field.map(|f| f.name.to_string()),
                _ => None,
            },
        });
    }

    /// A type whose `default_path` is a proper prefix of the target.
    fn infer_type_from_path(&self, target: &str) -> (Option<String>, Confidence) {
        for (name, def) in &self.schema.types {
            let Some(prefix) = def.default_path.as_deref() else {
                continue;
            };
            let prefix = prefix.trim_start_matches('/');
            if prefix.is_empty() {
                continue;
            }
            if target.len() > prefix.len() && target.starts_with(prefix) {
                return (Some(name.clone()), Confidence::Inferred);
            }
        }
        (None, Confidence::Unknown)
    }

    /// Vault-wide findings; call after every document has been validated.
    pub fn validate_schema(&self) -> Vec<SchemaIssue> {
        let mut issues = Vec::new();
        let schema = self.schema;

        for name in schema.types.keys() {
            if Schema::is_builtin_type(name) || self.context.used_types.contains(name) {
                continue;
            }
            issues.push(
                SchemaIssue::warning(
                    IssueKind::UnusedType,
                    format!("Type '{}' is defined in schema but never used", name),
                )
                .with_value(name)
                .with_fix_hint(format!(
                    "Create a file with 'type: {}' or remove the type from schema",
                    name
                )),
            );
        }

        for name in schema.traits.keys() {
            if self.context.used_traits.contains(name) {
                continue;
            }
            issues.push(
                SchemaIssue::warning(
                    IssueKind::UnusedTrait,
                    format!("Trait '@{}' is defined in schema but never used", name),
                )
                .with_value(name)
                .with_fix_hint(format!(
                    "Use @{} in a file or remove the trait from schema",
                    name
                )),
            );
        }

        for (type_name, def) in &schema.types {
            for (field_name, field) in &def.fields {
                let Some(target) = field.target.as_deref() else {
                    continue;
                };
                if !field.is_ref() || schema.type_def(target).is_some() {
                    continue;
                }
                issues.push(
                    SchemaIssue::error(
                        IssueKind::MissingTargetType,
                        format!(
                            "Field '{}.{}' references non-existent type '{}'",
                            type_name, field_name, target
                        ),
                    )
                    .with_value(target)
                    .with_fix_command(format!("vaultmark schema add type {}", target))
                    .with_fix_hint(format!(
                        "Add type '{}' to schema or change the target",
                        target
                    )),
                );
            }
        }

        for (type_name, def) in &schema.types {
            for (field_name, field) in &def.fields {
                let self_referential =
                    field.is_ref() && field.target.as_deref() == Some(type_name.as_str());
                if field.required && field.default.is_none() && self_referential {
                    issues.push(
                        SchemaIssue::warning(
                            IssueKind::SelfReferentialRequired,
                            format!(
                                "Type '{}' has required field '{}' that references itself - impossible to create first instance",
                                type_name, field_name
                            ),
                        )
                        .with_value(format!("{}.{}", type_name, field_name))
                        .with_fix_hint(
                            "Make the field optional (required: false) or add a default value",
                        ),
                    );
                }
            }
        }

        for collision in self.resolver.find_collisions() {
            if !self.context.used_short_names.contains(&collision.short_name) {
                continue;
            }
            issues.push(
                SchemaIssue::warning(
                    IssueKind::IdCollision,
                    format!(
                        "Short name '{}' is shared by {} objects: {}",
                        collision.short_name,
                        collision.object_ids.len(),
                        collision.object_ids.join(", ")
                    ),
                )
                .with_value(&collision.short_name)
                .with_fix_hint(format!(
                    "Use full paths when referencing '{}'",
                    collision.short_name
                )),
            );
        }

        for collision in self.resolver.find_alias_collisions() {
            let (target, others) = collision
                .object_ids
                .split_first()
                .map(|(first, rest)| (first.as_str(), rest.join(", ")))
                .unwrap_or_default();
            let message = match collision.conflicts_with {
                AliasConflict::ShortName => format!(
                    "Alias '{}' of [[{}]] conflicts with the short name of {}",
                    collision.alias, target, others
                ),
                AliasConflict::ObjectId => format!(
                    "Alias '{}' of [[{}]] conflicts with object ID '{}'",
                    collision.alias, target, collision.alias
                ),
            };
            issues.push(
                SchemaIssue::error(IssueKind::AliasCollision, message)
                    .with_value(&collision.alias)
                    .with_fix_hint("Rename the alias so references to it stay unambiguous"),
            );
        }

        for (alias, ids) in &self.context.duplicate_aliases {
            issues.push(
                SchemaIssue::error(
                    IssueKind::DuplicateAlias,
                    format!(
                        "Alias '{}' is used by multiple objects: {}",
                        alias,
                        ids.join(", ")
                    ),
                )
                .with_value(alias)
                .with_fix_hint("Keep the alias on a single object"),
            );
        }

        issues
    }

    /// Missing targets, sorted by target path.
    pub fn missing_refs(&self) -> Vec<&MissingRef> {
        self.context.missing_refs.values().collect()
    }

    /// Undefined traits, sorted by name.
    pub fn undefined_traits(&self) -> Vec<&UndefinedTrait> {
        self.context.undefined_traits.values().collect()
    }

    /// Short references that could be written as full paths.
    pub fn short_refs(&self) -> &BTreeMap<String, String> {
        &self.context.short_refs
    }
}

/// `id` is `ancestor` or nested somewhere below it.
fn is_within(doc: &ParsedDocument, id: &str, ancestor: &str) -> bool {
    let mut current = Some(id);
    while let Some(candidate) = current {
        if candidate == ancestor {
            return true;
        }
        current = doc.object(candidate).and_then(|o| o.parent_id.as_deref());
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(id: &str, object_type: &str) -> ParsedObject {
        ParsedObject {
            id: id.to_string(),
            object_type: object_type.to_string(),
            fields: Default::default(),
            tags: Vec::new(),
            heading: None,
            heading_level: None,
            parent_id: None,
            line_start: 1,
            line_end: None,
        }
    }

    fn document(file_path: &str, objects: Vec<ParsedObject>) -> ParsedDocument {
        ParsedDocument {
            file_path: file_path.to_string(),
            objects,
            ..Default::default()
        }
    }

    fn reference(source: &str, raw: &str, line: usize) -> Reference {
        Reference {
            source_id: source.to_string(),
            target_raw: raw.to_string(),
            display_text: None,
            line,
            start: 0,
            end: raw.len() + 4,
        }
    }

    fn schema(yaml: &str) -> Schema {
        Schema::from_yaml_str(yaml).unwrap()
    }

    fn infos(ids: &[(&str, &str)]) -> Vec<ObjectInfo> {
        ids.iter().map(|(id, t)| ObjectInfo::new(*id, *t)).collect()
    }

    fn kinds(issues: &[Issue]) -> Vec<IssueKind> {
        issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_unknown_type_short_circuits() {
        let schema = Schema::new();
        let mut validator = Validator::new(&schema, &[], ResolverOptions::default());
        let mut obj = object("notes/a", "recipe");
        obj.fields.insert("servings".into(), FieldValue::Number(2.0));

        let issues = validator.validate_document(&document("notes/a.md", vec![obj]));
        assert_eq!(kinds(&issues), vec![IssueKind::UnknownType]);
        assert_eq!(
            issues[0].fix_command.as_deref(),
            Some("vaultmark schema add type recipe")
        );
    }

    #[test]
    fn test_unknown_keys_and_reserved_keys() {
        let schema = schema("types:\n  person:\n    fields:\n      name: { type: string }\n");
        let mut validator = Validator::new(&schema, &[], ResolverOptions::default());
        let mut obj = object("people/freya", "person");
        for (key, value) in [
            ("name", FieldValue::string("Freya")),
            ("alias", FieldValue::string("The Queen")),
            ("id", FieldValue::string("freya")),
            ("mood", FieldValue::string("fierce")),
        ] {
            obj.fields.insert(key.into(), value);
        }

        let issues = validator.validate_document(&document("people/freya.md", vec![obj]));
        assert_eq!(kinds(&issues), vec![IssueKind::UnknownFrontmatterKey]);
        assert_eq!(
            issues[0].fix_command.as_deref(),
            Some("vaultmark schema add field person mood")
        );
    }

    #[test]
    fn test_duplicate_ids_and_parse_diagnostics() {
        let schema = Schema::new();
        let mut validator = Validator::new(&schema, &[], ResolverOptions::default());
        let mut doc = document(
            "notes/a.md",
            vec![object("notes/a", "page"), object("notes/a", "page")],
        );
        doc.diagnostics
            .push(vaultmark_core::ParseDiagnostic::new(4, "unterminated quote"));

        let issues = validator.validate_document(&doc);
        assert_eq!(
            kinds(&issues),
            vec![IssueKind::ParseError, IssueKind::DuplicateObjectId]
        );
        assert_eq!(issues[0].line, 4);
    }

    #[test]
    fn test_typed_embedded_object_needs_fragment() {
        let schema = schema("types:\n  meeting: {}\n");
        let mut validator = Validator::new(&schema, &[], ResolverOptions::default());
        let mut obj = object("notes/a", "meeting");
        obj.heading = Some("Standup".into());
        obj.parent_id = Some("notes/a".into());

        let issues = validator.validate_document(&document("notes/a.md", vec![obj]));
        assert_eq!(kinds(&issues), vec![IssueKind::MissingEmbeddedId]);
    }

    #[test]
    fn test_required_traits() {
        let schema = schema(
            "types:\n  project:\n    traits:\n      due: { required: true }\n      priority: { required: true }\ntraits:\n  due: { type: date }\n  priority: { type: enum, values: [low, high], default: low }\n",
        );
        let mut validator = Validator::new(&schema, &[], ResolverOptions::default());
        let mut section = object("projects/bifrost#plan", "section");
        section.parent_id = Some("projects/bifrost".into());
        section.line_start = 3;
        section.fields.insert("title".into(), FieldValue::string("Plan"));
        section.fields.insert("level".into(), FieldValue::Number(2.0));
        let mut doc = document(
            "projects/bifrost.md",
            vec![object("projects/bifrost", "project"), section],
        );

        let issues = validator.validate_document(&doc);
        assert_eq!(kinds(&issues), vec![IssueKind::MissingRequiredTrait]);
        assert_eq!(issues[0].value.as_deref(), Some("due"));

        doc.traits.push(ParsedTrait {
            trait_type: "due".into(),
            value: Some(FieldValue::date("2025-03-01")),
            content: "Ship".into(),
            parent_object_id: "projects/bifrost#plan".into(),
            line: 4,
        });
        let mut validator = Validator::new(&schema, &[], ResolverOptions::default());
        assert!(validator.validate_document(&doc).is_empty());
    }

    #[test]
    fn test_trait_checks() {
        let schema = schema(
            "traits:\n  due: { type: date }\n  priority: { type: enum, values: [low, high] }\n  remind: { type: datetime, default: '2025-01-01T09:00' }\n  done: {}\n",
        );
        let mut validator = Validator::new(&schema, &[], ResolverOptions::default());
        let mut doc = document("notes/a.md", vec![object("notes/a", "page")]);
        let traits = [
            ("due", Some(FieldValue::string("soon"))),
            ("due", None),
            ("priority", Some(FieldValue::string("urgent"))),
            ("remind", None),
            ("done", None),
            ("mood", Some(FieldValue::string("happy"))),
            ("mood", None),
        ];
        for (line, (name, value)) in traits.into_iter().enumerate() {
            doc.traits.push(ParsedTrait {
                trait_type: name.into(),
                value,
                content: String::new(),
                parent_object_id: "notes/a".into(),
                line: line + 1,
            });
        }

        let issues = validator.validate_document(&doc);
        let summary: Vec<_> = issues.iter().map(|i| (i.kind, i.level, i.line)).collect();
        use vaultmark_core::Severity::{Error, Warning};
        assert_eq!(
            summary,
            vec![
                (IssueKind::InvalidDateFormat, Error, 1),
                (IssueKind::InvalidTraitValue, Warning, 2),
                (IssueKind::InvalidEnumValue, Error, 3),
                (IssueKind::UndefinedTrait, Warning, 6),
                (IssueKind::UndefinedTrait, Warning, 7),
            ]
        );
        insta::assert_snapshot!(issues[2].message, @r#"Invalid value for trait '@priority': invalid enum value "urgent" (allowed: low, high)"#);

        let mood = &validator.undefined_traits()[0];
        assert_eq!(mood.usage_count, 2);
        assert!(mood.has_value);
        assert_eq!(mood.locations, vec!["notes/a.md:6", "notes/a.md:7"]);
    }

    #[test]
    fn test_reference_outcomes() {
        let schema = schema("types:\n  person:\n    default_path: people/\n");
        let objects = infos(&[
            ("people/freya", "person"),
            ("gods/thor", "person"),
            ("people/thor", "person"),
            ("notes/a", "page"),
        ]);
        let mut validator = Validator::new(&schema, &objects, ResolverOptions::default());
        let mut doc = document("notes/a.md", vec![object("notes/a", "page")]);
        doc.refs = vec![
            reference("notes/a", "people/freya", 2),
            reference("notes/a", "freya", 3),
            reference("notes/a", "thor", 4),
            reference("notes/a", "people/loki", 5),
            reference("notes/a", "places/midgard", 6),
            reference("notes/a", "people/freya#childhood", 7),
        ];

        let issues = validator.validate_document(&doc);
        assert_eq!(
            kinds(&issues),
            vec![
                IssueKind::ShortRefCouldBeFullPath,
                IssueKind::AmbiguousReference,
                IssueKind::MissingReference,
                IssueKind::MissingReference,
                IssueKind::StaleFragment,
            ]
        );
        insta::assert_snapshot!(issues[1].message, @"Reference [[thor]] is ambiguous (matches: gods/thor (short name), people/thor (short name))");
        assert_eq!(
            issues[2].fix_command.as_deref(),
            Some("vaultmark new person \"people/loki\"")
        );
        assert_eq!(issues[3].fix_command, None);
        assert_eq!(issues[4].level, vaultmark_core::Severity::Warning);

        let missing: Vec<_> = validator
            .missing_refs()
            .iter()
            .map(|m| (m.target_path.as_str(), m.confidence))
            .collect();
        assert_eq!(
            missing,
            vec![
                ("people/loki", Confidence::Inferred),
                ("places/midgard", Confidence::Unknown),
            ]
        );
        assert_eq!(validator.short_refs()["freya"], "people/freya");
    }

    #[test]
    fn test_full_path_suggested_for_any_match_source() {
        let schema = schema("");
        let objects = infos(&[
            ("people/freya", "person"),
            ("daily/2025-02-01", "date"),
            ("notes/a", "page"),
        ]);
        let options = ResolverOptions::new()
            .with_alias("The Queen", "people/freya")
            .with_name_field("Lady of Folkvangr", "people/freya");
        let mut validator = Validator::new(&schema, &objects, options);
        let mut doc = document("notes/a.md", vec![object("notes/a", "page")]);
        doc.refs = vec![
            reference("notes/a", "The Queen", 2),
            reference("notes/a", "Lady of Folkvangr", 3),
            reference("notes/a", "2025-02-01", 4),
        ];

        let issues = validator.validate_document(&doc);
        let summary: Vec<_> = issues.iter().map(|i| (i.kind, i.line)).collect();
        assert_eq!(
            summary,
            vec![
                (IssueKind::ShortRefCouldBeFullPath, 2),
                (IssueKind::ShortRefCouldBeFullPath, 3),
                (IssueKind::ShortRefCouldBeFullPath, 4),
            ]
        );
        insta::assert_snapshot!(issues[2].message, @"Short reference [[2025-02-01]] could be written as [[daily/2025-02-01]] for clarity");
        assert_eq!(validator.short_refs()["The Queen"], "people/freya");
        assert_eq!(validator.short_refs()["2025-02-01"], "daily/2025-02-01");
    }

    #[test]
    fn test_ref_fields_with_target_types() {
        let schema = schema(
            "types:\n  person: {}\n  project:\n    fields:\n      owner: { type: ref, target: person }\n      related: { type: 'ref[]' }\n",
        );
        let objects = infos(&[
            ("people/freya", "person"),
            ("projects/bifrost", "project"),
            ("projects/other", "project"),
        ]);
        let mut validator = Validator::new(&schema, &objects, ResolverOptions::default());

        let mut project = object("projects/bifrost", "project");
        project
            .fields
            .insert("owner".into(), FieldValue::reference("projects/other"));
        project.fields.insert(
            "related".into(),
            FieldValue::Array(vec![FieldValue::string("people/nobody")]),
        );
        let mut doc = document("projects/bifrost.md", vec![project]);
        doc.refs = vec![reference("projects/bifrost", "projects/other", 3)];

        let issues = validator.validate_document(&doc);
        assert_eq!(
            kinds(&issues),
            vec![IssueKind::WrongTargetType, IssueKind::MissingReference]
        );
        assert_eq!(
            issues[0].message,
            "Field 'owner' expects type 'person', but [[projects/other]] is type 'project'"
        );
    }

    #[test]
    fn test_missing_ref_field_is_certain() {
        let schema = schema(
            "types:\n  person:\n    default_path: people/\n  god: {}\n  project:\n    fields:\n      patron: { type: ref, target: god }\n",
        );
        let objects = infos(&[("projects/bifrost", "project")]);
        let mut validator = Validator::new(&schema, &objects, ResolverOptions::default());

        let mut prose = document("notes/a.md", vec![object("notes/a", "page")]);
        prose.refs = vec![reference("notes/a", "people/heimdall", 1)];
        validator.validate_document(&prose);

        let mut project = object("projects/bifrost", "project");
        project
            .fields
            .insert("patron".into(), FieldValue::reference("people/heimdall"));
        let mut doc = document("projects/bifrost.md", vec![project]);
        doc.refs = vec![reference("projects/bifrost", "people/heimdall", 3)];
        let issues = validator.validate_document(&doc);
        // Reported once, by the reference pass
        assert_eq!(kinds(&issues), vec![IssueKind::MissingReference]);

        let missing = validator.missing_refs();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].confidence, Confidence::Certain);
        assert_eq!(missing[0].inferred_type.as_deref(), Some("god"));
        assert_eq!(missing[0].field_source.as_deref(), Some("patron"));
        assert_eq!(missing[0].source_file, "notes/a.md");
    }

    #[test]
    fn test_validate_schema() {
        let schema = schema(
            "types:\n  person:\n    fields:\n      mentor: { type: ref, target: person, required: true }\n      team: { type: ref, target: team }\n  idea: {}\ntraits:\n  due: { type: date }\n  mood: {}\n",
        );
        let objects = infos(&[
            ("people/freya", "person"),
            ("gods/freya", "person"),
            ("people/thor", "person"),
            ("gods/thor", "person"),
        ]);
        let options = ResolverOptions::new().with_alias("thor", "people/freya");
        let mut duplicates = BTreeMap::new();
        duplicates.insert(
            "Goddess".to_string(),
            vec!["gods/freya".to_string(), "people/freya".to_string()],
        );
        let mut validator =
            Validator::new(&schema, &objects, options).with_duplicate_aliases(duplicates);

        let mut doc = document("people/freya.md", vec![object("people/freya", "person")]);
        doc.objects[0]
            .fields
            .insert("mentor".into(), FieldValue::reference("gods/freya"));
        doc.refs = vec![reference("people/freya", "freya", 5)];
        doc.traits.push(ParsedTrait {
            trait_type: "mood".into(),
            value: None,
            content: String::new(),
            parent_object_id: "people/freya".into(),
            line: 6,
        });
        validator.validate_document(&doc);

        let issues = validator.validate_schema();
        let summary: Vec<_> = issues
            .iter()
            .map(|i| (i.kind, i.value.clone().unwrap_or_default()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (IssueKind::UnusedType, "idea".to_string()),
                (IssueKind::UnusedTrait, "due".to_string()),
                (IssueKind::MissingTargetType, "team".to_string()),
                (IssueKind::SelfReferentialRequired, "person.mentor".to_string()),
                (IssueKind::IdCollision, "freya".to_string()),
                (IssueKind::AliasCollision, "thor".to_string()),
                (IssueKind::DuplicateAlias, "Goddess".to_string()),
            ]
        );
        insta::assert_snapshot!(issues[5].message, @"Alias 'thor' of [[people/freya]] conflicts with the short name of gods/thor, people/thor");
    }

    #[test]
    fn test_section_objects_validate_against_builtin() {
        let schema = Schema::new();
        let mut validator = Validator::new(&schema, &[], ResolverOptions::default());
        let mut section = object("notes/a#intro", "section");
        section.heading = Some("Intro".into());
        section.heading_level = Some(7);
        section.parent_id = Some("notes/a".into());
        section.fields.insert("title".into(), FieldValue::string("Intro"));
        section.fields.insert("level".into(), FieldValue::Number(7.0));

        let issues = validator.validate_document(&document("notes/a.md", vec![section]));
        assert_eq!(kinds(&issues), vec![IssueKind::MissingRequiredField]);
        assert_eq!(issues[0].message, "Field 'level': value 7 is above maximum 6");
    }
}
