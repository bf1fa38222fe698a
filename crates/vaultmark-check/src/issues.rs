//! Findings produced by a check pass.

use serde::{Deserialize, Serialize};
use std::fmt;
use vaultmark_core::Severity;

/// Machine-readable category of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    ParseError,
    DuplicateObjectId,
    UnknownType,
    MissingEmbeddedId,
    MissingRequiredField,
    MissingRequiredTrait,
    UnknownFrontmatterKey,
    UndefinedTrait,
    InvalidTraitValue,
    InvalidEnumValue,
    InvalidDateFormat,
    MissingReference,
    AmbiguousReference,
    StaleFragment,
    WrongTargetType,
    ShortRefCouldBeFullPath,
    UnusedType,
    UnusedTrait,
    MissingTargetType,
    SelfReferentialRequired,
    IdCollision,
    AliasCollision,
    DuplicateAlias,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParseError => "parse_error",
            Self::DuplicateObjectId => "duplicate_object_id",
            Self::UnknownType => "unknown_type",
            Self::MissingEmbeddedId => "missing_embedded_id",
            Self::MissingRequiredField => "missing_required_field",
            Self::MissingRequiredTrait => "missing_required_trait",
            Self::UnknownFrontmatterKey => "unknown_frontmatter_key",
            Self::UndefinedTrait => "undefined_trait",
            Self::InvalidTraitValue => "invalid_trait_value",
            Self::InvalidEnumValue => "invalid_enum_value",
            Self::InvalidDateFormat => "invalid_date_format",
            Self::MissingReference => "missing_reference",
            Self::AmbiguousReference => "ambiguous_reference",
            Self::StaleFragment => "stale_fragment",
            Self::WrongTargetType => "wrong_target_type",
            Self::ShortRefCouldBeFullPath => "short_ref_could_be_full_path",
            Self::UnusedType => "unused_type",
            Self::UnusedTrait => "unused_trait",
            Self::MissingTargetType => "missing_target_type",
            Self::SelfReferentialRequired => "self_referential_required",
            Self::IdCollision => "id_collision",
            Self::AliasCollision => "alias_collision",
            Self::DuplicateAlias => "duplicate_alias",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finding tied to a file and line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub level: Severity,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub file_path: String,
    pub line: usize,
    pub message: String,
    /// The offending value (type name, trait name, raw reference, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Shell command that fixes the issue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_hint: Option<String>,
}

impl Issue {
    pub fn new(
        level: Severity,
        kind: IssueKind,
        file_path: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            kind,
            file_path: file_path.into(),
            line,
            message: message.into(),
            value: None,
            fix_command: None,
            fix_hint: None,
        }
    }

    pub fn error(
        kind: IssueKind,
        file_path: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Error, kind, file_path, line, message)
    }

    pub fn warning(
        kind: IssueKind,
        file_path: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Warning, kind, file_path, line, message)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_fix_command(mut self, command: impl Into<String>) -> Self {
        self.fix_command = Some(command.into());
        self
    }

    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level.is_failure()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{} [{}] {}",
            self.level, self.file_path, self.line, self.kind, self.message
        )
    }
}

/// A vault-wide finding not tied to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIssue {
    pub level: Severity,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_hint: Option<String>,
}

impl SchemaIssue {
    pub fn new(level: Severity, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            level,
            kind,
            message: message.into(),
            value: None,
            fix_command: None,
            fix_hint: None,
        }
    }

    pub fn error(kind: IssueKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, message)
    }

    pub fn warning(kind: IssueKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, message)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_fix_command(mut self, command: impl Into<String>) -> Self {
        self.fix_command = Some(command.into());
        self
    }

    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level.is_failure()
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.level, self.kind, self.message)
    }
}

/// Result of checking a whole vault
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub issues: Vec<Issue>,
    pub schema_issues: Vec<SchemaIssue>,
    pub files_checked: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

impl CheckReport {
    pub fn new() -> Self {
        Self::default()
    }

    fn count(&mut self, level: Severity) {
        match level {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
    }

    pub fn add_issue(&mut self, issue: Issue) {
        self.count(issue.level);
        self.issues.push(issue);
    }

    pub fn add_schema_issue(&mut self, issue: SchemaIssue) {
        self.count(issue.level);
        self.schema_issues.push(issue);
    }

    /// Record one checked file and its issues.
    pub fn add_file(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.files_checked += 1;
        for issue in issues {
            self.add_issue(issue);
        }
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: CheckReport) {
        self.files_checked += other.files_checked;
        for issue in other.issues {
            self.add_issue(issue);
        }
        for issue in other.schema_issues {
            self.add_schema_issue(issue);
        }
    }

    /// No errors were found.
    pub fn passed(&self) -> bool {
        self.error_count == 0
    }

    /// Passed, and with `strict` also free of warnings.
    pub fn passed_with(&self, strict: bool) -> bool {
        self.passed() && !(strict && self.warning_count > 0)
    }

    pub fn total_issues(&self) -> usize {
        self.issues.len() + self.schema_issues.len()
    }

    /// Drop warnings, keeping the counts consistent.
    pub fn retain_errors(&mut self) {
        self.issues.retain(Issue::is_error);
        self.schema_issues.retain(SchemaIssue::is_error);
        self.warning_count = 0;
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
