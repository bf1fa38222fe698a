//! Field values carried by objects, traits and schema defaults.

use crate::dates::{Timestamp, canonical_yaml_timestamp, is_valid_date, is_valid_datetime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed field value.
///
/// Dates, datetimes and refs are kept as their canonical text so they can be
/// written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Number(f64),
    Bool(bool),
    /// `YYYY-MM-DD`
    Date(String),
    /// `YYYY-MM-DDTHH:MM[:SS]`, optionally with an RFC 3339 offset
    Datetime(String),
    /// Reference target as written, without brackets or display text
    Ref(String),
    Array(Vec<FieldValue>),
    Null,
}

impl FieldValue {
    pub fn string(s: impl Into<String>) -> Self {
        FieldValue::String(s.into())
    }

    pub fn date(s: impl Into<String>) -> Self {
        FieldValue::Date(s.into())
    }

    pub fn datetime(s: impl Into<String>) -> Self {
        FieldValue::Datetime(s.into())
    }

    pub fn reference(target: impl Into<String>) -> Self {
        FieldValue::Ref(target.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn is_ref(&self) -> bool {
        matches!(self, FieldValue::Ref(_))
    }

    pub fn is_date(&self) -> bool {
        matches!(self, FieldValue::Date(_))
    }

    pub fn is_datetime(&self) -> bool {
        matches!(self, FieldValue::Datetime(_))
    }

    /// Text of any string-like value (string, date, datetime, ref).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s)
            | FieldValue::Date(s)
            | FieldValue::Datetime(s)
            | FieldValue::Ref(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Target of a `Ref` value.
    pub fn as_ref_target(&self) -> Option<&str> {
        match self {
            FieldValue::Ref(target) => Some(target),
            _ => None,
        }
    }

    /// Every ref target in this value, recursing into arrays.
    pub fn ref_targets(&self) -> Vec<&str> {
        match self {
            FieldValue::Ref(target) => vec![target.as_str()],
            FieldValue::Array(items) => items.iter().flat_map(|item| item.ref_targets()).collect(),
            _ => Vec::new(),
        }
    }

    /// Human-readable rendering used in diagnostics.
    pub fn display(&self) -> String {
        self.to_string()
    }

    /// Coerce a decoded YAML value.
    ///
    /// Strings that are exactly one wikilink become refs, valid date and
    /// datetime strings become dates. Looser YAML timestamps such as
    /// `2025-2-1` or `2025-02-01 09:30:00` are rewritten to the canonical
    /// layouts. Mappings have no field representation and become `Null`.
    pub fn from_yaml(value: &serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null),
            Value::String(s) => Self::from_yaml_str(s),
            Value::Sequence(items) => {
                FieldValue::Array(items.iter().map(FieldValue::from_yaml).collect())
            }
            Value::Mapping(_) => FieldValue::Null,
            Value::Tagged(tagged) => FieldValue::from_yaml(&tagged.value),
        }
    }

    fn from_yaml_str(s: &str) -> Self {
        if let Some((target, _)) = parse_exact_wikilink(s) {
            return FieldValue::Ref(target.to_string());
        }
        if is_valid_date(s) {
            return FieldValue::Date(s.to_string());
        }
        if is_valid_datetime(s) {
            return FieldValue::Datetime(s.to_string());
        }
        match canonical_yaml_timestamp(s) {
            Some(Timestamp::Date(date)) => FieldValue::Date(date),
            Some(Timestamp::Datetime(datetime)) => FieldValue::Datetime(datetime),
            None => FieldValue::String(s.to_string()),
        }
    }
}

/// Parse a string that is exactly one wikilink, surrounding whitespace allowed.
///
/// Returns the trimmed target and display text; the target must be non-empty.
pub fn parse_exact_wikilink(s: &str) -> Option<(&str, Option<&str>)> {
    let inner = s.trim().strip_prefix("[[")?.strip_suffix("]]")?;
    let (target, display) = match inner.split_once('|') {
        Some((target, display)) => (target, Some(display.trim())),
        None => (inner, None),
    };
    let target = target.trim();
    if target.is_empty() || target.contains("[[") || target.contains("]]") {
        return None;
    }
    Some((target, display))
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) | FieldValue::Date(s) | FieldValue::Datetime(s) => {
                write!(f, "{}", s)
            }
            FieldValue::Ref(target) => write!(f, "[[{}]]", target),
            FieldValue::Number(n) => write!(f, "{}", format_number(*n)),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            FieldValue::Null => Ok(()),
        }
    }
}

/// Integers print without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_like_accessors() {
        assert_eq!(FieldValue::reference("people/freya").as_str(), Some("people/freya"));
        assert_eq!(FieldValue::date("2025-02-01").as_str(), Some("2025-02-01"));
        assert_eq!(FieldValue::Number(3.0).as_str(), None);
        assert_eq!(FieldValue::string("x").as_ref_target(), None);
    }

    #[test]
    fn test_ref_targets_recurse_into_arrays() {
        let value = FieldValue::Array(vec![
            FieldValue::reference("a"),
            FieldValue::string("b"),
            FieldValue::Array(vec![FieldValue::reference("c")]),
        ]);
        assert_eq!(value.ref_targets(), vec!["a", "c"]);
    }

    #[test]
    fn test_parse_exact_wikilink() {
        assert_eq!(parse_exact_wikilink("[[people/freya]]"), Some(("people/freya", None)));
        assert_eq!(
            parse_exact_wikilink(" [[people/freya|Lady Freya]] "),
            Some(("people/freya", Some("Lady Freya")))
        );
        assert_eq!(parse_exact_wikilink("[[]]"), None);
        assert_eq!(parse_exact_wikilink("[[  ]]"), None);
        assert_eq!(parse_exact_wikilink("see [[x]]"), None);
        assert_eq!(parse_exact_wikilink("[[a]] and [[b]]"), None);
    }

    #[test]
    fn test_from_yaml() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            r#"
owner: "[[people/freya]]"
due: 2025-02-01
at: 2025-02-01T09:30
loose_at: 2025-02-01 09:30:00
loose_due: 2025-2-1
plain: hello
count: 3
done: true
nothing: ~
list: ["[[a]]", b]
nested: { a: 1 }
"#,
        )
        .unwrap();
        let get = |key: &str| FieldValue::from_yaml(&yaml[key]);

        assert_eq!(get("owner"), FieldValue::reference("people/freya"));
        assert_eq!(get("due"), FieldValue::date("2025-02-01"));
        assert_eq!(get("at"), FieldValue::datetime("2025-02-01T09:30"));
        assert_eq!(get("loose_at"), FieldValue::datetime("2025-02-01T09:30:00"));
        assert_eq!(get("loose_due"), FieldValue::date("2025-02-01"));
        assert_eq!(get("plain"), FieldValue::string("hello"));
        assert_eq!(get("count"), FieldValue::Number(3.0));
        assert_eq!(get("done"), FieldValue::Bool(true));
        assert_eq!(get("nothing"), FieldValue::Null);
        assert_eq!(
            get("list"),
            FieldValue::Array(vec![FieldValue::reference("a"), FieldValue::string("b")])
        );
        assert_eq!(get("nested"), FieldValue::Null);
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Number(2.0).to_string(), "2");
        assert_eq!(FieldValue::Number(2.5).to_string(), "2.5");
        assert_eq!(
            FieldValue::Array(vec![FieldValue::reference("a"), FieldValue::Bool(true)]).to_string(),
            "[[[a]], true]"
        );
    }

    #[test]
    fn test_serializes_as_plain_json() {
        let value = FieldValue::Array(vec![
            FieldValue::reference("people/freya"),
            FieldValue::Number(1.5),
            FieldValue::Null,
        ]);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"["people/freya",1.5,null]"#
        );
    }
}
