//! Field values checked against their schema definitions.

use std::collections::BTreeMap;
use thiserror::Error;
use vaultmark_core::dates::{is_valid_date, is_valid_datetime};
use vaultmark_core::{FieldDefinition, FieldType, FieldValue, Fields, format_number};

/// Keys every object may carry regardless of its type.
pub const RESERVED_KEYS: [&str; 4] = ["type", "tags", "id", "alias"];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// A field that does not satisfy its definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Field '{field}': {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Check present fields against their definitions and report required
/// fields that are missing (absent or null, with no default).
///
/// Keys without a definition are not reported here.
pub fn validate_fields(
    fields: &Fields,
    definitions: &BTreeMap<String, FieldDefinition>,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for (name, def) in definitions {
        let missing = fields.get(name).is_none_or(FieldValue::is_null);
        if def.required && missing && def.default.is_none() {
            errors.push(FieldError::new(name, "Required field is missing"));
        }
    }

    for (name, value) in fields {
        if is_reserved_key(name) {
            continue;
        }
        if let Some(def) = definitions.get(name)
            && let Err(message) = validate_field_value(value, def)
        {
            errors.push(FieldError::new(name, message));
        }
    }

    errors
}

/// Check one value against its definition; null always passes.
pub fn validate_field_value(value: &FieldValue, def: &FieldDefinition) -> Result<(), String> {
    if value.is_null() {
        return Ok(());
    }

    match def.field_type {
        FieldType::String => value.as_str().map(|_| ()).ok_or("expected string".into()),
        FieldType::StringArray => each_item(value, "expected array of strings", |item| {
            item.as_str().is_some()
        }),
        FieldType::Number => {
            let n = value.as_number().ok_or("expected number")?;
            if let Some(min) = def.min
                && n < min
            {
                return Err(format!(
                    "value {} is below minimum {}",
                    format_number(n),
                    format_number(min)
                ));
            }
            if let Some(max) = def.max
                && n > max
            {
                return Err(format!(
                    "value {} is above maximum {}",
                    format_number(n),
                    format_number(max)
                ));
            }
            Ok(())
        }
        FieldType::NumberArray => each_item(value, "expected array of numbers", |item| {
            item.as_number().is_some()
        }),
        FieldType::Date => {
            let s = value.as_str().ok_or("expected date")?;
            if !is_valid_date(s) {
                return Err("invalid date format, expected YYYY-MM-DD".into());
            }
            Ok(())
        }
        FieldType::DateArray => each_item(value, "expected array of dates", |item| {
            item.as_str().is_some_and(is_valid_date)
        }),
        FieldType::Datetime => {
            let s = value.as_str().ok_or("expected datetime")?;
            if !is_valid_datetime(s) {
                return Err("invalid datetime format".into());
            }
            Ok(())
        }
        FieldType::Enum => {
            let s = value.as_str().ok_or("expected enum value (string)")?;
            if def.values.is_empty() {
                return Err("enum type missing 'values' definition".into());
            }
            if !def.values.iter().any(|allowed| allowed == s) {
                return Err(format!(
                    "invalid enum value '{}', expected one of: {}",
                    s,
                    def.values.join(", ")
                ));
            }
            Ok(())
        }
        FieldType::Bool => value.as_bool().map(|_| ()).ok_or("expected boolean".into()),
        FieldType::Ref => value
            .as_str()
            .map(|_| ())
            .ok_or("expected reference".into()),
        FieldType::RefArray => each_item(value, "expected array of references", |item| {
            item.as_str().is_some()
        }),
        FieldType::Url => {
            let s = value.as_str().ok_or("expected URL")?;
            validate_url(s)
        }
    }
}

fn each_item(
    value: &FieldValue,
    message: &str,
    valid: impl Fn(&FieldValue) -> bool,
) -> Result<(), String> {
    match value.as_array() {
        Some(items) if items.iter().all(&valid) => Ok(()),
        _ => Err(message.to_string()),
    }
}

/// Absolute URL check: a scheme is required, and web URLs need a host.
pub fn validate_url(raw: &str) -> Result<(), String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("expected URL".into());
    }
    if value.contains(char::is_whitespace) {
        return Err("invalid URL format".into());
    }

    match url::Url::parse(value) {
        Ok(parsed) => {
            let web = matches!(parsed.scheme(), "http" | "https");
            if web && parsed.host_str().is_none_or(str::is_empty) {
                return Err("URL must include a host".into());
            }
            Ok(())
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Err("URL must include a scheme (e.g., https://)".into())
        }
        Err(url::ParseError::EmptyHost) => Err("URL must include a host".into()),
        Err(_) => Err("invalid URL format".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs(entries: Vec<(&str, FieldDefinition)>) -> BTreeMap<String, FieldDefinition> {
        entries
            .into_iter()
            .map(|(name, def)| (name.to_string(), def))
            .collect()
    }

    fn fields(entries: Vec<(&str, FieldValue)>) -> Fields {
        entries
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    #[test]
    fn test_required_fields() {
        let definitions = defs(vec![
            ("name", FieldDefinition::new(FieldType::String).required()),
            (
                "status",
                FieldDefinition {
                    default: Some(FieldValue::string("active")),
                    ..FieldDefinition::new(FieldType::String).required()
                },
            ),
        ]);

        let errors = validate_fields(&Fields::new(), &definitions);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "Field 'name': Required field is missing");

        let errors = validate_fields(&fields(vec![("name", FieldValue::Null)]), &definitions);
        assert_eq!(errors.len(), 1);

        let ok = fields(vec![("name", FieldValue::string("Freya"))]);
        assert!(validate_fields(&ok, &definitions).is_empty());
    }

    #[test]
    fn test_value_shapes() {
        let check = |value: FieldValue, def: FieldDefinition| validate_field_value(&value, &def);

        assert!(check(FieldValue::date("2025-01-01"), FieldDefinition::new(FieldType::String)).is_ok());
        assert_eq!(
            check(FieldValue::Number(3.0), FieldDefinition::new(FieldType::String)),
            Err("expected string".to_string())
        );
        assert!(check(FieldValue::reference("people/freya"), FieldDefinition::new(FieldType::Ref)).is_ok());
        assert!(check(FieldValue::string("people/freya"), FieldDefinition::new(FieldType::Ref)).is_ok());
        assert!(check(FieldValue::Bool(true), FieldDefinition::new(FieldType::Ref)).is_err());
        assert!(
            check(
                FieldValue::Array(vec![FieldValue::reference("a"), FieldValue::string("b")]),
                FieldDefinition::new(FieldType::RefArray)
            )
            .is_ok()
        );
        assert_eq!(
            check(FieldValue::string("2025-13-01"), FieldDefinition::new(FieldType::Date)),
            Err("invalid date format, expected YYYY-MM-DD".to_string())
        );
        assert!(
            check(
                FieldValue::Array(vec![FieldValue::date("2025-01-01"), FieldValue::string("soon")]),
                FieldDefinition::new(FieldType::DateArray)
            )
            .is_err()
        );
        assert!(check(FieldValue::datetime("2025-01-01T09:30"), FieldDefinition::new(FieldType::Datetime)).is_ok());
        assert!(check(FieldValue::string("yes"), FieldDefinition::new(FieldType::Bool)).is_err());
        assert!(check(FieldValue::Null, FieldDefinition::new(FieldType::Number)).is_ok());
    }

    #[test]
    fn test_number_bounds() {
        let def = FieldDefinition {
            min: Some(1.0),
            max: Some(6.0),
            ..FieldDefinition::new(FieldType::Number)
        };
        assert!(validate_field_value(&FieldValue::Number(3.0), &def).is_ok());
        assert_eq!(
            validate_field_value(&FieldValue::Number(0.0), &def),
            Err("value 0 is below minimum 1".to_string())
        );
        assert_eq!(
            validate_field_value(&FieldValue::Number(7.5), &def),
            Err("value 7.5 is above maximum 6".to_string())
        );
    }

    #[test]
    fn test_enum_values() {
        let def = FieldDefinition::new(FieldType::Enum).with_values(["active", "paused"]);
        assert!(validate_field_value(&FieldValue::string("active"), &def).is_ok());
        insta::assert_snapshot!(
            validate_field_value(&FieldValue::string("done"), &def).unwrap_err(),
            @"invalid enum value 'done', expected one of: active, paused"
        );
        assert_eq!(
            validate_field_value(&FieldValue::string("x"), &FieldDefinition::new(FieldType::Enum)),
            Err("enum type missing 'values' definition".to_string())
        );
    }

    #[test]
    fn test_reserved_keys_are_skipped() {
        let definitions = defs(vec![("id", FieldDefinition::new(FieldType::Number))]);
        let values = fields(vec![("id", FieldValue::string("standup"))]);
        assert!(validate_fields(&values, &definitions).is_empty());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/path").is_ok());
        assert!(validate_url("mailto:freya@asgard.example").is_ok());
        assert_eq!(
            validate_url("example.com"),
            Err("URL must include a scheme (e.g., https://)".to_string())
        );
        assert_eq!(validate_url("https://"), Err("URL must include a host".to_string()));
        assert_eq!(validate_url("https://a b"), Err("invalid URL format".to_string()));
        assert_eq!(validate_url("  "), Err("expected URL".to_string()));
    }
}
