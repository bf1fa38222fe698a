//! Trait values checked against their trait definitions.

use crate::fields::validate_url;
use crate::issues::IssueKind;
use vaultmark_core::dates::{is_valid_date, is_valid_datetime};
use vaultmark_core::{FieldType, FieldValue, TraitDefinition};

/// Why a trait value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitValueError {
    pub kind: IssueKind,
    pub message: String,
    pub hint: Option<String>,
}

impl TraitValueError {
    fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Value text as written, for messages.
pub fn trait_value_display(value: &FieldValue) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

/// Check a present trait value against the trait's declared type.
///
/// Trait values are parsed loosely (no booleans or numbers), so `true`,
/// `false` and numeric text are accepted for those types.
pub fn validate_trait_value(
    name: &str,
    def: &TraitDefinition,
    value: &FieldValue,
) -> Result<(), TraitValueError> {
    let shown = trait_value_display(value);
    let trait_type = if def.is_boolean() {
        FieldType::Bool
    } else {
        def.trait_type.unwrap_or(FieldType::Bool)
    };

    match trait_type {
        FieldType::Bool => {
            if value.as_bool().is_some() || matches!(value.as_str(), Some("true" | "false")) {
                return Ok(());
            }
            Err(TraitValueError::new(
                IssueKind::InvalidTraitValue,
                format!("invalid boolean value \"{}\" (expected true or false)", shown),
            )
            .with_hint(format!(
                "Use @{name} on its own, or @{name}(true) / @{name}(false)"
            )))
        }
        FieldType::String => match value.as_str() {
            Some(_) => Ok(()),
            None => Err(TraitValueError::new(
                IssueKind::InvalidTraitValue,
                "expected string value",
            )),
        },
        FieldType::Number => {
            let numeric = value.as_number().is_some()
                || value
                    .as_str()
                    .is_some_and(|s| s.trim().parse::<f64>().is_ok_and(f64::is_finite));
            if numeric {
                return Ok(());
            }
            Err(TraitValueError::new(
                IssueKind::InvalidTraitValue,
                format!("invalid number value \"{}\"", shown),
            )
            .with_hint(format!("Use a number: @{name}(3)")))
        }
        FieldType::Url => {
            let result = match value.as_str() {
                Some(s) => validate_url(s),
                None => Err("expected URL value".to_string()),
            };
            result.map_err(|message| {
                TraitValueError::new(IssueKind::InvalidTraitValue, message)
                    .with_hint("Use an absolute URL such as https://example.com")
            })
        }
        FieldType::Date => {
            if value.as_str().is_some_and(is_valid_date) {
                return Ok(());
            }
            Err(TraitValueError::new(
                IssueKind::InvalidDateFormat,
                format!("invalid date format \"{}\" (expected YYYY-MM-DD)", shown),
            )
            .with_hint("Use date format YYYY-MM-DD (e.g., 2025-02-01)"))
        }
        FieldType::Datetime => {
            if value.as_str().is_some_and(is_valid_datetime) {
                return Ok(());
            }
            Err(TraitValueError::new(
                IssueKind::InvalidDateFormat,
                format!(
                    "invalid datetime format \"{}\" (expected YYYY-MM-DDTHH:MM or YYYY-MM-DDTHH:MM:SS)",
                    shown
                ),
            )
            .with_hint("Use datetime format YYYY-MM-DDTHH:MM or YYYY-MM-DDTHH:MM:SS"))
        }
        FieldType::Enum => {
            let allowed = def.values.join(", ");
            match value.as_str() {
                Some(s) if def.values.iter().any(|v| v == s) => Ok(()),
                Some(s) => Err(TraitValueError::new(
                    IssueKind::InvalidEnumValue,
                    format!("invalid enum value \"{}\" (allowed: {})", s, allowed),
                )
                .with_hint(format!("Change to one of: {}", allowed))),
                None => Err(TraitValueError::new(
                    IssueKind::InvalidEnumValue,
                    "expected enum value",
                )
                .with_hint(format!("Change to one of: {}", allowed))),
            }
        }
        FieldType::Ref => {
            if value.as_ref_target().is_some_and(|t| !t.is_empty()) {
                return Ok(());
            }
            Err(TraitValueError::new(
                IssueKind::InvalidTraitValue,
                "expected reference value",
            )
            .with_hint(format!("Use a reference: @{name}([[target]])")))
        }
        other => Err(TraitValueError::new(
            IssueKind::InvalidTraitValue,
            format!("unsupported trait type \"{}\"", other),
        )
        .with_hint("Trait types are single values; change the trait's type in the schema")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(def: TraitDefinition, value: FieldValue) -> Result<(), TraitValueError> {
        validate_trait_value("t", &def, &value)
    }

    #[test]
    fn test_boolean_traits() {
        let def = TraitDefinition::default();
        assert!(check(def.clone(), FieldValue::string("true")).is_ok());
        assert!(check(def.clone(), FieldValue::string("false")).is_ok());

        let err = check(def, FieldValue::string("maybe")).unwrap_err();
        assert_eq!(err.kind, IssueKind::InvalidTraitValue);
        insta::assert_snapshot!(err.message, @r#"invalid boolean value "maybe" (expected true or false)"#);
    }

    #[test]
    fn test_dates() {
        let date = TraitDefinition::of_type(FieldType::Date);
        assert!(check(date.clone(), FieldValue::date("2025-02-01")).is_ok());
        let err = check(date, FieldValue::string("tomorrow")).unwrap_err();
        assert_eq!(err.kind, IssueKind::InvalidDateFormat);
        assert!(err.message.contains("tomorrow"));

        let datetime = TraitDefinition::of_type(FieldType::Datetime);
        assert!(check(datetime.clone(), FieldValue::datetime("2025-02-01T09:00")).is_ok());
        assert!(check(datetime, FieldValue::date("2025-02-01")).is_err());
    }

    #[test]
    fn test_enum() {
        let def = TraitDefinition {
            values: vec!["low".into(), "high".into()],
            ..TraitDefinition::of_type(FieldType::Enum)
        };
        assert!(check(def.clone(), FieldValue::string("low")).is_ok());
        let err = check(def, FieldValue::string("urgent")).unwrap_err();
        assert_eq!(err.kind, IssueKind::InvalidEnumValue);
        assert_eq!(err.hint.as_deref(), Some("Change to one of: low, high"));
    }

    #[test]
    fn test_number_string_ref_url() {
        let number = TraitDefinition::of_type(FieldType::Number);
        assert!(check(number.clone(), FieldValue::string(" 4.5 ")).is_ok());
        assert!(check(number, FieldValue::string("four")).is_err());

        let reference = TraitDefinition::of_type(FieldType::Ref);
        assert!(check(reference.clone(), FieldValue::reference("people/freya")).is_ok());
        assert!(check(reference, FieldValue::string("people/freya")).is_err());

        let url = TraitDefinition::of_type(FieldType::Url);
        assert!(check(url.clone(), FieldValue::string("https://example.com")).is_ok());
        assert!(check(url, FieldValue::string("example.com")).is_err());

        assert!(check(TraitDefinition::of_type(FieldType::String), FieldValue::string("x")).is_ok());
        assert!(check(TraitDefinition::of_type(FieldType::StringArray), FieldValue::string("x")).is_err());
    }
}
