//! Type declarations: `::type(key=value, ...)` and the bare `::type` shorthand.
//!
//! Arguments are split by a small state machine that tracks quotes and
//! bracket depth, so commas and `=` inside `"..."` or `[...]` stay part of
//! the value. Values are parsed in priority order:
//!
//! 1. exact wikilink `[[target]]` becomes a ref
//! 2. `[...]` becomes an array (items parsed recursively)
//! 3. `"..."` becomes a string with the quotes stripped
//! 4. `true` / `false`
//! 5. numbers
//! 6. date-shaped and datetime-shaped text
//! 7. everything else is a string

use regex::Regex;
use std::sync::LazyLock;
use vaultmark_core::dates::{is_valid_date, is_valid_datetime};
use vaultmark_core::{Error, FieldValue, Fields, Result, TypeDeclaration, format_number};

use super::wikilinks::parse_exact;

/// Arguments run to the last `)` so quoted values may contain parentheses.
static DECL_WITH_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^::([\w-]+)\s*\((.*)\)\s*$").unwrap());

static DECL_NO_ARGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^::([\w-]+)\s*$").unwrap());

/// Parse a declaration line.
///
/// Returns `Ok(None)` when the line does not start with `::`, and an error
/// when it does but matches neither form.
pub fn parse_type_declaration(line: &str, line_number: usize) -> Result<Option<TypeDeclaration>> {
    let trimmed = line.trim();
    if !trimmed.starts_with("::") {
        return Ok(None);
    }

    if let Some(caps) = DECL_WITH_ARGS.captures(trimmed) {
        let fields = parse_arguments(&caps[2])?;
        let id = fields
            .get("id")
            .and_then(FieldValue::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        return Ok(Some(TypeDeclaration {
            type_name: caps[1].to_string(),
            id,
            fields,
            line: line_number,
        }));
    }

    if let Some(caps) = DECL_NO_ARGS.captures(trimmed) {
        return Ok(Some(TypeDeclaration {
            type_name: caps[1].to_string(),
            id: None,
            fields: Fields::new(),
            line: line_number,
        }));
    }

    Err(Error::parse_error(format!(
        "invalid type declaration syntax: {}",
        trimmed
    )))
}

/// Split `key=value, key=value` into fields.
pub fn parse_arguments(args: &str) -> Result<Fields> {
    let mut fields = Fields::new();
    if args.trim().is_empty() {
        return Ok(fields);
    }

    let mut key = String::new();
    let mut value = String::new();
    let mut in_key = true;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut depth: i32 = 0;

    let mut finish = |key: &mut String, value: &mut String| {
        let k = key.trim();
        if !k.is_empty() {
            fields.insert(k.to_string(), parse_field_value(value));
        }
        key.clear();
        value.clear();
    };

    for c in args.chars() {
        if escaped {
            escaped = false;
            value.push(c);
            continue;
        }

        match c {
            '\\' if in_quotes => {
                escaped = true;
                value.push(c);
            }
            '"' => {
                if depth == 0 {
                    in_quotes = !in_quotes;
                }
                value.push(c);
            }
            '[' => {
                if !in_quotes {
                    depth += 1;
                }
                value.push(c);
            }
            ']' => {
                if !in_quotes {
                    depth -= 1;
                }
                value.push(c);
            }
            '=' if in_key && !in_quotes && depth == 0 => in_key = false,
            ',' if !in_quotes && depth == 0 => {
                finish(&mut key, &mut value);
                in_key = true;
            }
            _ if in_key => key.push(c),
            _ => value.push(c),
        }
    }

    if in_quotes {
        return Err(Error::parse_error(format!(
            "unterminated quote in arguments: {}",
            args.trim()
        )));
    }
    if depth != 0 {
        return Err(Error::parse_error(format!(
            "unbalanced brackets in arguments: {}",
            args.trim()
        )));
    }

    finish(&mut key, &mut value);
    Ok(fields)
}

#[derive(Debug, Clone, Copy)]
struct ValueOptions {
    strict_dates: bool,
    booleans: bool,
    numbers: bool,
    arrays: bool,
    strip_quotes: bool,
}

const FIELD_VALUE: ValueOptions = ValueOptions {
    strict_dates: false,
    booleans: true,
    numbers: true,
    arrays: true,
    strip_quotes: true,
};

const TRAIT_VALUE: ValueOptions = ValueOptions {
    strict_dates: true,
    booleans: false,
    numbers: false,
    arrays: false,
    strip_quotes: false,
};

/// Parse a value with declaration rules.
pub fn parse_field_value(s: &str) -> FieldValue {
    parse_value(s, FIELD_VALUE)
}

/// Parse a trait value: refs, strictly valid dates and datetimes, otherwise text.
pub fn parse_trait_value(s: &str) -> FieldValue {
    parse_value(s, TRAIT_VALUE)
}

fn parse_value(s: &str, opts: ValueOptions) -> FieldValue {
    let s = s.trim();
    if s.is_empty() {
        return FieldValue::Null;
    }

    if !s.starts_with("[[[")
        && let Some((target, _)) = parse_exact(s)
    {
        return FieldValue::Ref(target.to_string());
    }

    if opts.arrays && s.len() >= 2 && s.starts_with('[') && s.ends_with(']') {
        return FieldValue::Array(parse_array_items(&s[1..s.len() - 1], opts));
    }

    if opts.strip_quotes && s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        return FieldValue::String(unescape_quoted(&s[1..s.len() - 1]));
    }

    if opts.booleans {
        match s {
            "true" => return FieldValue::Bool(true),
            "false" => return FieldValue::Bool(false),
            _ => {}
        }
    }

    if opts.numbers
        && let Ok(n) = s.parse::<f64>()
        && n.is_finite()
    {
        return FieldValue::Number(n);
    }

    if opts.strict_dates {
        if is_valid_datetime(s) {
            return FieldValue::Datetime(s.to_string());
        }
        if is_valid_date(s) {
            return FieldValue::Date(s.to_string());
        }
    } else if s.len() >= 10 && s.as_bytes()[0].is_ascii_digit() {
        let bytes = s.as_bytes();
        if s.contains('T') {
            return FieldValue::Datetime(s.to_string());
        }
        if s.len() == 10 && bytes[4] == b'-' && bytes[7] == b'-' {
            return FieldValue::Date(s.to_string());
        }
    }

    FieldValue::String(s.to_string())
}

fn parse_array_items(s: &str, opts: ValueOptions) -> Vec<FieldValue> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut in_quotes = false;

    let mut push = |current: &mut String| {
        let item = parse_value(current, opts);
        if !item.is_null() {
            items.push(item);
        }
        current.clear();
    };

    for c in s.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '[' if !in_quotes => {
                depth += 1;
                current.push(c);
            }
            ']' if !in_quotes => {
                depth -= 1;
                current.push(c);
            }
            ',' if !in_quotes && depth == 0 => push(&mut current),
            _ => current.push(c),
        }
    }
    push(&mut current);

    items
}

fn unescape_quoted(s: &str) -> String {
    s.replace("\\\"", "\"")
}

/// Serialize fields back to `::type(...)`, keys sorted and nulls dropped.
pub fn serialize_type_declaration(type_name: &str, fields: &Fields) -> String {
    let parts: Vec<String> = fields
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| format!("{}={}", k, serialize_field_value(v)))
        .collect();
    format!("::{}({})", type_name, parts.join(", "))
}

/// Serialize one value in declaration syntax.
pub fn serialize_field_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Ref(target) => format!("[[{}]]", target),
        FieldValue::Array(items) => {
            let items: Vec<String> = items.iter().map(serialize_field_value).collect();
            format!("[{}]", items.join(", "))
        }
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Number(n) => format_number(*n),
        FieldValue::Date(s) | FieldValue::Datetime(s) => s.clone(),
        FieldValue::String(s) => serialize_string(s),
    }
}

/// Quote a string when it contains argument syntax or would read back as
/// something other than the same string.
fn serialize_string(s: &str) -> String {
    let special = s.contains([',', '(', ')', '[', ']', '=', '"']);
    let reparses = parse_field_value(s) == FieldValue::String(s.to_string());
    if special || !reparses {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        s.to_string()
    }
}
