//! Frontmatter extraction: a document-initial `---` line, YAML, and the next `---` line.
//!
//! Without a closing `---` there is no frontmatter and the whole file is body.

use serde_yaml::Value;
use vaultmark_core::{Error, FieldValue, Fields, Result};

/// Raw frontmatter split from the body, before YAML decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontmatterBlock<'a> {
    /// Text between the delimiter lines
    pub raw: &'a str,
    /// 1-based line of the closing `---`
    pub end_line: usize,
    /// Byte offset where the body starts
    pub body_offset: usize,
}

impl FrontmatterBlock<'_> {
    /// First body line, 1-based.
    pub fn body_start_line(&self) -> usize {
        self.end_line + 1
    }
}

/// Decoded frontmatter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    /// String value of the `type` key
    pub object_type: Option<String>,
    pub tags: Vec<String>,
    /// Every other key
    pub fields: Fields,
    pub raw: String,
    pub end_line: usize,
}

/// Locate the frontmatter block, if any.
pub fn split_frontmatter(content: &str) -> Option<FrontmatterBlock<'_>> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim() != "---" {
        return None;
    }

    let raw_start = first.len();
    let mut offset = raw_start;
    for (idx, line) in lines.enumerate() {
        if line.trim() == "---" {
            let raw = content[raw_start..offset].trim_end_matches(['\n', '\r']);
            return Some(FrontmatterBlock {
                raw,
                // idx 0 is the second line of the file
                end_line: idx + 2,
                body_offset: offset + line.len(),
            });
        }
        offset += line.len();
    }

    None
}

/// Decode a frontmatter block into type, tags and fields.
pub fn parse_frontmatter(block: &FrontmatterBlock<'_>) -> Result<Frontmatter> {
    let mut fm = Frontmatter {
        raw: block.raw.to_string(),
        end_line: block.end_line,
        ..Frontmatter::default()
    };

    let root: Value = serde_yaml::from_str(block.raw).map_err(|e| {
        Error::parse_error(format!("failed to parse frontmatter as YAML: {}", e))
    })?;

    let mapping = match root {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(fm),
        _ => {
            return Err(Error::parse_error(
                "failed to parse frontmatter as YAML: expected a mapping at the top level",
            ));
        }
    };

    for (key, value) in &mapping {
        let Some(key) = yaml_key(key) else {
            continue;
        };

        match key.as_str() {
            "type" if value.is_string() => {
                fm.object_type = value.as_str().map(str::to_string);
            }
            "tags" => fm.tags = parse_tags(value),
            _ => {
                fm.fields.insert(key, FieldValue::from_yaml(value));
            }
        }
    }

    Ok(fm)
}

fn yaml_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Tags as a comma or space separated string, or a list of strings.
fn parse_tags(value: &Value) -> Vec<String> {
    let clean = |s: &str| {
        let tag = s.trim().trim_start_matches('#').trim();
        (!tag.is_empty()).then(|| tag.to_string())
    };

    match value {
        Value::String(s) => s.split([',', ' ']).filter_map(clean).collect(),
        Value::Sequence(items) => items.iter().filter_map(Value::as_str).filter_map(clean).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Frontmatter {
        let block = split_frontmatter(content).expect("frontmatter block");
        parse_frontmatter(&block).unwrap()
    }

    #[test]
    fn test_split() {
        let content = "---\ntitle: Test\n---\nContent here";
        let block = split_frontmatter(content).unwrap();
        assert_eq!(block.raw, "title: Test");
        assert_eq!(block.end_line, 3);
        assert_eq!(block.body_start_line(), 4);
        assert_eq!(&content[block.body_offset..], "Content here");
    }

    #[test]
    fn test_split_crlf_and_trailing_spaces() {
        let content = "---  \r\na: 1\r\n---\r\nbody";
        let block = split_frontmatter(content).unwrap();
        assert_eq!(block.raw, "a: 1");
        assert_eq!(&content[block.body_offset..], "body");
    }

    #[test]
    fn test_no_frontmatter() {
        assert!(split_frontmatter("Just content\n---\n").is_none());
        assert!(split_frontmatter("---\ntitle: Test\nNo closing").is_none());
        assert!(split_frontmatter("").is_none());
    }

    #[test]
    fn test_type_tags_and_fields() {
        let fm = parse(
            "---\ntype: person\ntags: [work, \"#rust\"]\nname: Freya\nage: 30\nactive: true\n\
             manager: \"[[people/odin]]\"\nborn: 1990-04-01\n---\n",
        );
        assert_eq!(fm.object_type.as_deref(), Some("person"));
        assert_eq!(fm.tags, vec!["work", "rust"]);
        assert_eq!(fm.fields.get("name"), Some(&FieldValue::string("Freya")));
        assert_eq!(fm.fields.get("age"), Some(&FieldValue::Number(30.0)));
        assert_eq!(fm.fields.get("active"), Some(&FieldValue::Bool(true)));
        assert_eq!(fm.fields.get("manager"), Some(&FieldValue::reference("people/odin")));
        assert_eq!(fm.fields.get("born"), Some(&FieldValue::date("1990-04-01")));
        assert!(!fm.fields.contains_key("type"));
        assert!(!fm.fields.contains_key("tags"));
    }

    #[test]
    fn test_plain_yaml_timestamps_are_canonical() {
        let fm = parse("---\nat: 2025-02-01 09:30:00\nd: 2025-2-1\nquoted: \"soon\"\n---\n");
        assert_eq!(fm.fields.get("at"), Some(&FieldValue::datetime("2025-02-01T09:30:00")));
        assert_eq!(fm.fields.get("d"), Some(&FieldValue::date("2025-02-01")));
        assert_eq!(fm.fields.get("quoted"), Some(&FieldValue::string("soon")));
    }

    #[test]
    fn test_string_tags() {
        let fm = parse("---\ntags: \"#one, two three\"\n---\n");
        assert_eq!(fm.tags, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_non_string_type_is_a_field() {
        let fm = parse("---\ntype: 3\n---\n");
        assert_eq!(fm.object_type, None);
        assert_eq!(fm.fields.get("type"), Some(&FieldValue::Number(3.0)));
    }

    #[test]
    fn test_empty_frontmatter() {
        let fm = parse("---\n---\nbody");
        assert!(fm.fields.is_empty());
        assert_eq!(fm.end_line, 2);
    }

    #[test]
    fn test_invalid_yaml() {
        let block = split_frontmatter("---\nkey: [unclosed\n---\n").unwrap();
        let err = parse_frontmatter(&block).unwrap_err();
        assert!(err.reason().starts_with("failed to parse frontmatter as YAML"));

        let block = split_frontmatter("---\n- a\n- b\n---\n").unwrap();
        assert!(parse_frontmatter(&block).is_err());
    }
}
