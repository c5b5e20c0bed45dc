//! Front-matter parsing
//!
//! Front-matter is the YAML block between two `---` lines at the top of a
//! markdown document. Every field is normalized to a list of strings: a
//! scalar becomes a one-element list, a sequence keeps its elements, and an
//! explicit null becomes an empty list. Numbers keep the text they were
//! written with, so `version: 3.10` stays `3.10`.

use indexmap::IndexMap;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// A scalar as deserialized, before numbers get their source text back
#[derive(Debug, Clone, PartialEq, Eq)]
enum Scalar {
    Text(String),
    Number(String),
}

/// Values of a single front-matter key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FieldValues(Vec<Scalar>);

impl FieldValues {
    fn text(value: impl Into<String>) -> Self {
        FieldValues(vec![Scalar::Text(value.into())])
    }

    fn number(value: impl ToString) -> Self {
        FieldValues(vec![Scalar::Number(value.to_string())])
    }

    fn has_numbers(&self) -> bool {
        self.0.iter().any(|v| matches!(v, Scalar::Number(_)))
    }

    /// Swap each number for its token in `raw` when both denote the same value
    fn into_strings(self, raw: &[&str]) -> Vec<String> {
        self.0
            .into_iter()
            .enumerate()
            .map(|(i, value)| match value {
                Scalar::Text(s) => s,
                Scalar::Number(n) => match raw.get(i) {
                    Some(token) if same_number(token, &n) => token.to_string(),
                    _ => n,
                },
            })
            .collect()
    }
}

fn same_number(token: &str, parsed: &str) -> bool {
    match (token.parse::<f64>(), parsed.parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl<'de> Deserialize<'de> for FieldValues {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StringOrVec;

        impl<'de> Visitor<'de> for StringOrVec {
            type Value = FieldValues;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a scalar or a list of scalars")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValues::text(value))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValues::text(value))
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValues::text(value.to_string()))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValues::number(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValues::number(value))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValues::number(value))
            }

            fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
            where
                S: SeqAccess<'de>,
            {
                let mut values = Vec::new();
                while let Some(item) = seq.next_element::<serde_yaml::Value>()? {
                    if let Some(s) = scalar_value(&item) {
                        values.push(s);
                    }
                }
                Ok(FieldValues(values))
            }

            // Nested mappings carry no listing metadata; keep the key, drop the value
            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(FieldValues::default())
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValues::default())
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValues::default())
            }
        }

        deserializer.deserialize_any(StringOrVec)
    }
}

fn scalar_value(value: &serde_yaml::Value) -> Option<Scalar> {
    match value {
        serde_yaml::Value::String(s) => Some(Scalar::Text(s.clone())),
        serde_yaml::Value::Bool(b) => Some(Scalar::Text(b.to_string())),
        serde_yaml::Value::Number(n) => Some(Scalar::Number(n.to_string())),
        _ => None,
    }
}

/// Plain scalar tokens written for a top-level key, in order
///
/// Covers `key: value`, `key: [a, b]` and a block sequence of `- value`
/// lines. Anything else yields no tokens.
fn raw_scalars<'a>(yaml: &'a str, key: &str) -> Vec<&'a str> {
    let mut lines = yaml.lines();
    while let Some(line) = lines.next() {
        let Some(value) = line.strip_prefix(key).and_then(|rest| rest.strip_prefix(':')) else {
            continue;
        };
        let value = strip_comment(value).trim();

        if let Some(flow) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            return flow.split(',').map(str::trim).collect();
        }
        if !value.is_empty() {
            return vec![value];
        }
        return lines
            .take_while(|l| l.starts_with(' ') || l.starts_with('-') || l.trim().is_empty())
            .filter_map(|l| l.trim_start().strip_prefix("- "))
            .map(|item| strip_comment(item).trim())
            .collect();
    }
    Vec::new()
}

fn strip_comment(value: &str) -> &str {
    value.find(" #").map_or(value, |pos| &value[..pos])
}

/// Front-matter of a markdown document: key -> list of strings, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: IndexMap<String, Vec<String>>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    ///
    /// Content without a front-matter block, or whose block is not a YAML
    /// mapping, yields an empty front-matter.
    pub fn parse(content: &str) -> (Self, &str) {
        let trimmed = content.trim_start();
        if !trimmed.starts_with("---") {
            return (FrontMatter::default(), content);
        }

        let rest = trimmed[3..].trim_start_matches(['\n', '\r']);

        // "---\n---": present but empty
        if let Some(remaining) = rest.strip_prefix("---") {
            return (
                FrontMatter::default(),
                remaining.trim_start_matches(['\n', '\r']),
            );
        }

        let Some(end_pos) = rest.find("\n---") else {
            // No closing ---, treat as no front-matter
            return (FrontMatter::default(), content);
        };

        let yaml_content = &rest[..end_pos];
        let remaining = rest[end_pos + 4..].trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return (FrontMatter::default(), remaining);
        }

        // A leading `---` that is really a markdown thematic break
        if !looks_like_yaml(yaml_content) {
            return (FrontMatter::default(), content);
        }

        match serde_yaml::from_str::<IndexMap<String, FieldValues>>(yaml_content) {
            Ok(map) => {
                let fields = map
                    .into_iter()
                    .map(|(k, v)| {
                        let raw = if v.has_numbers() {
                            raw_scalars(yaml_content, &k)
                        } else {
                            Vec::new()
                        };
                        let values = v.into_strings(&raw);
                        (k, values)
                    })
                    .collect();
                (Self { fields }, remaining)
            }
            Err(e) => {
                tracing::warn!("Failed to parse YAML front-matter, ignoring it: {}", e);
                (FrontMatter::default(), remaining)
            }
        }
    }

    /// All values of a key
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.fields.get(key).map(Vec::as_slice)
    }

    /// The value of a key declared with exactly one value
    pub fn single(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            [value] => Some(value.as_str()),
            _ => None,
        }
    }

    /// Values of a free-form list key, empty when absent
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key).map(<[String]>::to_vec).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K, V> FromIterator<(K, Vec<V>)> for FrontMatter
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Vec<V>)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into_iter().map(Into::into).collect()))
            .collect();
        Self { fields }
    }
}

/// At least one `key:` line, with a plain identifier key
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp");
        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15
tags:
  - rust
  - kotlin
category: programming
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.single("title"), Some("Hello World"));
        assert_eq!(fm.single("date"), Some("2024-01-15"));
        assert_eq!(fm.list("tags"), vec!["rust", "kotlin"]);
        assert_eq!(fm.single("category"), Some("programming"));
        assert!(remaining.contains("This is the content."));
        assert!(!remaining.contains("title:"));
    }

    #[test]
    fn test_keys_keep_source_order() {
        let (fm, _) = FrontMatter::parse("---\nb: 1\na: 2\nc: 3\n---\n");
        let keys: Vec<_> = fm.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_single_requires_exactly_one_value() {
        let content = "---\ntitle:\n  - One\n  - Two\nauthor: [Solo]\nempty:\n---\nbody";
        let (fm, _) = FrontMatter::parse(content);
        assert!(fm.contains_key("title"));
        assert_eq!(fm.single("title"), None);
        assert_eq!(fm.single("author"), Some("Solo"));
        assert_eq!(fm.get("empty"), Some(&[][..]));
        assert_eq!(fm.single("empty"), None);
        assert_eq!(fm.single("missing"), None);
    }

    #[test]
    fn test_scalars_are_stringified() {
        let (fm, _) = FrontMatter::parse("---\ndraft: true\nweight: 3\nratio: 0.5\n---\n");
        assert_eq!(fm.single("draft"), Some("true"));
        assert_eq!(fm.single("weight"), Some("3"));
        assert_eq!(fm.single("ratio"), Some("0.5"));
    }

    #[test]
    fn test_numbers_keep_written_text() {
        let content = "---\ntitle: 3.10\ndate: 2024.10 # month\nversions: [1.0, 2.50]\nports:\n  - 8080\n  - 1.20\n---\n";
        let (fm, _) = FrontMatter::parse(content);
        assert_eq!(fm.single("title"), Some("3.10"));
        assert_eq!(fm.single("date"), Some("2024.10"));
        assert_eq!(fm.list("versions"), vec!["1.0", "2.50"]);
        assert_eq!(fm.list("ports"), vec!["8080", "1.20"]);
    }

    #[test]
    fn test_quoted_values_are_kept_verbatim() {
        let (fm, _) = FrontMatter::parse("---\ntitle: 'He said \"hi\"'\n---\n");
        assert_eq!(fm.single("title"), Some(r#"He said "hi""#));
    }

    #[test]
    fn test_nested_mapping_value_is_empty() {
        let (fm, _) = FrontMatter::parse("---\nauthor:\n  name: Someone\ntitle: T\n---\n");
        assert_eq!(fm.get("author"), Some(&[][..]));
        assert_eq!(fm.single("title"), Some("T"));
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just a heading\n\nSome text.";
        let (fm, remaining) = FrontMatter::parse(content);
        assert!(fm.is_empty());
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_empty_frontmatter_block() {
        let (fm, remaining) = FrontMatter::parse("---\n---\nBody");
        assert!(fm.is_empty());
        assert_eq!(remaining, "Body");
    }

    #[test]
    fn test_unclosed_frontmatter_is_content() {
        let content = "---\ntitle: Never closed\n";
        let (fm, remaining) = FrontMatter::parse(content);
        assert!(fm.is_empty());
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"
---

Some random text with markdown lists:
- Item 1
- Item 2

---
More content here.
"#;

        let (fm, remaining) = FrontMatter::parse(content);
        assert!(fm.is_empty());
        assert!(remaining.contains("Some random text"));
    }

    #[test]
    fn test_content_with_url_not_yaml() {
        let content = "---\n\nCheck out https://example.com/path\n\n---\nMore content.\n";
        let (fm, remaining) = FrontMatter::parse(content);
        assert!(fm.is_empty());
        assert!(remaining.contains("https://example.com"));
    }

    #[test]
    fn test_invalid_yaml_is_ignored() {
        let content = "---\ntitle: [unclosed\n---\nBody text";
        let (fm, remaining) = FrontMatter::parse(content);
        assert!(fm.is_empty());
        assert_eq!(remaining, "Body text");
    }

    #[test]
    fn test_from_iter() {
        let fm: FrontMatter = [("title", vec!["T"]), ("tags", vec!["a", "b"])]
            .into_iter()
            .collect();
        assert_eq!(fm.len(), 2);
        assert_eq!(fm.single("title"), Some("T"));
        assert_eq!(fm.list("tags"), vec!["a", "b"]);
    }
}
