//! Frontmatter extraction for post and comment bodies.
//!
//! A body may begin with a block delimited by `---` lines holding one
//! `key: value` pair per line. Posts use it for `slug`, `tags` and `date`;
//! comments created through the API carry `nickname`, `email` and
//! `timestamp`. Parsing never fails: anything malformed yields an empty
//! record and the body unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DELIMITER: &str = "---";
const TAGS_KEY: &str = "tags";

/// Value stored under a frontmatter key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrontmatterValue {
    Scalar(String),
    List(Vec<String>),
}

impl FrontmatterValue {
    /// Returns the scalar string, or `None` for lists.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FrontmatterValue::Scalar(value) => Some(value),
            FrontmatterValue::List(_) => None,
        }
    }
}

/// Parsed frontmatter record.
///
/// Keys are kept sorted so serialization is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frontmatter(BTreeMap<String, FrontmatterValue>);

impl Frontmatter {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.0.get(key)
    }

    /// Returns a non-empty scalar value for `key`.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(FrontmatterValue::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn slug(&self) -> Option<&str> {
        self.scalar("slug")
    }

    pub fn nickname(&self) -> Option<&str> {
        self.scalar("nickname")
    }

    pub fn email(&self) -> Option<&str> {
        self.scalar("email")
    }

    pub fn date(&self) -> Option<&str> {
        self.scalar("date")
    }

    /// Returns the declared tags, empty when the key is missing.
    pub fn tags(&self) -> &[String] {
        match self.0.get(TAGS_KEY) {
            Some(FrontmatterValue::List(tags)) => tags,
            _ => &[],
        }
    }

    /// Inserts a raw value the way the parser would.
    ///
    /// The `tags` key is split on commas into a list; every other key is
    /// stored as a scalar.
    pub fn insert(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
        let key = key.into();
        let value = value.as_ref();
        let value = if key == TAGS_KEY {
            FrontmatterValue::List(split_tags(value))
        } else {
            FrontmatterValue::Scalar(value.to_string())
        };
        self.0.insert(key, value);
    }

    /// Replaces the tag list.
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = tags.into_iter().map(Into::into).collect();
        self.0
            .insert(TAGS_KEY.to_string(), FrontmatterValue::List(tags));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontmatterValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Serializes the record as a delimited header.
    ///
    /// Lists are joined with `", "`. The output ends with a newline so body
    /// text can be appended directly.
    pub fn to_header(&self) -> String {
        let mut header = String::from(DELIMITER);
        header.push('\n');
        for (key, value) in &self.0 {
            let rendered = match value {
                FrontmatterValue::Scalar(value) => value.clone(),
                FrontmatterValue::List(items) => items.join(", "),
            };
            header.push_str(&format!("{}: {}\n", key, rendered));
        }
        header.push_str(DELIMITER);
        header.push('\n');
        header
    }
}

/// Splits a body into its frontmatter record and remaining content.
///
/// The first line must be exactly `---` (trailing whitespace allowed) and a
/// later line must close the block the same way. Each line in between is
/// split on its first colon only, so values may contain colons. Lines without
/// a colon or with an empty key are skipped.
///
/// # Arguments
///
/// * `text`: Raw post or comment body
///
/// # Returns
///
/// The record and the trimmed text after the closing delimiter. When there
/// is no opening or closing delimiter, an empty record and `text` unchanged.
pub fn parse(text: &str) -> (Frontmatter, &str) {
    let mut lines = text.split_inclusive('\n');
    let opens = lines
        .next()
        .is_some_and(|first| first.trim_end() == DELIMITER);
    if !opens {
        return (Frontmatter::new(), text);
    }

    let mut offset = text.find('\n').map_or(text.len(), |pos| pos + 1);
    let mut record = Frontmatter::new();

    for line in lines {
        offset += line.len();
        let line = line.trim_end_matches(['\n', '\r']);

        if line.trim() == DELIMITER {
            return (record, text[offset..].trim());
        }

        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                record.insert(key, value.trim());
            }
        }
    }

    // Unclosed block: treat as ordinary content
    (Frontmatter::new(), text)
}

fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_record() {
        // Arrange
        let text = "---\nslug: hello-world\ndate: 2024-01-02\n---\n\n# Hello\n";

        // Act
        let (record, content) = parse(text);

        // Assert
        assert_eq!(record.slug(), Some("hello-world"));
        assert_eq!(record.date(), Some("2024-01-02"));
        assert_eq!(content, "# Hello");
    }

    #[test]
    fn test_parse_tags_split_on_commas() {
        // Arrange
        let text = "---\ntags: rust, graphql ,, blog\n---\nbody";

        // Act
        let (record, _) = parse(text);

        // Assert
        assert_eq!(record.tags(), ["rust", "graphql", "blog"]);
    }

    #[test]
    fn test_parse_value_with_colons() {
        // Arrange
        let text = "---\ntimestamp: 2024-05-01T10:20:30.000Z\nlink: https://example.com/a:b\n---\n";

        // Act
        let (record, content) = parse(text);

        // Assert
        assert_eq!(record.scalar("timestamp"), Some("2024-05-01T10:20:30.000Z"));
        assert_eq!(record.scalar("link"), Some("https://example.com/a:b"));
        assert_eq!(content, "");
    }

    #[test]
    fn test_parse_without_delimiter_returns_text_unchanged() {
        // Arrange
        let text = "Just a comment\n---\nnot: frontmatter\n---";

        // Act
        let (record, content) = parse(text);

        // Assert
        assert!(record.is_empty(), "Record should be empty");
        assert_eq!(content, text);
    }

    #[test]
    fn test_parse_unclosed_block_fails_soft() {
        // Arrange
        let text = "---\nslug: broken\nno closing delimiter";

        // Act
        let (record, content) = parse(text);

        // Assert
        assert!(record.is_empty(), "Unclosed block should yield no metadata");
        assert_eq!(content, text);
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        // Arrange
        let text = "---\njust words\n: no key\nnickname: Ada\n---\nHi";

        // Act
        let (record, content) = parse(text);

        // Assert
        assert_eq!(record.len(), 1);
        assert_eq!(record.nickname(), Some("Ada"));
        assert_eq!(content, "Hi");
    }

    #[test]
    fn test_parse_crlf_line_endings() {
        // Arrange
        let text = "---\r\nnickname: Ada\r\nemail: ada@example.com\r\n---\r\nHello\r\n";

        // Act
        let (record, content) = parse(text);

        // Assert
        assert_eq!(record.nickname(), Some("Ada"));
        assert_eq!(record.email(), Some("ada@example.com"));
        assert_eq!(content, "Hello");
    }

    #[test]
    fn test_parse_empty_input() {
        let (record, content) = parse("");
        assert!(record.is_empty());
        assert_eq!(content, "");
    }

    #[test]
    fn test_empty_scalar_is_not_exposed_by_accessor() {
        // Arrange
        let text = "---\nemail:\n---\nbody";

        // Act
        let (record, _) = parse(text);

        // Assert
        assert_eq!(
            record.get("email"),
            Some(&FrontmatterValue::Scalar(String::new()))
        );
        assert_eq!(record.email(), None, "Empty email should read as absent");
    }

    #[test]
    fn test_header_round_trip() {
        // Arrange
        let mut record = Frontmatter::new();
        record.insert("slug", "round-trip");
        record.insert("nickname", "Grace Hopper");
        record.insert("timestamp", "2024-05-01T10:20:30Z");
        record.set_tags(["rust", "web dev"]);

        // Act
        let header = record.to_header();
        let (parsed, content) = parse(&header);

        // Assert
        assert_eq!(parsed, record);
        assert_eq!(content, "");
    }

    #[test]
    fn test_header_round_trip_with_body() {
        // Arrange
        let mut record = Frontmatter::new();
        record.insert("nickname", "Ada");
        let text = format!("{}Body text\nsecond line", record.to_header());

        // Act
        let (parsed, content) = parse(&text);

        // Assert
        assert_eq!(parsed, record);
        assert_eq!(content, "Body text\nsecond line");
    }

    #[test]
    fn test_empty_record_round_trip() {
        let record = Frontmatter::new();
        let header = record.to_header();

        assert_eq!(header, "---\n---\n");
        let (parsed, _) = parse(&header);
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_serializes_as_plain_json_object() {
        // Arrange
        let (record, _) = parse("---\nslug: a\ntags: x, y\n---\n");

        // Act
        let json = serde_json::to_value(&record).expect("Should serialize");

        // Assert
        assert_eq!(json, serde_json::json!({ "slug": "a", "tags": ["x", "y"] }));
    }
}
