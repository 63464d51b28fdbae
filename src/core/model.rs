//! Unified Result Model
//!
//! Every command maps its outcome to this model before rendering output.

use serde::{Deserialize, Serialize};

/// The kind of result item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// One processed document
    File,
    /// One heading inside a document
    Heading,
    /// A slug computed from command-line text
    Slug,
    Error,
}

/// Severity of an issue attached to a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

/// Line-based range (1-indexed, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeLine {
    pub start: u32,
    pub end: u32,
}

impl RangeLine {
    pub fn line(line: u32) -> Self {
        Self {
            start: line,
            end: line,
        }
    }
}

/// Metadata for a result item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    /// File size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// XXH3 hash of the content as read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// XXH3 hash of the content after linking, when it differs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_after: Option<String>,

    /// Whether the item's content was (or would be) changed
    #[serde(default)]
    pub changed: bool,
}

/// An issue attached to a result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
}

impl ItemError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::new(code, message)
        }
    }
}

/// The unified result item that all commands produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultItem {
    pub kind: Kind,

    /// Path relative to root, using '/' as separator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeLine>,

    /// Short human-readable payload (heading id, slug)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Structured data payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ItemError>,
}

impl ResultItem {
    fn with_kind(kind: Kind) -> Self {
        Self {
            kind,
            path: None,
            range: None,
            excerpt: None,
            data: None,
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// Create a new file result
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::with_kind(Kind::File)
        }
    }

    /// Create a new heading result
    pub fn heading(path: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            excerpt: Some(id.into()),
            ..Self::with_kind(Kind::Heading)
        }
    }

    /// Create a new slug result
    pub fn slug(slug: impl Into<String>) -> Self {
        Self {
            excerpt: Some(slug.into()),
            ..Self::with_kind(Kind::Slug)
        }
    }

    /// Create a new error result
    pub fn error(error: ItemError) -> Self {
        Self {
            errors: vec![error],
            ..Self::with_kind(Kind::Error)
        }
    }

    /// Set the path
    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the range to a single line, if known
    pub fn at_line(mut self, line: Option<u32>) -> Self {
        self.range = line.map(RangeLine::line);
        self
    }

    /// Set metadata
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Set structured data payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Add an error
    pub fn with_error(mut self, error: ItemError) -> Self {
        self.errors.push(error);
        self
    }

    /// Whether any attached issue has error severity
    pub fn has_error(&self) -> bool {
        self.errors.iter().any(|e| e.severity == Severity::Error)
    }
}

/// Result set containing multiple result items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = ResultItem>) {
        self.items.extend(items);
    }

    /// Sort items by path and line for stable output. Items without a line
    /// sort first within their path and otherwise keep their relative order.
    pub fn sort(&mut self) {
        self.items.sort_by(|a, b| match (&a.path, &b.path) {
            (Some(pa), Some(pb)) => pa.cmp(pb).then_with(|| line_of(a).cmp(&line_of(b))),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items carrying an error-severity issue
    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|i| i.has_error()).count()
    }
}

fn line_of(item: &ResultItem) -> u32 {
    item.range.map(|r| r.start).unwrap_or(0)
}

impl IntoIterator for ResultSet {
    type Item = ResultItem;
    type IntoIter = std::vec::IntoIter<ResultItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<ResultItem> for ResultSet {
    fn from_iter<T: IntoIterator<Item = ResultItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_item_file() {
        let item = ResultItem::file("docs/index.html");
        assert_eq!(item.kind, Kind::File);
        assert_eq!(item.path, Some("docs/index.html".to_string()));
        assert!(item.errors.is_empty());
    }

    #[test]
    fn test_result_item_heading() {
        let item = ResultItem::heading("a.html", "intro").at_line(Some(7));
        assert_eq!(item.kind, Kind::Heading);
        assert_eq!(item.excerpt, Some("intro".to_string()));
        assert_eq!(item.range, Some(RangeLine::line(7)));
    }

    #[test]
    fn test_result_item_error() {
        let item = ResultItem::error(ItemError::new("READ_FAILED", "binary file")).at_path("x.html");
        assert_eq!(item.kind, Kind::Error);
        assert_eq!(item.errors[0].code, "READ_FAILED");
        assert!(item.has_error());
    }

    #[test]
    fn test_warning_is_not_error() {
        let item = ResultItem::heading("a.html", "").with_error(ItemError::warning("EMPTY_ID", "empty"));
        assert!(!item.has_error());
    }

    #[test]
    fn test_result_set_sort() {
        let mut set = ResultSet::new();
        set.push(ResultItem::error(ItemError::new("ERR", "no path")));
        set.push(ResultItem::heading("b.html", "x").at_line(Some(3)));
        set.push(ResultItem::heading("a.html", "y").at_line(Some(9)));
        set.push(ResultItem::heading("a.html", "z").at_line(Some(2)));
        set.sort();

        let order: Vec<_> = set.items.iter().map(|i| i.excerpt.clone()).collect();
        assert_eq!(
            order,
            vec![
                Some("z".to_string()),
                Some("y".to_string()),
                Some("x".to_string()),
                None
            ]
        );
    }

    #[test]
    fn test_sort_is_stable_without_lines() {
        let mut set = ResultSet::new();
        set.push(ResultItem::file("a.html"));
        set.push(ResultItem::heading("a.html", "first"));
        set.sort();
        assert_eq!(set.items[0].kind, Kind::File);
    }

    #[test]
    fn test_error_count() {
        let set: ResultSet = vec![
            ResultItem::file("a.html"),
            ResultItem::error(ItemError::new("E", "bad")),
            ResultItem::file("b.html").with_error(ItemError::warning("W", "meh")),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 3);
        assert_eq!(set.error_count(), 1);
    }

    #[test]
    fn test_serialization_shape() {
        let item = ResultItem::heading("a.html", "intro").with_data(serde_json::json!({"level": "h2"}));
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"kind\":\"heading\""));
        assert!(json.contains("\"data\":{\"level\":\"h2\"}"));
        assert!(!json.contains("errors"));
        assert!(json.contains("\"changed\":false"));
    }

    #[test]
    fn test_deserialization_defaults() {
        let json = r#"{"kind":"file","path":"a.html","meta":{},"errors":[{"code":"X","message":"m"}]}"#;
        let item: ResultItem = serde_json::from_str(json).unwrap();
        assert!(!item.meta.changed);
        assert_eq!(item.errors[0].severity, Severity::Error);
    }
}
