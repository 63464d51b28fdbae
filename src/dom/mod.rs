//! Document module - The element tree the linker reads and mutates
//!
//! Provides:
//! - Document: query-by-tag-name and attribute access over an element tree
//! - HeadingLevel: the three heading tags that get linked (h2, h3, h4)
//! - html: a Document over HTML source text that re-serializes losslessly

pub mod html;

#[cfg(test)]
pub mod memory;

use serde::Serialize;

/// Heading levels that receive ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    /// Levels in the order the linker visits them
    pub const ALL: [HeadingLevel; 3] = [HeadingLevel::H2, HeadingLevel::H3, HeadingLevel::H4];

    /// Lowercase tag name
    pub fn tag(&self) -> &'static str {
        match self {
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
        }
    }

    /// Parse a tag name (case-insensitive)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "h2" => Some(HeadingLevel::H2),
            "h3" => Some(HeadingLevel::H3),
            "h4" => Some(HeadingLevel::H4),
            _ => None,
        }
    }
}

/// A tree of elements that can be queried by tag name and whose attributes
/// can be rewritten in place.
///
/// Nodes are lightweight handles owned by the document; the caller never
/// creates or destroys elements through this trait.
pub trait Document {
    type Node: Copy;

    /// Elements with the given tag name, in document order
    fn elements_by_tag_name(&self, tag: &str) -> Vec<Self::Node>;

    /// Raw markup between the element's start and end tags
    fn inner_html(&self, node: Self::Node) -> String;

    /// Rendered text of the element: markup removed, entities decoded,
    /// whitespace runs collapsed and trimmed
    fn text_content(&self, node: Self::Node) -> String;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    /// Set an attribute, overwriting any prior value
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    /// 1-indexed source line of the element, when the document knows it
    fn source_line(&self, _node: Self::Node) -> Option<u32> {
        None
    }
}
