//! HTML source document
//!
//! Indexes the heading elements of an HTML string without building a full
//! tree. Headings follow the browser's implicit-close rules: any `</hN>` end
//! tag or a new `<hN>` start tag closes the open heading, and an unclosed
//! heading runs to the end of input. Markup inside comments and raw-text
//! elements (`<script>`, `<style>`, ...) is not scanned.
//!
//! Serialization preserves every byte of the source except the start tags of
//! headings whose attributes were actually changed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

use super::{Document, HeadingLevel};

/// Elements whose content is never scanned for headings
const OPAQUE_ELEMENTS: [&str; 11] = [
    "script", "style", "textarea", "title", "template", "noscript", "xmp", "iframe", "noembed",
    "noframes", "plaintext",
];

/// Comments and tags, removed when computing rendered text. A `<` not
/// followed by a letter, `/`, `!` or `?` is literal text.
static MARKUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!---?>|<!--.*?-->|</?[A-Za-z][^>]*>|<[!?][^>]*>").expect("Invalid MARKUP_RE regex")
});

#[derive(Debug, Clone)]
struct Attribute {
    /// Lowercased name
    name: String,
    /// Entity-decoded value; `None` for a bare attribute
    value: Option<String>,
    /// Span of the attribute in the source
    raw: Range<usize>,
    modified: bool,
}

#[derive(Debug, Clone)]
struct Element {
    level: HeadingLevel,
    /// Tag name as written
    tag_name: String,
    start_tag: Range<usize>,
    content: Range<usize>,
    attrs: Vec<Attribute>,
    self_closing: bool,
    line: u32,
    dirty: bool,
}

#[derive(Debug)]
struct StartTag {
    name: String,
    attrs: Vec<Attribute>,
    self_closing: bool,
    end: usize,
}

/// Heading currently open while scanning
enum OpenHeading {
    Linked(Element),
    /// h1, h5 or h6: closes like a heading but is not indexed
    Other,
}

/// Handle to a heading inside an [`HtmlDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadingRef(usize);

/// An HTML document whose h2-h4 headings can be queried and re-attributed
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    source: String,
    headings: Vec<Element>,
}

impl HtmlDocument {
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let headings = scan_headings(&source);
        Self { source, headings }
    }

    /// Number of indexed h2-h4 headings
    pub fn heading_count(&self) -> usize {
        self.headings.len()
    }

    /// Whether any heading attribute has been changed since parsing
    pub fn is_modified(&self) -> bool {
        self.headings.iter().any(|h| h.dirty)
    }

    /// Serialize the document, rewriting only changed heading start tags
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(self.source.len() + 64);
        let mut cursor = 0;

        for element in self.headings.iter().filter(|h| h.dirty) {
            out.push_str(&self.source[cursor..element.start_tag.start]);
            out.push_str(&serialize_start_tag(&self.source, element));
            cursor = element.start_tag.end;
        }

        out.push_str(&self.source[cursor..]);
        out
    }
}

impl Document for HtmlDocument {
    type Node = HeadingRef;

    /// Only h2, h3 and h4 are indexed; any other tag yields no elements
    fn elements_by_tag_name(&self, tag: &str) -> Vec<HeadingRef> {
        let Some(level) = HeadingLevel::from_tag(tag) else {
            return Vec::new();
        };

        self.headings
            .iter()
            .enumerate()
            .filter(|(_, h)| h.level == level)
            .map(|(i, _)| HeadingRef(i))
            .collect()
    }

    fn inner_html(&self, node: HeadingRef) -> String {
        self.source[self.headings[node.0].content.clone()].to_string()
    }

    fn text_content(&self, node: HeadingRef) -> String {
        render_text(&self.source[self.headings[node.0].content.clone()])
    }

    fn attribute(&self, node: HeadingRef, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        self.headings[node.0]
            .attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.clone().unwrap_or_default())
    }

    fn set_attribute(&mut self, node: HeadingRef, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let element = &mut self.headings[node.0];

        match element.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => {
                if attr.value.as_deref().unwrap_or("") == value {
                    return;
                }
                attr.value = Some(value.to_string());
                attr.modified = true;
            }
            None => element.attrs.push(Attribute {
                name,
                value: Some(value.to_string()),
                raw: 0..0,
                modified: true,
            }),
        }

        element.dirty = true;
    }

    fn source_line(&self, node: HeadingRef) -> Option<u32> {
        Some(self.headings[node.0].line)
    }
}

/// Collapse heading markup into the text a reader sees
fn render_text(inner: &str) -> String {
    let stripped = MARKUP_RE.replace_all(inner, "");
    let decoded = html_escape::decode_html_entities(&stripped);
    decoded.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

fn serialize_start_tag(source: &str, element: &Element) -> String {
    let mut out = String::from("<");
    out.push_str(&element.tag_name);

    for attr in &element.attrs {
        out.push(' ');
        if !attr.modified {
            out.push_str(&source[attr.raw.clone()]);
            continue;
        }

        out.push_str(&attr.name);
        if let Some(value) = &attr.value {
            out.push_str("=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(value));
            out.push('"');
        }
    }

    if element.self_closing {
        out.push_str(" /");
    }
    out.push('>');
    out
}

fn is_heading_tag(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

fn is_tag_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'/' || b == b'>'
}

/// Tag name starting at `start`, up to whitespace, `/` or `>`
fn tag_name_at(source: &str, start: usize) -> &str {
    let bytes = source.as_bytes();
    let mut end = start;
    while end < bytes.len() && !is_tag_delimiter(bytes[end]) {
        end += 1;
    }
    &source[start..end]
}

/// Index just past the next `>` at or after `pos`
fn skip_past_gt(source: &str, pos: usize) -> usize {
    source[pos..]
        .find('>')
        .map(|off| pos + off + 1)
        .unwrap_or(source.len())
}

/// Index just past the end tag `</name ...>` found at or after `from`
fn find_close_tag(source: &str, from: usize, name: &str) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut i = from;

    while let Some(off) = source[i..].find("</") {
        let start = i + off + 2;
        let end = start + name.len();
        if end <= bytes.len()
            && bytes[start..end].eq_ignore_ascii_case(name.as_bytes())
            && (end == bytes.len() || is_tag_delimiter(bytes[end]))
        {
            return Some(skip_past_gt(source, end));
        }
        i = start;
    }

    None
}

/// Parse a start tag beginning at the `<` at `pos`
fn parse_start_tag(source: &str, pos: usize) -> Option<StartTag> {
    let bytes = source.as_bytes();
    let len = bytes.len();

    let name_start = pos + 1;
    if name_start >= len || !bytes[name_start].is_ascii_alphabetic() {
        return None;
    }
    let name = tag_name_at(source, name_start).to_string();
    let mut i = name_start + name.len();
    let mut attrs = Vec::new();

    loop {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len {
            return None;
        }

        match bytes[i] {
            b'>' => {
                return Some(StartTag {
                    name,
                    attrs,
                    self_closing: false,
                    end: i + 1,
                });
            }
            b'/' => {
                if i + 1 < len && bytes[i + 1] == b'>' {
                    return Some(StartTag {
                        name,
                        attrs,
                        self_closing: true,
                        end: i + 2,
                    });
                }
                i += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = i;
        i += 1;
        while i < len && !is_tag_delimiter(bytes[i]) && bytes[i] != b'=' {
            i += 1;
        }
        let attr_name = source[attr_start..i].to_ascii_lowercase();

        let mut j = i;
        while j < len && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let value = if j < len && bytes[j] == b'=' {
            j += 1;
            while j < len && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j >= len {
                return None;
            }

            match bytes[j] {
                quote @ (b'"' | b'\'') => {
                    let value_start = j + 1;
                    let off = source[value_start..].find(quote as char)?;
                    i = value_start + off + 1;
                    Some(&source[value_start..value_start + off])
                }
                _ => {
                    let value_start = j;
                    while j < len && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                        j += 1;
                    }
                    i = j;
                    Some(&source[value_start..j])
                }
            }
        } else {
            None
        };

        attrs.push(Attribute {
            name: attr_name,
            value: value.map(|v| html_escape::decode_html_entities(v).into_owned()),
            raw: attr_start..i,
            modified: false,
        });
    }
}

/// Tracks the 1-indexed line of increasing byte offsets
struct LineCounter<'a> {
    source: &'a str,
    cursor: usize,
    line: u32,
}

impl<'a> LineCounter<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, pos: usize) -> u32 {
        let newlines = self.source.as_bytes()[self.cursor..pos]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.line += newlines as u32;
        self.cursor = pos;
        self.line
    }
}

fn close_heading(open: OpenHeading, at: usize, headings: &mut Vec<Element>) {
    if let OpenHeading::Linked(mut element) = open {
        element.content.end = at;
        headings.push(element);
    }
}

fn scan_headings(source: &str) -> Vec<Element> {
    let mut headings = Vec::new();
    let mut open: Option<OpenHeading> = None;
    let mut lines = LineCounter::new(source);
    let mut i = 0;

    while let Some(off) = source[i..].find('<') {
        let pos = i + off;
        let rest = &source[pos..];

        if rest.starts_with("<!-->") || rest.starts_with("<!--->") {
            i = skip_past_gt(source, pos);
            continue;
        }

        if rest.starts_with("<!--") {
            i = source[pos + 4..]
                .find("-->")
                .map(|e| pos + 4 + e + 3)
                .unwrap_or(source.len());
            continue;
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            i = skip_past_gt(source, pos);
            continue;
        }

        if rest.starts_with("</") {
            if is_heading_tag(tag_name_at(source, pos + 2)) {
                if let Some(heading) = open.take() {
                    close_heading(heading, pos, &mut headings);
                }
            }
            i = skip_past_gt(source, pos);
            continue;
        }

        let Some(tag) = parse_start_tag(source, pos) else {
            i = pos + 1;
            continue;
        };

        let lower = tag.name.to_ascii_lowercase();

        if OPAQUE_ELEMENTS.contains(&lower.as_str()) && !tag.self_closing {
            i = find_close_tag(source, tag.end, &lower).unwrap_or(source.len());
            continue;
        }

        if is_heading_tag(&lower) {
            if let Some(heading) = open.take() {
                close_heading(heading, pos, &mut headings);
            }

            open = Some(match HeadingLevel::from_tag(&lower) {
                Some(level) => OpenHeading::Linked(Element {
                    level,
                    tag_name: tag.name,
                    start_tag: pos..tag.end,
                    content: tag.end..tag.end,
                    attrs: tag.attrs,
                    self_closing: tag.self_closing,
                    line: lines.line_at(pos),
                    dirty: false,
                }),
                None => OpenHeading::Other,
            });
        }

        i = tag.end;
    }

    if let Some(heading) = open.take() {
        close_heading(heading, source.len(), &mut headings);
    }

    headings
}
