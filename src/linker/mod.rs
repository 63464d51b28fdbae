//! Linker module - Assign anchor ids to h2/h3/h4 headings
//!
//! Every heading gets an `id` derived from its text: lowercased, with the
//! first space turned into a hyphen. `SlugMode::AllSpaces` hyphenates every
//! space instead, and `unique` suffixes repeated ids; both are opt-in.

pub mod slug;
pub mod unique;

use serde::Serialize;
use std::collections::HashMap;

use crate::dom::{Document, HeadingLevel};
use crate::error::HeadlinkError;
pub use slug::{slugify, SlugMode};
use unique::IdRegistry;

/// Announced on the diagnostic stream when a linking pass starts
pub const STARTUP_MESSAGE: &str = "[ .. ] Linking header names...";

/// Which text of a heading the slug is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextSource {
    /// Rendered text: markup removed, entities decoded, whitespace collapsed
    #[default]
    Text,
    /// The raw inner markup, unmodified
    InnerHtml,
}

impl std::str::FromStr for TextSource {
    type Err = HeadlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(TextSource::Text),
            "inner-html" | "html" => Ok(TextSource::InnerHtml),
            _ => Err(HeadlinkError::InvalidOption {
                option: "text source",
                value: s.to_string(),
            }),
        }
    }
}

/// Options for a linking pass. The default reproduces plain first-space
/// slugs with no collision handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkOptions {
    pub mode: SlugMode,
    pub unique: bool,
    pub text_source: TextSource,
}

/// One heading visited by a linking pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedHeading {
    pub level: HeadingLevel,

    /// Position among headings of the same level, in document order
    pub index: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// The text the id was derived from
    pub text: String,

    /// The `id` attribute before the pass, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<String>,

    pub id: String,
}

impl LinkedHeading {
    /// Whether the pass changed (or added) the `id` attribute
    pub fn changed(&self) -> bool {
        self.previous_id.as_deref() != Some(self.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkWarningCode {
    /// The heading has no text, so its id is the empty string
    EmptyId,
    /// Another heading in the same document got the same id
    DuplicateId,
}

impl LinkWarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkWarningCode::EmptyId => "EMPTY_ID",
            LinkWarningCode::DuplicateId => "DUPLICATE_ID",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkWarning {
    pub code: LinkWarningCode,
    pub message: String,
    pub level: HeadingLevel,
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Everything a linking pass did to one document
#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkReport {
    pub headings: Vec<LinkedHeading>,
    pub warnings: Vec<LinkWarning>,
}

impl LinkReport {
    pub fn changed_count(&self) -> usize {
        self.headings.iter().filter(|h| h.changed()).count()
    }

    pub fn count_for(&self, level: HeadingLevel) -> usize {
        self.headings.iter().filter(|h| h.level == level).count()
    }
}

fn heading_text<D: Document>(doc: &D, node: D::Node, source: TextSource) -> String {
    match source {
        TextSource::Text => doc.text_content(node),
        TextSource::InnerHtml => doc.inner_html(node),
    }
}

/// Compute the id of every heading, in visiting order, without touching the
/// document.
fn plan<D: Document>(doc: &D, options: &LinkOptions) -> (Vec<D::Node>, LinkReport) {
    let mut nodes = Vec::new();
    let mut report = LinkReport::default();
    let mut registry = options.unique.then(IdRegistry::new);
    let mut first_use: HashMap<String, (HeadingLevel, usize)> = HashMap::new();

    for level in HeadingLevel::ALL {
        let elements = doc.elements_by_tag_name(level.tag());
        if elements.is_empty() {
            log::debug!("no <{}> headings, skipping level", level.tag());
            continue;
        }

        for (index, node) in elements.into_iter().enumerate() {
            let text = heading_text(doc, node, options.text_source);
            let slug = slugify(&text, options.mode);
            let id = match registry.as_mut() {
                Some(registry) => registry.claim(&slug),
                None => slug,
            };
            let line = doc.source_line(node);

            if id.is_empty() {
                report.warnings.push(LinkWarning {
                    code: LinkWarningCode::EmptyId,
                    message: format!("<{}> #{} has no text; its id is empty", level.tag(), index),
                    level,
                    index,
                    line,
                });
            }

            match first_use.get(&id) {
                Some((first_level, first_index)) => report.warnings.push(LinkWarning {
                    code: LinkWarningCode::DuplicateId,
                    message: format!(
                        "id '{}' already assigned to <{}> #{}",
                        id,
                        first_level.tag(),
                        first_index
                    ),
                    level,
                    index,
                    line,
                }),
                None => {
                    first_use.insert(id.clone(), (level, index));
                }
            }

            report.headings.push(LinkedHeading {
                level,
                index,
                line,
                text,
                previous_id: doc.attribute(node, "id"),
                id,
            });
            nodes.push(node);
        }
    }

    (nodes, report)
}

/// Report the ids a linking pass would assign, leaving the document as is
pub fn plan_links<D: Document>(doc: &D, options: &LinkOptions) -> LinkReport {
    plan(doc, options).1
}

/// Give every h2, h3 and h4 of `doc` an `id` derived from its text.
///
/// Levels are visited in order (all h2, then h3, then h4), each in document
/// order; a level with no elements is skipped. Any prior `id` is overwritten.
/// Running the pass twice on an unchanged document assigns the same ids.
pub fn link_headers<D: Document>(doc: &mut D, options: &LinkOptions) -> LinkReport {
    log::info!("{}", STARTUP_MESSAGE);

    let (nodes, report) = plan(doc, options);
    for (node, heading) in nodes.into_iter().zip(&report.headings) {
        doc.set_attribute(node, "id", &heading.id);
    }

    log::debug!(
        "linked {} headings ({} changed, {} warnings)",
        report.headings.len(),
        report.changed_count(),
        report.warnings.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::html::HtmlDocument;
    use crate::dom::memory::MemoryDocument;

    #[test]
    fn test_first_space_literal() {
        let mut doc = MemoryDocument::new();
        let h = doc.push("h2", "Quick Start Guide");
        link_headers(&mut doc, &LinkOptions::default());
        assert_eq!(doc.id_of(h), Some("quick-start guide"));
    }

    #[test]
    fn test_all_spaces_mode() {
        let mut doc = MemoryDocument::new();
        let h = doc.push("h2", "Quick Start Guide");
        let options = LinkOptions {
            mode: SlugMode::AllSpaces,
            ..Default::default()
        };
        link_headers(&mut doc, &options);
        assert_eq!(doc.id_of(h), Some("quick-start-guide"));
    }

    #[test]
    fn test_every_level_gets_an_id() {
        let mut doc = MemoryDocument::new();
        let h2 = doc.push("h2", "Overview");
        let h3 = doc.push("h3", "Details Here");
        let h4 = doc.push("h4", "Fine Print");
        let p = doc.push("p", "Body text");
        let h1 = doc.push("h1", "Title");

        let report = link_headers(&mut doc, &LinkOptions::default());

        assert_eq!(doc.id_of(h2), Some("overview"));
        assert_eq!(doc.id_of(h3), Some("details-here"));
        assert_eq!(doc.id_of(h4), Some("fine-print"));
        assert_eq!(doc.id_of(p), None);
        assert_eq!(doc.id_of(h1), None);
        assert_eq!(report.headings.len(), 3);
    }

    #[test]
    fn test_missing_levels_are_skipped() {
        let mut doc = MemoryDocument::new();
        let h3 = doc.push("h3", "Only Three");

        let report = link_headers(&mut doc, &LinkOptions::default());

        assert_eq!(doc.id_of(h3), Some("only-three"));
        assert_eq!(report.count_for(HeadingLevel::H2), 0);
        assert_eq!(report.count_for(HeadingLevel::H3), 1);
        assert_eq!(report.count_for(HeadingLevel::H4), 0);
    }

    #[test]
    fn test_empty_document() {
        let mut doc = MemoryDocument::new();
        let report = link_headers(&mut doc, &LinkOptions::default());
        assert!(report.headings.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_levels_visited_in_order() {
        let mut doc = MemoryDocument::new();
        doc.push("h4", "D");
        doc.push("h2", "A");
        doc.push("h3", "C");
        doc.push("h2", "B");

        let report = link_headers(&mut doc, &LinkOptions::default());
        let ids: Vec<_> = report.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(report.headings[1].index, 1);
    }

    #[test]
    fn test_overwrites_existing_id() {
        let mut doc = MemoryDocument::new();
        let h = doc.push("h2", "Fresh Name");
        doc.set_attribute(h, "id", "stale");

        let report = link_headers(&mut doc, &LinkOptions::default());

        assert_eq!(doc.id_of(h), Some("fresh-name"));
        assert_eq!(report.headings[0].previous_id.as_deref(), Some("stale"));
        assert!(report.headings[0].changed());
    }

    #[test]
    fn test_idempotent() {
        let mut doc = MemoryDocument::new();
        doc.push("h2", "Getting Started");
        doc.push("h3", "Step One Two");
        doc.push("h3", "Step One Two");

        let first = link_headers(&mut doc, &LinkOptions::default());
        let snapshot = doc.clone();
        let second = link_headers(&mut doc, &LinkOptions::default());

        let first_ids: Vec<_> = first.headings.iter().map(|h| h.id.clone()).collect();
        let second_ids: Vec<_> = second.headings.iter().map(|h| h.id.clone()).collect();
        assert_eq!(first_ids, second_ids);
        assert_eq!(second.changed_count(), 0);
        for i in 0..doc.elements.len() {
            assert_eq!(doc.id_of(i), snapshot.id_of(i));
        }
    }

    #[test]
    fn test_idempotent_with_unique() {
        let mut doc = MemoryDocument::new();
        doc.push("h2", "Notes");
        doc.push("h2", "Notes");
        let options = LinkOptions {
            unique: true,
            ..Default::default()
        };

        link_headers(&mut doc, &options);
        let second = link_headers(&mut doc, &options);
        assert_eq!(second.changed_count(), 0);
        assert_eq!(doc.id_of(1), Some("notes-1"));
    }

    #[test]
    fn test_collision_is_kept_by_default() {
        let mut doc = MemoryDocument::new();
        let a = doc.push("h2", "Getting Started");
        let b = doc.push("h2", "Getting-Started");

        let report = link_headers(&mut doc, &LinkOptions::default());

        assert_eq!(doc.id_of(a), Some("getting-started"));
        assert_eq!(doc.id_of(b), Some("getting-started"));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, LinkWarningCode::DuplicateId);
        assert_eq!(report.warnings[0].index, 1);
    }

    #[test]
    fn test_collision_resolved_with_unique() {
        let mut doc = MemoryDocument::new();
        let a = doc.push("h2", "Getting Started");
        let b = doc.push("h2", "Getting-Started");
        let c = doc.push("h3", "getting started");

        let options = LinkOptions {
            unique: true,
            ..Default::default()
        };
        let report = link_headers(&mut doc, &options);

        assert_eq!(doc.id_of(a), Some("getting-started"));
        assert_eq!(doc.id_of(b), Some("getting-started-1"));
        assert_eq!(doc.id_of(c), Some("getting-started-2"));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_text_warns() {
        let mut doc = MemoryDocument::new();
        let h = doc.push("h4", "");

        let report = link_headers(&mut doc, &LinkOptions::default());

        assert_eq!(doc.id_of(h), Some(""));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, LinkWarningCode::EmptyId);
        assert_eq!(report.warnings[0].code.as_str(), "EMPTY_ID");
    }

    #[test]
    fn test_plan_does_not_mutate() {
        let mut doc = MemoryDocument::new();
        let h = doc.push("h2", "Planned Only");

        let report = plan_links(&doc, &LinkOptions::default());

        assert_eq!(report.headings[0].id, "planned-only");
        assert_eq!(doc.id_of(h), None);
    }

    #[test]
    fn test_html_document_text_sources() {
        let source = "<h2><em>API</em> Reference</h2>";

        let mut doc = HtmlDocument::parse(source);
        link_headers(&mut doc, &LinkOptions::default());
        assert_eq!(doc.to_html(), "<h2 id=\"api-reference\"><em>API</em> Reference</h2>");

        let mut raw = HtmlDocument::parse(source);
        let options = LinkOptions {
            text_source: TextSource::InnerHtml,
            ..Default::default()
        };
        let report = link_headers(&mut raw, &options);
        assert_eq!(report.headings[0].id, "<em>api</em>-reference");
    }

    #[test]
    fn test_html_document_end_to_end() {
        let source = "<html><body>\n\
                      <h2 id=\"old\">Quick Start Guide</h2>\n\
                      <h3>Install It</h3>\n\
                      <h4 class=\"note\">Fine Print</h4>\n\
                      </body></html>\n";
        let mut doc = HtmlDocument::parse(source);

        let report = link_headers(&mut doc, &LinkOptions::default());

        assert_eq!(report.changed_count(), 3);
        assert_eq!(report.headings[0].line, Some(2));
        assert_eq!(
            doc.to_html(),
            "<html><body>\n\
             <h2 id=\"quick-start guide\">Quick Start Guide</h2>\n\
             <h3 id=\"install-it\">Install It</h3>\n\
             <h4 class=\"note\" id=\"fine-print\">Fine Print</h4>\n\
             </body></html>\n"
        );
    }

    #[test]
    fn test_literal_angle_brackets_in_heading_text() {
        let mut doc = HtmlDocument::parse("<h2>1 < 2 and 3 > 2</h2>");
        let report = link_headers(&mut doc, &LinkOptions::default());
        assert_eq!(report.headings[0].id, "1-< 2 and 3 > 2");
    }

    #[test]
    fn test_whitespace_only_heading_gets_empty_id() {
        let mut doc = HtmlDocument::parse("<h3>   \n </h3>");
        let report = link_headers(&mut doc, &LinkOptions::default());

        assert_eq!(report.headings[0].id, "");
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, LinkWarningCode::EmptyId);
        assert_eq!(doc.to_html(), "<h3 id=\"\">   \n </h3>");
    }

    #[test]
    fn test_bare_empty_id_is_unchanged() {
        let mut doc = HtmlDocument::parse("<h2 id></h2>");
        let report = link_headers(&mut doc, &LinkOptions::default());

        assert_eq!(report.changed_count(), 0);
        assert!(!doc.is_modified());
        assert_eq!(doc.to_html(), "<h2 id></h2>");
    }

    #[test]
    fn test_text_source_parse() {
        assert_eq!("text".parse::<TextSource>().unwrap(), TextSource::Text);
        assert_eq!("inner-html".parse::<TextSource>().unwrap(), TextSource::InnerHtml);
        assert!("markdown".parse::<TextSource>().is_err());
    }

    #[test]
    fn test_report_serialization() {
        let heading = LinkedHeading {
            level: HeadingLevel::H3,
            index: 0,
            line: None,
            text: "A B".to_string(),
            previous_id: None,
            id: "a-b".to_string(),
        };
        let json = serde_json::to_string(&heading).unwrap();
        assert!(json.contains("\"level\":\"h3\""));
        assert!(!json.contains("previous_id"));
    }
}
