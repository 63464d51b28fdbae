//! Renderer module
//!
//! Renders ResultSet to different output formats: jsonl, json, md, raw

use crate::core::model::{Kind, ResultItem, ResultSet, Severity};
use crate::error::HeadlinkError;
use std::io::Write;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = HeadlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(HeadlinkError::InvalidOption {
                option: "format",
                value: s.to_string(),
            }),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    #[allow(dead_code)]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pretty: false,
        }
    }

    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Renderer for result sets
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a result set to a string
    pub fn render(&self, result_set: &ResultSet) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(result_set),
            OutputFormat::Json => self.render_json(result_set),
            OutputFormat::Markdown => self.render_markdown(result_set),
            OutputFormat::Raw => self.render_raw(result_set),
        }
    }

    /// Render to a writer, followed by a newline when there is output
    pub fn render_to<W: Write>(&self, result_set: &ResultSet, mut writer: W) -> std::io::Result<()> {
        let output = self.render(result_set);
        if output.is_empty() {
            return Ok(());
        }
        writer.write_all(output.as_bytes())?;
        writer.write_all(b"\n")
    }

    /// Render as JSON Lines (one JSON object per line)
    fn render_jsonl(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| {
                if self.config.pretty {
                    serde_json::to_string_pretty(item).ok()
                } else {
                    serde_json::to_string(item).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// Render as a single JSON array
    fn render_json(&self, result_set: &ResultSet) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        }
    }

    /// Render as Markdown
    fn render_markdown(&self, result_set: &ResultSet) -> String {
        let mut output = String::new();

        let mut files = Vec::new();
        let mut headings = Vec::new();
        let mut slugs = Vec::new();
        let mut errors = Vec::new();

        for item in &result_set.items {
            match item.kind {
                Kind::File => files.push(item),
                Kind::Heading => headings.push(item),
                Kind::Slug => slugs.push(item),
                Kind::Error => errors.push(item),
            }
        }

        if !errors.is_empty() {
            output.push_str("## Errors\n\n");
            for item in errors {
                self.render_issues_md(&mut output, item);
            }
            output.push('\n');
        }

        if !files.is_empty() {
            output.push_str("## Files\n\n");
            for item in files {
                if let Some(path) = &item.path {
                    output.push_str(&format!("- `{}`", path));
                    if item.meta.changed {
                        output.push_str(" (changed)");
                    }
                    output.push('\n');
                }
                self.render_issues_md(&mut output, item);
            }
            output.push('\n');
        }

        if !headings.is_empty() {
            output.push_str("## Headings\n\n");
            for item in headings {
                self.render_heading_md(&mut output, item);
            }
            output.push('\n');
        }

        if !slugs.is_empty() {
            output.push_str("## Slugs\n\n");
            for item in slugs {
                if let Some(slug) = &item.excerpt {
                    output.push_str(&format!("- `{}`\n", slug));
                }
            }
            output.push('\n');
        }

        output
    }

    fn render_heading_md(&self, output: &mut String, item: &ResultItem) {
        output.push_str("- ");
        if let Some(path) = &item.path {
            output.push_str(&format!("`{}`", path));
            if let Some(range) = &item.range {
                output.push_str(&format!(":{}", range.start));
            }
            output.push(' ');
        }
        if let Some(id) = &item.excerpt {
            output.push_str(&format!("`#{}`", id));
        }
        if item.meta.changed {
            output.push_str(" (changed)");
        }
        output.push('\n');
        self.render_issues_md(output, item);
    }

    fn render_issues_md(&self, output: &mut String, item: &ResultItem) {
        for error in &item.errors {
            let marker = match error.severity {
                Severity::Error => "**",
                Severity::Warning => "_",
            };
            output.push_str(&format!("  - {0}{1}{0}: {2}", marker, error.code, error.message));
            if let Some(path) = &item.path {
                if item.kind == Kind::Error {
                    output.push_str(&format!(" (`{}`)", path));
                }
            }
            output.push('\n');
        }
    }

    /// Render as raw output: excerpts only
    fn render_raw(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| item.excerpt.clone())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
