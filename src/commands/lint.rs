//! Lint command - Check heading ids without rewriting anything
//!
//! Checks for:
//! - headings with no id
//! - ids that differ from what linking would assign
//! - empty and duplicate ids

use anyhow::{bail, Context, Result};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::backends::scan::{collect_targets, ScanOptions};
use crate::commands::{emit, error_item};
use crate::core::file_reader::{read_file_with_config, FileReadConfig};
use crate::core::model::{ItemError, ResultItem, ResultSet, Severity};
use crate::core::paths::{display_path, is_html_file};
use crate::core::render::RenderConfig;
use crate::dom::html::HtmlDocument;
use crate::error::HeadlinkError;
use crate::linker::{plan_links, LinkOptions};

/// A lint issue
#[derive(Debug, Clone)]
pub struct LintIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub path: String,
    pub line: Option<u32>,
    /// The id linking would assign
    pub expected: Option<String>,
}

impl LintIssue {
    fn new(severity: Severity, code: &'static str, message: String, path: &str, line: Option<u32>) -> Self {
        Self {
            severity,
            code,
            message,
            path: path.to_string(),
            line,
            expected: None,
        }
    }

    pub fn to_result_item(&self) -> ResultItem {
        let error = match self.severity {
            Severity::Error => ItemError::new(self.code, &self.message),
            Severity::Warning => ItemError::warning(self.code, &self.message),
        };

        let mut item = ResultItem::error(error)
            .at_path(&self.path)
            .at_line(self.line);
        if let Some(expected) = &self.expected {
            item = item.with_data(json!({ "expected": expected }));
        }
        item
    }
}

/// Lint the headings of an HTML string
pub fn lint_source(source: &str, path: &str, options: &LinkOptions) -> Vec<LintIssue> {
    let doc = HtmlDocument::parse(source);
    log::debug!("{}: {} headings", path, doc.heading_count());
    let report = plan_links(&doc, options);
    let mut issues = Vec::new();

    for heading in &report.headings {
        let tag = heading.level.tag();
        let issue = match heading.previous_id.as_deref() {
            None => Some(LintIssue::new(
                Severity::Error,
                "MISSING_ID",
                format!("<{}> '{}' has no id; expected '{}'", tag, heading.text, heading.id),
                path,
                heading.line,
            )),
            Some(current) if current != heading.id => Some(LintIssue::new(
                Severity::Error,
                "STALE_ID",
                format!(
                    "<{}> '{}' has id '{}'; expected '{}'",
                    tag, heading.text, current, heading.id
                ),
                path,
                heading.line,
            )),
            Some(_) => None,
        };

        if let Some(mut issue) = issue {
            issue.expected = Some(heading.id.clone());
            issues.push(issue);
        }
    }

    for warning in &report.warnings {
        issues.push(LintIssue::new(
            Severity::Warning,
            warning.code.as_str(),
            warning.message.clone(),
            path,
            warning.line,
        ));
    }

    issues
}

/// Lint one file
pub fn lint_file(path: &Path, display: &str, options: &LinkOptions) -> Result<Vec<LintIssue>> {
    if !is_html_file(path) {
        return Err(HeadlinkError::NotHtml(display.to_string()).into());
    }

    let read = read_file_with_config(path, &FileReadConfig::read_only());
    let Some(source) = read.content else {
        return Err(HeadlinkError::Unreadable {
            path: display.to_string(),
            reason: read.skip_reason.unwrap_or_default(),
        }
        .into());
    };

    if read.lossy_conversion {
        log::debug!("{}: invalid UTF-8 replaced while reading", display);
    }

    let mut issues: Vec<LintIssue> = read
        .warnings
        .iter()
        .map(|w| LintIssue::new(Severity::Warning, w.code.as_str(), w.message.clone(), display, None))
        .collect();
    issues.extend(lint_source(&source, display, options));
    Ok(issues)
}

/// Lint every target document
pub fn lint_documents(root: &Path, documents: &[PathBuf], options: &LinkOptions) -> ResultSet {
    let mut result_set = ResultSet::new();

    for path in documents {
        let display = display_path(path, root);
        match lint_file(path, &display, options) {
            Ok(issues) => result_set.extend(issues.iter().map(LintIssue::to_result_item)),
            Err(err) => result_set.push(error_item(&display, &err, "READ_FAILED")),
        }
    }

    result_set.sort();
    result_set
}

/// Run the lint command. Fails when any error-severity issue is found.
pub fn run_lint(
    root: &Path,
    targets: &[PathBuf],
    scan: ScanOptions,
    options: &LinkOptions,
    render_config: RenderConfig,
) -> Result<()> {
    let result_set = if targets.len() == 1 && targets[0] == Path::new("-") {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("failed to read HTML from stdin")?;
        lint_source(&source, "-", options)
            .iter()
            .map(LintIssue::to_result_item)
            .collect()
    } else {
        let documents = collect_targets(root, targets, scan)?;
        lint_documents(root, &documents, options)
    };

    emit(&result_set, render_config)?;

    let errors = result_set.error_count();
    if errors > 0 {
        bail!("{} heading issue(s) found", errors);
    }
    Ok(())
}
