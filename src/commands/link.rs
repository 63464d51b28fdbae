//! Link command - Rewrite heading ids in HTML documents
//!
//! Each document is parsed, linked, and written back only when its bytes
//! actually change. `-` as the sole target links stdin to stdout.

use anyhow::{bail, Context, Result};
use serde_json::json;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::backends::scan::{collect_targets, ScanOptions};
use crate::commands::{emit, error_item};
use crate::core::file_reader::{read_file_with_config, FileReadConfig};
use crate::core::model::{ItemError, Meta, ResultItem, ResultSet};
use crate::core::paths::{display_path, is_html_file};
use crate::core::render::RenderConfig;
use crate::core::util::hash_bytes;
use crate::dom::html::HtmlDocument;
use crate::dom::HeadingLevel;
use crate::error::HeadlinkError;
use crate::linker::{link_headers, LinkOptions, LinkReport};

/// Switches for a link run
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkRun {
    pub options: LinkOptions,
    pub scan: ScanOptions,
    /// Compute changes without writing files
    pub dry_run: bool,
    /// Emit one result item per heading
    pub headings: bool,
}

/// What linking did to one document
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub path: String,
    pub report: LinkReport,
    pub changed: bool,
    pub size: Option<u64>,
    pub hash_before: String,
    pub hash_after: String,
    pub read_warnings: Vec<ItemError>,
}

impl DocumentOutcome {
    pub fn to_result_items(&self, run: &LinkRun) -> Vec<ResultItem> {
        let meta = Meta {
            size: self.size,
            hash: Some(self.hash_before.clone()),
            hash_after: self.changed.then(|| self.hash_after.clone()),
            changed: self.changed,
        };

        let mut file = ResultItem::file(&self.path).with_meta(meta).with_data(json!({
            "headings": self.report.headings.len(),
            "h2": self.report.count_for(HeadingLevel::H2),
            "h3": self.report.count_for(HeadingLevel::H3),
            "h4": self.report.count_for(HeadingLevel::H4),
            "changed_headings": self.report.changed_count(),
            "slug_mode": run.options.mode.as_str(),
            "dry_run": run.dry_run,
        }));

        for warning in &self.read_warnings {
            file = file.with_error(warning.clone());
        }
        for warning in &self.report.warnings {
            let message = match warning.line {
                Some(line) => format!("line {}: {}", line, warning.message),
                None => warning.message.clone(),
            };
            file = file.with_error(ItemError::warning(warning.code.as_str(), message));
        }

        let mut items = vec![file];
        if run.headings {
            items.extend(self.report.headings.iter().map(|h| {
                ResultItem::heading(&self.path, &h.id)
                    .at_line(h.line)
                    .with_meta(Meta {
                        changed: h.changed(),
                        ..Default::default()
                    })
                    .with_data(json!({
                        "level": h.level,
                        "index": h.index,
                        "text": h.text,
                        "previous_id": h.previous_id,
                    }))
            }));
        }
        items
    }
}

/// Link the headings of an HTML string, returning the new source
pub fn link_source(source: &str, options: &LinkOptions) -> (String, LinkReport) {
    let mut doc = HtmlDocument::parse(source);
    let report = link_headers(&mut doc, options);
    let output = if doc.is_modified() {
        doc.to_html()
    } else {
        source.to_string()
    };
    (output, report)
}

/// Link one file in place (unless `dry_run`)
pub fn link_file(path: &Path, display: &str, options: &LinkOptions, dry_run: bool) -> Result<DocumentOutcome> {
    if !is_html_file(path) {
        return Err(HeadlinkError::NotHtml(display.to_string()).into());
    }

    let read = read_file_with_config(path, &FileReadConfig::default());
    let read_warnings = read.warnings.iter().map(|w| w.to_item_error()).collect();
    let Some(source) = read.content else {
        return Err(HeadlinkError::Unreadable {
            path: display.to_string(),
            reason: read.skip_reason.unwrap_or_default(),
        }
        .into());
    };

    let (output, report) = link_source(&source, options);
    let changed = output != source;

    if changed && !dry_run {
        fs::write(path, &output).with_context(|| format!("failed to write {}", display))?;
    }

    Ok(DocumentOutcome {
        path: display.to_string(),
        report,
        changed,
        size: read.size,
        hash_before: hash_bytes(source.as_bytes()),
        hash_after: hash_bytes(output.as_bytes()),
        read_warnings,
    })
}

fn process_document(root: &Path, path: &Path, run: &LinkRun) -> Vec<ResultItem> {
    let display = display_path(path, root);

    match link_file(path, &display, &run.options, run.dry_run) {
        Ok(outcome) => {
            if outcome.changed {
                let verb = if run.dry_run { "would update" } else { "updated" };
                log::info!("{} {} ({} headings)", verb, display, outcome.report.changed_count());
            }
            outcome.to_result_items(run)
        }
        Err(err) => {
            log::warn!("{}: {:#}", display, err);
            vec![error_item(&display, &err, "WRITE_FAILED")]
        }
    }
}

/// Link every target document and collect the results
pub fn link_documents(root: &Path, documents: &[PathBuf], run: &LinkRun) -> ResultSet {
    #[cfg(feature = "parallel")]
    let items: Vec<ResultItem> = documents
        .par_iter()
        .flat_map_iter(|path| process_document(root, path, run))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let items: Vec<ResultItem> = documents
        .iter()
        .flat_map(|path| process_document(root, path, run))
        .collect();

    let mut result_set: ResultSet = items.into_iter().collect();
    result_set.sort();
    result_set
}

/// Read HTML from stdin and write the linked HTML to stdout
pub fn run_link_stdin(options: &LinkOptions) -> Result<()> {
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .context("failed to read HTML from stdin")?;

    let (output, report) = link_source(&source, options);
    for warning in &report.warnings {
        log::warn!("{}: {}", warning.code.as_str(), warning.message);
    }

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|_| stdout.flush())
        .context("failed to write HTML to stdout")
}

/// Run the link command
pub fn run_link(root: &Path, targets: &[PathBuf], run: LinkRun, render_config: RenderConfig) -> Result<()> {
    if targets.len() == 1 && targets[0] == Path::new("-") {
        return run_link_stdin(&run.options);
    }

    let documents = collect_targets(root, targets, run.scan)?;
    log::debug!("{} documents to link", documents.len());

    let result_set = link_documents(root, &documents, &run);
    emit(&result_set, render_config)?;

    let failed = result_set.error_count();
    if failed > 0 {
        bail!("{} document(s) could not be linked", failed);
    }
    Ok(())
}
