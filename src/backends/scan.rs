//! Document discovery backend
//!
//! Uses the ignore crate for traversal that respects .gitignore

use anyhow::{bail, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::core::paths::{is_html_file, resolve_under_root};

/// Traversal options
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Include hidden files and directories
    pub hidden: bool,
    /// Disable .gitignore and other ignore rules
    pub no_ignore: bool,
    pub max_depth: Option<usize>,
}

/// Find HTML documents under a directory, sorted by path
pub fn scan_documents(dir: &Path, options: ScanOptions) -> Vec<PathBuf> {
    let ignore = !options.no_ignore;

    let mut builder = WalkBuilder::new(dir);
    builder
        .hidden(!options.hidden)
        .ignore(ignore)
        .git_ignore(ignore)
        .git_global(ignore)
        .git_exclude(ignore)
        .max_depth(options.max_depth);

    let mut documents: Vec<PathBuf> = builder
        .build()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                log::debug!("skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.into_path())
        .filter(|p| is_html_file(p))
        .collect();

    documents.sort();
    documents
}

/// Resolve command-line targets into the list of documents to process.
///
/// With no targets the whole root is scanned. Directory targets are scanned;
/// file targets are taken as given, whatever their extension, so callers can
/// report non-HTML files explicitly.
pub fn collect_targets(root: &Path, targets: &[PathBuf], options: ScanOptions) -> Result<Vec<PathBuf>> {
    if targets.is_empty() {
        return Ok(scan_documents(root, options));
    }

    let mut documents = Vec::new();
    for target in targets {
        let path = resolve_under_root(target, root);
        if path.is_dir() {
            documents.extend(scan_documents(&path, options));
        } else if path.is_file() {
            documents.push(path);
        } else {
            bail!("path not found: {}", target.display());
        }
    }

    documents.sort();
    documents.dedup();
    Ok(documents)
}
