//! Path normalization utilities
//!
//! Ensures all paths are normalized to use '/' as separator and are relative to root.

use std::path::{Path, PathBuf};

/// Extensions treated as HTML documents
pub const HTML_EXTENSIONS: [&str; 3] = ["html", "htm", "xhtml"];

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Path as shown in results: relative to root when possible, else as given
pub fn display_path(path: &Path, root: &Path) -> String {
    make_relative(path, root).unwrap_or_else(|| normalize_path(path))
}

/// Interpret a user-supplied path relative to root unless it is absolute
pub fn resolve_under_root(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Check whether a path has an HTML extension (case-insensitive)
pub fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| HTML_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
