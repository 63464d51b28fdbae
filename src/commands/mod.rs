//! Commands module - The operations exposed on the command line
//!
//! Provides:
//! - link: rewrite heading ids in HTML documents (or stdin)
//! - lint: report headings whose ids are missing or out of date
//! - slug: print the id a piece of heading text would get

pub mod link;
pub mod lint;
pub mod slug;

use anyhow::{Context, Result};
use std::io::Write;

use crate::core::model::{ItemError, ResultItem, ResultSet};
use crate::core::render::{RenderConfig, Renderer};
use crate::error::HeadlinkError;

/// Turn a per-document failure into an error result item. Typed errors keep
/// their own code; anything else gets `fallback_code`.
pub fn error_item(path: &str, err: &anyhow::Error, fallback_code: &str) -> ResultItem {
    let code = err
        .downcast_ref::<HeadlinkError>()
        .map(|e| e.code())
        .unwrap_or(fallback_code);
    ResultItem::error(ItemError::new(code, format!("{:#}", err))).at_path(path)
}

/// Render a result set to stdout
pub fn emit(result_set: &ResultSet, config: RenderConfig) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    Renderer::with_config(config)
        .render_to(result_set, &mut handle)
        .context("failed to write results")?;
    handle.flush().context("failed to write results")
}
