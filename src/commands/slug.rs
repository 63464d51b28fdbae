//! Slug command - Show the id a piece of heading text would get

use anyhow::{bail, Result};
use serde_json::json;

use crate::commands::emit;
use crate::core::model::{ResultItem, ResultSet};
use crate::core::render::RenderConfig;
use crate::linker::{slugify, SlugMode};

/// One slug item per input text, in input order
pub fn slug_items(texts: &[String], mode: SlugMode) -> ResultSet {
    texts
        .iter()
        .map(|text| {
            ResultItem::slug(slugify(text, mode)).with_data(json!({
                "text": text,
                "mode": mode.as_str(),
            }))
        })
        .collect()
}

/// Run the slug command
pub fn run_slug(texts: &[String], mode: SlugMode, render_config: RenderConfig) -> Result<()> {
    if texts.is_empty() {
        bail!("no text given");
    }
    emit(&slug_items(texts, mode), render_config)
}
