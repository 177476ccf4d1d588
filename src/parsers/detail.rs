use super::{element_text, extract_field, selector};
use crate::config::DetailConfig;
use crate::error::Result;
use crate::models::CatalogEntry;
use crate::utils::resolve_url;
use scraper::Html;
use tracing::debug;

/// Builds the full entry for one detail page. Absent optional fields become
/// empty values; only an invalid selector is an error.
pub fn parse_detail(document: &Html, config: &DetailConfig, base_url: &str, key: &str) -> Result<CatalogEntry> {
    let root = document.root_element();

    let title = match config.name_selector.as_deref() {
        Some(css) => extract_field(root, Some(css), config.name_att.as_deref())?,
        None => String::new(),
    };

    let cover = match config.cover_selector.as_deref() {
        Some(css) => extract_field(root, Some(css), Some(config.cover_att.as_deref().unwrap_or("src")))?,
        None => String::new(),
    };

    let description = all_texts(document, config.description_selector.as_deref())?.join("\n");

    let author = match config.author_selector.as_deref() {
        Some(css) => document.select(&selector(css)?).next().map(element_text),
        None => None,
    }
    .unwrap_or_default();

    let genres = all_texts(document, config.category_selector.as_deref())?;

    let raw_status = all_texts(document, config.status_selector.as_deref())?.join(" ");
    let status = config.status_rules.classify(&raw_status);

    debug!("[DETAIL] title={} author={} status={} raw_status={:?}", title, author, status, raw_status);

    Ok(CatalogEntry {
        key: key.to_string(),
        title,
        cover_url: resolve_url(base_url, &cover),
        author: Some(author),
        genres,
        description,
        status,
    })
}

fn all_texts(document: &Html, css: Option<&str>) -> Result<Vec<String>> {
    match css {
        Some(css) => Ok(document.select(&selector(css)?).map(element_text).collect()),
        None => Ok(Vec::new()),
    }
}
