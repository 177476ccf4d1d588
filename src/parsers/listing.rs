use super::{extract_field, selector};
use crate::config::{ChapterConfig, FetcherConfig};
use crate::error::Result;
use crate::models::{CatalogEntry, ChapterEntry, ListingPage};
use crate::utils::resolve_url;
use scraper::Html;
use tracing::debug;

/// Row selector plus per-field sub-selectors. Catalog listings and chapter
/// lists share this shape.
#[derive(Debug, Clone, Copy)]
pub struct RowSelectors<'a> {
    pub row: &'a str,
    pub name_selector: Option<&'a str>,
    pub name_att: Option<&'a str>,
    pub link_selector: Option<&'a str>,
    pub link_att: Option<&'a str>,
    pub cover_selector: Option<&'a str>,
    pub cover_att: Option<&'a str>,
}

/// Raw fields of one matched row; links are already absolute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub name: String,
    pub link: String,
    pub cover: String,
}

impl<'a> From<&'a FetcherConfig> for RowSelectors<'a> {
    fn from(config: &'a FetcherConfig) -> Self {
        Self {
            row: &config.selector,
            name_selector: config.name_selector.as_deref(),
            name_att: config.name_att.as_deref(),
            link_selector: config.link_selector.as_deref(),
            link_att: config.link_att.as_deref(),
            cover_selector: config.cover_selector.as_deref(),
            cover_att: config.cover_att.as_deref(),
        }
    }
}

impl<'a> From<&'a ChapterConfig> for RowSelectors<'a> {
    fn from(config: &'a ChapterConfig) -> Self {
        Self {
            row: &config.selector,
            name_selector: config.name_selector.as_deref(),
            name_att: config.name_att.as_deref(),
            link_selector: config.link_selector.as_deref(),
            link_att: config.link_att.as_deref(),
            cover_selector: None,
            cover_att: None,
        }
    }
}

/// Extracts every row in document order. Duplicates are kept and a row with
/// no link yields an empty `link`.
pub fn parse_rows(document: &Html, selectors: &RowSelectors<'_>, base_url: &str) -> Result<Vec<Row>> {
    let row_selector = selector(selectors.row)?;
    let has_cover = selectors.cover_selector.is_some() || selectors.cover_att.is_some();

    let mut rows = Vec::new();
    for element in document.select(&row_selector) {
        let name = extract_field(element, selectors.name_selector, selectors.name_att)?;
        let link = extract_field(
            element,
            selectors.link_selector,
            Some(selectors.link_att.unwrap_or("href")),
        )?;
        let cover = if has_cover {
            extract_field(
                element,
                selectors.cover_selector,
                Some(selectors.cover_att.unwrap_or("src")),
            )?
        } else {
            String::new()
        };

        rows.push(Row {
            name,
            link: resolve_url(base_url, &link),
            cover: resolve_url(base_url, &cover),
        });
    }

    Ok(rows)
}

pub fn parse_listing(document: &Html, config: &FetcherConfig, base_url: &str) -> Result<ListingPage> {
    let rows = parse_rows(document, &RowSelectors::from(config), base_url)?;

    let has_next_page = match config.next_page_selector.as_deref() {
        Some(css) => document.select(&selector(css)?).next().is_some(),
        None => false,
    };

    debug!(
        "[LISTING] {}: {} entries, has_next_page={}",
        config.name,
        rows.len(),
        has_next_page
    );

    let entries = rows
        .into_iter()
        .map(|row| CatalogEntry::new(row.link, row.name, row.cover))
        .collect();

    Ok(ListingPage {
        entries,
        has_next_page,
    })
}

pub fn parse_chapter_rows(document: &Html, config: &ChapterConfig, base_url: &str) -> Result<Vec<ChapterEntry>> {
    let rows = parse_rows(document, &RowSelectors::from(config), base_url)?;
    Ok(rows
        .into_iter()
        .map(|row| ChapterEntry::new(row.link, row.name))
        .collect())
}
