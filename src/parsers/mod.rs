//! Selector-driven extractors shared by listings, details, chapters and content.

pub mod content;
pub mod detail;
pub mod listing;

use crate::error::{Result, TomeError};
use crate::utils::normalize_text;
use scraper::{ElementRef, Selector};

pub use content::parse_content;
pub use detail::parse_detail;
pub use listing::{parse_chapter_rows, parse_listing, parse_rows, Row, RowSelectors};

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| TomeError::parse(format!("Invalid selector `{}`: {:?}", css, e)))
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<String>())
}

/// Reads a field from `scope`: the text of all `css` matches joined by a space,
/// or the `att` value of the first match carrying it. Without `css` the scope
/// element itself is read. Absent values are empty strings.
pub(crate) fn extract_field(scope: ElementRef<'_>, css: Option<&str>, att: Option<&str>) -> Result<String> {
    let targets: Vec<ElementRef<'_>> = match css {
        Some(css) => scope.select(&selector(css)?).collect(),
        None => vec![scope],
    };

    let value = match att {
        Some(att) => targets
            .iter()
            .find_map(|el| el.value().attr(att))
            .map(|v| v.trim().to_string())
            .unwrap_or_default(),
        None => targets
            .into_iter()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    };

    Ok(value)
}
