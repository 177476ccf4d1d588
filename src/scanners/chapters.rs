use crate::config::ChapterConfig;
use crate::error::{Result, TomeError};
use crate::models::ChapterEntry;
use crate::parsers::{parse_chapter_rows, selector};
use crate::request::{HeaderPolicy, Request};
use crate::traits::Transport;
use futures::future::try_join_all;
use scraper::Html;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Discovers how many chapter-list pages an entry has, fetches them all at
/// once and flattens the result in page order.
pub struct ChapterScanner<'a> {
    transport: &'a dyn Transport,
    policy: &'a HeaderPolicy,
    base_url: &'a str,
    config: &'a ChapterConfig,
}

impl<'a> ChapterScanner<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        policy: &'a HeaderPolicy,
        base_url: &'a str,
        config: &'a ChapterConfig,
    ) -> Self {
        Self {
            transport,
            policy,
            base_url,
            config,
        }
    }

    pub async fn scan(&self, entry_key: &str) -> Result<Vec<ChapterEntry>> {
        info!("[CHAPTERS] Scanning chapters from: {}", entry_key);

        let first = self.fetch(entry_key).await?;

        if self.config.page_count_selector.is_none() {
            let chapters = self.finish(self.parse_page(&first)?);
            info!("[CHAPTERS] Found {} chapters on a single page", chapters.len());
            return Ok(chapters);
        }

        let total_pages = total_pages(&first, self.config)?;
        info!("[CHAPTERS] {} chapter-list pages for {}", total_pages, entry_key);

        let tasks = (1..=total_pages).map(|page| self.fetch_page(entry_key, page));
        let pages = try_join_all(tasks).await?;

        let chapters = self.finish(flatten_pages(pages));
        info!("[CHAPTERS] Found {} chapters across {} pages", chapters.len(), total_pages);
        Ok(chapters)
    }

    async fn fetch_page(&self, entry_key: &str, page: u32) -> Result<(u32, Vec<ChapterEntry>)> {
        let url = page_url(&self.config.page_url, entry_key, page);
        let body = self
            .fetch(&url)
            .await
            .map_err(|e| TomeError::chapter_page(page, e))?;
        let chapters = self
            .parse_page(&body)
            .map_err(|e| TomeError::chapter_page(page, e))?;

        debug!("[CHAPTERS] page {} -> {} chapters", page, chapters.len());
        Ok((page, chapters))
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let request = self.policy.decorate(Request::get(url));
        self.transport.execute(&request).await
    }

    fn parse_page(&self, body: &str) -> Result<Vec<ChapterEntry>> {
        parse_chapter_rows(&Html::parse_document(body), self.config, self.base_url)
    }

    fn finish(&self, mut chapters: Vec<ChapterEntry>) -> Vec<ChapterEntry> {
        if self.config.reverse {
            chapters.reverse();
        }
        chapters
    }
}

/// Reads the pagination marker and adds the configured offset. A missing or
/// non-numeric marker means a single page.
pub fn total_pages(body: &str, config: &ChapterConfig) -> Result<u32> {
    let Some(css) = config.page_count_selector.as_deref() else {
        return Ok(1);
    };

    let document = Html::parse_document(body);
    let raw = document.select(&selector(css)?).next().map(|el| match config.page_count_att.as_deref() {
        Some(att) => el.value().attr(att).unwrap_or_default().trim().to_string(),
        None => el.text().collect::<String>().trim().to_string(),
    });

    match raw.as_deref().map(str::parse::<u32>) {
        Some(Ok(marker)) => Ok(marker.saturating_add(config.page_offset).max(1)),
        Some(Err(_)) => {
            warn!("[CHAPTERS] Non-numeric page marker {:?}, assuming one page", raw);
            Ok(1)
        }
        None => {
            debug!("[CHAPTERS] No page marker, assuming one page");
            Ok(1)
        }
    }
}

pub fn page_url(template: &str, entry_key: &str, page: u32) -> String {
    template
        .replace("{key}", entry_key)
        .replace("{page}", &page.to_string())
}

/// Orders per-page results by page index before concatenating, so the output
/// never depends on which fetch finished first.
pub fn flatten_pages(pages: Vec<(u32, Vec<ChapterEntry>)>) -> Vec<ChapterEntry> {
    pages
        .into_iter()
        .collect::<BTreeMap<_, _>>()
        .into_values()
        .flatten()
        .collect()
}
