//! A configured site: identity, header policy and the four fetch operations.

use crate::config::{FetcherConfig, FilterConfig, ListingKind, SourceConfig};
use crate::error::{Result, TomeError};
use crate::models::{CatalogEntry, ChapterEntry, ListingPage};
use crate::parsers::{parse_content, parse_detail, parse_listing};
use crate::request::{build_list_request, HeaderPolicy, Request};
use crate::scanners::ChapterScanner;
use crate::traits::Transport;
use scraper::Html;
use std::sync::Arc;
use tracing::info;

/// Values chosen by the host for the filters a source declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Title(String),
    /// Index into the options of the source's sort filter.
    Sort(usize),
}

pub struct Source {
    config: SourceConfig,
    policy: HeaderPolicy,
    transport: Arc<dyn Transport>,
}

impl Source {
    pub fn new(config: SourceConfig, transport: Arc<dyn Transport>) -> Self {
        let policy = config.header_policy();
        Self {
            config,
            policy,
            transport,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn lang(&self) -> &str {
        &self.config.lang
    }

    pub fn id(&self) -> i64 {
        self.config.id
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Names of the listings this source can browse, in declaration order.
    pub fn listings(&self) -> Vec<&str> {
        self.config
            .fetchers
            .iter()
            .filter(|f| f.kind == ListingKind::Listing)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn filters(&self) -> &[FilterConfig] {
        &self.config.filters
    }

    pub async fn fetch_listing(&self, listing: &str, page: u32, query: Option<&str>) -> Result<ListingPage> {
        let fetcher = self
            .config
            .fetcher(listing)
            .ok_or_else(|| TomeError::listing_not_found(listing))?;
        self.fetch_with(fetcher, page, query).await
    }

    /// Resolves host filters to a listing: a non-blank title searches,
    /// otherwise the chosen sort option picks the listing.
    pub async fn fetch_filtered(&self, filters: &[FilterValue], page: u32) -> Result<ListingPage> {
        let query = filters.iter().find_map(|f| match f {
            FilterValue::Title(q) if !q.trim().is_empty() => Some(q.as_str()),
            _ => None,
        });

        if let Some(query) = query {
            let fetcher = self
                .config
                .search_fetcher()
                .ok_or_else(|| TomeError::listing_not_found("search"))?;
            return self.fetch_with(fetcher, page, Some(query)).await;
        }

        let sort = filters.iter().find_map(|f| match f {
            FilterValue::Sort(index) => Some(*index),
            _ => None,
        });

        let fetcher = self.sorted_fetcher(sort.unwrap_or(0))?;
        self.fetch_with(fetcher, page, None).await
    }

    pub async fn fetch_detail(&self, key: &str) -> Result<CatalogEntry> {
        info!("[{}] Fetching detail: {}", self.config.name, key);
        let body = self.get(key).await?;
        parse_detail(&Html::parse_document(&body), &self.config.detail, &self.config.base_url, key)
    }

    pub async fn fetch_all_chapters(&self, key: &str) -> Result<Vec<ChapterEntry>> {
        ChapterScanner::new(
            self.transport.as_ref(),
            &self.policy,
            &self.config.base_url,
            &self.config.chapters,
        )
        .scan(key)
        .await
    }

    pub async fn fetch_content(&self, key: &str) -> Result<Vec<String>> {
        info!("[{}] Fetching content: {}", self.config.name, key);
        let body = self.get(key).await?;
        parse_content(&Html::parse_document(&body), &self.config.content)
    }

    async fn fetch_with(&self, fetcher: &FetcherConfig, page: u32, query: Option<&str>) -> Result<ListingPage> {
        let request = build_list_request(&self.config.base_url, fetcher, page, query);
        info!("[{}] Fetching {} page {}: {}", self.config.name, fetcher.name, page, request.url);

        let body = self.send(request).await?;
        parse_listing(&Html::parse_document(&body), fetcher, &self.config.base_url)
    }

    fn sorted_fetcher(&self, index: usize) -> Result<&FetcherConfig> {
        let option = self.config.filters.iter().find_map(|f| match f {
            FilterConfig::Sort { options, .. } => options.get(index),
            _ => None,
        });

        option
            .and_then(|name| self.config.fetcher(name))
            .or_else(|| {
                self.config
                    .fetchers
                    .iter()
                    .find(|f| f.kind == ListingKind::Listing)
            })
            .ok_or_else(|| TomeError::listing_not_found(format!("sort option {}", index)))
    }

    async fn get(&self, url: &str) -> Result<String> {
        self.send(Request::get(url)).await
    }

    async fn send(&self, request: Request) -> Result<String> {
        let request = self.policy.decorate(request);
        self.transport.execute(&request).await
    }
}
