//! Turns "listing page N with optional query Q" into a concrete request.

use crate::config::FetcherConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PAGE_PLACEHOLDER: &str = "{page}";
pub const QUERY_PLACEHOLDER: &str = "{query}";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// GET the templated URL.
    #[default]
    SimpleGet,
    /// POST a fixed "load more" form to the templated URL.
    TemplatedFormPost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A transport-independent request description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub form: Option<Vec<(String, String)>>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            form: None,
        }
    }

    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            form: Some(form),
        }
    }

    /// Sets a header, replacing any existing value with the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Identity headers stamped on every outgoing request of a source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderPolicy {
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl HeaderPolicy {
    pub fn decorate(&self, mut request: Request) -> Request {
        if let Some(user_agent) = &self.user_agent {
            request = request.with_header("User-Agent", user_agent);
        }
        if let Some(referer) = &self.referer {
            request = request.with_header("Referer", referer);
        }
        for (name, value) in &self.extra {
            request = request.with_header(name, value);
        }
        request
    }
}

/// Substitutes `{page}` and `{query}` in `endpoint`. Missing placeholders are
/// left alone; the query is percent-encoded.
pub fn fill_template(endpoint: &str, page: u32, query: Option<&str>) -> String {
    let encoded = urlencoding::encode(query.unwrap_or_default());
    endpoint
        .replace(PAGE_PLACEHOLDER, &page.to_string())
        .replace(QUERY_PLACEHOLDER, &encoded)
}

/// Joins an endpoint onto the site origin unless it is already absolute.
pub fn join_origin(base_url: &str, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("{}{}", base_url.trim_end_matches('/'), endpoint)
    }
}

pub fn build_list_request(
    base_url: &str,
    config: &FetcherConfig,
    page: u32,
    query: Option<&str>,
) -> Request {
    let url = join_origin(base_url, &fill_template(&config.endpoint, page, query));

    match config.request_mode {
        RequestMode::SimpleGet => Request::get(url),
        RequestMode::TemplatedFormPost => Request::post_form(url, load_more_form(page)),
    }
}

/// Form fields of the WordPress "load more" archive endpoint.
pub fn load_more_form(page: u32) -> Vec<(String, String)> {
    [
        ("action", "madara_load_more".to_string()),
        ("page", page.to_string()),
        ("template", "madara-core/content/content-archive".to_string()),
        ("vars[paged]", "1".to_string()),
        ("vars[orderby]", "date".to_string()),
        ("vars[template]", "archive".to_string()),
        ("vars[sidebar]", "full".to_string()),
        ("vars[post_type]", "wp-manga".to_string()),
        ("vars[post_status]", "publish".to_string()),
        ("vars[meta_query][relation]", "OR".to_string()),
        ("vars[manga_archives_item_layout]", "big_thumbnail".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}
