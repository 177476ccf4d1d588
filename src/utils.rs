use crate::error::Result;
use crate::request::{Method, Request};
use crate::traits::Transport;
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// reqwest-backed [`Transport`].
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("tomescrape/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Transport for HttpClient {
    async fn execute(&self, request: &Request) -> Result<String> {
        debug!("[HTTP] {:?} {}", request.method, request.url);

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let response = builder.send().await?.error_for_status()?;
        let text = response.text().await?;
        Ok(text)
    }
}

/// Resolves `href` against `base_url`. Empty input stays empty so callers can
/// see that the markup had no link.
pub fn resolve_url(base_url: &str, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }

    match Url::parse(base_url).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn normalize_text(text: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"));
    re.replace_all(text, " ").trim().to_string()
}
