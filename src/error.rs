use thiserror::Error;

#[derive(Error, Debug)]
pub enum TomeError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// A single chapter-list page failed; the whole chapter fetch fails with it.
    #[error("Chapter page {page} failed: {source}")]
    ChapterPage {
        page: u32,
        #[source]
        source: Box<TomeError>,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Listing not found: {0}")]
    ListingNotFound(String),

    #[error("Source not found: {0}")]
    SourceNotFound(String),
}

impl TomeError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn chapter_page(page: u32, source: TomeError) -> Self {
        Self::ChapterPage {
            page,
            source: Box::new(source),
        }
    }

    pub fn listing_not_found(listing: impl Into<String>) -> Self {
        Self::ListingNotFound(listing.into())
    }

    pub fn source_not_found(source: impl Into<String>) -> Self {
        Self::SourceNotFound(source.into())
    }
}

pub type Result<T> = std::result::Result<T, TomeError>;
