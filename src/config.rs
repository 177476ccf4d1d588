use crate::error::Result;
use crate::models::EntryStatus;
use crate::request::{HeaderPolicy, RequestMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 11; Pixel 5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.91 Mobile Safari/537.36";

/// Prefix for environment overrides, e.g. `TOMESCRAPE_SOURCES__NOVELFULL__BASE_URL`.
pub const ENV_PREFIX: &str = "TOMESCRAPE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sources: BTreeMap<String, SourceConfig>,
}

/// Everything the engine needs to know about one site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub lang: String,
    pub id: i64,
    pub base_url: String,
    #[serde(default)]
    pub headers: HeaderPolicy,
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
    pub fetchers: Vec<FetcherConfig>,
    pub detail: DetailConfig,
    pub chapters: ChapterConfig,
    pub content: ContentConfig,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    #[default]
    Listing,
    Search,
}

/// How one listing (latest, popular, search...) is requested and parsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetcherConfig {
    pub name: String,
    #[serde(default)]
    pub kind: ListingKind,
    /// Path or URL with `{page}` and `{query}` placeholders.
    pub endpoint: String,
    /// Row selector.
    pub selector: String,
    pub name_selector: Option<String>,
    pub name_att: Option<String>,
    pub link_selector: Option<String>,
    pub link_att: Option<String>,
    pub cover_selector: Option<String>,
    pub cover_att: Option<String>,
    pub next_page_selector: Option<String>,
    #[serde(default)]
    pub request_mode: RequestMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailConfig {
    pub name_selector: Option<String>,
    pub name_att: Option<String>,
    pub cover_selector: Option<String>,
    pub cover_att: Option<String>,
    pub description_selector: Option<String>,
    pub author_selector: Option<String>,
    pub category_selector: Option<String>,
    pub status_selector: Option<String>,
    #[serde(default)]
    pub status_rules: StatusRules,
}

/// Maps raw status text to [`EntryStatus`]. Rules are tried in order; the
/// first rule with a matching substring wins, otherwise `default` applies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusRules {
    #[serde(default)]
    pub default: EntryStatus,
    #[serde(default)]
    pub rules: Vec<StatusRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRule {
    pub contains: Vec<String>,
    pub status: EntryStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterConfig {
    /// Chapter row selector.
    pub selector: String,
    pub name_selector: Option<String>,
    pub name_att: Option<String>,
    pub link_selector: Option<String>,
    pub link_att: Option<String>,
    /// Element carrying the last chapter-list page index. Unset means the
    /// chapter list is never paginated.
    pub page_count_selector: Option<String>,
    /// Attribute holding the index; unset reads the element text.
    pub page_count_att: Option<String>,
    /// Added to the marker value to get the total page count.
    #[serde(default = "default_page_offset")]
    pub page_offset: u32,
    /// Template for chapter-list page N with `{key}` and `{page}` placeholders.
    #[serde(default = "default_page_url")]
    pub page_url: String,
    /// Reverse the final list (for sites that list newest first).
    #[serde(default)]
    pub reverse: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentConfig {
    pub title_selector: Option<String>,
    pub content_selector: String,
    #[serde(default)]
    pub exclude: Vec<ExclusionRule>,
}

/// Structural filter dropping content nodes such as hidden decoy paragraphs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExclusionRule {
    /// The node has attribute `name` whose value contains `contains`.
    Attribute { name: String, contains: String },
    /// The node itself matches `selector`.
    Selector { selector: String },
}

/// Search and sort capabilities a source declares to its host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterConfig {
    Title,
    /// Each option names a listing in `fetchers`.
    Sort { name: String, options: Vec<String> },
}

fn default_page_offset() -> u32 {
    1
}

fn default_page_url() -> String {
    "{key}?page={page}".to_string()
}

impl Default for ChapterConfig {
    fn default() -> Self {
        Self {
            selector: String::new(),
            name_selector: None,
            name_att: None,
            link_selector: None,
            link_att: None,
            page_count_selector: None,
            page_count_att: None,
            page_offset: default_page_offset(),
            page_url: default_page_url(),
            reverse: false,
        }
    }
}

impl Config {
    /// Loads a TOML file and layers `TOMESCRAPE_*` environment overrides on top.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Like [`Config::load`], but falls back to the built-in sources when the
    /// file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get_source_config(&self, source_name: &str) -> Option<&SourceConfig> {
        self.sources.get(source_name)
    }
}

impl SourceConfig {
    pub fn fetcher(&self, listing: &str) -> Option<&FetcherConfig> {
        self.fetchers
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(listing))
    }

    pub fn search_fetcher(&self) -> Option<&FetcherConfig> {
        self.fetchers.iter().find(|f| f.kind == ListingKind::Search)
    }

    /// Header policy with the referer defaulting to the site origin.
    pub fn header_policy(&self) -> HeaderPolicy {
        let mut policy = self.headers.clone();
        if policy.referer.is_none() {
            policy.referer = Some(self.base_url.clone());
        }
        policy
    }
}

impl StatusRules {
    pub fn classify(&self, raw: &str) -> EntryStatus {
        self.rules
            .iter()
            .find(|rule| rule.contains.iter().any(|needle| raw.contains(needle.as_str())))
            .map(|rule| rule.status)
            .unwrap_or(self.default)
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut sources = BTreeMap::new();
        sources.insert("novelfull".to_string(), novelfull());
        sources.insert("hizomanga".to_string(), hizomanga());
        Config { sources }
    }
}

fn novelfull() -> SourceConfig {
    let listing = |name: &str, kind: ListingKind, endpoint: &str| FetcherConfig {
        name: name.to_string(),
        kind,
        endpoint: endpoint.to_string(),
        selector: "div.archive div.row".to_string(),
        name_selector: Some("h3.truyen-title a".to_string()),
        name_att: Some("title".to_string()),
        link_selector: Some("h3.truyen-title a".to_string()),
        link_att: Some("href".to_string()),
        cover_selector: Some(".col-xs-3 img".to_string()),
        cover_att: Some("src".to_string()),
        next_page_selector: Some("ul > li.last > a".to_string()),
        request_mode: RequestMode::SimpleGet,
    };

    let mut extra = BTreeMap::new();
    extra.insert("Cache-Control".to_string(), "max-age=0".to_string());

    SourceConfig {
        name: "NovelFull".to_string(),
        lang: "en".to_string(),
        id: 10,
        base_url: "https://novelfull.com".to_string(),
        headers: HeaderPolicy {
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            referer: None,
            extra,
        },
        filters: vec![
            FilterConfig::Title,
            FilterConfig::Sort {
                name: "Sort By:".to_string(),
                options: vec!["Latest".to_string(), "Popular".to_string()],
            },
        ],
        fetchers: vec![
            listing("Latest", ListingKind::Listing, "/latest-release-novel?page={page}"),
            listing("Popular", ListingKind::Listing, "/most-popular?page={page}"),
            listing("Search", ListingKind::Search, "/search?keyword={query}&page={page}"),
        ],
        detail: DetailConfig {
            name_selector: Some(".info-holder h3.title".to_string()),
            name_att: None,
            cover_selector: Some(".book img".to_string()),
            cover_att: Some("src".to_string()),
            description_selector: Some(".desc-text p".to_string()),
            author_selector: Some(".info a".to_string()),
            category_selector: Some("div.info > div:nth-child(3) a".to_string()),
            status_selector: Some("div.info > div:nth-child(5) a".to_string()),
            status_rules: StatusRules {
                rules: vec![
                    StatusRule {
                        contains: vec!["OnGoing".to_string()],
                        status: EntryStatus::Ongoing,
                    },
                    StatusRule {
                        contains: vec!["Complete".to_string()],
                        status: EntryStatus::Completed,
                    },
                ],
                default: EntryStatus::Ongoing,
            },
        },
        chapters: ChapterConfig {
            selector: "ul.list-chapter li a".to_string(),
            name_att: Some("title".to_string()),
            link_att: Some("href".to_string()),
            page_count_selector: Some("li.last > a".to_string()),
            page_count_att: Some("data-page".to_string()),
            ..ChapterConfig::default()
        },
        content: ContentConfig {
            title_selector: None,
            content_selector: "div.txt h4, div.txt p".to_string(),
            exclude: Vec::new(),
        },
    }
}

fn hizomanga() -> SourceConfig {
    let listing = |name: &str, kind: ListingKind, endpoint: &str, next: &str| FetcherConfig {
        name: name.to_string(),
        kind,
        endpoint: endpoint.to_string(),
        selector: "div.inmain div.mdthumb".to_string(),
        name_selector: Some("a".to_string()),
        name_att: Some("title".to_string()),
        link_selector: Some("a".to_string()),
        link_att: Some("href".to_string()),
        cover_selector: Some("a img".to_string()),
        cover_att: Some("data-src".to_string()),
        next_page_selector: Some(next.to_string()),
        request_mode: RequestMode::TemplatedFormPost,
    };

    SourceConfig {
        name: "Hizomanga".to_string(),
        lang: "ar".to_string(),
        id: 52,
        base_url: "https://hizomanga.com".to_string(),
        headers: HeaderPolicy {
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            referer: None,
            extra: BTreeMap::new(),
        },
        filters: vec![FilterConfig::Title],
        fetchers: vec![
            listing("Latest", ListingKind::Listing, "/series/?page={page}&status=&order=latest", "a.r"),
            listing("Search", ListingKind::Search, "/page/{page}/?s={query}", "a.next"),
            listing("Trending", ListingKind::Listing, "/series/?page={page}&status=&order=popular", "a.r"),
            listing("New", ListingKind::Listing, "/series/?page={page}&order=update", "a.rs"),
        ],
        detail: DetailConfig {
            name_selector: Some("h1.entry-title".to_string()),
            name_att: None,
            cover_selector: Some("div.sertothumb img".to_string()),
            cover_att: Some("data-src".to_string()),
            description_selector: Some("div.entry-content[itemprop=description] p".to_string()),
            author_selector: Some("div.serl span a".to_string()),
            category_selector: Some("div.sertogenre a".to_string()),
            status_selector: Some("div.sertostat span".to_string()),
            status_rules: StatusRules {
                rules: vec![
                    StatusRule {
                        contains: vec!["Ongoing".to_string()],
                        status: EntryStatus::Ongoing,
                    },
                    StatusRule {
                        contains: vec!["Hiatus".to_string()],
                        status: EntryStatus::OnHiatus,
                    },
                ],
                default: EntryStatus::Completed,
            },
        },
        chapters: ChapterConfig {
            selector: "li[data-id]".to_string(),
            name_selector: Some("a div.epl-num, a div.epl-title".to_string()),
            link_selector: Some("a".to_string()),
            link_att: Some("href".to_string()),
            ..ChapterConfig::default()
        },
        content: ContentConfig {
            title_selector: Some(".epheader".to_string()),
            content_selector: "div.entry-content p, div.entry-content ol li".to_string(),
            exclude: vec![ExclusionRule::Attribute {
                name: "style".to_string(),
                contains: "opacity".to_string(),
            }],
        },
    }
}
