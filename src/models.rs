use serde::{Deserialize, Serialize};

/// One work in a listing or on its detail page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Absolute URL of the detail page; joins listing, detail and chapter phases.
    pub key: String,
    pub title: String,
    pub cover_url: String,
    pub author: Option<String>,
    pub genres: Vec<String>,
    pub description: String,
    pub status: EntryStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChapterEntry {
    pub key: String,
    pub name: String,
}

/// Result of fetching a single listing page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingPage {
    pub entries: Vec<CatalogEntry>,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Ongoing,
    Completed,
    OnHiatus,
    #[default]
    Unknown,
}

impl CatalogEntry {
    pub fn new(key: String, title: String, cover_url: String) -> Self {
        Self {
            key,
            title,
            cover_url,
            ..Self::default()
        }
    }
}

impl ChapterEntry {
    pub fn new(key: String, name: String) -> Self {
        Self { key, name }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Ongoing => write!(f, "Ongoing"),
            EntryStatus::Completed => write!(f, "Completed"),
            EntryStatus::OnHiatus => write!(f, "On hiatus"),
            EntryStatus::Unknown => write!(f, "Unknown"),
        }
    }
}
