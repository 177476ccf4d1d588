//! Configuration-driven scraping engine for template-based catalog sites.
//!
//! A [`Source`] binds one site's selectors and header policy to a
//! [`Transport`] and exposes four operations: listing pages, entry details,
//! the full chapter list and chapter content.

pub mod config;
pub mod error;
pub mod models;
pub mod parsers;
pub mod registry;
pub mod request;
pub mod scanners;
pub mod source;
pub mod traits;
pub mod utils;

pub use config::{Config, SourceConfig};
pub use error::{Result, TomeError};
pub use models::{CatalogEntry, ChapterEntry, EntryStatus, ListingPage};
pub use registry::SourceRegistry;
pub use request::{HeaderPolicy, Request, RequestMode};
pub use source::{FilterValue, Source};
pub use traits::Transport;
pub use utils::HttpClient;
