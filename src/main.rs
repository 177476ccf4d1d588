use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use tomescrape::{Config, FilterValue, HttpClient, SourceRegistry};

#[derive(Parser)]
#[command(name = "tomescrape")]
#[command(about = "Configuration-driven catalog, chapter and content scraper")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "tomescrape.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the built-in source configuration to the config path
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List configured sources with their listings and filters
    Sources,
    /// Fetch one page of a listing (e.g. "Latest", "Popular", "Search")
    List {
        source: String,
        listing: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Resolve filters (title search or sort option) to a listing page
    Browse {
        source: String,
        /// Title search; takes precedence over --sort
        #[arg(short, long)]
        title: Option<String>,
        /// Index of the sort option
        #[arg(short, long)]
        sort: Option<usize>,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Fetch the detail page of an entry
    Detail { source: String, url: String },
    /// Fetch every chapter of an entry
    Chapters { source: String, url: String },
    /// Fetch the text blocks of a chapter
    Content { source: String, url: String },
}

#[derive(Serialize)]
struct SourceSummary<'a> {
    key: &'a str,
    name: &'a str,
    lang: &'a str,
    id: i64,
    base_url: &'a str,
    listings: Vec<&'a str>,
    filters: &'a [tomescrape::config::FilterConfig],
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Init { force } => run_init(&cli.config, force),
        command => run_command(command, &cli.config).await,
    }
}

async fn run_command(command: Commands, config_path: &str) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let transport = Arc::new(HttpClient::new()?);
    let registry = SourceRegistry::from_config(&config, transport);

    match command {
        Commands::Init { force } => run_init(config_path, force)?,
        Commands::Sources => {
            let summaries: Vec<_> = registry
                .iter()
                .map(|(key, source)| SourceSummary {
                    key,
                    name: source.name(),
                    lang: source.lang(),
                    id: source.id(),
                    base_url: source.base_url(),
                    listings: source.listings(),
                    filters: source.filters(),
                })
                .collect();
            print_json(&summaries)?;
        }
        Commands::List { source, listing, page, query } => {
            let page = registry
                .require(&source)?
                .fetch_listing(&listing, page, query.as_deref())
                .await?;
            info!("Fetched {} entries (next page: {})", page.entries.len(), page.has_next_page);
            print_json(&page)?;
        }
        Commands::Browse { source, title, sort, page } => {
            let mut filters = Vec::new();
            if let Some(title) = title {
                filters.push(FilterValue::Title(title));
            }
            if let Some(sort) = sort {
                filters.push(FilterValue::Sort(sort));
            }
            let page = registry.require(&source)?.fetch_filtered(&filters, page).await?;
            print_json(&page)?;
        }
        Commands::Detail { source, url } => {
            let entry = registry.require(&source)?.fetch_detail(&url).await?;
            print_json(&entry)?;
        }
        Commands::Chapters { source, url } => {
            let chapters = registry.require(&source)?.fetch_all_chapters(&url).await?;
            info!("Fetched {} chapters", chapters.len());
            print_json(&chapters)?;
        }
        Commands::Content { source, url } => {
            let blocks = registry.require(&source)?.fetch_content(&url).await?;
            print_json(&blocks)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!("tomescrape={}", level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_init(path: &str, force: bool) -> Result<()> {
    if std::path::Path::new(path).exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path);
    }

    Config::default().save(path)?;
    info!("Wrote default configuration to {}", path);
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
