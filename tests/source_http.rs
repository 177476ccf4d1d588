use std::sync::Arc;

use mockito::{Matcher, Server};
use tokio_test::{assert_err, assert_ok};
use tomescrape::config::{
    ChapterConfig, ContentConfig, DetailConfig, ExclusionRule, FetcherConfig, FilterConfig, ListingKind,
    SourceConfig, StatusRule, StatusRules,
};
use tomescrape::{EntryStatus, FilterValue, HeaderPolicy, HttpClient, RequestMode, Source, TomeError};

const AGENT: &str = "tomescrape-test/1.0";

fn fetcher(name: &str, kind: ListingKind, endpoint: &str, request_mode: RequestMode) -> FetcherConfig {
    FetcherConfig {
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
        next_page_selector: Some("a.r".to_string()),
        request_mode,
    }
}

fn source_config(base_url: &str) -> SourceConfig {
    SourceConfig {
        name: "Mock".to_string(),
        lang: "en".to_string(),
        id: 99,
        base_url: base_url.to_string(),
        headers: HeaderPolicy {
            user_agent: Some(AGENT.to_string()),
            referer: None,
            extra: Default::default(),
        },
        filters: vec![
            FilterConfig::Title,
            FilterConfig::Sort {
                name: "Sort".to_string(),
                options: vec!["Latest".to_string(), "Popular".to_string()],
            },
        ],
        fetchers: vec![
            fetcher("Latest", ListingKind::Listing, "/latest/{page}", RequestMode::SimpleGet),
            fetcher("Popular", ListingKind::Listing, "/popular/{page}", RequestMode::TemplatedFormPost),
            fetcher("Search", ListingKind::Search, "/search?page={page}&q={query}", RequestMode::SimpleGet),
        ],
        detail: DetailConfig {
            name_selector: Some("h1.entry-title".to_string()),
            cover_selector: Some("div.thumb img".to_string()),
            cover_att: Some("data-src".to_string()),
            description_selector: Some("div.desc p".to_string()),
            author_selector: Some("span.author a".to_string()),
            category_selector: Some("div.genres a".to_string()),
            status_selector: Some("div.status span".to_string()),
            status_rules: StatusRules {
                rules: vec![StatusRule {
                    contains: vec!["Ongoing".to_string()],
                    status: EntryStatus::Ongoing,
                }],
                default: EntryStatus::Completed,
            },
            ..DetailConfig::default()
        },
        chapters: ChapterConfig {
            selector: "li[data-id]".to_string(),
            name_selector: Some("a div.epl-num, a div.epl-title".to_string()),
            link_selector: Some("a".to_string()),
            link_att: Some("href".to_string()),
            page_count_selector: Some("li.last > a".to_string()),
            page_count_att: Some("data-page".to_string()),
            page_url: "{key}/page/{page}".to_string(),
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

fn source(server: &Server) -> Source {
    let transport = Arc::new(HttpClient::new().expect("client"));
    Source::new(source_config(&server.url()), transport)
}

fn listing_html(titles: &[&str], next: bool) -> String {
    let rows: String = titles
        .iter()
        .map(|t| {
            format!(r#"<div class="mdthumb"><a href="/series/{t}" title="{t}"><img src="x.gif" data-src="/img/{t}.jpg"></a></div>"#)
        })
        .collect();
    let next = if next { r#"<a class="r" href="/latest/2">Next</a>"# } else { "" };
    format!(r#"<html><body><div class="inmain">{rows}</div>{next}</body></html>"#)
}

#[tokio::test]
async fn latest_listing_is_fetched_with_identity_headers() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/latest/2")
        .match_header("user-agent", AGENT)
        .match_header("referer", server.url().as_str())
        .with_status(200)
        .with_body(listing_html(&["one", "two"], true))
        .create_async()
        .await;

    let page = assert_ok!(source(&server).fetch_listing("Latest", 2, None).await);

    mock.assert_async().await;
    assert!(page.has_next_page);
    assert_eq!(page.entries.len(), 2);
    assert_eq!(page.entries[0].title, "one");
    assert_eq!(page.entries[0].key, format!("{}/series/one", server.url()));
    assert_eq!(page.entries[1].cover_url, format!("{}/img/two.jpg", server.url()));
}

#[tokio::test]
async fn form_post_listing_sends_load_more_payload() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/popular/3")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("action".into(), "madara_load_more".into()),
            Matcher::UrlEncoded("page".into(), "3".into()),
            Matcher::UrlEncoded("vars[post_type]".into(), "wp-manga".into()),
        ]))
        .with_status(200)
        .with_body(listing_html(&["popular"], false))
        .create_async()
        .await;

    let page = assert_ok!(source(&server).fetch_listing("popular", 3, None).await);

    mock.assert_async().await;
    assert!(!page.has_next_page);
    assert_eq!(page.entries[0].title, "popular");
}

#[tokio::test]
async fn title_filter_routes_to_search_with_escaped_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("q".into(), "a b".into()),
        ]))
        .with_status(200)
        .with_body(listing_html(&["found"], false))
        .create_async()
        .await;

    let filters = [FilterValue::Title("a b".to_string()), FilterValue::Sort(1)];
    let page = assert_ok!(source(&server).fetch_filtered(&filters, 1).await);

    mock.assert_async().await;
    assert_eq!(page.entries.len(), 1);
}

#[tokio::test]
async fn sort_filter_selects_listing_and_blank_title_is_ignored() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/popular/1")
        .with_status(200)
        .with_body(listing_html(&["p"], false))
        .create_async()
        .await;

    let filters = [FilterValue::Title("   ".to_string()), FilterValue::Sort(1)];
    assert_ok!(source(&server).fetch_filtered(&filters, 1).await);

    mock.assert_async().await;
}

#[tokio::test]
async fn unknown_listing_is_reported() {
    let server = Server::new_async().await;
    let err = assert_err!(source(&server).fetch_listing("Nope", 1, None).await);
    assert!(matches!(err, TomeError::ListingNotFound(_)));
}

#[tokio::test]
async fn detail_page_is_parsed() {
    let mut server = Server::new_async().await;
    let body = r#"<html><body>
        <h1 class="entry-title">Alpha</h1>
        <div class="thumb"><img data-src="/img/alpha.jpg"></div>
        <div class="desc"><p>Line one</p><p>Line two</p></div>
        <span class="author"><a>Writer</a></span>
        <div class="genres"><a>Action</a><a>Fantasy</a></div>
        <div class="status"><span>Ongoing</span></div>
    </body></html>"#;
    server
        .mock("GET", "/series/alpha")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let key = format!("{}/series/alpha", server.url());
    let entry = assert_ok!(source(&server).fetch_detail(&key).await);

    assert_eq!(entry.key, key);
    assert_eq!(entry.title, "Alpha");
    assert_eq!(entry.cover_url, format!("{}/img/alpha.jpg", server.url()));
    assert_eq!(entry.description, "Line one\nLine two");
    assert_eq!(entry.author.as_deref(), Some("Writer"));
    assert_eq!(entry.genres, vec!["Action", "Fantasy"]);
    assert_eq!(entry.status, EntryStatus::Ongoing);
}

fn chapter_list(numbers: &[u32], last: Option<u32>) -> String {
    let rows: String = numbers
        .iter()
        .map(|n| {
            format!(r#"<li data-id="{n}"><a href="/read/{n}"><div class="epl-num">Ch {n}</div><div class="epl-title">Part {n}</div></a></li>"#)
        })
        .collect();
    let marker = last
        .map(|l| format!(r#"<ul><li class="last"><a data-page="{l}">Last</a></li></ul>"#))
        .unwrap_or_default();
    format!("<html><body><ul>{rows}</ul>{marker}</body></html>")
}

#[tokio::test]
async fn chapters_are_gathered_from_every_page() {
    let mut server = Server::new_async().await;
    let discovery = server
        .mock("GET", "/series/alpha")
        .with_status(200)
        .with_body(chapter_list(&[1, 2], Some(2)))
        .expect(1)
        .create_async()
        .await;
    let mut pages = Vec::new();
    for (page, numbers) in [(1, [1, 2]), (2, [3, 4]), (3, [5, 6])] {
        let mock = server
            .mock("GET", format!("/series/alpha/page/{page}").as_str())
            .match_header("user-agent", AGENT)
            .with_status(200)
            .with_body(chapter_list(&numbers, Some(2)))
            .expect(1)
            .create_async()
            .await;
        pages.push(mock);
    }

    let key = format!("{}/series/alpha", server.url());
    let chapters = assert_ok!(source(&server).fetch_all_chapters(&key).await);

    discovery.assert_async().await;
    for mock in &pages {
        mock.assert_async().await;
    }
    let names: Vec<_> = chapters.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        ["Ch 1 Part 1", "Ch 2 Part 2", "Ch 3 Part 3", "Ch 4 Part 4", "Ch 5 Part 5", "Ch 6 Part 6"]
    );
    assert_eq!(chapters[5].key, format!("{}/read/6", server.url()));
}

#[tokio::test]
async fn http_failure_on_a_chapter_page_carries_the_page_index() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/series/beta")
        .with_status(200)
        .with_body(chapter_list(&[], Some(1)))
        .create_async()
        .await;
    server
        .mock("GET", "/series/beta/page/1")
        .with_status(200)
        .with_body(chapter_list(&[1], None))
        .create_async()
        .await;
    server
        .mock("GET", "/series/beta/page/2")
        .with_status(500)
        .create_async()
        .await;

    let key = format!("{}/series/beta", server.url());
    let err = assert_err!(source(&server).fetch_all_chapters(&key).await);

    match err {
        TomeError::ChapterPage { page, source } => {
            assert_eq!(page, 2);
            assert!(matches!(*source, TomeError::Http(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn failed_discovery_skips_page_fetches() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/series/gamma")
        .with_status(404)
        .create_async()
        .await;
    let page = server
        .mock("GET", "/series/gamma/page/1")
        .expect(0)
        .create_async()
        .await;

    let key = format!("{}/series/gamma", server.url());
    let err = assert_err!(source(&server).fetch_all_chapters(&key).await);

    assert!(matches!(err, TomeError::Http(_)));
    page.assert_async().await;
}

#[tokio::test]
async fn content_drops_decoys_and_prepends_title() {
    let mut server = Server::new_async().await;
    let body = r#"<html><body>
        <div class="epheader">Chapter 1</div>
        <div class="entry-content">
            <p>First</p>
            <p style="opacity: 0">buy now</p>
            <p></p>
            <ol><li>Listed</li></ol>
        </div>
    </body></html>"#;
    server
        .mock("GET", "/read/1")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let key = format!("{}/read/1", server.url());
    let blocks = assert_ok!(source(&server).fetch_content(&key).await);

    assert_eq!(blocks, vec!["Chapter 1", "First", "", "Listed"]);
}
