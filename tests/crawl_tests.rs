//! Integration tests for the crawler
//!
//! These tests use wiremock to serve small site graphs and run full crawls
//! over the plain HTTP engine.

use scrapedown::config::Config;
use scrapedown::{BrowserPool, CrawlRequest, Crawler, ProgressEvent, ScrapeError, Scraper};
use std::sync::Arc;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn crawler() -> Crawler {
    let config = Config::default();
    let pool = Arc::new(BrowserPool::from_config(&config.browser));
    let scraper = Scraper::new(&config, pool).expect("Failed to build scraper");
    Crawler::new(Arc::new(scraper))
}

/// Serves a page whose body is a list of links to the given hrefs
fn page_mock(page: &str, links: &[&str]) -> Mock {
    let anchors: String = links
        .iter()
        .map(|href| format!("<li><a href=\"{}\">{}</a></li>", href, href))
        .collect();
    let body = format!(
        "<html><body><main><h1>{}</h1><ul>{}</ul></main></body></html>",
        page, anchors
    );

    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html"))
}

async fn serve(server: &MockServer, page: &str, links: &[&str]) {
    page_mock(page, links).mount(server).await;
}

/// Paths of the crawled pages, in visit order
fn visited_paths(server: &MockServer, pages: &[scrapedown::PageResult]) -> Vec<String> {
    pages
        .iter()
        .map(|p| p.url.trim_start_matches(&server.uri()).to_string())
        .collect()
}

#[tokio::test]
async fn test_crawl_depth_first_order_and_dedup() {
    let server = MockServer::start().await;

    serve(&server, "/", &["/a", "/b", "/a", "/a#section"]).await;
    page_mock("/a", &["/a/deep", "/"])
        .expect(1)
        .mount(&server)
        .await;
    serve(&server, "/a/deep", &[]).await;
    serve(&server, "/b", &["/"]).await;

    let request = CrawlRequest::new(server.uri()).with_max_depth(3);
    let result = crawler().crawl(&request, None).await.unwrap();

    assert!(result.success);
    assert_eq!(result.base_url, server.uri());
    assert_eq!(visited_paths(&server, &result.pages), vec!["/", "/a", "/a/deep", "/b"]);
    assert_eq!(result.total_pages, 4);
    assert_eq!(result.succeeded(), 4);
}

#[tokio::test]
async fn test_crawl_query_variants_are_one_page() {
    let server = MockServer::start().await;

    serve(&server, "/", &["/item?x=1", "/item?x=2"]).await;
    page_mock("/item", &[])
        .expect(1)
        .mount(&server)
        .await;

    let request = CrawlRequest::new(format!("{}/", server.uri()));
    let result = crawler().crawl(&request, None).await.unwrap();

    assert_eq!(visited_paths(&server, &result.pages), vec!["/", "/item?x=1"]);
}

#[tokio::test]
async fn test_crawl_max_depth_one_is_seed_only() {
    let server = MockServer::start().await;

    serve(&server, "/", &["/a", "/b"]).await;
    serve(&server, "/a", &[]).await;
    serve(&server, "/b", &[]).await;

    let request = CrawlRequest::new(format!("{}/", server.uri())).with_max_depth(1);
    let result = crawler().crawl(&request, None).await.unwrap();

    assert_eq!(visited_paths(&server, &result.pages), vec!["/"]);
}

#[tokio::test]
async fn test_crawl_max_pages_on_cycle() {
    let server = MockServer::start().await;

    serve(&server, "/", &["/one"]).await;
    serve(&server, "/one", &["/two", "/"]).await;
    serve(&server, "/two", &["/three", "/one"]).await;
    serve(&server, "/three", &["/", "/two"]).await;

    let request = CrawlRequest::new(format!("{}/", server.uri()))
        .with_max_depth(10)
        .with_max_pages(2);
    let result = crawler().crawl(&request, None).await.unwrap();

    assert!(result.success);
    assert_eq!(visited_paths(&server, &result.pages), vec!["/", "/one"]);
}

#[tokio::test]
async fn test_crawl_cycle_terminates_without_budget_pressure() {
    let server = MockServer::start().await;

    serve(&server, "/", &["/one"]).await;
    serve(&server, "/one", &["/two", "/"]).await;
    serve(&server, "/two", &["/", "/one"]).await;

    let request = CrawlRequest::new(format!("{}/", server.uri()))
        .with_max_depth(50)
        .with_max_pages(50);
    let result = crawler().crawl(&request, None).await.unwrap();

    assert_eq!(visited_paths(&server, &result.pages), vec!["/", "/one", "/two"]);
}

#[tokio::test]
async fn test_crawl_path_prefix_scope() {
    let server = MockServer::start().await;

    serve(&server, "/docs/", &["/docs/intro", "/blog/post", "/docs"]).await;
    serve(&server, "/docs/intro", &["/docs/advanced", "/pricing"]).await;
    serve(&server, "/docs/advanced", &[]).await;
    serve(&server, "/blog/post", &[]).await;
    serve(&server, "/pricing", &[]).await;

    let request =
        CrawlRequest::new(format!("{}/docs/", server.uri())).with_path_prefix("/docs/");
    let result = crawler().crawl(&request, None).await.unwrap();

    assert_eq!(
        visited_paths(&server, &result.pages),
        vec!["/docs/", "/docs/intro", "/docs/advanced"]
    );
}

#[tokio::test]
async fn test_crawl_ignores_other_hosts() {
    let server = MockServer::start().await;
    let port = url::Url::parse(&server.uri()).unwrap().port().unwrap();

    let other_host = format!("http://localhost:{}/elsewhere", port);
    serve(
        &server,
        "/",
        &[other_host.as_str(), "https://example.invalid/", "/local"],
    )
    .await;
    serve(&server, "/local", &[]).await;

    let request = CrawlRequest::new(format!("{}/", server.uri()));
    let result = crawler().crawl(&request, None).await.unwrap();

    assert_eq!(visited_paths(&server, &result.pages), vec!["/", "/local"]);
}

#[tokio::test]
async fn test_crawl_records_failed_pages_and_prunes_them() {
    let server = MockServer::start().await;

    serve(&server, "/", &["/broken", "/ok"]).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    serve(&server, "/ok", &[]).await;

    let request = CrawlRequest::new(format!("{}/", server.uri()));
    let result = crawler().crawl(&request, None).await.unwrap();

    assert!(result.success);
    assert_eq!(visited_paths(&server, &result.pages), vec!["/", "/broken", "/ok"]);
    assert_eq!(result.succeeded(), 2);

    let broken = &result.pages[1];
    assert!(!broken.success);
    assert!(broken.error.as_deref().unwrap().contains("500"));
}

#[tokio::test]
async fn test_crawl_progress_events() {
    let server = MockServer::start().await;

    serve(&server, "/", &["/a", "/b"]).await;
    serve(&server, "/a", &[]).await;
    serve(&server, "/b", &[]).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let request = CrawlRequest::new(format!("{}/", server.uri())).with_max_pages(10);
    let result = crawler().crawl(&request, Some(tx)).await.unwrap();

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert_eq!(events.len(), 4);
    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);

    for (i, event) in events[..3].iter().enumerate() {
        match event {
            ProgressEvent::Progress {
                current_url,
                completed,
                total,
            } => {
                assert_eq!(*completed, i + 1);
                assert_eq!(*total, 10);
                assert_eq!(current_url, &result.pages[i].url);
            }
            other => panic!("expected progress, got {:?}", other),
        }
    }

    match &events[3] {
        ProgressEvent::Result { data } => assert_eq!(data, &result),
        other => panic!("expected result, got {:?}", other),
    }
}

#[tokio::test]
async fn test_crawl_invalid_request_sends_nothing() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let request = CrawlRequest::new("https://example.com/").with_max_pages(0);

    let err = crawler().crawl(&request, Some(tx)).await.unwrap_err();

    assert!(matches!(err, ScrapeError::InvalidRequest(_)));
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_crawl_dropped_receiver_does_not_stop_crawl() {
    let server = MockServer::start().await;

    serve(&server, "/", &["/a"]).await;
    serve(&server, "/a", &[]).await;

    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);

    let request = CrawlRequest::new(format!("{}/", server.uri()));
    let result = crawler().crawl(&request, Some(tx)).await.unwrap();

    assert_eq!(result.total_pages, 2);
}

#[tokio::test]
async fn test_crawl_prefix_without_slash_matches_nothing() {
    let server = MockServer::start().await;

    serve(&server, "/docs/", &["/docs/intro"]).await;
    serve(&server, "/docs/intro", &[]).await;

    let request = CrawlRequest::new(format!("{}/docs/", server.uri())).with_path_prefix("docs/");
    let result = crawler().crawl(&request, None).await.unwrap();

    assert!(result.success);
    assert_eq!(visited_paths(&server, &result.pages), vec!["/docs/"]);
}
