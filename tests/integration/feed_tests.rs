//! Paginated feed discovery tests

use crate::common::MemoryStore;
use sitemirror::sync::{HtmlExtractor, HttpFetcher, SyncOptions, SyncScheduler};
use sitemirror::{FeedDiscovery, FeedSource, Source};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POSTS: &str = "/wp-json/wp/v2/posts";

fn posts(base: &str, page: u32, count: u32) -> serde_json::Value {
    let posts: Vec<_> = (0..count)
        .map(|i| {
            serde_json::json!({
                "id": page * 100 + i,
                "date": format!("2024-03-{:02}T08:30:00", i + 1),
                "link": format!("{base}/post-{page}-{i}"),
            })
        })
        .collect();
    serde_json::Value::Array(posts)
}

async fn mount_page(server: &MockServer, page: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

fn discovery() -> FeedDiscovery {
    FeedDiscovery::new(Arc::new(HttpFetcher::new().unwrap()))
}

#[tokio::test]
async fn test_pagination_stops_at_empty_page() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "1", posts(&base, 1, 10)).await;
    mount_page(&server, "2", posts(&base, 2, 10)).await;
    mount_page(&server, "3", serde_json::json!([])).await;

    let feed = FeedSource {
        per_page: Some(10),
        ..FeedSource::new(format!("{base}{POSTS}"))
    };
    let records = discovery().discover(&feed).await.unwrap();

    assert_eq!(records.len(), 20);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    assert!(records.iter().all(|r| r.sitemap_url == feed.url));
    assert_eq!(records[0].loc, format!("{base}/post-1-0"));
    assert_eq!(
        records[0].last_mod.as_deref(),
        Some("2024-03-01T00:00:00+00:00")
    );
}

#[tokio::test]
async fn test_failed_page_ends_discovery_without_error() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "1", posts(&base, 1, 3)).await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let records = discovery()
        .discover(&FeedSource::new(format!("{base}{POSTS}")))
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn test_posts_without_valid_date_are_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "1",
        serde_json::json!([
            { "date": "2024-03-01T08:30:00", "link": format!("{base}/kept") },
            { "date": "yesterday", "link": format!("{base}/no-date") },
            { "date": "2024-02-30T00:00:00", "link": format!("{base}/bad-date") },
            { "date": "2024-03-02T08:30:00", "link": format!("{base}/kept") },
        ]),
    )
    .await;
    mount_page(&server, "2", serde_json::json!([])).await;

    let records = discovery()
        .discover(&FeedSource::new(format!("{base}{POSTS}")))
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].loc, format!("{base}/kept"));
    assert_eq!(
        records[0].last_mod.as_deref(),
        Some("2024-03-01T00:00:00+00:00")
    );
}

#[tokio::test]
async fn test_feed_user_agent_override_is_sent() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(header("user-agent", "Mozilla/5.0 (X11; Linux x86_64)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let feed = FeedSource {
        user_agent: Some("Mozilla/5.0 (X11; Linux x86_64)".to_string()),
        ..FeedSource::new(format!("{base}{POSTS}"))
    };
    let records = discovery().discover(&feed).await.unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_feed_source_sync_stores_posts() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "1", posts(&base, 1, 4)).await;
    mount_page(&server, "2", serde_json::json!([])).await;

    let store = Arc::new(MemoryStore::new());
    let scheduler = SyncScheduler::new(
        store.clone(),
        Arc::new(HttpFetcher::new().unwrap()),
        Arc::new(HtmlExtractor::default()),
        SyncOptions::default(),
    );

    let failures = scheduler
        .sync_sources(&[Source::Feed(FeedSource::new(format!("{base}{POSTS}")))])
        .await;

    assert!(failures.is_empty());
    assert_eq!(store.locs().len(), 4);
}

#[tokio::test]
async fn test_page_ceiling_stops_endless_feed() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts(&base, 1, 3)))
        .expect(2)
        .mount(&server)
        .await;

    let records = discovery()
        .with_max_pages(2)
        .discover(&FeedSource::new(format!("{base}{POSTS}")))
        .await
        .unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    // both pages list the same posts
    assert_eq!(records.len(), 3);
}
