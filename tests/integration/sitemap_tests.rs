//! Source sync tests against mock sitemap servers

use crate::common::{
    article_page, sitemap_index, urlset, FaultyStore, MemoryStore, RecordingObserver, T1, T2,
};
use sitemirror::storage::SqliteStorage;
use sitemirror::sync::{FetchError, HtmlExtractor, HttpFetcher, SyncOptions, SyncScheduler};
use sitemirror::{MirrorError, Source, Store};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn scheduler(store: Arc<dyn Store>, options: SyncOptions) -> SyncScheduler {
    SyncScheduler::new(
        store,
        Arc::new(HttpFetcher::new().unwrap()),
        Arc::new(HtmlExtractor::default()),
        options,
    )
}

fn options() -> SyncOptions {
    SyncOptions {
        politeness_delay: Duration::ZERO,
        ..SyncOptions::default()
    }
}

#[tokio::test]
async fn test_index_children_are_flattened() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(
        &server,
        "/index.xml",
        sitemap_index(&[format!("{base}/s1.xml"), format!("{base}/s2.xml")]),
    )
    .await;
    mount(
        &server,
        "/s1.xml",
        urlset(&[(format!("{base}/a"), Some(T1)), (format!("{base}/b"), None)]),
    )
    .await;
    mount(
        &server,
        "/s2.xml",
        urlset(&[(format!("{base}/b"), None), (format!("{base}/c"), Some(T2))]),
    )
    .await;

    let store = Arc::new(MemoryStore::new());
    let observer = Arc::new(RecordingObserver::default());
    let failures = scheduler(store.clone(), options())
        .with_observer(observer.clone())
        .sync_sitemaps(&[format!("{base}/index.xml")])
        .await;

    assert!(failures.is_empty());
    assert_eq!(
        store.locs(),
        vec![
            format!("{base}/a"),
            format!("{base}/b"),
            format!("{base}/c")
        ]
    );

    let records = store.find_all_url_records().unwrap();
    let c = records.iter().find(|r| r.loc.ends_with("/c")).unwrap();
    assert_eq!(c.sitemap_url, format!("{base}/s2.xml"));
    assert_eq!(c.last_mod.as_deref(), Some(T2));

    assert_eq!(
        *observer.synced.lock().unwrap(),
        vec![(format!("{base}/index.xml"), 3, 3)]
    );
}

#[tokio::test]
async fn test_source_sync_is_idempotent() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount(
        &server,
        "/sitemap.xml",
        urlset(&[
            (format!("{base}/a"), Some(T1)),
            (format!("{base}/b"), Some(T1)),
            (format!("{base}/c"), Some(T1)),
        ]),
    )
    .await;

    let store = Arc::new(MemoryStore::new());
    let scheduler = scheduler(store.clone(), options());
    let sources = vec![Source::sitemap(format!("{base}/sitemap.xml"))];

    assert!(scheduler.sync_sources(&sources).await.is_empty());
    assert!(scheduler.sync_sources(&sources).await.is_empty());

    assert_eq!(store.locs().len(), 3);
    assert_eq!(store.url_creates.load(Ordering::SeqCst), 3);
    assert_eq!(store.url_updates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failing_source_does_not_block_others() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount(
        &server,
        "/good.xml",
        urlset(&[(format!("{base}/a"), None)]),
    )
    .await;
    mount(&server, "/page.html", "<html><body>hi</body></html>".to_string()).await;

    let store = Arc::new(MemoryStore::new());
    let observer = Arc::new(RecordingObserver::default());
    let failures = scheduler(store.clone(), options())
        .with_observer(observer.clone())
        .sync_sitemaps(&[
            format!("{base}/missing.xml"),
            format!("{base}/good.xml"),
            format!("{base}/page.html"),
        ])
        .await;

    assert_eq!(failures.len(), 2);
    for failure in &failures {
        match failure.source.url() {
            u if u.ends_with("/missing.xml") => assert!(matches!(
                failure.error,
                MirrorError::Fetch(FetchError::Status { status: 404, .. })
            )),
            u if u.ends_with("/page.html") => {
                assert!(matches!(failure.error, MirrorError::NotASitemap { .. }))
            }
            other => panic!("unexpected failure for {other}"),
        }
    }

    assert_eq!(store.locs(), vec![format!("{base}/a")]);
    assert_eq!(observer.failed_sources.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_refresh_last_mod_updates_known_urls() {
    let server = MockServer::start().await;
    let base = server.uri();
    let entry = format!("{base}/sitemap.xml");

    mount(&server, "/sitemap.xml", urlset(&[(format!("{base}/a"), Some(T1))])).await;
    let store = Arc::new(MemoryStore::new());
    let scheduler = scheduler(
        store.clone(),
        SyncOptions {
            refresh_last_mod: true,
            ..options()
        },
    );
    assert!(scheduler.sync_sitemaps(&[entry.clone()]).await.is_empty());

    server.reset().await;
    mount(&server, "/sitemap.xml", urlset(&[(format!("{base}/a"), Some(T2))])).await;
    assert!(scheduler.sync_sitemaps(&[entry]).await.is_empty());

    let records = store.find_all_url_records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].last_mod.as_deref(), Some(T2));
    assert_eq!(store.url_creates.load(Ordering::SeqCst), 1);
    assert_eq!(store.url_updates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_full_run_against_sqlite() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(
        &server,
        "/sitemap.xml",
        urlset(&[
            (format!("{base}/a"), Some("2024-01-01")),
            (format!("{base}/b"), Some(T1)),
        ]),
    )
    .await;

    // a second fetch of either page would fail verification when the server drops
    for (route, title) in [("/a", "Page A"), ("/b", "Page B")] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(article_page(title, "Answer", "Gist")),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStorage::new(&dir.path().join("mirror.db")).unwrap());
    let scheduler = scheduler(store.clone(), options());
    let sources = vec![Source::sitemap(format!("{base}/sitemap.xml"))];

    let first = scheduler.run(&sources).await.unwrap();
    assert!(first.source_failures.is_empty());
    assert_eq!(first.contents.created, 2);

    let second = scheduler.run(&sources).await.unwrap();
    assert_eq!(second.contents.gated, 2);

    assert_eq!(store.count_url_records().unwrap(), 2);
    assert_eq!(store.count_content_records().unwrap(), 2);

    let a = store
        .find_content_by_url(&format!("{base}/a"))
        .unwrap()
        .unwrap();
    assert_eq!(a.title.as_deref(), Some("Page A"));
    assert_eq!(a.last_modified.as_deref(), Some("2024-01-01T00:00:00+00:00"));
}

#[tokio::test]
async fn test_storage_error_fails_only_its_source() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount(&server, "/good.xml", urlset(&[(format!("{base}/a"), None)])).await;
    mount(
        &server,
        "/bad.xml",
        urlset(&[(format!("{base}/b"), None), (format!("{base}/c"), None)]),
    )
    .await;

    let store = Arc::new(
        FaultyStore::new(MemoryStore::new())
            .fail_on("create_url_record", Some(format!("{base}/c").as_str())),
    );
    let observer = Arc::new(RecordingObserver::default());
    let failures = scheduler(store.clone(), options())
        .with_observer(observer.clone())
        .sync_sitemaps(&[format!("{base}/good.xml"), format!("{base}/bad.xml")])
        .await;

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].source.url(), format!("{base}/bad.xml"));
    assert!(matches!(failures[0].error, MirrorError::Storage(_)));

    // records written before the failing one are kept
    assert_eq!(store.inner.locs(), vec![format!("{base}/a"), format!("{base}/b")]);
    assert_eq!(observer.synced.lock().unwrap().len(), 1);
}
