//! Integration Tests for the Web Cache
//!
//! Runs `HttpFetcher` against a local server that counts the requests it serves.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use recall_cache::{CacheError, HttpFetcher, MemoryStore, WebCache};

// == Helper Functions ==

#[derive(Clone, Default)]
struct Origin {
    hits: Arc<AtomicUsize>,
}

async fn page(State(origin): State<Origin>) -> String {
    let n = origin.hits.fetch_add(1, Ordering::SeqCst) + 1;
    format!("<html><body>served {}</body></html>", n)
}

async fn broken(State(origin): State<Origin>) -> (StatusCode, &'static str) {
    origin.hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

/// Starts the origin server on an ephemeral port.
async fn spawn_origin() -> (SocketAddr, Origin) {
    let origin = Origin::default();
    let app = Router::new()
        .route("/page", get(page))
        .route("/broken", get(broken))
        .with_state(origin.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, origin)
}

fn web_cache(ttl_secs: u64) -> WebCache<MemoryStore, HttpFetcher> {
    // Local origin only; ignore any proxy set in the environment
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let fetcher = HttpFetcher::with_client(client);
    WebCache::new(Arc::new(MemoryStore::new()), fetcher).with_ttl(ttl_secs)
}

// == Tests ==

#[tokio::test]
async fn test_second_fetch_served_from_cache() {
    let (addr, origin) = spawn_origin().await;
    let cache = web_cache(10);
    let url = format!("http://{}/page", addr);

    let first = cache.fetch(&url).await.unwrap();
    let second = cache.fetch(&url).await.unwrap();

    assert_eq!(first, "<html><body>served 1</body></html>");
    assert_eq!(first, second);
    assert_eq!(origin.hits.load(Ordering::SeqCst), 1);
    assert_eq!(cache.access_count(&url).await.unwrap(), 2);
}

#[tokio::test]
async fn test_expired_page_refetched() {
    let (addr, origin) = spawn_origin().await;
    let cache = web_cache(1);
    let url = format!("http://{}/page", addr);

    cache.fetch(&url).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let refreshed = cache.fetch(&url).await.unwrap();

    assert_eq!(refreshed, "<html><body>served 2</body></html>");
    assert_eq!(origin.hits.load(Ordering::SeqCst), 2);
    assert_eq!(cache.access_count(&url).await.unwrap(), 2);
}

#[tokio::test]
async fn test_error_status_not_cached() {
    let (addr, origin) = spawn_origin().await;
    let cache = web_cache(10);
    let url = format!("http://{}/broken", addr);

    let first = cache.fetch(&url).await;
    let second = cache.fetch(&url).await;

    assert!(matches!(first, Err(CacheError::Fetch(_))));
    assert!(matches!(second, Err(CacheError::Fetch(_))));
    assert_eq!(origin.hits.load(Ordering::SeqCst), 2);
    assert_eq!(cache.access_count(&url).await.unwrap(), 2);
}

#[tokio::test]
async fn test_connection_refused_is_fetch_error() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let cache = web_cache(10);
    let url = format!("http://{}/page", addr);

    let result = cache.fetch(&url).await;
    assert!(matches!(result, Err(CacheError::Fetch(_))));
    assert_eq!(cache.access_count(&url).await.unwrap(), 1);
}
