//! Web Cache
//!
//! Counts every access to a URL and keeps the last fetched page for a fixed TTL.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::decode_str;
use crate::error::{CacheError, Result};
use crate::store::KeyValueStore;
use crate::web::Fetcher;

/// Seconds a fetched page stays cached by default.
pub const DEFAULT_PAGE_TTL: u64 = 10;

/// Store key of the access counter for `url`.
pub fn count_key(url: &str) -> String {
    format!("count:{}", url)
}

/// Store key of the cached page for `url`.
pub fn cached_key(url: &str) -> String {
    format!("cached:{}", url)
}

type Flights = Mutex<HashMap<String, Arc<Mutex<()>>>>;

// == Web Cache ==
/// Access-counting, TTL-bounded page cache in front of a [`Fetcher`].
///
/// Failed fetches are returned to the caller and never cached. Without
/// single-flight, concurrent misses on one URL each fetch and the last write
/// wins the TTL window.
pub struct WebCache<S, F> {
    store: Arc<S>,
    fetcher: F,
    ttl_secs: u64,
    /// Per-URL locks, present when single-flight is enabled
    flights: Option<Flights>,
}

impl<S, F> WebCache<S, F>
where
    S: KeyValueStore,
    F: Fetcher,
{
    // == Constructor ==
    /// Creates a cache with the default 10 second TTL.
    pub fn new(store: Arc<S>, fetcher: F) -> Self {
        Self {
            store,
            fetcher,
            ttl_secs: DEFAULT_PAGE_TTL,
            flights: None,
        }
    }

    /// Sets the page TTL in seconds. Zero is raised to one second.
    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs.max(1);
        self
    }

    /// When enabled, concurrent misses on the same URL wait for one fetch
    /// instead of each fetching.
    pub fn single_flight(mut self, enabled: bool) -> Self {
        self.flights = enabled.then(|| Mutex::new(HashMap::new()));
        self
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    // == Fetch ==
    /// Returns the page at `url`, from cache when a live copy exists.
    ///
    /// The access counter is incremented before the cache is consulted, so it
    /// counts attempts, hits and misses alike, including failed fetches.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        self.fetch_counted(url).await.map(|(page, _)| page)
    }

    /// Like [`WebCache::fetch`], also returning the access count this call produced.
    pub async fn fetch_counted(&self, url: &str) -> Result<(String, u64)> {
        let count = self.store.increment(&count_key(url)).await?.max(0) as u64;

        if let Some(page) = self.cached(url).await? {
            debug!("Cache hit for {} (access #{})", url, count);
            return Ok((page, count));
        }

        let page = match &self.flights {
            None => self.refresh(url).await?,
            Some(flights) => self.refresh_single_flight(flights, url).await?,
        };
        Ok((page, count))
    }

    // == Access Count ==
    /// Number of `fetch` calls made for `url`.
    pub async fn access_count(&self, url: &str) -> Result<u64> {
        match self.store.get(&count_key(url)).await? {
            Some(bytes) => {
                let text = decode_str(bytes)?;
                text.parse().map_err(|_| {
                    CacheError::Conversion(format!(
                        "Access counter for '{}' holds '{}'",
                        url, text
                    ))
                })
            }
            None => Ok(0),
        }
    }

    async fn cached(&self, url: &str) -> Result<Option<String>> {
        self.store
            .get(&cached_key(url))
            .await?
            .map(decode_str)
            .transpose()
    }

    async fn refresh(&self, url: &str) -> Result<String> {
        debug!("Cache miss for {}, fetching", url);

        let page = self.fetcher.fetch(url).await.map_err(|e| {
            warn!("Fetch of {} failed: {}", url, e);
            e
        })?;

        self.store
            .set_with_expiry(&cached_key(url), page.clone().into_bytes(), self.ttl_secs)
            .await?;
        Ok(page)
    }

    async fn refresh_single_flight(&self, flights: &Flights, url: &str) -> Result<String> {
        let gate = {
            let mut map = flights.lock().await;
            map.entry(url.to_string()).or_default().clone()
        };

        let result = {
            let _flight = gate.lock().await;
            // Another caller may have filled the cache while this one waited.
            match self.cached(url).await {
                Ok(Some(page)) => Ok(page),
                Ok(None) => self.refresh(url).await,
                Err(e) => Err(e),
            }
        };

        let mut map = flights.lock().await;
        // Only the map and this caller hold the gate: nobody else is waiting.
        if Arc::strong_count(&gate) == 2 {
            map.remove(url);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Serves `<html>{url} v{n}</html>`, where n counts calls; fails for URLs containing "down".
    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
        delay_ms: u64,
    }

    impl CountingFetcher {
        fn slow(delay_ms: u64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay_ms,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if url.contains("down") {
                return Err(CacheError::Fetch(format!("{} returned 503", url)));
            }
            Ok(format!("<html>{} v{}</html>", url, n))
        }
    }

    fn web_cache(fetcher: CountingFetcher) -> WebCache<MemoryStore, CountingFetcher> {
        WebCache::new(Arc::new(MemoryStore::new()), fetcher)
    }

    #[tokio::test]
    async fn test_first_fetch_calls_fetcher() {
        let cache = web_cache(CountingFetcher::default());

        let page = cache.fetch("http://a.test").await.unwrap();

        assert_eq!(page, "<html>http://a.test v1</html>");
        assert_eq!(cache.fetcher().calls(), 1);
        assert_eq!(cache.access_count("http://a.test").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_second_fetch_within_ttl_is_cached() {
        let cache = web_cache(CountingFetcher::default());

        let first = cache.fetch("http://a.test").await.unwrap();
        let second = cache.fetch("http://a.test").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.fetcher().calls(), 1);
        assert_eq!(cache.access_count("http://a.test").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fetch_after_ttl_refreshes() {
        let cache = web_cache(CountingFetcher::default()).with_ttl(1);

        let first = cache.fetch("http://a.test").await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        let second = cache.fetch("http://a.test").await.unwrap();

        assert_eq!(cache.fetcher().calls(), 2);
        assert_ne!(first, second);
        assert_eq!(second, "<html>http://a.test v2</html>");
        assert_eq!(cache.access_count("http://a.test").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_page_stored_with_ttl() {
        let store = Arc::new(MemoryStore::new());
        let cache = WebCache::new(store.clone(), CountingFetcher::default());

        cache.fetch("http://a.test").await.unwrap();

        let remaining = store.ttl_remaining_ms(&cached_key("http://a.test")).await.unwrap();
        assert!(remaining <= DEFAULT_PAGE_TTL * 1000);
        assert!(remaining > (DEFAULT_PAGE_TTL - 1) * 1000);
        assert!(store.ttl_remaining_ms(&count_key("http://a.test")).await.is_none());
    }

    #[tokio::test]
    async fn test_urls_cached_independently() {
        let cache = web_cache(CountingFetcher::default());

        cache.fetch("http://a.test").await.unwrap();
        cache.fetch("http://b.test").await.unwrap();
        cache.fetch("http://a.test").await.unwrap();

        assert_eq!(cache.fetcher().calls(), 2);
        assert_eq!(cache.access_count("http://a.test").await.unwrap(), 2);
        assert_eq!(cache.access_count("http://b.test").await.unwrap(), 1);
        assert_eq!(cache.access_count("http://never.test").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = web_cache(CountingFetcher::default());

        let first = cache.fetch("http://down.test").await;
        let second = cache.fetch("http://down.test").await;

        assert!(matches!(first, Err(CacheError::Fetch(ref msg)) if msg.contains("503")));
        assert!(second.is_err());
        assert_eq!(cache.fetcher().calls(), 2);
        assert_eq!(cache.access_count("http://down.test").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fetch_counted_reports_own_access() {
        let cache = Arc::new(web_cache(CountingFetcher::slow(20)));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.fetch_counted("http://a.test").await })
            })
            .collect();

        let mut counts = Vec::new();
        for handle in handles {
            counts.push(handle.await.unwrap().unwrap().1);
        }
        counts.sort_unstable();

        assert_eq!(counts, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_huge_ttl_still_caches() {
        let cache = web_cache(CountingFetcher::default()).with_ttl(u64::MAX / 100);

        let first = cache.fetch("http://a.test").await.unwrap();
        let second = cache.fetch("http://a.test").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.fetcher().calls(), 1);
    }

    #[tokio::test]
    async fn test_with_zero_ttl_is_clamped() {
        let cache = web_cache(CountingFetcher::default()).with_ttl(0);
        assert_eq!(cache.ttl_secs(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_without_single_flight_all_fetch() {
        let cache = Arc::new(web_cache(CountingFetcher::slow(50)));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.fetch("http://a.test").await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(cache.fetcher().calls(), 5);
        assert_eq!(cache.access_count("http://a.test").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_single_flight_fetches_once() {
        let cache = Arc::new(web_cache(CountingFetcher::slow(50)).single_flight(true));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.fetch("http://a.test").await })
            })
            .collect();

        let mut pages = Vec::new();
        for handle in handles {
            pages.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(cache.fetcher().calls(), 1);
        assert!(pages.iter().all(|p| p == "<html>http://a.test v1</html>"));
        assert_eq!(cache.access_count("http://a.test").await.unwrap(), 5);

        let flights = cache.flights.as_ref().unwrap().lock().await;
        assert!(flights.is_empty());
    }
}
