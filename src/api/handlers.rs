//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use crate::cache::{Cache, StoreOperation, Value};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    GetQuery, GetResponse, HealthResponse, PageQuery, PageResponse, ReplayResponse,
    StatsResponse, StoreRequest, StoreResponse, ValueKind,
};
use crate::store::MemoryStore;
use crate::tracking::{CallTracker, ReplayLog};
use crate::web::{Fetcher, HttpFetcher, WebCache};

/// `Cache.store` wrapped with call tracking.
pub type TrackedStore = CallTracker<StoreOperation<MemoryStore>, MemoryStore>;

/// Page cache with a swappable fetcher.
pub type PageCache = WebCache<MemoryStore, Arc<dyn Fetcher>>;

/// Application state shared across all handlers.
///
/// Every component shares the one store handle.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub cache: Cache<MemoryStore>,
    pub tracked_store: Arc<TrackedStore>,
    pub replay: ReplayLog<MemoryStore>,
    pub pages: Arc<PageCache>,
}

impl AppState {
    /// Builds the components over a fresh store, using `fetcher` for pages.
    ///
    /// The store is flushed when the cache is created.
    pub async fn new(config: &Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let cache = Cache::new(store.clone()).await?;

        let tracked_store = CallTracker::new(cache.store_operation(), store.clone())
            .with_policy(config.failure_policy)
            .serialized(config.serialize_calls);

        let pages = WebCache::new(store.clone(), fetcher)
            .with_ttl(config.page_ttl)
            .single_flight(config.single_flight);

        info!(
            "State ready: failure_policy={}, serialize_calls={}, page_ttl={}s, single_flight={}",
            config.failure_policy, config.serialize_calls, config.page_ttl, config.single_flight
        );

        Ok(Self {
            replay: ReplayLog::new(store.clone()),
            store,
            cache,
            tracked_store: Arc::new(tracked_store),
            pages: Arc::new(pages),
        })
    }

    /// Builds the state with an HTTP fetcher configured from `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(Duration::from_secs(config.fetch_timeout))?;
        Self::new(config, Arc::new(fetcher)).await
    }
}

/// Handler for PUT /store
///
/// Stores a value under a generated key through the tracked `Cache.store`.
pub async fn store_handler(
    State(state): State<AppState>,
    Json(req): Json<StoreRequest>,
) -> Result<Json<StoreResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = state
        .tracked_store
        .call((Value::from(req.value),))
        .await?;

    Ok(Json(StoreResponse::new(key)))
}

/// Handler for GET /get/:key?as=str|int|float
///
/// Retrieves and decodes a stored value.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<GetQuery>,
) -> Result<Json<GetResponse>> {
    let value: Option<serde_json::Value> = match query.kind {
        ValueKind::Str => state.cache.get_str(&key).await?.map(Into::into),
        ValueKind::Int => state.cache.get_int(&key).await?.map(Into::into),
        ValueKind::Float => state.cache.get_float(&key).await?.map(Into::into),
    };

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /replay/:name
///
/// Returns the recorded calls of a tracked operation.
pub async fn replay_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ReplayResponse>> {
    let replay = state.replay.replay(&name).await?;
    Ok(Json(ReplayResponse::from(&replay)))
}

/// Handler for GET /page?url=...
///
/// Returns the page content, cached for the configured TTL.
pub async fn page_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let url = query.url.trim().to_string();
    let (content, access_count) = state.pages.fetch_counted(&url).await?;

    Ok(Json(PageResponse {
        url,
        content,
        access_count,
    }))
}

/// Handler for GET /stats
///
/// Returns current store statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.store.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
