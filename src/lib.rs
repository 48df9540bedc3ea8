//! Recall Cache - typed value cache with call tracking and page caching
//!
//! Stores scalars under random keys, records and replays calls to tracked
//! operations, and caches fetched web pages for a fixed TTL while counting
//! accesses per URL. All state lives behind the [`store::KeyValueStore`] trait.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;
pub mod tracking;
pub mod web;

pub use api::AppState;
pub use cache::{Cache, Value};
pub use config::Config;
pub use error::{CacheError, Result};
pub use store::{KeyValueStore, MemoryStore};
pub use tasks::spawn_cleanup_task;
pub use tracking::{CallTracker, FailurePolicy, FnOperation, Operation, ReplayLog};
pub use web::{Fetcher, HttpFetcher, WebCache};
