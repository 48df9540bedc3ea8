//! Store Module
//!
//! The key-value capability every component is built on, plus an in-memory
//! implementation with TTL expiration.

mod entry;
mod memory;
mod stats;


use async_trait::async_trait;

use crate::error::Result;

// Re-export public types
pub use entry::{current_timestamp_ms, StoreData, StoreEntry};
pub use memory::MemoryStore;
pub use stats::StoreStats;

// == Key Value Store ==
/// Minimal capability set the caches and the call tracker need from a store.
///
/// Each method is atomic on its own. Sequences of calls are not.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Writes `value` under `key`, replacing any previous value and clearing its TTL.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Writes `value` under `key` with a TTL in seconds.
    async fn set_with_expiry(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> Result<()>;

    /// Reads the raw bytes under `key`. A missing or expired key is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Increments the integer counter under `key`, starting from 0 if absent.
    async fn increment(&self, key: &str) -> Result<i64>;

    /// Appends `value` to the tail of the list under `key`. Returns the new length.
    async fn append(&self, key: &str, value: String) -> Result<usize>;

    /// Returns list items from `start` to `end` inclusive.
    ///
    /// Negative indexes count from the tail, so `(0, -1)` is the whole list.
    async fn range(&self, key: &str, start: i64, end: i64) -> Result<Vec<String>>;

    /// Sets a TTL on an existing key. Returns false if the key does not exist.
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool>;

    /// Removes every key.
    async fn flush_all(&self) -> Result<()>;
}
