//! Memory Store Module
//!
//! In-memory `KeyValueStore` backed by a HashMap with lazy and swept TTL expiration.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::store::{KeyValueStore, StoreData, StoreEntry, StoreStats};

// == Memory Store ==
/// Process-local store. Share it between components through an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Key-value storage
    entries: HashMap<String, StoreEntry>,
    /// Read statistics
    stats: StoreStats,
}

impl Inner {
    /// Returns the live entry for `key`, dropping it first if its TTL elapsed.
    fn live_entry(&mut self, key: &str) -> Option<&mut StoreEntry> {
        if self.entries.get(key).is_some_and(StoreEntry::is_expired) {
            self.entries.remove(key);
            self.stats.record_expired(1);
            debug!("Key expired: {}", key);
        }
        self.entries.get_mut(key)
    }
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Stats ==
    /// Returns current store statistics.
    pub async fn stats(&self) -> StoreStats {
        let inner = self.inner.read().await;
        let mut stats = inner.stats.clone();
        stats.set_total_keys(inner.entries.len());
        stats
    }

    // == TTL ==
    /// Returns the remaining TTL of `key` in milliseconds, or None if it has none or is absent.
    pub async fn ttl_remaining_ms(&self, key: &str) -> Option<u64> {
        let mut inner = self.inner.write().await;
        inner.live_entry(key).and_then(|entry| entry.ttl_remaining_ms())
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired());

        let removed = before - inner.entries.len();
        inner.stats.record_expired(removed);
        removed
    }

    // == Length ==
    /// Returns the current number of keys, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    // == Is Empty ==
    /// Returns true if no keys are held, expired or not.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}

fn wrong_type(key: &str, found: &StoreData, wanted: &str) -> CacheError {
    CacheError::Storage(format!(
        "Key '{}' holds a {} value, expected {}",
        key,
        found.kind(),
        wanted
    ))
}

/// Resolves an inclusive, possibly negative index pair against a list of `len` items.
fn resolve_range(len: usize, start: i64, end: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let end = if end < 0 { end + len } else { end.min(len - 1) };

    if len == 0 || start > end || start >= len {
        None
    } else {
        Some((start as usize, end as usize))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        debug!("SET key={}, size={}", key, value.len());

        let mut inner = self.inner.write().await;
        inner
            .entries
            .insert(key.to_string(), StoreEntry::new(StoreData::Bytes(value), None));
        Ok(())
    }

    async fn set_with_expiry(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> Result<()> {
        debug!("SETEX key={}, size={}, ttl={}s", key, value.len(), ttl_secs);

        if ttl_secs == 0 {
            return Err(CacheError::Storage(format!(
                "Invalid expire time for key '{}'",
                key
            )));
        }

        let mut inner = self.inner.write().await;
        inner.entries.insert(
            key.to_string(),
            StoreEntry::new(StoreData::Bytes(value), Some(ttl_secs)),
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        debug!("GET key={}", key);

        let mut inner = self.inner.write().await;
        let value = match inner.live_entry(key) {
            Some(entry) => match &entry.data {
                StoreData::Bytes(bytes) => Some(bytes.clone()),
                other => return Err(wrong_type(key, other, "bytes")),
            },
            None => None,
        };

        if value.is_some() {
            inner.stats.record_hit();
        } else {
            inner.stats.record_miss();
        }
        Ok(value)
    }

    async fn increment(&self, key: &str) -> Result<i64> {
        let mut inner = self.inner.write().await;
        let next = match inner.live_entry(key) {
            Some(entry) => {
                let current = match &entry.data {
                    StoreData::Bytes(bytes) => std::str::from_utf8(bytes)
                        .ok()
                        .and_then(|s| s.parse::<i64>().ok())
                        .ok_or_else(|| {
                            CacheError::Storage(format!(
                                "Value at key '{}' is not an integer",
                                key
                            ))
                        })?,
                    other => return Err(wrong_type(key, other, "bytes")),
                };
                let next = current.checked_add(1).ok_or_else(|| {
                    CacheError::Storage(format!("Increment of key '{}' would overflow", key))
                })?;
                // Counters keep their TTL across increments.
                entry.data = StoreData::Bytes(next.to_string().into_bytes());
                next
            }
            None => {
                inner.entries.insert(
                    key.to_string(),
                    StoreEntry::new(StoreData::Bytes(b"1".to_vec()), None),
                );
                1
            }
        };

        debug!("INCR key={} -> {}", key, next);
        Ok(next)
    }

    async fn append(&self, key: &str, value: String) -> Result<usize> {
        let mut inner = self.inner.write().await;
        let len = match inner.live_entry(key) {
            Some(entry) => match &mut entry.data {
                StoreData::List(items) => {
                    items.push(value);
                    items.len()
                }
                other => return Err(wrong_type(key, other, "list")),
            },
            None => {
                inner.entries.insert(
                    key.to_string(),
                    StoreEntry::new(StoreData::List(vec![value]), None),
                );
                1
            }
        };

        debug!("RPUSH key={} -> len={}", key, len);
        Ok(len)
    }

    async fn range(&self, key: &str, start: i64, end: i64) -> Result<Vec<String>> {
        let mut inner = self.inner.write().await;
        match inner.live_entry(key) {
            Some(entry) => match &entry.data {
                StoreData::List(items) => Ok(resolve_range(items.len(), start, end)
                    .map(|(from, to)| items[from..=to].to_vec())
                    .unwrap_or_default()),
                other => Err(wrong_type(key, other, "list")),
            },
            None => Ok(Vec::new()),
        }
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.live_entry(key) {
            Some(entry) => {
                entry.set_expiry(ttl_secs);
                debug!("EXPIRE key={}, ttl={}s", key, ttl_secs);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn flush_all(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        let removed = inner.entries.len();
        inner.entries.clear();
        debug!("FLUSHALL removed={}", removed);
        Ok(())
    }
}
