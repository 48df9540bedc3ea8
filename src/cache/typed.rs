//! Typed Cache
//!
//! Stores scalar values under random keys and reads them back through a
//! caller-chosen decoder.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::Value;
use crate::error::{CacheError, Result};
use crate::store::KeyValueStore;
use crate::tracking::Operation;

/// Qualified name under which `Cache::store` calls are tracked.
pub const STORE_OPERATION: &str = "Cache.store";

// == Cache ==
/// Value cache over a shared store.
///
/// Keys are random UUIDs, never derived from content. Values are stored
/// untagged, so the reader decides how to decode them.
#[derive(Debug)]
pub struct Cache<S> {
    store: Arc<S>,
}

impl<S> Clone for Cache<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: KeyValueStore> Cache<S> {
    // == Constructor ==
    /// Creates a cache over `store`, flushing it so the namespace starts empty.
    pub async fn new(store: Arc<S>) -> Result<Self> {
        store.flush_all().await?;
        info!("Cache initialized on a flushed store");
        Ok(Self { store })
    }

    /// The shared store handle.
    pub fn store_handle(&self) -> &Arc<S> {
        &self.store
    }

    // == Store ==
    /// Writes `value` under a freshly generated key and returns the key.
    pub async fn store(&self, value: impl Into<Value>) -> Result<String> {
        let key = Uuid::new_v4().to_string();
        let value = value.into();
        debug!("Storing {:?} under {}", value, key);

        self.store.set(&key, value.into_bytes()).await?;
        Ok(key)
    }

    // == Get ==
    /// Returns the raw bytes under `key`, or None if absent.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.store.get(key).await
    }

    /// Returns the value under `key` passed through `decode`, or None if absent.
    ///
    /// `decode` runs only when the key is present.
    pub async fn get_with<T, F>(&self, key: &str, decode: F) -> Result<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> Result<T>,
    {
        self.store.get(key).await?.map(decode).transpose()
    }

    /// UTF-8 string under `key`.
    pub async fn get_str(&self, key: &str) -> Result<Option<String>> {
        self.get_with(key, decode_str).await
    }

    /// Base-10 integer under `key`.
    pub async fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.get_with(key, decode_int).await
    }

    /// Floating-point number under `key`.
    pub async fn get_float(&self, key: &str) -> Result<Option<f64>> {
        self.get_with(key, decode_float).await
    }

    /// `store` as an [`Operation`] named [`STORE_OPERATION`], ready to wrap in a `CallTracker`.
    pub fn store_operation(&self) -> StoreOperation<S> {
        StoreOperation {
            cache: self.clone(),
        }
    }
}

// == Decoders ==
pub fn decode_str(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| CacheError::Conversion(format!("Value is not valid UTF-8: {}", e)))
}

pub fn decode_int(bytes: Vec<u8>) -> Result<i64> {
    let text = decode_str(bytes)?;
    text.trim()
        .parse()
        .map_err(|_| CacheError::Conversion(format!("Value '{}' is not an integer", text)))
}

pub fn decode_float(bytes: Vec<u8>) -> Result<f64> {
    let text = decode_str(bytes)?;
    text.trim()
        .parse()
        .map_err(|_| CacheError::Conversion(format!("Value '{}' is not a number", text)))
}

// == Store Operation ==
/// [`Cache::store`] exposed as a trackable operation.
#[derive(Debug)]
pub struct StoreOperation<S> {
    cache: Cache<S>,
}

#[async_trait]
impl<S: KeyValueStore> Operation for StoreOperation<S> {
    type Args = (Value,);
    type Output = String;

    fn qualified_name(&self) -> &str {
        STORE_OPERATION
    }

    async fn invoke(&self, args: (Value,)) -> Result<String> {
        self.cache.store(args.0).await
    }
}
