//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::store::StoreStats;
use crate::tracking::Replay;

/// Response body for the STORE operation (PUT /store)
#[derive(Debug, Clone, Serialize)]
pub struct StoreResponse {
    /// The generated key
    pub key: String,
}

impl StoreResponse {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The decoded value
    pub value: serde_json::Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for the replay endpoint (GET /replay/:name)
#[derive(Debug, Clone, Serialize)]
pub struct ReplayResponse {
    pub name: String,
    /// Invocation counter
    pub calls: u64,
    /// Rendered calls, oldest first
    pub lines: Vec<String>,
}

impl From<&Replay> for ReplayResponse {
    fn from(replay: &Replay) -> Self {
        Self {
            name: replay.name.clone(),
            calls: replay.calls,
            lines: replay.lines(),
        }
    }
}

/// Response body for the page endpoint (GET /page)
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse {
    pub url: String,
    pub content: String,
    /// Accesses to this URL so far, including this one
    pub access_count: u64,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of reads that found a live value
    pub hits: u64,
    /// Number of reads that found nothing
    pub misses: u64,
    /// Number of keys removed by TTL expiry
    pub expired: u64,
    /// Current number of keys in the store
    pub total_keys: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<StoreStats> for StatsResponse {
    fn from(stats: StoreStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expired: stats.expired,
            total_keys: stats.total_keys,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::ReplayEntry;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("k", 42);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "k");
        assert_eq!(json["value"], 42);
    }

    #[test]
    fn test_replay_response_from_replay() {
        let replay = Replay {
            name: "Cache.store".to_string(),
            calls: 1,
            entries: vec![ReplayEntry {
                args: "('a',)".to_string(),
                result: "k1".to_string(),
            }],
        };

        let resp = ReplayResponse::from(&replay);
        assert_eq!(resp.calls, 1);
        assert_eq!(resp.lines, vec!["Cache.store(*('a',)) -> k1"]);
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = StoreStats {
            hits: 80,
            misses: 20,
            expired: 5,
            total_keys: 100,
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.expired, 5);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
