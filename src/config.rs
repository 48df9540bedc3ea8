//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::tracking::FailurePolicy;
use crate::web::DEFAULT_PAGE_TTL;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Seconds a fetched page stays cached
    pub page_ttl: u64,
    /// HTTP client timeout in seconds for page fetches
    pub fetch_timeout: u64,
    /// What call tracking records when `Cache.store` fails
    pub failure_policy: FailurePolicy,
    /// Run tracked calls one at a time
    pub serialize_calls: bool,
    /// Share one in-flight fetch between concurrent misses on a URL
    pub single_flight: bool,
}

/// Reads and parses `name`, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `PAGE_TTL` - Page cache TTL in seconds (default: 10)
    /// - `FETCH_TIMEOUT` - Page fetch timeout in seconds (default: 30)
    /// - `FAILURE_POLICY` - `record_error`, `skip_output` or `success_only` (default: record_error)
    /// - `SERIALIZE_CALLS` - `true`/`false` (default: false)
    /// - `SINGLE_FLIGHT` - `true`/`false` (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            page_ttl: env_or("PAGE_TTL", defaults.page_ttl),
            fetch_timeout: env_or("FETCH_TIMEOUT", defaults.fetch_timeout),
            failure_policy: env_or("FAILURE_POLICY", defaults.failure_policy),
            serialize_calls: env_or("SERIALIZE_CALLS", defaults.serialize_calls),
            single_flight: env_or("SINGLE_FLIGHT", defaults.single_flight),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 1,
            page_ttl: DEFAULT_PAGE_TTL,
            fetch_timeout: 30,
            failure_policy: FailurePolicy::RecordError,
            serialize_calls: false,
            single_flight: false,
        }
    }
}
