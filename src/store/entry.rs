//! Store Entry Module
//!
//! Defines the structure for individual store entries with TTL support.

// == Store Data ==
/// Payload held under a key: a plain byte value or an append-only list.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreData {
    /// Raw bytes written by `set`, also used for counters
    Bytes(Vec<u8>),
    /// Ordered list written by `append`
    List(Vec<String>),
}

impl StoreData {
    /// Type name used in wrong-type errors.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreData::Bytes(_) => "bytes",
            StoreData::List(_) => "list",
        }
    }
}

// == Store Entry ==
/// Represents a single store entry with payload and metadata.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored payload
    pub data: StoreData,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates a new store entry with optional TTL.
    ///
    /// # Arguments
    /// * `data` - The payload to store
    /// * `ttl_seconds` - Optional TTL in seconds
    pub fn new(data: StoreData, ttl_seconds: Option<u64>) -> Self {
        let now = current_timestamp_ms();

        Self {
            data,
            created_at: now,
            expires_at: ttl_seconds.map(|ttl| expiry_after(now, ttl)),
        }
    }

    // == Set Expiry ==
    /// Restarts the TTL window from now.
    pub fn set_expiry(&mut self, ttl_seconds: u64) {
        self.expires_at = Some(expiry_after(current_timestamp_ms(), ttl_seconds));
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches the expiration time,
    /// so a fully elapsed TTL never serves stale data.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// Expiration timestamp `ttl_seconds` after `now`, clamped to `u64::MAX`.
fn expiry_after(now: u64, ttl_seconds: u64) -> u64 {
    now.saturating_add(ttl_seconds.saturating_mul(1000))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn bytes(s: &str) -> StoreData {
        StoreData::Bytes(s.as_bytes().to_vec())
    }

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = StoreEntry::new(bytes("test_value"), None);

        assert_eq!(entry.data, bytes("test_value"));
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining_ms().is_none());
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = StoreEntry::new(bytes("test_value"), Some(10));

        assert!(!entry.is_expired());
        let remaining_ms = entry.ttl_remaining_ms().unwrap();
        assert!(remaining_ms <= 10_000);
        assert!(remaining_ms >= 9_000);
    }

    #[test]
    fn test_entry_expiration() {
        let entry = StoreEntry::new(bytes("test_value"), Some(1));

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining_ms().unwrap(), 0);
    }

    #[test]
    fn test_set_expiry_on_persistent_entry() {
        let mut entry = StoreEntry::new(StoreData::List(vec!["a".into()]), None);
        entry.set_expiry(5);

        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let entry = StoreEntry {
            data: bytes("test"),
            created_at: now,
            expires_at: Some(now),
        };

        assert!(entry.is_expired(), "Entry should be expired at boundary");
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let mut entry = StoreEntry::new(bytes("test"), Some(u64::MAX / 100));
        assert_eq!(entry.expires_at, Some(u64::MAX));
        assert!(!entry.is_expired());

        entry.set_expiry(u64::MAX);
        assert_eq!(entry.expires_at, Some(u64::MAX));
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_data_kind() {
        assert_eq!(bytes("x").kind(), "bytes");
        assert_eq!(StoreData::List(Vec::new()).kind(), "list");
    }
}
