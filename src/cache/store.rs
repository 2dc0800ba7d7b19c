//! Expiring key-value store with lazy, read-time eviction.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

/// A cached value together with its absolute expiry time.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached response payload.
    value: Value,
    /// When the entry stops being served.
    expires_at: Instant,
}

/// An in-memory map from opaque string keys to JSON values with expiry.
///
/// Expired entries are only removed when read: there is no background
/// sweep, so memory for keys that are never read again is reclaimed only
/// by an explicit [`clear`](ExpiringCache::clear) or a post-expiry `get`.
/// A key whose entry has expired is indistinguishable from one that was
/// never cached.
#[derive(Debug, Default)]
pub struct ExpiringCache {
    entries: HashMap<String, CacheEntry>,
}

impl ExpiringCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, expiring `ttl` from now.
    ///
    /// Any existing entry for `key` is replaced unconditionally. The map is
    /// unbounded; callers control growth through their key space.
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key.into(), entry);
    }

    /// Returns the live value for `key`, if any.
    ///
    /// An entry whose expiry has been reached is removed and `None` is
    /// returned, the same as for a key that was never stored.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let entry = self.entries.get(key)?;
        if Instant::now() >= entry.expires_at {
            self.entries.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Removes the entry for `key`. No-op when absent.
    pub fn clear(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Number of entries currently stored, including any not yet observed
    /// as expired.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    #[test]
    fn test_get_after_set_returns_value() {
        let mut cache = ExpiringCache::new();
        cache.set("profile_alice", json!({"id": "1"}), Duration::from_secs(60));

        assert_eq!(cache.get("profile_alice"), Some(json!({"id": "1"})));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_on_absent_key_returns_none() {
        let mut cache = ExpiringCache::new();

        assert!(cache.get("missing").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entry_is_removed_on_read() {
        let mut cache = ExpiringCache::new();
        cache.set("short", json!(42), Duration::from_millis(10));

        thread::sleep(Duration::from_millis(20));

        assert!(cache.get("short").is_none());
        // The expired read must purge the entry from internal storage
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_entry_survives_until_ttl_elapses() {
        let mut cache = ExpiringCache::new();
        cache.set("k", json!("v"), Duration::from_secs(60));

        thread::sleep(Duration::from_millis(10));

        assert_eq!(cache.get("k"), Some(json!("v")));
    }

    #[test]
    fn test_clear_removes_entry() {
        let mut cache = ExpiringCache::new();
        cache.set("k", json!(true), Duration::from_secs(60));

        cache.clear("k");

        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_on_absent_key_is_noop() {
        let mut cache = ExpiringCache::new();
        cache.clear("never_set");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_overwrites_existing_entry() {
        let mut cache = ExpiringCache::new();
        cache.set("k", json!("first"), Duration::from_secs(60));
        cache.set("k", json!("second"), Duration::from_secs(60));

        assert_eq!(cache.get("k"), Some(json!("second")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_unread_expired_entry_stays_in_storage() {
        let mut cache = ExpiringCache::new();
        cache.set("stale", json!(1), Duration::from_millis(5));

        thread::sleep(Duration::from_millis(15));

        // No sweep runs in the background; the entry lingers until read
        assert_eq!(cache.len(), 1);
        assert!(cache.get("stale").is_none());
        assert_eq!(cache.len(), 0);
    }
}
