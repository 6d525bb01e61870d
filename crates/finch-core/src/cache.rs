//! Read-through result cache
//!
//! The engine caches serialized decision payloads keyed by
//! `(operation, user_id, params)` for a fixed TTL. The cache is an explicit
//! collaborator injected into the engine rather than a global, and time is
//! abstracted behind a `Clock` so tests can drive expiry deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Time source for TTL bookkeeping
pub trait Clock: Send + Sync {
    /// Monotonic milliseconds since an arbitrary epoch
    fn now_millis(&self) -> u64;
}

/// Wall-clock backed time source
#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Manually advanced time source for tests
#[derive(Default)]
pub struct ManualClock {
    millis: Mutex<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, delta: Duration) {
        let mut millis = self.millis.lock().unwrap();
        *millis += delta.as_millis() as u64;
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        *self.millis.lock().unwrap()
    }
}

/// Cache collaborator interface
pub trait DecisionCache: Send + Sync {
    /// Fetch a non-expired entry
    fn get(&self, key: &str) -> Option<String>;

    /// Store an entry under the cache's TTL
    fn set(&self, key: &str, value: String);

    /// Drop all entries whose key starts with `prefix` (e.g. everything
    /// for one user after a data refresh)
    fn delete_by_prefix(&self, prefix: &str);
}

struct Entry {
    value: String,
    expires_at_millis: u64,
}

/// In-memory TTL cache
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }
}

impl DecisionCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.expires_at_millis > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: String) {
        let expires_at_millis = self.clock.now_millis() + self.ttl.as_millis() as u64;
        self.entries.lock().unwrap().insert(
            key.to_string(),
            Entry {
                value,
                expires_at_millis,
            },
        );
    }

    fn delete_by_prefix(&self, prefix: &str) {
        self.entries
            .lock()
            .unwrap()
            .retain(|key, _| !key.starts_with(prefix));
    }
}

/// Cache that stores nothing; every call recomputes
#[derive(Default)]
pub struct NoopCache;

impl DecisionCache for NoopCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: String) {}

    fn delete_by_prefix(&self, _prefix: &str) {}
}

/// Cache key for an engine operation
pub fn cache_key(operation: &str, user_id: &str, params: &str) -> String {
    format!("{}:{}:{}", operation, user_id, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_expire_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::with_clock(Duration::from_secs(60), clock.clone());

        cache.set("persona:u1:", "payload".to_string());
        assert_eq!(cache.get("persona:u1:").as_deref(), Some("payload"));

        clock.advance(Duration::from_secs(59));
        assert!(cache.get("persona:u1:").is_some());

        clock.advance(Duration::from_secs(2));
        assert!(cache.get("persona:u1:").is_none());
    }

    #[test]
    fn test_delete_by_prefix() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache.set("persona:u1:", "a".to_string());
        cache.set("recommendations:u1:3:5", "b".to_string());
        cache.set("persona:u2:", "c".to_string());

        cache.delete_by_prefix("persona:u1");
        assert!(cache.get("persona:u1:").is_none());
        assert!(cache.get("recommendations:u1:3:5").is_some());
        assert!(cache.get("persona:u2:").is_some());
    }

    #[test]
    fn test_noop_cache_never_hits() {
        let cache = NoopCache;
        cache.set("k", "v".to_string());
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(cache_key("persona", "u1", ""), "persona:u1:");
        assert_eq!(
            cache_key("recommendations", "u1", "3:5:3"),
            "recommendations:u1:3:5:3"
        );
    }
}
