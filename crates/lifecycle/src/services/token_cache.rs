//! Expiring key/value cache for provider tokens.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Source of the current time for expiry checks.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    start: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner) += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared cache used to keep provider tokens between requests.
pub trait TokenCache: Send + Sync {
    /// Returns the value stored under `key` unless it has expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key` for `ttl`.
    fn set(&self, key: &str, value: String, ttl: Duration);

    /// Drops the value stored under `key`.
    fn invalidate(&self, key: &str);
}

#[derive(Debug)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Process-local token cache.
#[derive(Clone)]
pub struct InMemoryTokenCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTokenCache {
    /// Creates an empty cache driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates an empty cache driven by `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock: Arc::new(clock),
        }
    }
}

impl Default for InMemoryTokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryTokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTokenCache")
            .field("entries", &self.entries.read().unwrap_or_else(PoisonError::into_inner).len())
            .finish_non_exhaustive()
    }
}

impl TokenCache for InMemoryTokenCache {
    fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    fn invalidate(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_visible_until_ttl_elapses() {
        let clock = ManualClock::new();
        let cache = InMemoryTokenCache::with_clock(clock.clone());

        cache.set("token", "abc".to_string(), Duration::from_secs(300));
        assert_eq!(cache.get("token").as_deref(), Some("abc"));

        clock.advance(Duration::from_secs(299));
        assert_eq!(cache.get("token").as_deref(), Some("abc"));

        clock.advance(Duration::from_secs(1));
        assert!(cache.get("token").is_none());
    }

    #[test]
    fn test_set_overwrites_and_invalidate_removes() {
        let cache = InMemoryTokenCache::new();
        cache.set("token", "old".to_string(), Duration::from_secs(60));
        cache.set("token", "new".to_string(), Duration::from_secs(60));
        assert_eq!(cache.get("token").as_deref(), Some("new"));

        cache.invalidate("token");
        assert!(cache.get("token").is_none());
    }

    #[test]
    fn test_missing_key() {
        let cache = InMemoryTokenCache::new();
        assert!(cache.get("nothing").is_none());
    }
}
