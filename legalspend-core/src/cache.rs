//! In-process TTL cache wrapping async producers.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::SpendError;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Generic TTL key-value cache for expensive async operations.
///
/// Keys are deterministic canonical strings built from the logical
/// operation's arguments; callers needing manual invalidation must use the
/// same recipe. Entries are never returned past expiry and expired entries
/// are evicted lazily on the next lookup, not proactively swept. Producer
/// failures are never cached, so a transient upstream error does not pin an
/// empty result for a full TTL.
pub struct SpendCache<V> {
    default_ttl: Duration,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> SpendCache<V> {
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached value for `key` if present and unexpired.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(entry) if Instant::now() <= entry.expires_at => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    /// Return the cached value for `key`, or run `producer` and cache its
    /// successful result for `ttl` (defaulting to the configured TTL).
    ///
    /// The lock is not held across the producer, so concurrent misses on the
    /// same key may race the producer; last write wins, which is acceptable
    /// for idempotent fetches.
    ///
    /// # Errors
    /// Propagates the producer's error. Errors are not cached.
    pub async fn get_or_insert_with<F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        producer: F,
    ) -> Result<V, SpendError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, SpendError>>,
    {
        if let Some(hit) = self.get(key).await {
            return Ok(hit);
        }

        let value = producer().await?;
        let expires_at = Instant::now() + ttl.unwrap_or(self.default_ttl);
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.clone(),
                expires_at,
            },
        );
        Ok(value)
    }

    /// Remove entries whose key contains `pattern` as a substring, or every
    /// entry when no pattern is given.
    pub async fn invalidate(&self, pattern: Option<&str>) {
        let mut entries = self.entries.lock().await;
        match pattern {
            Some(needle) => entries.retain(|key, _| !key.contains(needle)),
            None => entries.clear(),
        }
    }

    /// Number of entries currently stored, including not-yet-evicted expired
    /// ones.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
