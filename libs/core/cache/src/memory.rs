use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache as RawLruCache;
use tokio::sync::Mutex;

use crate::error::CacheError;
use crate::metrics::CacheMetrics;
use crate::Cache;

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if now >= at)
    }
}

/// Process-wide LRU cache with monotonic-clock TTL expiry.
///
/// Expiry is checked lazily on read rather than via a background sweep: an
/// expired entry is evicted the next time it's looked up or displaced by
/// the LRU policy, whichever comes first.
pub struct InMemoryCache {
    entries: Mutex<RawLruCache<String, Entry>>,
    metrics: CacheMetrics,
}

impl InMemoryCache {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            entries: Mutex::new(RawLruCache::new(capacity)),
            metrics: CacheMetrics::new(name),
        }
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let hit = match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.pop(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        };
        match &hit {
            Some(_) => self.metrics.record_hit(),
            None => self.metrics.record_miss(),
        }
        Ok(hit)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<(), CacheError> {
        let expires_at = if ttl_seconds == 0 {
            None
        } else {
            Some(Instant::now() + Duration::from_secs(ttl_seconds))
        };
        let mut entries = self.entries.lock().await;
        entries.put(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        entries.pop(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let present = match entries.peek(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.pop(key);
                false
            }
            Some(_) => true,
            None => false,
        };
        Ok(present)
    }

    fn hit_rate(&self) -> f64 {
        self.metrics.hit_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = InMemoryCache::new("test", 10);
        cache.set("k", b"v".to_vec(), 60).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn missing_key_is_absence_not_error() {
        let cache = InMemoryCache::new("test", 10);
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn zero_ttl_never_expires() {
        let cache = InMemoryCache::new("test", 10);
        cache.set("k", b"v".to_vec(), 0).await.unwrap();
        assert!(cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_the_entry() {
        let cache = InMemoryCache::new("test", 10);
        cache.set("k", b"v".to_vec(), 60).await.unwrap();
        cache.delete("k").await.unwrap();
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn expired_entry_is_treated_as_absent() {
        let cache = InMemoryCache::new("test", 10);
        cache.set("k", b"v".to_vec(), 60).await.unwrap();
        {
            let mut entries = cache.entries.lock().await;
            let entry = entries.get_mut("k").unwrap();
            entry.expires_at = Some(Instant::now() - Duration::from_secs(1));
        }
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn hit_rate_tracks_observations() {
        let cache = InMemoryCache::new("test", 10);
        cache.set("k", b"v".to_vec(), 60).await.unwrap();
        cache.get("k").await.unwrap();
        cache.get("missing").await.unwrap();
        assert!((cache.hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}
