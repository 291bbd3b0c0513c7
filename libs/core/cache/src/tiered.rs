use async_trait::async_trait;
use tracing::warn;

use crate::error::CacheError;
use crate::memory::InMemoryCache;
use crate::redis::RedisCache;
use crate::Cache;

/// External-store-primary, in-memory-fallback composite.
///
/// On an external (Redis) failure the fallback must continue to serve the
/// caller rather than propagating the error — but it must never answer
/// with a value that could be stale relative to what Redis would have
/// returned. So a Redis error degrades a read to an explicit absence
/// (a miss) instead of consulting the local LRU's possibly-outdated copy;
/// the caller is left to treat it like any other cache miss and fall back
/// to its own source of truth. Writes still go to both tiers so the LRU
/// stays warm for use as a standalone cache if Redis is ever removed.
pub struct TieredCache {
    primary: RedisCache,
    fallback: InMemoryCache,
}

impl TieredCache {
    pub fn new(primary: RedisCache, fallback: InMemoryCache) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl Cache for TieredCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match self.primary.get(key).await {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(error = %err, key, "redis cache unavailable, degrading to absence");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<(), CacheError> {
        if let Err(err) = self.primary.set(key, value.clone(), ttl_seconds).await {
            warn!(error = %err, key, "redis cache unavailable, writing through to fallback only");
        }
        self.fallback.set(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        if let Err(err) = self.primary.delete(key).await {
            warn!(error = %err, key, "redis cache unavailable, deleting from fallback only");
        }
        self.fallback.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        match self.primary.exists(key).await {
            Ok(present) => Ok(present),
            Err(err) => {
                warn!(error = %err, key, "redis cache unavailable, degrading to absence");
                Ok(false)
            }
        }
    }

    fn hit_rate(&self) -> f64 {
        self.primary.hit_rate()
    }
}
