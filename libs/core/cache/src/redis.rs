use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::error::CacheError;
use crate::metrics::CacheMetrics;
use crate::Cache;

/// External key/value store backend, with per-entry TTL via `SET ... EX`.
pub struct RedisCache {
    manager: ConnectionManager,
    metrics: CacheMetrics,
}

impl RedisCache {
    pub fn new(name: &'static str, manager: ConnectionManager) -> Self {
        Self {
            manager,
            metrics: CacheMetrics::new(name),
        }
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.manager.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        match &value {
            Some(_) => self.metrics.record_hit(),
            None => self.metrics.record_miss(),
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        if ttl_seconds == 0 {
            let _: () = conn.set(key, value).await?;
        } else {
            let _: () = conn.set_ex(key, value, ttl_seconds).await?;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.manager.clone();
        let present: bool = conn.exists(key).await?;
        Ok(present)
    }

    fn hit_rate(&self) -> f64 {
        self.metrics.hit_rate()
    }
}
