//! TTL key/value cache abstraction: a process-wide LRU, an external
//! Redis-backed store, and a tiered composite of the two.

mod error;
mod key;
mod memory;
mod metrics;
mod redis;
mod tiered;

use async_trait::async_trait;

pub use error::CacheError;
pub use key::CacheKeyBuilder;
pub use memory::InMemoryCache;
pub use metrics::CacheMetrics;
pub use redis::RedisCache;
pub use tiered::TieredCache;

/// Standard ttl, per the cache policy: regions/AZs cache for 24h.
pub const TTL_REGIONS_SECONDS: u64 = 24 * 60 * 60;
/// instance-type/image metadata and per-resource lookups cache for 1h.
pub const TTL_METADATA_SECONDS: u64 = 60 * 60;
/// provider pricing catalog documents cache for 24h.
pub const TTL_CATALOG_SECONDS: u64 = 24 * 60 * 60;

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;
    fn hit_rate(&self) -> f64;
}
