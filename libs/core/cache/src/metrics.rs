use std::sync::atomic::{AtomicU64, Ordering};

/// Hit/miss counters for one cache instance, plus a push to the
/// process-wide `cache_hit_ratio{cache}` gauge on every observation so the
/// ratio is visible without a separate scrape-time computation.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    name: &'static str,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheMetrics {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("catalog_fetch_total", "result" => "hit", "cache" => self.name)
            .increment(1);
        self.publish_ratio();
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("catalog_fetch_total", "result" => "miss", "cache" => self.name)
            .increment(1);
        self.publish_ratio();
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            return 0.0;
        }
        hits as f64 / total as f64
    }

    fn publish_ratio(&self) {
        metrics::gauge!("cache_hit_ratio", "cache" => self.name).set(self.hit_rate());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_is_zero_with_no_observations() {
        let metrics = CacheMetrics::new("test");
        assert_eq!(metrics.hit_rate(), 0.0);
    }

    #[test]
    fn hit_rate_reflects_ratio_of_hits_to_total() {
        let metrics = CacheMetrics::new("test");
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();
        assert!((metrics.hit_rate() - (2.0 / 3.0)).abs() < f64::EPSILON);
    }
}
