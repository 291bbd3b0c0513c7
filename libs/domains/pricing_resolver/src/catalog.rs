//! Catalog fetch with a 24h positive cache, grounded on
//! `core_cache::{Cache, TTL_CATALOG_SECONDS}` for the cache contract and
//! `pricing-engine/app/lookup.py`'s service/region/attribute query shape for
//! what a "catalog document" actually holds (a service's full product list
//! for a region).
//!
//! A miss is cached too, at a much shorter TTL, so a hammering caller asking
//! about a resource type the catalog genuinely doesn't carry doesn't force a
//! full repository scan on every request — grounded on the same `lookup.py`
//! flow, which logs and returns `None` rather than re-querying on every call
//! within the same warm window.

use std::sync::Arc;

use core_cache::{Cache, CacheKeyBuilder, TTL_CATALOG_SECONDS};
use domain_pricing::models::{CloudProvider, PriceEntry, PriceFilter};
use domain_pricing::repository::PricingRepository;

use crate::error::{ResolverError, ResolverResult};

const TTL_NEGATIVE_SECONDS: u64 = 5 * 60;
const NEGATIVE_MARKER: &[u8] = b"__absent__";

pub struct Catalog {
    repository: Arc<dyn PricingRepository>,
    cache: Arc<dyn Cache>,
}

impl Catalog {
    pub fn new(repository: Arc<dyn PricingRepository>, cache: Arc<dyn Cache>) -> Self {
        Self { repository, cache }
    }

    /// Returns every price entry for `provider` in `normalized_region`
    /// matching `resource_type`, using the 24h catalog cache. `None` means
    /// a cached negative (the catalog has no entries for this selector).
    pub async fn candidates(
        &self,
        provider: CloudProvider,
        normalized_region: &str,
        resource_type: domain_pricing::models::ResourceType,
    ) -> ResolverResult<Option<Vec<PriceEntry>>> {
        let key = CacheKeyBuilder::new(
            "catalog",
            provider.to_string(),
            normalized_region,
            resource_type.to_string(),
            "all",
        )
        .build();

        if let Some(bytes) = self.cache.get(&key).await? {
            if bytes == NEGATIVE_MARKER {
                return Ok(None);
            }
            let entries: Vec<PriceEntry> = serde_json::from_slice(&bytes)
                .map_err(|e| ResolverError::Internal(format!("corrupt catalog cache entry: {e}")))?;
            return Ok(Some(entries));
        }

        let filter = PriceFilter {
            provider: Some(provider),
            resource_type: Some(resource_type),
            regions: Some(normalized_region.to_string()),
            limit: 10_000,
            ..Default::default()
        };
        let entries = self.repository.list(filter).await?;

        if entries.is_empty() {
            self.cache
                .set(&key, NEGATIVE_MARKER.to_vec(), TTL_NEGATIVE_SECONDS)
                .await?;
            return Ok(None);
        }

        let encoded = serde_json::to_vec(&entries)
            .map_err(|e| ResolverError::Internal(format!("failed to encode catalog cache entry: {e}")))?;
        self.cache.set(&key, encoded, TTL_CATALOG_SECONDS).await?;
        Ok(Some(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_cache::InMemoryCache;
    use domain_pricing::models::{CreatePriceEntry, Money, PricingUnit, ResourceType, UpdatePriceEntry};

    struct StubRepository {
        entries: Vec<PriceEntry>,
    }

    #[async_trait::async_trait]
    impl PricingRepository for StubRepository {
        async fn create(&self, _input: CreatePriceEntry) -> domain_pricing::error::PricingResult<PriceEntry> {
            unimplemented!()
        }
        async fn create_many(
            &self,
            _inputs: Vec<CreatePriceEntry>,
        ) -> domain_pricing::error::PricingResult<Vec<PriceEntry>> {
            unimplemented!()
        }
        async fn get_by_id(&self, _id: uuid::Uuid) -> domain_pricing::error::PricingResult<Option<PriceEntry>> {
            unimplemented!()
        }
        async fn get_by_sku(
            &self,
            _sku: &str,
            _provider: CloudProvider,
            _region: &str,
        ) -> domain_pricing::error::PricingResult<Option<PriceEntry>> {
            unimplemented!()
        }
        async fn list(&self, _filter: PriceFilter) -> domain_pricing::error::PricingResult<Vec<PriceEntry>> {
            Ok(self.entries.clone())
        }
        async fn update(
            &self,
            _id: uuid::Uuid,
            _input: UpdatePriceEntry,
        ) -> domain_pricing::error::PricingResult<PriceEntry> {
            unimplemented!()
        }
        async fn delete(&self, _id: uuid::Uuid) -> domain_pricing::error::PricingResult<bool> {
            unimplemented!()
        }
        async fn upsert(&self, _input: CreatePriceEntry) -> domain_pricing::error::PricingResult<PriceEntry> {
            unimplemented!()
        }
        async fn count(&self) -> domain_pricing::error::PricingResult<usize> {
            unimplemented!()
        }
        async fn count_by_provider(&self, _provider: CloudProvider) -> domain_pricing::error::PricingResult<usize> {
            unimplemented!()
        }
        async fn get_regions_for_provider(
            &self,
            _provider: CloudProvider,
        ) -> domain_pricing::error::PricingResult<Vec<String>> {
            unimplemented!()
        }
        async fn delete_expired(&self) -> domain_pricing::error::PricingResult<usize> {
            unimplemented!()
        }
    }

    fn sample_entry() -> PriceEntry {
        PriceEntry {
            id: uuid::Uuid::now_v7(),
            provider: CloudProvider::Aws,
            resource_type: ResourceType::Compute,
            sku: "ABC123".to_string(),
            service_name: "Amazon EC2".to_string(),
            product_family: "Compute Instance".to_string(),
            instance_type: Some("t3.micro".to_string()),
            region: "US East (N. Virginia)".to_string(),
            unit_price: Money::new(150, domain_pricing::models::Currency::Usd),
            pricing_unit: PricingUnit::Hour,
            description: "t3.micro on-demand".to_string(),
            attributes: Default::default(),
            effective_date: chrono::Utc::now(),
            expiration_date: None,
            collected_at: chrono::Utc::now(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn caches_positive_lookup() {
        let repo = Arc::new(StubRepository {
            entries: vec![sample_entry()],
        });
        let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new("test", 100));
        let catalog = Catalog::new(repo, cache);

        let first = catalog
            .candidates(CloudProvider::Aws, "US East (N. Virginia)", ResourceType::Compute)
            .await
            .unwrap();
        assert_eq!(first.unwrap().len(), 1);

        let second = catalog
            .candidates(CloudProvider::Aws, "US East (N. Virginia)", ResourceType::Compute)
            .await
            .unwrap();
        assert_eq!(second.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn caches_negative_lookup() {
        let repo = Arc::new(StubRepository { entries: vec![] });
        let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new("test", 100));
        let catalog = Catalog::new(repo, cache);

        let result = catalog
            .candidates(CloudProvider::Aws, "US East (N. Virginia)", ResourceType::Compute)
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
