//! Orchestrates region normalization, catalog fetch, and attribute
//! matching into the `POST /lookup` contract of spec §6.

use std::str::FromStr;
use std::sync::Arc;

use core_cache::Cache;
use domain_pricing::models::{CloudProvider, ResourceType};
use domain_pricing::repository::PricingRepository;
use tracing::instrument;

use crate::catalog::Catalog;
use crate::error::{ResolverError, ResolverResult};
use crate::matcher::match_candidates;
use crate::models::{LookupMetadata, LookupRequest, LookupResponse, NormalizedPrice};
use crate::region::normalize_region;

pub struct PricingResolver {
    catalog: Catalog,
}

impl PricingResolver {
    pub fn new(repository: Arc<dyn PricingRepository>, cache: Arc<dyn Cache>) -> Self {
        Self {
            catalog: Catalog::new(repository, cache),
        }
    }

    #[instrument(skip(self), fields(service = %request.service, region = %request.region))]
    pub async fn lookup(&self, request: LookupRequest) -> ResolverResult<LookupResponse> {
        let provider = CloudProvider::from_str(&request.service)
            .map_err(|_| ResolverError::UnsupportedService(request.service.clone()))?;
        let resource_type = ResourceType::from_str(&request.resource_type)
            .map_err(|_| ResolverError::UnsupportedService(request.resource_type.clone()))?;
        let normalized_region = normalize_region(&request.region)?;

        let candidates = self.catalog.candidates(provider, normalized_region, resource_type).await?;
        let cache_hit = candidates.is_some();
        let candidates = candidates.unwrap_or_default();
        if candidates.is_empty() {
            return Err(ResolverError::NoMatch(format!(
                "{} in {normalized_region}",
                request.resource_type
            )));
        }
        let candidates_considered = candidates.len();

        let outcome = match_candidates(candidates, &request.attributes);
        let prices = outcome
            .matched
            .into_iter()
            .map(|entry| NormalizedPrice {
                sku: entry.sku,
                unit: entry.pricing_unit.to_string(),
                unit_price: rust_decimal::Decimal::new(
                    entry.unit_price.amount,
                    entry.unit_price.decimal_places.max(0) as u32,
                ),
                currency: map_currency(entry.unit_price.currency),
                usage_type: entry.instance_type,
                effective_date: entry.effective_date,
            })
            .collect();

        Ok(LookupResponse {
            prices,
            confidence: outcome.confidence,
            metadata: LookupMetadata {
                normalized_region: normalized_region.to_string(),
                candidates_considered,
                cache_hit,
            },
        })
    }
}

fn map_currency(currency: domain_pricing::models::Currency) -> domain_cost_model::Currency {
    match currency {
        domain_pricing::models::Currency::Usd => domain_cost_model::Currency::Usd,
        domain_pricing::models::Currency::Eur => domain_cost_model::Currency::Eur,
        domain_pricing::models::Currency::Gbp => domain_cost_model::Currency::Gbp,
    }
}
