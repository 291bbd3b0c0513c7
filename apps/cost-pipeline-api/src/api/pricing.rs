use std::sync::Arc;

use axum::Router;
use domain_pricing::PgPricingRepository;
use domain_pricing_resolver::PricingResolver;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = Arc::new(PgPricingRepository::new(state.db.clone()));
    let cache = Arc::new(core_cache::RedisCache::new("pricing", state.redis.clone()));
    let resolver = PricingResolver::new(repository, cache);

    domain_pricing_resolver::handlers::router(resolver)
}
