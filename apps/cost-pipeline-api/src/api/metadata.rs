use std::sync::Arc;

use axum::Router;
use domain_metadata_resolver::{
    ComputeAdapter, DatabaseAdapter, EnrichmentState, LoadBalancerAdapter, MetadataResolver,
};

use crate::describe_client::UnavailableDescribeClient;
use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let account = state.config.account_id.clone();
    let adapters: Vec<Box<dyn domain_metadata_resolver::ServiceAdapter>> = vec![
        Box::new(ComputeAdapter {
            region: "".to_string(),
            account: account.clone(),
        }),
        Box::new(DatabaseAdapter {
            account: account.clone(),
        }),
        Box::new(LoadBalancerAdapter { account }),
    ];

    let cache = core_cache::RedisCache::new("metadata", state.redis.clone());
    let enrichment = EnrichmentState {
        resolver: Arc::new(MetadataResolver::new(adapters)),
        describe_client: Arc::new(UnavailableDescribeClient),
        cache: Arc::new(cache),
    };

    domain_metadata_resolver::handlers::router(enrichment)
}
