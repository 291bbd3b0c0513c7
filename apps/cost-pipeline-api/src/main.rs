//! Cost Pipeline API - Entry Point
//!
//! Internal gateway fronting the stateless stage services (plan interpreter,
//! metadata resolver, pricing resolver, usage modeler, cost engine) and the
//! result store, mounted behind `apps/orchestrator`'s `StagePipeline` calls.

mod api;
mod config;
mod describe_client;
mod router;
mod state;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_usage_modeler::ProfileStore;
use tracing::{info, warn};

use config::Config;
use state::AppState;

#[derive(utoipa::OpenApi)]
#[openapi(nest(
    (path = "/", api = domain_plan_interpreter::handlers::ApiDoc),
    (path = "/", api = domain_metadata_resolver::handlers::ApiDoc),
    (path = "/", api = domain_pricing_resolver::handlers::ApiDoc),
    (path = "/", api = domain_usage_modeler::handlers::ApiDoc),
    (path = "/", api = domain_cost_engine::handlers::ApiDoc),
    (path = "/results", api = domain_result_store::handlers::ApiDoc),
))]
struct ApiDoc;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    observability::init_metrics();

    info!(name = %config.app.name, version = %config.app.version, "starting cost-pipeline-api");

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("database connection failed: {e}"))?;
    let redis = database::redis::connect_from_config_with_retry(config.redis.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("redis connection failed: {e}"))?;

    let mut usage_profiles = ProfileStore::new();
    let profile_dir = Path::new(&config.usage_profile_dir);
    if profile_dir.exists() {
        usage_profiles.load_dir(profile_dir)?;
    } else {
        warn!(dir = %config.usage_profile_dir, "usage profile directory missing, starting empty");
    }

    let state = AppState {
        config: config.clone(),
        db,
        redis,
        usage_profiles: Arc::new(usage_profiles),
    };

    let api_routes = router::build(&state);
    let router: Router = axum_helpers::server::create_router::<ApiDoc>(api_routes)
        .await?
        .merge(axum_helpers::server::health_router(config.app.clone()));

    axum_helpers::server::create_production_app(
        router,
        &config.server,
        Duration::from_secs(30),
        async {},
    )
    .await?;

    Ok(())
}
