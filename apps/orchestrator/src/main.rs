//! Orchestrator Service - Entry Point
//!
//! Hosts the durable job state machine (spec component C9) behind the
//! `/jobs`, `/jobs/{id}`, `/jobs/{id}/advance` external API of spec §6, and
//! runs a background poller that drives non-terminal jobs forward on its
//! own cadence so a client never has to call `advance` itself.

mod config;
mod pipeline;
mod poller;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_orchestrator::{Orchestrator, PgJobRepository, PgStageExecutionRepository};
use tracing::info;

use config::Config;
use pipeline::HttpStagePipeline;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    observability::init_metrics();

    info!(name = %config.app.name, version = %config.app.version, "starting orchestrator");

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("database connection failed: {e}"))?;
    let redis = database::redis::connect_from_config_with_retry(config.redis.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("redis connection failed: {e}"))?;

    let jobs = Arc::new(PgJobRepository::new(db.clone()));
    let stages = Arc::new(PgStageExecutionRepository::new(db));
    let stage_pipeline = Arc::new(HttpStagePipeline::new(
        config.plan_executor_url.clone(),
        config.cost_pipeline_api_url.clone(),
        config.uploads_root.clone(),
        redis.clone(),
    ));
    let orchestrator = Arc::new(Orchestrator::new(jobs, stages, stage_pipeline, redis));

    tokio::spawn(poller::run(
        orchestrator.clone(),
        config.poll_batch_size,
        Duration::from_secs(config.poll_interval_seconds),
    ));

    let api_routes = domain_orchestrator::handlers::router(orchestrator);
    let router: Router = axum_helpers::server::create_router::<domain_orchestrator::ApiDoc>(api_routes)
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
