//! Plan Executor Service - Entry Point
//!
//! Hosts the sandboxed plan executor worker (spec component C3) behind the
//! internal `/execute`, `/status/{execution_id}`, `/result/{execution_id}`,
//! `/execution/{execution_id}` API of spec §6.

mod config;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_plan_executor::{AssumeRoleBroker, ExecutorError, PlanExecutor, SubprocessEnv};
use tracing::info;

use config::Config;

/// No AWS SDK dependency lives anywhere in this workspace (see DESIGN.md),
/// so assume-role resolution is a pluggable seam rather than a real STS
/// call: it hands back an environment carrying only the role name, which a
/// deployment wires a real broker closure in place of.
fn assume_role(role: &str, ttl_seconds: u64) -> Result<SubprocessEnv, ExecutorError> {
    let mut env = SubprocessEnv::empty();
    env.insert("ASSUMED_ROLE", role);
    env.insert("ASSUMED_ROLE_TTL_SECONDS", ttl_seconds.to_string());
    Ok(env)
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    observability::init_metrics();

    info!(name = %config.app.name, version = %config.app.version, "starting plan-executor");

    let broker = Arc::new(AssumeRoleBroker::new(assume_role));
    let executor = Arc::new(PlanExecutor::new(config.executor.clone(), broker));

    let api_routes = domain_plan_executor::handlers::router(executor);
    let router: Router = axum_helpers::server::create_router::<domain_plan_executor::ApiDoc>(api_routes)
        .await?
        .merge(axum_helpers::server::health_router(config.app.clone()))
        .layer(middleware::from_fn(observability::middleware::metrics_middleware));

    axum_helpers::server::create_production_app(
        router,
        &config.server,
        Duration::from_secs(30),
        async {},
    )
    .await?;

    Ok(())
}
