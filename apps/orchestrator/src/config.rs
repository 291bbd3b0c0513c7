//! Configuration for the orchestrator service: database/redis connections
//! for the job and stage-execution repositories, the distributed lock, and
//! the base URLs of the downstream stage services it drives via HTTP.

use core_config::{app_info, server::ServerConfig, AppInfo, FromEnv};
use database::postgres::PostgresConfig;
use database::redis::RedisConfig;

pub use core_config::Environment;

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub redis: RedisConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub plan_executor_url: String,
    pub cost_pipeline_api_url: String,
    /// Stand-in for the out-of-scope upload gateway (spec §1): a local
    /// directory of already-staged IaC bundles, one subdirectory per
    /// `upload_reference`.
    pub uploads_root: String,
    pub poll_interval_seconds: u64,
    pub poll_batch_size: u64,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let redis = RedisConfig::from_env()?;

        let plan_executor_url = std::env::var("PLAN_EXECUTOR_URL")
            .unwrap_or_else(|_| "http://localhost:8081".to_string());
        let cost_pipeline_api_url = std::env::var("COST_PIPELINE_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let uploads_root =
            std::env::var("UPLOADS_ROOT").unwrap_or_else(|_| "./uploads".to_string());
        let poll_interval_seconds = std::env::var("ORCHESTRATOR_POLL_INTERVAL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);
        let poll_batch_size = std::env::var("ORCHESTRATOR_POLL_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50);

        Ok(Self {
            app: app_info!(),
            database,
            redis,
            server,
            environment,
            plan_executor_url,
            cost_pipeline_api_url,
            uploads_root,
            poll_interval_seconds,
            poll_batch_size,
        })
    }
}
