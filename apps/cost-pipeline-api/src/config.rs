//! Configuration for the cost-pipeline-api gateway.

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
    /// Metadata resolver adapters annotate every synthesized resource with
    /// the account that owns it; this system has no multi-account model, so
    /// one account id covers the whole deployment.
    pub account_id: String,
    pub usage_profile_dir: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let redis = RedisConfig::from_env()?;
        let account_id =
            std::env::var("ACCOUNT_ID").unwrap_or_else(|_| "default-account".to_string());
        let usage_profile_dir =
            std::env::var("USAGE_PROFILE_DIR").unwrap_or_else(|_| "./usage-profiles".to_string());

        Ok(Self {
            app: app_info!(),
            database,
            redis,
            server,
            environment,
            account_id,
            usage_profile_dir,
        })
    }
}
