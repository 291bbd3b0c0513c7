//! Configuration for the plan-executor service: the enumerated plan
//! executor config of spec §6 (`max_execution_time,
//! max_workspace_size_mb, allowed_providers[]`), plus server/app info.

use std::path::PathBuf;
use std::time::Duration;

use core_config::{app_info, server::ServerConfig, AppInfo, FromEnv};
use domain_plan_executor::ExecutorConfig;

pub use core_config::Environment;

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub executor: ExecutorConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;

        let workspace_root = std::env::var("PLAN_EXECUTOR_WORKSPACE_ROOT")
            .unwrap_or_else(|_| "/tmp/plan-executor-workspaces".to_string());
        let stage_timeout_seconds: u64 = std::env::var("PLAN_EXECUTOR_STAGE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);
        let max_execution_seconds: u64 = std::env::var("PLAN_EXECUTOR_MAX_EXECUTION_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(290);
        let max_workspace_size_mb: u64 = std::env::var("PLAN_EXECUTOR_MAX_WORKSPACE_SIZE_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(256);
        let allowed_providers = std::env::var("PLAN_EXECUTOR_ALLOWED_PROVIDERS")
            .unwrap_or_else(|_| "aws".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let executor = ExecutorConfig {
            workspace_root: PathBuf::from(workspace_root),
            stage_timeout: Duration::from_secs(stage_timeout_seconds),
            max_execution_time: Duration::from_secs(max_execution_seconds),
            max_workspace_size_bytes: max_workspace_size_mb * 1024 * 1024,
            allowed_providers,
        };

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            executor,
        })
    }
}
