//! Shared application state for the cost-pipeline-api gateway.
//!
//! Cheap-to-clone handles only: database pool, redis manager, and the
//! in-memory usage-profile catalog loaded once at startup. Per-domain
//! routers in `api/` build their own repository/service instances from
//! these handles, mirroring how the rest of this workspace wires domains.

use std::sync::Arc;

use domain_usage_modeler::ProfileStore;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: database::postgres::DatabaseConnection,
    pub redis: database::redis::ConnectionManager,
    pub usage_profiles: Arc<ProfileStore>,
}
