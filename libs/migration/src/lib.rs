pub use sea_orm_migration::prelude::*;

mod m20241128_000000_bootstrap;
mod m20260110_000000_create_jobs;
mod m20260111_000000_create_cloud_prices;
mod m20260112_000000_create_cost_results;
mod m20260113_000000_create_audit_log;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241128_000000_bootstrap::Migration),
            Box::new(m20260110_000000_create_jobs::Migration),
            Box::new(m20260111_000000_create_cloud_prices::Migration),
            Box::new(m20260112_000000_create_cost_results::Migration),
            Box::new(m20260113_000000_create_audit_log::Migration),
        ]
    }
}
