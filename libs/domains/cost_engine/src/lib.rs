//! Deterministic cost computation (C8): multiplies matched usage by matched
//! pricing per resource, aggregates by service and region, and produces the
//! Final Cost Model's determinism hash. Pure logic, no I/O — `apps/cost-pipeline-api`
//! mounts it behind `POST /aggregate`.

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod models;
pub mod units;

pub use engine::CostEngine;
pub use handlers::ApiDoc;
pub use error::{EngineError, EngineResult};
pub use models::{AggregateRequest, AggregateResponse, PriceRecordInput};
