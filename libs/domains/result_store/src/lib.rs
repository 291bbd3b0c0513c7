//! Result Store Domain (C10)
//!
//! Write-once persistence for a job's Final Cost Model: `create` checks for
//! a duplicate `job_id` and never overwrites; `update`/`delete` do not exist
//! as trait methods at all, so there is nothing for `apps/cost-pipeline-api`
//! to call for those verbs. Also owns the append-only audit log and the
//! policy gate evaluation used by the comparison/governance interface.

pub mod audit;
pub mod entity;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod postgres;
pub mod repository;

pub use entity::audit_log::NewAuditLogEntry;
pub use entity::cost_results::NewCostResult;
pub use error::{StoreError, StoreResult};
pub use gate::{evaluate as evaluate_gate, GatePolicy};
pub use handlers::{ApiDoc, ResultStoreState, StoreRequest};
pub use postgres::{PgAuditRepository, PgResultRepository};
pub use repository::{AuditRepository, ResultRepository};
