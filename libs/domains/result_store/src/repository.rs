use async_trait::async_trait;
use domain_cost_model::{AuditAction, AuditLogEntry, ImmutableCostResult};
use uuid::Uuid;

use crate::entity::audit_log::NewAuditLogEntry;
use crate::entity::cost_results::NewCostResult;
use crate::error::StoreResult;

/// Persistence for cost results. There is deliberately no `update`/`delete`
/// method on this trait at all — results are write-once, so there is
/// nothing for the HTTP layer to call; `apps/cost-pipeline-api` returns 405
/// for those verbs without reaching this crate, grounded on
/// `results-governance-service/app/routers/results.py`'s explicit handlers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Fails with `StoreError::AlreadyExists` if a result for `input.job_id`
    /// already exists, checked before the insert.
    async fn create(&self, input: NewCostResult) -> StoreResult<ImmutableCostResult>;

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<ImmutableCostResult>>;

    async fn get_by_job_id(&self, job_id: Uuid) -> StoreResult<Option<ImmutableCostResult>>;

    /// Spec names this `list_by_project`; this system has no project entity
    /// to filter by, so it is a plain paginated listing ordered by
    /// `created_at` descending — see DESIGN.md.
    async fn list_by_project(&self, limit: u64, offset: u64) -> StoreResult<Vec<ImmutableCostResult>>;
}

/// Append-only audit trail over `create`/`compare`/`gate` actions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn log_action(&self, entry: NewAuditLogEntry) -> StoreResult<AuditLogEntry>;

    async fn query(
        &self,
        action: Option<AuditAction>,
        correlation_id: Option<Uuid>,
        limit: u64,
    ) -> StoreResult<Vec<AuditLogEntry>>;
}
