use async_trait::async_trait;
use domain_cost_model::{Job, StageExecution, StageName};
use uuid::Uuid;

use crate::error::OrchestratorResult;
use crate::models::{CloseStageExecution, CreateJobRow, JobTransition, OpenStageExecution};

/// Persistence for jobs. The repository is the single source of truth for
/// job state; all mutations funnel through it and are serialized per job by
/// `crate::lock`, not by this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, input: CreateJobRow) -> OrchestratorResult<Job>;

    async fn get_by_id(&self, id: Uuid) -> OrchestratorResult<Option<Job>>;

    async fn get_by_idempotency_key(&self, key: &str) -> OrchestratorResult<Option<Job>>;

    async fn apply_transition(&self, id: Uuid, transition: JobTransition)
        -> OrchestratorResult<Job>;

    /// Non-terminal jobs, oldest first, for the orchestrator's poller to
    /// drive forward. Not part of spec §6's external interface; an internal
    /// sweep query only.
    async fn list_active(&self, limit: u64) -> OrchestratorResult<Vec<Job>>;
}

/// Persistence for the append-only stage-execution history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StageExecutionRepository: Send + Sync {
    async fn open(&self, input: OpenStageExecution) -> OrchestratorResult<StageExecution>;

    async fn close(&self, id: Uuid, close: CloseStageExecution) -> OrchestratorResult<StageExecution>;

    /// Most recent attempt for `(job_id, stage_name)`, used to carry forward
    /// the previous failure's error message into a retry.
    async fn latest_for_stage(
        &self,
        job_id: Uuid,
        stage_name: StageName,
    ) -> OrchestratorResult<Option<StageExecution>>;
}
