use async_trait::async_trait;
use domain_cost_model::{Job, JobState, StageExecution, StageName};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::jobs::{ActiveModel as JobActiveModel, Column as JobColumn, Entity as JobEntity};
use crate::entity::stage_executions::{
    ActiveModel as StageActiveModel, Column as StageColumn, Entity as StageEntity,
};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::models::{CloseStageExecution, CreateJobRow, JobTransition, OpenStageExecution};
use crate::repository::{JobRepository, StageExecutionRepository};

#[derive(Clone)]
pub struct PgJobRepository {
    db: DatabaseConnection,
}

impl PgJobRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn create(&self, input: CreateJobRow) -> OrchestratorResult<Job> {
        let model: JobActiveModel = input.into();
        let result = model.insert(&self.db).await?.into();
        Ok(result)
    }

    async fn get_by_id(&self, id: Uuid) -> OrchestratorResult<Option<Job>> {
        let result = JobEntity::find_by_id(id).one(&self.db).await?.map(Into::into);
        Ok(result)
    }

    async fn get_by_idempotency_key(&self, key: &str) -> OrchestratorResult<Option<Job>> {
        let result = JobEntity::find()
            .filter(JobColumn::IdempotencyKey.eq(key))
            .one(&self.db)
            .await?
            .map(Into::into);
        Ok(result)
    }

    async fn apply_transition(&self, id: Uuid, transition: JobTransition) -> OrchestratorResult<Job> {
        let existing = JobEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(OrchestratorError::NotFound(id))?;

        let mut model: JobActiveModel = existing.into();

        if let Some(current_state) = transition.current_state {
            model.current_state = Set(current_state);
        }
        if let Some(previous_state) = transition.previous_state {
            model.previous_state = Set(Some(previous_state));
        }
        if let Some(retry_count) = transition.retry_count {
            model.retry_count = Set(retry_count);
        }
        if let Some(error_message) = transition.error_message {
            model.error_message = Set(error_message);
        }
        if let Some(plan_reference) = transition.plan_reference {
            model.plan_reference = Set(plan_reference);
        }
        if let Some(result_reference) = transition.result_reference {
            model.result_reference = Set(result_reference);
        }
        if let Some(started_at) = transition.started_at {
            model.started_at = Set(Some(started_at.into()));
        }
        if let Some(completed_at) = transition.completed_at {
            model.completed_at = Set(Some(completed_at.into()));
        }

        let result = model.update(&self.db).await?.into();
        Ok(result)
    }

    async fn list_active(&self, limit: u64) -> OrchestratorResult<Vec<Job>> {
        let results = JobEntity::find()
            .filter(
                JobColumn::CurrentState
                    .ne(JobState::Completed)
                    .and(JobColumn::CurrentState.ne(JobState::Failed)),
            )
            .order_by_asc(JobColumn::UpdatedAt)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok(results)
    }
}

#[derive(Clone)]
pub struct PgStageExecutionRepository {
    db: DatabaseConnection,
}

impl PgStageExecutionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StageExecutionRepository for PgStageExecutionRepository {
    async fn open(&self, input: OpenStageExecution) -> OrchestratorResult<StageExecution> {
        let model: StageActiveModel = input.into();
        let result = model.insert(&self.db).await?.into();
        Ok(result)
    }

    async fn close(&self, id: Uuid, close: CloseStageExecution) -> OrchestratorResult<StageExecution> {
        use domain_cost_model::StageStatus;

        let existing = StageEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| OrchestratorError::Internal(format!("stage execution {id} not found")))?;

        let mut model: StageActiveModel = existing.into();
        model.status = Set(if close.success {
            StageStatus::Success
        } else {
            StageStatus::Failed
        });
        model.output_digest = Set(close.output_digest);
        model.error_message = Set(close.error_message);
        model.duration_ms = Set(Some(close.duration_ms));
        model.completed_at = Set(Some(chrono::Utc::now().into()));

        let result = model.update(&self.db).await?.into();
        Ok(result)
    }

    async fn latest_for_stage(
        &self,
        job_id: Uuid,
        stage_name: StageName,
    ) -> OrchestratorResult<Option<StageExecution>> {
        let result = StageEntity::find()
            .filter(StageColumn::JobId.eq(job_id))
            .filter(StageColumn::StageName.eq(stage_name))
            .order_by_desc(StageColumn::AttemptNumber)
            .one(&self.db)
            .await?
            .map(Into::into);
        Ok(result)
    }
}
