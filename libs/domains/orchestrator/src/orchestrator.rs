//! Drives a job through `PLANNING -> PARSING -> ENRICHING -> COSTING ->
//! COMPLETED`, one stage per call to `advance`, each guarded by the
//! distributed lock and the per-stage timeout/retry policy in `crate::stage`.
//!
//! A `JobState` names the stage currently in progress (`StageName::as_job_state`
//! is the inverse of the mapping used here): the `UPLOADED -> PLANNING`
//! transition is a pickup with no stage body, and from then on
//! `current_state` tells `advance` which `StageName` to run next — running
//! it is what produces the following state.
//!
//! The concrete work each stage performs (invoking the plan executor,
//! interpreter, metadata resolver, pricing resolver/usage modeler/cost
//! engine) is injected as a `StagePipeline` implementation so this crate
//! stays free of HTTP-client concerns; `apps/orchestrator` wires the real
//! clients in.

use std::sync::Arc;

use async_trait::async_trait;
use domain_cost_model::{Job, JobState, PipelineError, StageName};
use redis::aio::ConnectionManager;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::lock::JobLock;
use crate::models::{CreateJobRow, JobTransition};
use crate::repository::{JobRepository, StageExecutionRepository};
use crate::stage::run_stage;

/// Lock TTL floor: at least as long as the longest stage timeout (PLANNING,
/// 300s), per §4.9 ("TTL >= longest stage timeout").
pub const LOCK_TTL_MS: u64 = 300_000;

/// The work a stage performs once the orchestrator has decided it's next.
/// Each method receives the job as it stood when the stage was entered and
/// returns the reference string the orchestrator should persist alongside
/// the transition (a plan/NRG/ERG/result reference, stage-dependent).
#[async_trait]
pub trait StagePipeline: Send + Sync {
    async fn plan(&self, job: &Job) -> Result<String, PipelineError>;
    async fn parse(&self, job: &Job) -> Result<String, PipelineError>;
    async fn enrich(&self, job: &Job) -> Result<String, PipelineError>;
    async fn cost(&self, job: &Job) -> Result<String, PipelineError>;
}

pub struct Orchestrator {
    jobs: Arc<dyn JobRepository>,
    stages: Arc<dyn StageExecutionRepository>,
    pipeline: Arc<dyn StagePipeline>,
    redis: ConnectionManager,
}

impl Orchestrator {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        stages: Arc<dyn StageExecutionRepository>,
        pipeline: Arc<dyn StagePipeline>,
        redis: ConnectionManager,
    ) -> Self {
        Self {
            jobs,
            stages,
            pipeline,
            redis,
        }
    }

    /// `create_job`. Idempotent on `idempotency_key`: a previously-seen key
    /// returns the pre-existing job untouched, no new row, no side effects.
    #[instrument(skip(self), fields(correlation_id))]
    pub async fn submit_job(
        &self,
        upload_reference: String,
        region: String,
        usage_profile: String,
        idempotency_key: Option<String>,
    ) -> OrchestratorResult<Job> {
        if let Some(key) = idempotency_key.as_deref() {
            if let Some(existing) = self.jobs.get_by_idempotency_key(key).await? {
                info!(job_id = %existing.id, "idempotent resubmit, returning existing job");
                return Ok(existing);
            }
        }

        let correlation_id = Uuid::now_v7();
        tracing::Span::current().record("correlation_id", correlation_id.to_string());

        let job = self
            .jobs
            .create(CreateJobRow {
                upload_reference,
                region,
                usage_profile,
                idempotency_key,
                correlation_id,
            })
            .await?;

        info!(job_id = %job.id, %correlation_id, "job submitted");
        Ok(job)
    }

    /// `get_job`. Read-only status lookup backing the status interface.
    pub async fn get_job(&self, job_id: Uuid) -> OrchestratorResult<Job> {
        self.jobs
            .get_by_id(job_id)
            .await?
            .ok_or(OrchestratorError::NotFound(job_id))
    }

    /// Non-terminal jobs for a poller to drive forward, oldest first.
    pub async fn list_active_jobs(&self, limit: u64) -> OrchestratorResult<Vec<Job>> {
        self.jobs.list_active(limit).await
    }

    /// Drives exactly one stage forward from the job's `current_state`. A
    /// job already in a terminal state is returned unchanged.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn advance(&self, job_id: Uuid) -> OrchestratorResult<Job> {
        let job = self.get_job(job_id).await?;
        if job.current_state.is_terminal() {
            return Ok(job);
        }

        let Some(next_state) = job.current_state.next_on_success() else {
            return Ok(job);
        };
        crate::state_machine::guard_transition(job.current_state, next_state)?;

        let Some(stage_name) = state_to_stage(job.current_state) else {
            // UPLOADED -> PLANNING is a pickup: no stage body runs yet.
            let updated = self
                .jobs
                .apply_transition(
                    job_id,
                    JobTransition {
                        current_state: Some(next_state),
                        previous_state: Some(job.current_state),
                        started_at: Some(chrono::Utc::now()),
                        ..Default::default()
                    },
                )
                .await?;
            return Ok(updated);
        };

        let lock = JobLock::acquire(self.redis.clone(), job_id, LOCK_TTL_MS).await?;

        let attempt_number = self
            .stages
            .latest_for_stage(job_id, stage_name)
            .await?
            .map(|s| s.attempt_number + 1)
            .unwrap_or(1);

        let input_digest = format!("{job_id}:{stage_name}:{attempt_number}");

        let pipeline = self.pipeline.clone();
        let job_for_stage = job.clone();
        let result = run_stage(
            self.stages.as_ref(),
            job_id,
            stage_name,
            attempt_number,
            input_digest,
            || {
                let pipeline = pipeline.clone();
                let job = job_for_stage.clone();
                async move { dispatch(pipeline.as_ref(), stage_name, &job).await }
            },
        )
        .await;

        let final_result = match result {
            Ok(outcome) => {
                let mut transition = JobTransition {
                    current_state: Some(next_state),
                    previous_state: Some(job.current_state),
                    ..Default::default()
                };
                apply_reference(&mut transition, stage_name, outcome.value);
                if next_state == JobState::Completed {
                    transition.completed_at = Some(chrono::Utc::now());
                }
                self.jobs.apply_transition(job_id, transition).await
            }
            Err(err) => {
                warn!(job_id = %job_id, %stage_name, error = %err, "stage failed");
                self.jobs
                    .apply_transition(
                        job_id,
                        JobTransition {
                            current_state: Some(JobState::Failed),
                            previous_state: Some(job.current_state),
                            error_message: Some(Some(err.to_string())),
                            completed_at: Some(chrono::Utc::now()),
                            ..Default::default()
                        },
                    )
                    .await?;
                Err(err)
            }
        };

        if let Err(release_err) = lock.release().await {
            warn!(job_id = %job_id, error = %release_err, "failed to release job lock");
        }

        final_result
    }
}

fn state_to_stage(state: JobState) -> Option<StageName> {
    match state {
        JobState::Planning => Some(StageName::Planning),
        JobState::Parsing => Some(StageName::Parsing),
        JobState::Enriching => Some(StageName::Enriching),
        JobState::Costing => Some(StageName::Costing),
        JobState::Uploaded | JobState::Completed | JobState::Failed => None,
    }
}

async fn dispatch(
    pipeline: &dyn StagePipeline,
    stage_name: StageName,
    job: &Job,
) -> Result<String, PipelineError> {
    match stage_name {
        StageName::Planning => pipeline.plan(job).await,
        StageName::Parsing => pipeline.parse(job).await,
        StageName::Enriching => pipeline.enrich(job).await,
        StageName::Costing => pipeline.cost(job).await,
    }
}

fn apply_reference(transition: &mut JobTransition, stage_name: StageName, reference: String) {
    match stage_name {
        StageName::Planning => transition.plan_reference = Some(Some(reference)),
        StageName::Costing => transition.result_reference = Some(Some(reference)),
        StageName::Parsing | StageName::Enriching => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_to_stage_maps_driven_states_only() {
        assert_eq!(state_to_stage(JobState::Planning), Some(StageName::Planning));
        assert_eq!(state_to_stage(JobState::Uploaded), None);
        assert_eq!(state_to_stage(JobState::Completed), None);
    }
}
