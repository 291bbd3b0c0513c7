//! Per-stage execution lifecycle: open a stage-execution record, run the
//! stage body under its timeout (and, for retry-eligible stages, under
//! `core_retry`), and finalize the record on every exit path.

use std::future::Future;
use std::time::{Duration, Instant};

use core_retry::{retry_with_cancellation, Classification, RetryError, RetryPolicy};
use domain_cost_model::{PipelineError, StageExecution, StageName};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::models::{CloseStageExecution, OpenStageExecution};
use crate::repository::StageExecutionRepository;

/// Default backoff shape for retry-eligible stages; the stage's own
/// `max_retries` still bounds the attempt count.
const RETRY_BASE_DELAY_MS: u64 = 200;
const RETRY_MAX_DELAY_MS: u64 = 5_000;

pub struct StageOutcome<T> {
    pub value: T,
    pub execution: StageExecution,
}

/// Runs `operation` as one stage attempt: opens the stage-execution record,
/// enforces the stage's timeout, retries under `core_retry` when the stage
/// is retry-eligible, and closes the record with the outcome regardless of
/// how the attempt ended.
pub async fn run_stage<F, Fut, T>(
    stage_repo: &dyn StageExecutionRepository,
    job_id: Uuid,
    stage_name: StageName,
    attempt_number: i32,
    input_digest: String,
    operation: F,
) -> OrchestratorResult<StageOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let policy = stage_name.policy();
    let execution = stage_repo
        .open(OpenStageExecution {
            job_id,
            stage_name,
            attempt_number,
            input_digest,
        })
        .await?;

    let started = Instant::now();
    let cancel = CancellationToken::new();
    let timeout = Duration::from_secs(policy.timeout_seconds);

    let outcome = tokio::time::timeout(timeout, run_with_retry(operation, stage_name, &cancel)).await;
    let duration_ms = started.elapsed().as_millis() as i64;

    match outcome {
        Ok(Ok(value)) => {
            let execution = stage_repo
                .close(
                    execution.id,
                    CloseStageExecution {
                        output_digest: None,
                        error_message: None,
                        duration_ms,
                        success: true,
                    },
                )
                .await?;
            Ok(StageOutcome { value, execution })
        }
        Ok(Err(err)) => {
            let message = err.to_string();
            stage_repo
                .close(
                    execution.id,
                    CloseStageExecution {
                        output_digest: None,
                        error_message: Some(message.clone()),
                        duration_ms,
                        success: false,
                    },
                )
                .await?;
            Err(stage_error(stage_name, err, message))
        }
        Err(_elapsed) => {
            cancel.cancel();
            let message = format!("{stage_name} exceeded {}s timeout", policy.timeout_seconds);
            stage_repo
                .close(
                    execution.id,
                    CloseStageExecution {
                        output_digest: None,
                        error_message: Some(message.clone()),
                        duration_ms,
                        success: false,
                    },
                )
                .await?;
            Err(OrchestratorError::StageTimeout(message))
        }
    }
}

async fn run_with_retry<F, Fut, T>(
    mut operation: F,
    stage_name: StageName,
    cancel: &CancellationToken,
) -> Result<T, PipelineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    if !stage_name.retry_eligible() {
        return operation().await;
    }

    let policy = stage_name.policy();
    let retry_policy = RetryPolicy::new(policy.max_retries, RETRY_BASE_DELAY_MS, RETRY_MAX_DELAY_MS);

    retry_with_cancellation(operation, retry_policy, cancel, |err: &PipelineError| {
        if err.is_retryable_kind() {
            Classification::Retryable
        } else {
            Classification::Terminal
        }
    })
    .await
    .map_err(|err: RetryError<PipelineError>| match err {
        RetryError::Cancelled => PipelineError::Timeout("stage cancelled".to_string()),
        RetryError::Terminal(inner) | RetryError::Exhausted(inner) => inner,
    })
}

fn stage_error(stage_name: StageName, err: PipelineError, message: String) -> OrchestratorError {
    match err {
        PipelineError::Validation(_) | PipelineError::SecurityViolation(_) => {
            OrchestratorError::Validation(message)
        }
        PipelineError::Timeout(_) => OrchestratorError::StageTimeout(message),
        _ => OrchestratorError::StageFailed(format!("{stage_name}: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockStageExecutionRepository;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn open_execution(job_id: Uuid, stage_name: StageName) -> StageExecution {
        StageExecution {
            id: Uuid::now_v7(),
            job_id,
            stage_name,
            attempt_number: 1,
            status: domain_cost_model::StageStatus::Running,
            input_digest: "digest".into(),
            output_digest: None,
            error_message: None,
            duration_ms: None,
            started_at: chrono::Utc::now(),
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn successful_stage_closes_with_success() {
        let job_id = Uuid::now_v7();
        let mut repo = MockStageExecutionRepository::new();
        let execution = open_execution(job_id, StageName::Parsing);
        let execution_clone = execution.clone();
        repo.expect_open().returning(move |_| Ok(execution_clone.clone()));
        repo.expect_close()
            .withf(|_, close| close.success)
            .returning(move |_, _| Ok(execution.clone()));

        let outcome = run_stage(&repo, job_id, StageName::Parsing, 1, "digest".into(), || async {
            Ok::<_, PipelineError>(42)
        })
        .await
        .unwrap();

        assert_eq!(outcome.value, 42);
    }

    #[tokio::test]
    async fn non_retry_eligible_stage_fails_on_first_error() {
        let job_id = Uuid::now_v7();
        let mut repo = MockStageExecutionRepository::new();
        let execution = open_execution(job_id, StageName::Planning);
        let execution_clone = execution.clone();
        repo.expect_open().returning(move |_| Ok(execution_clone.clone()));
        repo.expect_close()
            .withf(|_, close| !close.success)
            .returning(move |_, _| Ok(execution.clone()));

        let attempts = Arc::new(AtomicU32::new(0));
        let counted = attempts.clone();

        let result = run_stage(&repo, job_id, StageName::Planning, 1, "digest".into(), move || {
            let counted = counted.clone();
            async move {
                counted.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(PipelineError::UpstreamUnavailable("down".into()))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_eligible_stage_retries_transient_failures() {
        let job_id = Uuid::now_v7();
        let mut repo = MockStageExecutionRepository::new();
        let execution = open_execution(job_id, StageName::Enriching);
        let execution_clone = execution.clone();
        repo.expect_open().returning(move |_| Ok(execution_clone.clone()));
        repo.expect_close()
            .withf(|_, close| close.success)
            .returning(move |_, _| Ok(execution.clone()));

        let attempts = Arc::new(AtomicU32::new(0));
        let counted = attempts.clone();

        let outcome = run_stage(&repo, job_id, StageName::Enriching, 1, "digest".into(), move || {
            let counted = counted.clone();
            async move {
                if counted.fetch_add(1, Ordering::SeqCst) < 1 {
                    Err(PipelineError::UpstreamUnavailable("throttled".into()))
                } else {
                    Ok(7)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome.value, 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
