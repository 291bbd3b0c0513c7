use domain_cost_model::{JobState, StageName};
use uuid::Uuid;

/// Row-level insert shape for a new job, distinct from `domain_cost_model::CreateJob`
/// (the externally-facing submit payload) because the repository also needs a
/// server-assigned `correlation_id`.
#[derive(Debug, Clone)]
pub struct CreateJobRow {
    pub upload_reference: String,
    pub region: String,
    pub usage_profile: String,
    pub idempotency_key: Option<String>,
    pub correlation_id: Uuid,
}

/// Fields updated when a job transitions between stages. `None` means
/// "leave unchanged"; `current_state`/`previous_state` are always written
/// together since a transition always moves both.
#[derive(Debug, Clone, Default)]
pub struct JobTransition {
    pub current_state: Option<JobState>,
    pub previous_state: Option<JobState>,
    pub retry_count: Option<i32>,
    pub error_message: Option<Option<String>>,
    pub plan_reference: Option<Option<String>>,
    pub result_reference: Option<Option<String>>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Insert shape for a stage execution opened on stage entry.
#[derive(Debug, Clone)]
pub struct OpenStageExecution {
    pub job_id: Uuid,
    pub stage_name: StageName,
    pub attempt_number: i32,
    pub input_digest: String,
}

/// Fields written when a stage execution is finalized on exit.
#[derive(Debug, Clone)]
pub struct CloseStageExecution {
    pub output_digest: Option<String>,
    pub error_message: Option<String>,
    pub duration_ms: i64,
    pub success: bool,
}
