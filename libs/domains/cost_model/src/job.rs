use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// Job state machine.
///
/// Allowed transitions are exactly the five forward arrows
/// (`Uploaded -> Planning -> Parsing -> Enriching -> Costing -> Completed`)
/// plus any non-terminal state directly to `Failed`. `Completed` and
/// `Failed` are terminal and have no outgoing transitions; enforcement lives
/// in `domain_orchestrator::state_machine`, not here — this enum is the
/// shared vocabulary, not the guard.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
    TS,
)]
#[ts(export)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "job_state")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobState {
    #[default]
    #[sea_orm(string_value = "uploaded")]
    Uploaded,
    #[sea_orm(string_value = "planning")]
    Planning,
    #[sea_orm(string_value = "parsing")]
    Parsing,
    #[sea_orm(string_value = "enriching")]
    Enriching,
    #[sea_orm(string_value = "costing")]
    Costing,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// The single forward successor in the happy path, or `None` for
    /// terminal states and for `Completed`'s predecessor `Costing` (which
    /// has a forward successor, `Completed`, handled below).
    pub fn next_on_success(self) -> Option<JobState> {
        match self {
            JobState::Uploaded => Some(JobState::Planning),
            JobState::Planning => Some(JobState::Parsing),
            JobState::Parsing => Some(JobState::Enriching),
            JobState::Enriching => Some(JobState::Costing),
            JobState::Costing => Some(JobState::Completed),
            JobState::Completed | JobState::Failed => None,
        }
    }

    /// True if `self -> next` is one of the allowed transitions: the one
    /// forward arrow, or any non-terminal state directly to `Failed`.
    pub fn can_transition_to(self, next: JobState) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == JobState::Failed || self.next_on_success() == Some(next)
    }

    /// Fixed progress-percent band for the status interface.
    pub fn progress_range(self) -> (u8, u8) {
        match self {
            JobState::Uploaded => (0, 10),
            JobState::Planning => (10, 20),
            JobState::Parsing => (20, 40),
            JobState::Enriching => (40, 60),
            JobState::Costing => (60, 95),
            JobState::Completed => (100, 100),
            JobState::Failed => (0, 100),
        }
    }
}

/// Per-stage execution identity, matching `JobState`'s four driven stages
/// (uploaded/completed/failed are not stage executions, they're job states).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
    TS,
)]
#[ts(export)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "stage_name")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StageName {
    #[sea_orm(string_value = "planning")]
    Planning,
    #[sea_orm(string_value = "parsing")]
    Parsing,
    #[sea_orm(string_value = "enriching")]
    Enriching,
    #[sea_orm(string_value = "costing")]
    Costing,
}

impl StageName {
    pub fn as_job_state(self) -> JobState {
        match self {
            StageName::Planning => JobState::Planning,
            StageName::Parsing => JobState::Parsing,
            StageName::Enriching => JobState::Enriching,
            StageName::Costing => JobState::Costing,
        }
    }

    pub const ALL: [StageName; 4] = [
        StageName::Planning,
        StageName::Parsing,
        StageName::Enriching,
        StageName::Costing,
    ];
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
    TS,
)]
#[ts(export)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "stage_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StageStatus {
    #[default]
    #[sea_orm(string_value = "running")]
    Running,
    #[sea_orm(string_value = "success")]
    Success,
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Per-stage timeout/retry policy. Retry eligibility is not a plain
/// per-stage bool because "retryable" is defined per error classification
/// (throttling/5xx), not per stage alone.
#[derive(Debug, Clone, Copy)]
pub struct StagePolicy {
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

impl StageName {
    pub fn policy(self) -> StagePolicy {
        match self {
            StageName::Planning => StagePolicy {
                timeout_seconds: 300,
                max_retries: 0,
            },
            StageName::Parsing => StagePolicy {
                timeout_seconds: 120,
                max_retries: 0,
            },
            StageName::Enriching => StagePolicy {
                timeout_seconds: 180,
                max_retries: 2,
            },
            StageName::Costing => StagePolicy {
                timeout_seconds: 60,
                max_retries: 2,
            },
        }
    }

    /// Whether a retryable failure in this stage may be retried at all.
    /// PLANNING and PARSING are never retried even on a retryable
    /// classification (subprocess isn't idempotent / transform is
    /// deterministic so a retry can't change the outcome).
    pub fn retry_eligible(self) -> bool {
        matches!(self, StageName::Enriching | StageName::Costing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct Job {
    #[ts(as = "String")]
    pub id: Uuid,
    pub upload_reference: String,
    pub region: String,
    pub usage_profile: String,
    pub idempotency_key: Option<String>,
    #[ts(as = "String")]
    pub correlation_id: Uuid,
    pub current_state: JobState,
    pub previous_state: Option<JobState>,
    pub retry_count: i32,
    pub error_message: Option<String>,
    pub plan_reference: Option<String>,
    pub result_reference: Option<String>,
    #[ts(as = "Option<String>")]
    pub started_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Progress percent for the status interface, clamped within the
    /// current state's band; `Failed` reports the last non-terminal state's
    /// progress, since a failure can occur at any point in the pipeline.
    pub fn progress_percent(&self) -> u8 {
        if self.current_state == JobState::Failed {
            return self
                .previous_state
                .map(|s| s.progress_range().1)
                .unwrap_or(0);
        }
        self.current_state.progress_range().0
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateJob {
    pub upload_reference: String,
    pub region: String,
    pub usage_profile: String,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct StageExecution {
    #[ts(as = "String")]
    pub id: Uuid,
    #[ts(as = "String")]
    pub job_id: Uuid,
    pub stage_name: StageName,
    pub attempt_number: i32,
    pub status: StageStatus,
    pub input_digest: String,
    pub output_digest: Option<String>,
    pub error_message: Option<String>,
    pub duration_ms: Option<i64>,
    #[ts(as = "String")]
    pub started_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_allowed() {
        assert!(JobState::Uploaded.can_transition_to(JobState::Planning));
        assert!(JobState::Planning.can_transition_to(JobState::Parsing));
        assert!(JobState::Parsing.can_transition_to(JobState::Enriching));
        assert!(JobState::Enriching.can_transition_to(JobState::Costing));
        assert!(JobState::Costing.can_transition_to(JobState::Completed));
    }

    #[test]
    fn any_non_terminal_can_fail() {
        assert!(JobState::Uploaded.can_transition_to(JobState::Failed));
        assert!(JobState::Enriching.can_transition_to(JobState::Failed));
    }

    #[test]
    fn terminal_states_have_no_outgoing_transitions() {
        assert!(!JobState::Completed.can_transition_to(JobState::Failed));
        assert!(!JobState::Failed.can_transition_to(JobState::Uploaded));
    }

    #[test]
    fn skipping_a_stage_is_rejected() {
        assert!(!JobState::Uploaded.can_transition_to(JobState::Parsing));
    }

    #[test]
    fn planning_and_parsing_are_never_retry_eligible() {
        assert!(!StageName::Planning.retry_eligible());
        assert!(!StageName::Parsing.retry_eligible());
        assert!(StageName::Enriching.retry_eligible());
        assert!(StageName::Costing.retry_eligible());
    }
}
