use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Terminal and non-terminal execution states per spec §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Timeout,
    Killed,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed
                | ExecutionStatus::Failed
                | ExecutionStatus::Timeout
                | ExecutionStatus::Killed
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExecuteRequest {
    pub job_id: Uuid,
    pub iac_source: IacSource,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub variables: serde_json::Map<String, serde_json::Value>,
    pub credential_reference: Option<String>,
}

/// Inline file contents, keyed by workspace-relative path. A durable
/// deployment would reference an object-store location instead; the
/// internal API contract (spec §6) takes `iac_source` as an opaque
/// reference, which this variant satisfies by embedding the payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IacSource {
    pub files: Vec<IacFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IacFile {
    pub path: String,
    pub contents: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExecutionStatusView {
    pub execution_id: Uuid,
    pub status: ExecutionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExecutionResultView {
    pub status: ExecutionStatus,
    #[schema(value_type = Object)]
    pub plan_document: Option<serde_json::Value>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ExecutionRecord {
    pub execution_id: Uuid,
    pub job_id: Uuid,
    pub status: ExecutionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub error_message: Option<String>,
    pub plan_document: Option<serde_json::Value>,
    pub cancelled: bool,
}

impl ExecutionRecord {
    pub(crate) fn pending(execution_id: Uuid, job_id: Uuid) -> Self {
        Self {
            execution_id,
            job_id,
            status: ExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            duration_ms: None,
            error_message: None,
            plan_document: None,
            cancelled: false,
        }
    }
}
