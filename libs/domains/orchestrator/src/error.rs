use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_cost_model::PipelineError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("job not found: {0}")]
    NotFound(Uuid),

    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("could not acquire lock for job {0}")]
    LockUnavailable(Uuid),

    #[error("stage timed out: {0}")]
    StageTimeout(String),

    #[error("stage failed: {0}")]
    StageFailed(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

impl From<sea_orm::DbErr> for OrchestratorError {
    fn from(err: sea_orm::DbErr) -> Self {
        OrchestratorError::Database(err.to_string())
    }
}

impl From<core_cache::CacheError> for OrchestratorError {
    fn from(err: core_cache::CacheError) -> Self {
        OrchestratorError::Cache(err.to_string())
    }
}

impl From<OrchestratorError> for PipelineError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::NotFound(id) => PipelineError::NotFound(format!("job {id}")),
            OrchestratorError::InvalidTransition { from, to } => {
                PipelineError::Validation(format!("invalid transition {from} -> {to}"))
            }
            OrchestratorError::LockUnavailable(id) => {
                PipelineError::Conflict(format!("job {id} is already being processed"))
            }
            OrchestratorError::StageTimeout(msg) => PipelineError::Timeout(msg),
            OrchestratorError::StageFailed(msg) => PipelineError::SubprocessFailure(msg),
            OrchestratorError::Validation(msg) => PipelineError::Validation(msg),
            OrchestratorError::Database(msg) => PipelineError::Internal(msg),
            OrchestratorError::Cache(msg) => PipelineError::UpstreamUnavailable(msg),
            OrchestratorError::Internal(msg) => PipelineError::Internal(msg),
        }
    }
}

impl From<OrchestratorError> for AppError {
    fn from(err: OrchestratorError) -> Self {
        PipelineError::from(err).into()
    }
}

impl IntoResponse for OrchestratorError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_unavailable_maps_to_conflict() {
        let id = Uuid::now_v7();
        let pipeline: PipelineError = OrchestratorError::LockUnavailable(id).into();
        assert_eq!(pipeline.kind(), "conflict");
    }

    #[test]
    fn stage_timeout_maps_to_timeout() {
        let pipeline: PipelineError = OrchestratorError::StageTimeout("slow".into()).into();
        assert_eq!(pipeline.kind(), "timeout");
    }
}
