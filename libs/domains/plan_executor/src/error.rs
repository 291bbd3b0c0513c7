use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_cost_model::PipelineError;
use thiserror::Error;

/// Failure taxonomy emitted by the plan executor worker, matching spec §4.3
/// exactly: `security_violation`, `validation_failure`, `timeout`,
/// `subprocess_failure`, `internal_error`.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("security violation: {0}")]
    SecurityViolation(String),

    #[error("validation failure: {0}")]
    ValidationFailure(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("subprocess failure: {0}")]
    SubprocessFailure(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;

impl From<std::io::Error> for ExecutorError {
    fn from(err: std::io::Error) -> Self {
        ExecutorError::Internal(err.to_string())
    }
}

impl From<ExecutorError> for PipelineError {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::SecurityViolation(msg) => PipelineError::SecurityViolation(msg),
            ExecutorError::ValidationFailure(msg) => PipelineError::Validation(msg),
            ExecutorError::Timeout(msg) => PipelineError::Timeout(msg),
            ExecutorError::SubprocessFailure(msg) => PipelineError::SubprocessFailure(msg),
            ExecutorError::Internal(msg) => PipelineError::Internal(msg),
            ExecutorError::NotFound(msg) => PipelineError::NotFound(msg),
            ExecutorError::Conflict(msg) => PipelineError::Conflict(msg),
        }
    }
}

impl From<ExecutorError> for AppError {
    fn from(err: ExecutorError) -> Self {
        PipelineError::from(err).into()
    }
}

impl IntoResponse for ExecutorError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
