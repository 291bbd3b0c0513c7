use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_cost_model::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<EngineError> for PipelineError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(msg) => PipelineError::Validation(msg),
            EngineError::Internal(msg) => PipelineError::Internal(msg),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        PipelineError::from(err).into()
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
