use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_cost_model::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelerError {
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error("profile directory not found: {0}")]
    ProfileDirectoryMissing(String),

    #[error("malformed profile {0}: {1}")]
    MalformedProfile(String, String),
}

pub type ModelerResult<T> = Result<T, ModelerError>;

impl From<ModelerError> for PipelineError {
    fn from(err: ModelerError) -> Self {
        match err {
            ModelerError::ProfileNotFound(msg) => PipelineError::NotFound(msg),
            ModelerError::ProfileDirectoryMissing(msg) => PipelineError::Internal(msg),
            ModelerError::MalformedProfile(name, reason) => {
                PipelineError::Validation(format!("profile {name}: {reason}"))
            }
        }
    }
}

impl From<ModelerError> for AppError {
    fn from(err: ModelerError) -> Self {
        PipelineError::from(err).into()
    }
}

impl IntoResponse for ModelerError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
