use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_cost_model::PipelineError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("result not found: {0}")]
    NotFound(Uuid),

    #[error("a result already exists for job {0}")]
    AlreadyExists(Uuid),

    #[error("results are immutable: {0}")]
    ImmutabilityViolation(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => PipelineError::NotFound(format!("result for job {id}")),
            StoreError::AlreadyExists(id) => {
                PipelineError::Conflict(format!("result already exists for job {id}"))
            }
            StoreError::ImmutabilityViolation(msg) => PipelineError::ImmutabilityViolation(msg),
            StoreError::Validation(msg) => PipelineError::Validation(msg),
            StoreError::Database(msg) => PipelineError::Internal(msg),
            StoreError::Internal(msg) => PipelineError::Internal(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        PipelineError::from(err).into()
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_exists_maps_to_conflict() {
        let pipeline: PipelineError = StoreError::AlreadyExists(Uuid::now_v7()).into();
        assert_eq!(pipeline.kind(), "conflict");
    }

    #[test]
    fn immutability_violation_maps_to_immutability_violation() {
        let pipeline: PipelineError =
            StoreError::ImmutabilityViolation("update not allowed".into()).into();
        assert_eq!(pipeline.kind(), "immutability_violation");
    }
}
