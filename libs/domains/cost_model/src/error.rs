use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::errors::{AppError, ErrorResponse};
use thiserror::Error;

/// The one error type shared across every stage crate.
///
/// One variant per named error kind; no per-stage error enums, so that a
/// `PipelineError` surfaced by any component maps to exactly one HTTP
/// status regardless of which stage raised it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("result is immutable: {0}")]
    ImmutabilityViolation(String),

    #[error("forbidden: {0}")]
    SecurityViolation(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("subprocess failed: {0}")]
    SubprocessFailure(String),

    #[error("deterministic transform failed: {0}")]
    DeterministicTransformFailure(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation",
            PipelineError::NotFound(_) => "not_found",
            PipelineError::Conflict(_) => "conflict",
            PipelineError::ImmutabilityViolation(_) => "immutability_violation",
            PipelineError::SecurityViolation(_) => "security_violation",
            PipelineError::Timeout(_) => "timeout",
            PipelineError::UpstreamUnavailable(_) => "upstream_unavailable",
            PipelineError::SubprocessFailure(_) => "subprocess_failure",
            PipelineError::DeterministicTransformFailure(_) => "deterministic_transform_failure",
            PipelineError::Internal(_) => "internal_error",
        }
    }

    /// Validation and security errors are never retried; `timeout` and
    /// `subprocess_failure` are only retry-eligible from ENRICHING/COSTING,
    /// which the caller decides using the originating stage, not this kind
    /// alone — this reports the kind's retryability in isolation.
    pub fn is_retryable_kind(&self) -> bool {
        matches!(
            self,
            PipelineError::Timeout(_)
                | PipelineError::UpstreamUnavailable(_)
                | PipelineError::SubprocessFailure(_)
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
            PipelineError::NotFound(_) => StatusCode::NOT_FOUND,
            PipelineError::Conflict(_) => StatusCode::CONFLICT,
            PipelineError::ImmutabilityViolation(_) => StatusCode::METHOD_NOT_ALLOWED,
            PipelineError::SecurityViolation(_) => StatusCode::FORBIDDEN,
            PipelineError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            PipelineError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PipelineError::SubprocessFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::DeterministicTransformFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            code: status.as_u16() as i32,
            error: self.kind().to_string(),
            message: self.to_string(),
            details: None,
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(error: PipelineError) -> Self {
        match error {
            PipelineError::Validation(msg) => AppError::BadRequest(msg),
            PipelineError::NotFound(msg) => AppError::NotFound(msg),
            PipelineError::Conflict(msg) => AppError::Conflict(msg),
            PipelineError::ImmutabilityViolation(msg) => {
                AppError::UnprocessableEntity(format!("result is immutable: {msg}"))
            }
            PipelineError::SecurityViolation(msg) => AppError::Forbidden(msg),
            PipelineError::Timeout(msg) => AppError::ServiceUnavailable(msg),
            PipelineError::UpstreamUnavailable(msg) => AppError::ServiceUnavailable(msg),
            PipelineError::SubprocessFailure(msg) => AppError::UnprocessableEntity(msg),
            PipelineError::DeterministicTransformFailure(msg) => {
                AppError::UnprocessableEntity(msg)
            }
            PipelineError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_error_variant() {
        assert_eq!(PipelineError::Validation("x".into()).kind(), "validation");
        assert_eq!(
            PipelineError::ImmutabilityViolation("x".into()).kind(),
            "immutability_violation"
        );
    }

    #[test]
    fn immutability_violation_maps_to_405() {
        let err = PipelineError::ImmutabilityViolation("update not allowed".into());
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn only_timeout_and_upstream_and_subprocess_are_retryable_kinds() {
        assert!(PipelineError::Timeout("x".into()).is_retryable_kind());
        assert!(PipelineError::UpstreamUnavailable("x".into()).is_retryable_kind());
        assert!(PipelineError::SubprocessFailure("x".into()).is_retryable_kind());
        assert!(!PipelineError::Validation("x".into()).is_retryable_kind());
        assert!(!PipelineError::SecurityViolation("x".into()).is_retryable_kind());
    }
}
