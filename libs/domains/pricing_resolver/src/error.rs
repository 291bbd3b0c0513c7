use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_cost_model::PipelineError;
use domain_pricing::error::PricingError;
use thiserror::Error;

/// Failure taxonomy for the pricing internal API (spec §6): 400 unsupported
/// service, 404 no match, 503 on upstream failure.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("unsupported service: {0}")]
    UnsupportedService(String),

    #[error("unknown region: {0}")]
    UnknownRegion(String),

    #[error("no matching price found for {0}")]
    NoMatch(String),

    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ResolverResult<T> = Result<T, ResolverError>;

impl From<PricingError> for ResolverError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::NotFound(msg) => ResolverError::NoMatch(msg),
            PricingError::Database(e) => ResolverError::CatalogUnavailable(e.to_string()),
            PricingError::Provider(msg) => ResolverError::CatalogUnavailable(msg),
            PricingError::InvalidInput(msg) => ResolverError::UnsupportedService(msg),
            PricingError::Duplicate(msg) | PricingError::Internal(msg) => ResolverError::Internal(msg),
        }
    }
}

impl From<core_cache::CacheError> for ResolverError {
    fn from(err: core_cache::CacheError) -> Self {
        ResolverError::CatalogUnavailable(err.to_string())
    }
}

impl From<ResolverError> for PipelineError {
    fn from(err: ResolverError) -> Self {
        match err {
            ResolverError::UnsupportedService(msg) | ResolverError::UnknownRegion(msg) => {
                PipelineError::Validation(msg)
            }
            ResolverError::NoMatch(msg) => PipelineError::NotFound(msg),
            ResolverError::CatalogUnavailable(msg) => PipelineError::UpstreamUnavailable(msg),
            ResolverError::Internal(msg) => PipelineError::Internal(msg),
        }
    }
}

impl From<ResolverError> for AppError {
    fn from(err: ResolverError) -> Self {
        PipelineError::from(err).into()
    }
}

impl IntoResponse for ResolverError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
