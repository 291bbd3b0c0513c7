//! HTTP surface for the `POST /lookup` internal API of spec §6: a
//! service/region/resource-type/attributes query in, normalized prices out.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use utoipa::OpenApi;

use crate::error::ResolverError;
use crate::models::{LookupRequest, LookupResponse};
use crate::resolver::PricingResolver;

#[derive(OpenApi)]
#[openapi(paths(lookup), components(schemas(LookupRequest, LookupResponse)))]
pub struct ApiDoc;

pub fn router(resolver: PricingResolver) -> Router {
    Router::new()
        .route("/lookup", post(lookup))
        .with_state(Arc::new(resolver))
}

/// Look up normalized, confidence-rated prices for a resource type in a region.
#[utoipa::path(
    post,
    path = "/lookup",
    tag = "pricing-resolver",
    request_body = LookupRequest,
    responses(
        (status = 200, description = "Matched prices", body = LookupResponse),
        (status = 404, description = "No catalog entry matched the request")
    )
)]
async fn lookup(
    State(resolver): State<Arc<PricingResolver>>,
    Json(request): Json<LookupRequest>,
) -> Result<Json<LookupResponse>, ResolverError> {
    let response = resolver.lookup(request).await?;
    Ok(Json(response))
}
