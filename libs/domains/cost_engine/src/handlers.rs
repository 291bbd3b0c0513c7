//! HTTP surface for the `POST /aggregate` internal API of spec §6: matched
//! pricing plus usage annotations in, the Final Cost Model out.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use utoipa::OpenApi;

use crate::engine::CostEngine;
use crate::models::{AggregateRequest, AggregateResponse};

#[derive(OpenApi)]
#[openapi(paths(aggregate), components(schemas(AggregateRequest, AggregateResponse)))]
pub struct ApiDoc;

pub fn router(engine: CostEngine) -> Router {
    Router::new()
        .route("/aggregate", post(aggregate))
        .with_state(Arc::new(engine))
}

/// Compute the Final Cost Model for a set of resources given their matched
/// pricing and usage annotations.
#[utoipa::path(
    post,
    path = "/aggregate",
    tag = "cost-engine",
    request_body = AggregateRequest,
    responses((status = 200, description = "Final cost model", body = AggregateResponse))
)]
async fn aggregate(
    State(engine): State<Arc<CostEngine>>,
    Json(request): Json<AggregateRequest>,
) -> Json<AggregateResponse> {
    let fcm = engine.compute(
        &request.resources,
        &request.pricing_records,
        &request.usage_records,
        request.currency,
        request.precision,
    );
    Json(AggregateResponse { fcm })
}
