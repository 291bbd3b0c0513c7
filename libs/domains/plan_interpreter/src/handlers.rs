//! HTTP surface for the `POST /interpret` internal API of spec §6: a plan
//! document in, a Normalized Resource Graph out. Stateless and pure, so
//! unlike the other stage handlers this router needs no service struct.

use axum::{routing::post, Json, Router};
use domain_cost_model::{NormalizedResourceGraph, PipelineError};
use utoipa::OpenApi;

use crate::interpreter::interpret_plan_document;
use crate::model::PlanDocument;

#[derive(OpenApi)]
#[openapi(
    paths(interpret),
    components(schemas(PlanDocument, NormalizedResourceGraph))
)]
pub struct ApiDoc;

pub fn router() -> Router {
    Router::new().route("/interpret", post(interpret))
}

/// Interpret a planned-change document into a Normalized Resource Graph.
#[utoipa::path(
    post,
    path = "/interpret",
    tag = "plan-interpreter",
    request_body = PlanDocument,
    responses(
        (status = 200, description = "Normalized resource graph", body = NormalizedResourceGraph),
        (status = 422, description = "Plan document could not be interpreted deterministically")
    )
)]
async fn interpret(
    Json(plan): Json<PlanDocument>,
) -> Result<Json<NormalizedResourceGraph>, PipelineError> {
    let nrg = interpret_plan_document(&plan)?;
    Ok(Json(nrg))
}
