//! HTTP surface for the `POST /enrich` internal API of spec §6: a
//! Normalized Resource Graph in, an Enriched Resource Graph out.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use core_cache::Cache;
use domain_cost_model::{EnrichedResourceGraph, NormalizedResourceGraph, PipelineError};
use utoipa::OpenApi;

use crate::describe::DescribeClient;
use crate::resolver::MetadataResolver;

#[derive(OpenApi)]
#[openapi(
    paths(enrich),
    components(schemas(NormalizedResourceGraph, EnrichedResourceGraph))
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct EnrichmentState {
    pub resolver: Arc<MetadataResolver>,
    pub describe_client: Arc<dyn DescribeClient>,
    pub cache: Arc<dyn Cache>,
}

pub fn router(state: EnrichmentState) -> Router {
    Router::new().route("/enrich", post(enrich)).with_state(state)
}

/// Enrich a Normalized Resource Graph with provider describe-* metadata.
#[utoipa::path(
    post,
    path = "/enrich",
    tag = "metadata-resolver",
    request_body = NormalizedResourceGraph,
    responses(
        (status = 200, description = "Enriched resource graph", body = EnrichedResourceGraph)
    )
)]
async fn enrich(
    State(state): State<EnrichmentState>,
    Json(nrg): Json<NormalizedResourceGraph>,
) -> Result<Json<EnrichedResourceGraph>, PipelineError> {
    let erg = state
        .resolver
        .enrich(&nrg, state.describe_client.as_ref(), state.cache.as_ref())
        .await;
    Ok(Json(erg))
}
