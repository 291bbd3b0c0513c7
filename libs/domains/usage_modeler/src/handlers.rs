//! HTTP surface for the `POST /apply` and `GET /profiles` internal APIs of
//! spec §6: apply a named usage profile (plus overrides) to an enriched
//! resource graph, and list the profiles available to apply.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use domain_cost_model::{ErgNode, UsageAnnotatedResourceGraph, UsageOverride};
use serde::Deserialize;
use utoipa::{OpenApi, ToSchema};

use crate::error::ModelerError;
use crate::modeler::UsageModeler;
use crate::profile::ProfileStore;

#[derive(OpenApi)]
#[openapi(
    paths(apply, list_profiles),
    components(schemas(ApplyRequest, UsageAnnotatedResourceGraph))
)]
pub struct ApiDoc;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApplyRequest {
    pub nodes: Vec<ErgNode>,
    pub profile_name: String,
    #[serde(default)]
    pub overrides: Vec<UsageOverride>,
}

pub fn router(profiles: Arc<ProfileStore>) -> Router {
    Router::new()
        .route("/apply", post(apply))
        .route("/profiles", get(list_profiles))
        .with_state(profiles)
}

/// Apply a named usage profile (plus resource/type/service overrides) to an
/// enriched resource graph, producing a usage-annotated resource graph.
#[utoipa::path(
    post,
    path = "/apply",
    tag = "usage-modeler",
    request_body = ApplyRequest,
    responses(
        (status = 200, description = "Usage-annotated resource graph", body = UsageAnnotatedResourceGraph),
        (status = 404, description = "Unknown usage profile")
    )
)]
async fn apply(
    State(profiles): State<Arc<ProfileStore>>,
    Json(request): Json<ApplyRequest>,
) -> Result<Json<UsageAnnotatedResourceGraph>, ModelerError> {
    let modeler = UsageModeler::new(&profiles);
    let uarg = modeler.apply(request.nodes, &request.profile_name, &request.overrides)?;
    Ok(Json(uarg))
}

/// List the usage profiles currently loaded and available to `/apply`.
#[utoipa::path(
    get,
    path = "/profiles",
    tag = "usage-modeler",
    responses((status = 200, description = "Loaded profile names", body = Vec<String>))
)]
async fn list_profiles(State(profiles): State<Arc<ProfileStore>>) -> Json<Vec<String>> {
    Json(profiles.list().into_iter().map(str::to_string).collect())
}
