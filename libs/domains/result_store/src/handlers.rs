//! HTTP surface for the result-store internal API of spec §6: `POST
//! /store`, `GET /{result_id}`, `POST /history`, `POST /gate`. Every
//! mutating call appends exactly one audit log entry, matching
//! `crate::audit`'s construction helpers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use domain_cost_model::{Confidence, GateResult, ImmutableCostResult};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json_;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::audit;
use crate::entity::cost_results::NewCostResult;
use crate::error::{StoreError, StoreResult};
use crate::gate::{evaluate, GatePolicy};
use crate::repository::{AuditRepository, ResultRepository};

#[derive(OpenApi)]
#[openapi(
    paths(store, get_result, history, gate),
    components(schemas(StoreRequest, HistoryRequest, GateRequest, ImmutableCostResult, GateResult))
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct ResultStoreState {
    pub results: Arc<dyn ResultRepository>,
    pub audit: Arc<dyn AuditRepository>,
}

pub fn router(state: ResultStoreState) -> Router {
    Router::new()
        .route("/store", post(store))
        .route("/{result_id}", get(get_result))
        .route("/history", post(history))
        .route("/gate", post(gate))
        .with_state(state)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoreRequest {
    pub job_id: Uuid,
    pub pricing_snapshot: Json_,
    pub usage_profile: String,
    pub fcm: domain_cost_model::Fcm,
    pub confidence: Confidence,
    pub created_by: Option<String>,
    pub correlation_id: Uuid,
}

/// Persist a job's Final Cost Model. Duplicate `job_id` is rejected with a
/// typed conflict rather than silently overwriting the existing record.
#[utoipa::path(
    post,
    path = "/store",
    tag = "result-store",
    request_body = StoreRequest,
    responses(
        (status = 201, description = "Result persisted", body = ImmutableCostResult),
        (status = 409, description = "A result already exists for this job_id")
    )
)]
async fn store(
    State(state): State<ResultStoreState>,
    Json(request): Json<StoreRequest>,
) -> StoreResult<Json<ImmutableCostResult>> {
    let correlation_id = request.correlation_id;
    let job_id = request.job_id;
    let result = state
        .results
        .create(NewCostResult {
            job_id: request.job_id,
            pricing_snapshot: request.pricing_snapshot,
            usage_profile: request.usage_profile,
            fcm: request.fcm,
            confidence: request.confidence,
            created_by: request.created_by,
            correlation_id,
        })
        .await?;

    state
        .audit
        .log_action(audit::persisted(None, correlation_id, job_id))
        .await?;

    Ok(Json(result))
}

/// Fetch an immutable cost result by its id. Read-only: there is no
/// corresponding update/delete route, on purpose.
#[utoipa::path(
    get,
    path = "/{result_id}",
    tag = "result-store",
    params(("result_id" = Uuid, Path, description = "Result id")),
    responses(
        (status = 200, description = "Result found", body = ImmutableCostResult),
        (status = 404, description = "No result with this id")
    )
)]
async fn get_result(
    State(state): State<ResultStoreState>,
    Path(result_id): Path<Uuid>,
) -> StoreResult<Json<ImmutableCostResult>> {
    let result = state
        .results
        .get_by_id(result_id)
        .await?
        .ok_or(StoreError::NotFound(result_id))?;
    Ok(Json(result))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct HistoryRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    50
}

/// Paginated listing of stored results, most recent first.
#[utoipa::path(
    post,
    path = "/history",
    tag = "result-store",
    request_body = HistoryRequest,
    responses((status = 200, description = "Page of results", body = Vec<ImmutableCostResult>))
)]
async fn history(
    State(state): State<ResultStoreState>,
    Json(request): Json<HistoryRequest>,
) -> StoreResult<Json<Vec<ImmutableCostResult>>> {
    let results = state.results.list_by_project(request.limit, request.offset).await?;
    Ok(Json(results))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GateRequest {
    pub result_id: Uuid,
    pub baseline_id: Option<Uuid>,
    #[serde(default)]
    pub policy: GatePolicy,
}

/// Evaluate a candidate result against a policy (and optionally a baseline
/// result), producing PASS/FAIL, violations, and an exit code.
#[utoipa::path(
    post,
    path = "/gate",
    tag = "result-store",
    request_body = GateRequest,
    responses(
        (status = 200, description = "Gate outcome", body = GateResult),
        (status = 404, description = "Candidate or baseline result not found")
    )
)]
async fn gate(
    State(state): State<ResultStoreState>,
    Json(request): Json<GateRequest>,
) -> StoreResult<Json<GateResult>> {
    let candidate = state
        .results
        .get_by_id(request.result_id)
        .await?
        .ok_or(StoreError::NotFound(request.result_id))?;

    let baseline = match request.baseline_id {
        Some(id) => Some(
            state
                .results
                .get_by_id(id)
                .await?
                .ok_or(StoreError::NotFound(id))?,
        ),
        None => None,
    };

    let outcome = evaluate(&candidate, baseline.as_ref(), &request.policy);

    state
        .audit
        .log_action(audit::gate_evaluated(
            None,
            candidate.correlation_id,
            candidate.id,
            serde_json::to_value(&outcome).unwrap_or(Json_::Null),
        ))
        .await?;

    Ok(Json(outcome))
}
