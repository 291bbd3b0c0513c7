//! HTTP surface for the submit/status external interfaces of spec §6:
//! `create_job` and `get_job`. Job advancement itself is driven by a poller
//! calling `Orchestrator::advance` in a loop, not by a route — there is no
//! `POST /jobs/{job_id}/advance` exposed here on purpose.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use domain_cost_model::Job;
use serde::Deserialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::OrchestratorResult;
use crate::orchestrator::Orchestrator;

#[derive(OpenApi)]
#[openapi(paths(create_job, get_job), components(schemas(CreateJobRequest, Job)))]
pub struct ApiDoc;

pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/jobs", post(create_job))
        .route("/jobs/{job_id}", get(get_job))
        .with_state(orchestrator)
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateJobRequest {
    pub upload_reference: String,
    pub region: String,
    pub usage_profile: String,
    pub idempotency_key: Option<String>,
}

/// Submit a new cost-estimation job. A resubmit under an already-seen
/// `idempotency_key` returns the pre-existing job body, same status, no new
/// row created.
#[utoipa::path(
    post,
    path = "/jobs",
    tag = "orchestrator",
    request_body = CreateJobRequest,
    responses((status = 201, description = "Job accepted", body = Job))
)]
async fn create_job(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(request): Json<CreateJobRequest>,
) -> OrchestratorResult<(StatusCode, Json<Job>)> {
    let job = orchestrator
        .submit_job(
            request.upload_reference,
            request.region,
            request.usage_profile,
            request.idempotency_key,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// Read-only status lookup. `progress_percent` follows the fixed band per
/// `JobState::progress_range`.
#[utoipa::path(
    get,
    path = "/jobs/{job_id}",
    tag = "orchestrator",
    params(("job_id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job status", body = Job),
        (status = 404, description = "No job with this id")
    )
)]
async fn get_job(
    State(orchestrator): State<Arc<Orchestrator>>,
    Path(job_id): Path<Uuid>,
) -> OrchestratorResult<Json<Job>> {
    let job = orchestrator.get_job(job_id).await?;
    Ok(Json(job))
}
