//! HTTP surface for the plan executor's internal API of spec §6: `POST
//! /execute`, `GET /status/{execution_id}`, `GET /result/{execution_id}`,
//! `DELETE /execution/{execution_id}`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::error::ExecutorResult;
use crate::executor::PlanExecutor;
use crate::models::{ExecuteRequest, ExecutionResultView, ExecutionStatusView};

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(execute, status, result, cancel),
    components(schemas(ExecuteRequest, ExecutionStatusView, ExecutionResultView))
)]
pub struct ApiDoc;

pub fn router(executor: Arc<PlanExecutor>) -> Router {
    Router::new()
        .route("/execute", post(execute))
        .route("/status/{execution_id}", get(status))
        .route("/result/{execution_id}", get(result))
        .route("/execution/{execution_id}", delete(cancel))
        .with_state(executor)
}

/// Submit IaC source for sandboxed plan execution. Returns immediately with
/// a `PENDING` status; poll `/status/{execution_id}` for progress.
#[utoipa::path(
    post,
    path = "/execute",
    tag = "plan-executor",
    request_body = ExecuteRequest,
    responses((status = 202, description = "Execution accepted", body = ExecutionStatusView))
)]
async fn execute(
    State(executor): State<Arc<PlanExecutor>>,
    Json(request): Json<ExecuteRequest>,
) -> (StatusCode, Json<ExecutionStatusView>) {
    let view = executor.submit(request).await;
    (StatusCode::ACCEPTED, Json(view))
}

/// Poll the status of a submitted execution.
#[utoipa::path(
    get,
    path = "/status/{execution_id}",
    tag = "plan-executor",
    params(("execution_id" = Uuid, Path, description = "Execution id")),
    responses(
        (status = 200, description = "Execution status", body = ExecutionStatusView),
        (status = 404, description = "No execution with this id")
    )
)]
async fn status(
    State(executor): State<Arc<PlanExecutor>>,
    Path(execution_id): Path<Uuid>,
) -> ExecutorResult<Json<ExecutionStatusView>> {
    let view = executor.status(execution_id).await?;
    Ok(Json(view))
}

/// Fetch the plan document produced by a terminal execution. Returns a
/// conflict while the execution is still pending or running.
#[utoipa::path(
    get,
    path = "/result/{execution_id}",
    tag = "plan-executor",
    params(("execution_id" = Uuid, Path, description = "Execution id")),
    responses(
        (status = 200, description = "Execution result", body = ExecutionResultView),
        (status = 404, description = "No execution with this id"),
        (status = 409, description = "Execution has not reached a terminal state")
    )
)]
async fn result(
    State(executor): State<Arc<PlanExecutor>>,
    Path(execution_id): Path<Uuid>,
) -> ExecutorResult<Json<ExecutionResultView>> {
    let view = executor.result(execution_id).await?;
    Ok(Json(view))
}

/// Cancel a running execution, killing its subprocess if one is active.
#[utoipa::path(
    delete,
    path = "/execution/{execution_id}",
    tag = "plan-executor",
    params(("execution_id" = Uuid, Path, description = "Execution id")),
    responses(
        (status = 204, description = "Execution cancelled"),
        (status = 404, description = "No execution with this id")
    )
)]
async fn cancel(
    State(executor): State<Arc<PlanExecutor>>,
    Path(execution_id): Path<Uuid>,
) -> ExecutorResult<StatusCode> {
    executor.cancel(execution_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
