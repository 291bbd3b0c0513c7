//! Assembles every stage service's internal routes, plus the result
//! store's internal and external routes, behind this gateway's single
//! `/api` mount point (added by `axum_helpers::server::create_router`).

use axum::Router;

use crate::api::{cost, interpreter, metadata, pricing, result_store, usage};
use crate::state::AppState;

pub fn build(state: &AppState) -> Router {
    Router::new()
        .merge(interpreter::router())
        .merge(metadata::router(state))
        .merge(pricing::router(state))
        .merge(usage::router(state))
        .merge(cost::router())
        .nest("/results", result_store::router(state))
}
