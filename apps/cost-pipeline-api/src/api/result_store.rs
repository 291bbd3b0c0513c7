//! Mounts the result store (C10) under `/results`: `POST /store`,
//! `GET /{result_id}`, `POST /history`, `POST /gate` internally, plus the
//! external immutable Result interface's explicit method-not-allowed
//! responses on the same path, grounded on
//! `results-governance-service/app/routers/results.py`'s `PUT`/`PATCH`/
//! `DELETE` handlers that unconditionally return 405 rather than letting
//! the router fall back to a bare 404.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{delete, patch, put};
use axum::Router;
use domain_result_store::{PgAuditRepository, PgResultRepository, ResultStoreState};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let store_state = ResultStoreState {
        results: Arc::new(PgResultRepository::new(state.db.clone())),
        audit: Arc::new(PgAuditRepository::new(state.db.clone())),
    };

    let immutable_guard =
        Router::new().route("/{result_id}", put(immutable).patch(immutable).delete(immutable));

    domain_result_store::handlers::router(store_state).merge(immutable_guard)
}

async fn immutable() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}
