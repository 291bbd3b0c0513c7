use axum::Router;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    domain_usage_modeler::handlers::router(state.usage_profiles.clone())
}
